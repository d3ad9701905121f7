// Copyright 2023 Greptime Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Benchmark binary
//!
//! Usage:
//!   cargo run --release
//!
//! Configuration comes from the environment or a `.env` file, for example:
//!   CLICKHOUSE__HOST       - ClickHouse host (default: clickhouse-node1)
//!   VERTICA__HOST          - Vertica host (default: vertica)
//!   BATCH_SIZE             - Events per run (default: 1000)
//!   RUN_ONCE               - Stop after one run (default: false)
//!   RUN_INTERVAL_SECONDS   - Pause between runs (default: 5)
//!   LOG_LEVEL              - Log level (default: info)

use std::process::ExitCode;

use log::info;
use olap_bench::logging::{init_logging, LogFileOptions};
use olap_bench::{run_benchmark, ChartReporter, Settings};

#[tokio::main]
async fn main() -> ExitCode {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = init_logging(settings.log_level, &LogFileOptions::default()) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    // databases in the same compose project may still be starting
    tokio::time::sleep(settings.startup_delay()).await;
    info!("Start script");

    let reporter = ChartReporter::default();
    loop {
        if let Ok(timings) = run_benchmark(&settings, &reporter).await {
            info!("Run finished: {:?}", timings.as_map());
        }
        if settings.run_once {
            break;
        }
        info!("Next run in {}s", settings.run_interval_seconds);
        tokio::time::sleep(settings.run_interval()).await;
    }
    ExitCode::SUCCESS
}
