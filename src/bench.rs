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

//! Benchmark Runner
//!
//! Drives one benchmark run through its phases: connect, provision both tables,
//! generate events, write to ClickHouse then Vertica, read both back, report.
//! Phases run strictly one after another.
//!
//! Failures are handled per call. Provisioning and the ClickHouse write are logged
//! and the run goes on. A failed Vertica connect or write, or a failed read, aborts
//! the run with [Error::BenchmarkAborted](crate::error::Error::BenchmarkAborted).

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use log::{error, info};
use rand::rngs::StdRng;
use rand::Rng;
use snafu::ResultExt;

use crate::column_store::{ColumnStore, ColumnStoreLoader};
use crate::config::Settings;
use crate::error::{BenchmarkAbortedSnafu, Result};
use crate::generator::EventGenerator;
use crate::report::Reporter;
use crate::row_store::{RowStoreLoader, RowStoreSession};

/// Phases of a run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Connect,
    InitTables,
    Generate,
    WriteColumnStore,
    WriteRowStore,
    ReadColumnStore,
    ReadRowStore,
    Report,
    Done,
}

/// Elapsed time of the four measured operations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BenchmarkTimings {
    pub clickhouse_write: Duration,
    pub vertica_write: Duration,
    pub clickhouse_read: Duration,
    pub vertica_read: Duration,
}

impl BenchmarkTimings {
    pub const KEYS: [&'static str; 4] = [
        "clickhouse_write_time",
        "vertica_write_time",
        "clickhouse_read_time",
        "vertica_read_time",
    ];

    /// Timings in seconds keyed by [Self::KEYS]
    pub fn as_map(&self) -> BTreeMap<&'static str, f64> {
        let values = [
            self.clickhouse_write,
            self.vertica_write,
            self.clickhouse_read,
            self.vertica_read,
        ];
        Self::KEYS
            .into_iter()
            .zip(values.map(|d| d.as_secs_f64()))
            .collect()
    }

    pub fn log_summary(&self) {
        info!(
            "ClickHouse write time: {:.2} seconds",
            self.clickhouse_write.as_secs_f64()
        );
        info!(
            "Vertica write time: {:.2} seconds",
            self.vertica_write.as_secs_f64()
        );
        info!(
            "ClickHouse read time: {:.2} seconds",
            self.clickhouse_read.as_secs_f64()
        );
        info!(
            "Vertica read time: {:.2} seconds",
            self.vertica_read.as_secs_f64()
        );
    }
}

/// Runs the benchmark phases over a pair of loaders
pub struct BenchmarkRunner<R: Rng = StdRng> {
    event_count: usize,
    generator: EventGenerator<R>,
    phase: Phase,
}

impl BenchmarkRunner<StdRng> {
    /// Runner generating `settings.batch_size` events per run
    pub fn new(settings: &Settings) -> Self {
        Self::with_generator(settings.batch_size, EventGenerator::new())
    }
}

impl<R: Rng> BenchmarkRunner<R> {
    pub fn with_generator(event_count: usize, generator: EventGenerator<R>) -> Self {
        Self {
            event_count,
            generator,
            phase: Phase::Connect,
        }
    }

    /// Phase the last run reached, [Phase::Done] after a complete run
    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn enter(&mut self, phase: Phase) {
        info!("Benchmark phase: {phase:?}");
        self.phase = phase;
    }

    /// Execute one run. `connect_row_store` is called first, so a Vertica that
    /// cannot be reached stops the run before anything is provisioned or generated.
    pub async fn run<C, S, F, P>(
        &mut self,
        column_store: &ColumnStoreLoader<C>,
        connect_row_store: F,
        reporter: &P,
    ) -> Result<BenchmarkTimings>
    where
        C: ColumnStore,
        S: RowStoreSession,
        F: FnOnce() -> Result<RowStoreLoader<S>>,
        P: Reporter + ?Sized,
    {
        info!("Starting data generation and loading process");

        self.enter(Phase::Connect);
        let mut row_store = connect_row_store().context(BenchmarkAbortedSnafu {
            phase: Phase::Connect,
        })?;

        self.enter(Phase::InitTables);
        tolerate(Phase::InitTables, column_store.initialize().await);
        tolerate(Phase::InitTables, row_store.initialize());

        self.enter(Phase::Generate);
        let events = self.generator.generate(self.event_count);
        info!("Generated {} events", events.len());

        self.enter(Phase::WriteColumnStore);
        let start = Instant::now();
        tolerate(
            Phase::WriteColumnStore,
            column_store.load_batch(&events).await,
        );
        let clickhouse_write = start.elapsed();

        self.enter(Phase::WriteRowStore);
        let start = Instant::now();
        row_store.load_batch(&events).context(BenchmarkAbortedSnafu {
            phase: Phase::WriteRowStore,
        })?;
        let vertica_write = start.elapsed();

        self.enter(Phase::ReadColumnStore);
        let clickhouse_read = column_store
            .read_all()
            .await
            .context(BenchmarkAbortedSnafu {
                phase: Phase::ReadColumnStore,
            })?;

        self.enter(Phase::ReadRowStore);
        let vertica_read = row_store.read_all().context(BenchmarkAbortedSnafu {
            phase: Phase::ReadRowStore,
        })?;

        let timings = BenchmarkTimings {
            clickhouse_write,
            vertica_write,
            clickhouse_read,
            vertica_read,
        };
        timings.log_summary();

        self.enter(Phase::Report);
        tolerate(Phase::Report, reporter.render(&timings));

        self.enter(Phase::Done);
        Ok(timings)
    }
}

/// Log a failure that must not stop the run
fn tolerate<T>(phase: Phase, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            error!("{phase:?} failed, continuing the run: {e:?}");
            None
        }
    }
}

/// One run against the databases named in `settings`
pub async fn run_benchmark<P>(settings: &Settings, reporter: &P) -> Result<BenchmarkTimings>
where
    P: Reporter + ?Sized,
{
    let column_store = ColumnStoreLoader::connect(settings.clickhouse.clone());
    let mut runner = BenchmarkRunner::new(settings);
    let result = runner
        .run(
            &column_store,
            || RowStoreLoader::connect(settings.vertica.clone()),
            reporter,
        )
        .await;
    if let Err(e) = &result {
        error!("Unhandled error in phase {:?}: {e:?}", runner.phase());
    }
    result
}
