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

// Integration tests against live databases, run with `cargo test -- --ignored`
// These tests require running ClickHouse and Vertica instances

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use olap_bench::{
    BenchmarkRunner, ClickHouseSettings, ColumnStoreLoader, EventGenerator, Phase, Reporter,
    Result, RowStoreLoader, VerticaSettings,
};

// Test configuration
struct TestConfig {
    clickhouse_host: String,
    vertica_host: String,
}

impl TestConfig {
    fn new() -> Self {
        Self {
            clickhouse_host: std::env::var("BENCH_TEST_CLICKHOUSE_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            vertica_host: std::env::var("BENCH_TEST_VERTICA_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
        }
    }

    fn clickhouse(&self, table: &str) -> ClickHouseSettings {
        ClickHouseSettings::builder()
            .host(self.clickhouse_host.as_str())
            .table(table)
            .build()
            .unwrap()
    }

    fn vertica(&self, table: &str) -> VerticaSettings {
        VerticaSettings::builder()
            .host(self.vertica_host.as_str())
            .table(table)
            .build()
            .unwrap()
    }
}

// Test helper to create unique table names
fn unique_table_name(prefix: &str) -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis();
    format!("{prefix}_{timestamp}")
}

struct NoReport;

impl Reporter for NoReport {
    fn render(&self, _: &olap_bench::BenchmarkTimings) -> Result<()> {
        Ok(())
    }
}

#[tokio::test]
#[ignore = "requires a running ClickHouse"]
async fn test_clickhouse_load_and_read() -> Result<()> {
    let config = TestConfig::new();
    let loader = ColumnStoreLoader::connect(config.clickhouse(&unique_table_name("events")));

    loader.initialize().await?;
    // provisioning is repeatable
    loader.initialize().await?;

    assert_eq!(loader.load_batch(&[]).await?, 0);
    let events = EventGenerator::with_seed(5).generate(200);
    assert_eq!(loader.load_batch(&events).await?, 200);

    let elapsed = loader.read_all().await?;
    assert!(elapsed >= Duration::ZERO);
    Ok(())
}

#[test]
#[ignore = "requires a running Vertica and its ODBC driver"]
fn test_vertica_load_and_read() -> Result<()> {
    let config = TestConfig::new();
    let mut loader = RowStoreLoader::connect(config.vertica(&unique_table_name("events")))?;

    loader.initialize()?;
    let events = EventGenerator::with_seed(6).generate(20);
    assert_eq!(loader.load_batch(&events)?, 20);

    let elapsed = loader.read_all()?;
    assert!(elapsed >= Duration::ZERO);
    Ok(())
}

#[tokio::test]
#[ignore = "requires running ClickHouse and Vertica"]
async fn test_full_benchmark_run() -> Result<()> {
    let config = TestConfig::new();
    let table = unique_table_name("bench");
    let column_store = ColumnStoreLoader::connect(config.clickhouse(&table));
    let mut runner = BenchmarkRunner::with_generator(1000, EventGenerator::with_seed(8));

    let timings = runner
        .run(
            &column_store,
            || RowStoreLoader::connect(config.vertica(&table)),
            &NoReport,
        )
        .await?;

    assert_eq!(runner.phase(), Phase::Done);
    let map = timings.as_map();
    assert_eq!(map.len(), 4);
    assert!(map.values().all(|v| *v >= 0.0));
    Ok(())
}

#[tokio::test]
async fn test_unreachable_vertica_aborts_run() {
    let config = TestConfig::new();
    let column_store = ColumnStoreLoader::connect(config.clickhouse("events"));
    // nothing listens on port 1
    let vertica = VerticaSettings::builder()
        .host("127.0.0.1")
        .port(1u16)
        .build()
        .unwrap();
    let mut runner = BenchmarkRunner::with_generator(10, EventGenerator::with_seed(4));

    let err = runner
        .run(&column_store, || RowStoreLoader::connect(vertica), &NoReport)
        .await
        .unwrap_err();

    assert_eq!(err.aborted_phase(), Some(Phase::Connect));
    assert!(runner.phase() < Phase::Generate);
}
