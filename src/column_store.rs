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

//! ClickHouse side of the benchmark
//!
//! [ColumnStoreLoader] provisions the events table, writes events in a single batch
//! and times a full-table read. The database itself sits behind [ColumnStore] so the
//! loader can run against the HTTP client or an in-memory double.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use clickhouse::{Client, Row};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use uuid::Uuid;

use crate::config::ClickHouseSettings;
use crate::error::{ClickHouseSnafu, Result};
use crate::event::Event;

/// Row layout of the ClickHouse events table
///
/// ```sql
/// CREATE TABLE events (
///     event_type String,
///     timestamp DateTime64,
///     user_id UUID NULL,
///     url String NULL
/// ) ENGINE = MergeTree() ORDER BY timestamp;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Row, Serialize, Deserialize)]
pub struct EventRow {
    pub event_type: String,

    /// DateTime64 with the default precision (3), milliseconds since the epoch
    pub timestamp: i64,

    #[serde(with = "clickhouse::serde::uuid::option")]
    pub user_id: Option<Uuid>,

    pub url: Option<String>,
}

impl From<&Event> for EventRow {
    fn from(event: &Event) -> Self {
        Self {
            event_type: event.event_type.as_str().to_string(),
            timestamp: event.timestamp.timestamp_millis(),
            user_id: event.user_id,
            url: event.url.clone(),
        }
    }
}

/// The statements a column store has to understand
#[async_trait]
pub trait ColumnStore: Send + Sync {
    /// Run a statement that returns no rows
    async fn execute(&self, statement: &str) -> Result<()>;

    /// Insert all rows into `table` with one request, returns rows written
    async fn insert(&self, table: &str, rows: &[EventRow]) -> Result<u64>;

    /// Run a query and materialize every returned row
    async fn fetch_all(&self, query: &str) -> Result<Vec<EventRow>>;
}

/// [ColumnStore] over the ClickHouse HTTP interface
#[derive(Clone)]
pub struct ClickHouseStore {
    client: Client,
}

impl ClickHouseStore {
    pub fn new(settings: &ClickHouseSettings) -> Self {
        let client = Client::default()
            .with_url(settings.url())
            .with_user(&settings.user)
            .with_password(&settings.password)
            .with_database("default");
        Self { client }
    }
}

#[async_trait]
impl ColumnStore for ClickHouseStore {
    async fn execute(&self, statement: &str) -> Result<()> {
        self.client
            .query(statement)
            .execute()
            .await
            .context(ClickHouseSnafu { statement })
    }

    async fn insert(&self, table: &str, rows: &[EventRow]) -> Result<u64> {
        let statement = format!("INSERT INTO {table} ({})", Event::COLUMNS.join(", "));
        let mut insert = self
            .client
            .insert::<EventRow>(table)
            .context(ClickHouseSnafu {
                statement: &statement,
            })?;
        for row in rows {
            insert.write(row).await.context(ClickHouseSnafu {
                statement: &statement,
            })?;
        }
        insert.end().await.context(ClickHouseSnafu {
            statement: &statement,
        })?;
        Ok(rows.len() as u64)
    }

    async fn fetch_all(&self, query: &str) -> Result<Vec<EventRow>> {
        self.client
            .query(query)
            .fetch_all::<EventRow>()
            .await
            .context(ClickHouseSnafu { statement: query })
    }
}

/// Loads events into ClickHouse and reads them back
pub struct ColumnStoreLoader<C = ClickHouseStore> {
    settings: ClickHouseSettings,
    store: C,
}

impl ColumnStoreLoader<ClickHouseStore> {
    /// Loader over the HTTP client. No request is sent until the first call.
    pub fn connect(settings: ClickHouseSettings) -> Self {
        let store = ClickHouseStore::new(&settings);
        Self::new(settings, store)
    }
}

impl<C: ColumnStore> ColumnStoreLoader<C> {
    pub fn new(settings: ClickHouseSettings, store: C) -> Self {
        Self { settings, store }
    }

    /// DDL run by [Self::initialize], in order
    pub fn provisioning_statements(&self) -> Vec<String> {
        let database = &self.settings.database;
        let table = self.settings.qualified_table();
        vec![
            format!("CREATE DATABASE IF NOT EXISTS {database}"),
            format!("DROP TABLE IF EXISTS {table}"),
            format!(
                "CREATE TABLE IF NOT EXISTS {table} (\
                 event_type String, \
                 timestamp DateTime64, \
                 user_id UUID NULL, \
                 url String NULL\
                 ) ENGINE = MergeTree() ORDER BY timestamp"
            ),
        ]
    }

    /// Drop and recreate the events table. Any rows from earlier runs are lost.
    pub async fn initialize(&self) -> Result<()> {
        info!("Initializing ClickHouse");
        for statement in self.provisioning_statements() {
            self.store.execute(&statement).await?;
        }
        info!(
            "Table '{}' created successfully in database '{}'",
            self.settings.table, self.settings.database
        );
        Ok(())
    }

    /// Insert all events in a single batch, an empty slice sends nothing
    pub async fn load_batch(&self, events: &[Event]) -> Result<u64> {
        if events.is_empty() {
            return Ok(0);
        }
        let rows: Vec<EventRow> = events.iter().map(EventRow::from).collect();
        let written = self
            .store
            .insert(&self.settings.qualified_table(), &rows)
            .await?;
        info!("Loaded batch of {written} rows into ClickHouse");
        Ok(written)
    }

    /// Time a full-table read, from issuing the query until all rows are in memory
    pub async fn read_all(&self) -> Result<Duration> {
        let query = format!("SELECT * FROM {}", self.settings.qualified_table());
        let start = Instant::now();
        let rows = self.store.fetch_all(&query).await?;
        let elapsed = start.elapsed();
        debug!("Read {} rows from ClickHouse in {elapsed:?}", rows.len());
        Ok(elapsed)
    }
}
