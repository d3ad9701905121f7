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

//! Vertica side of the benchmark
//!
//! Unlike the ClickHouse path, events are written one `INSERT` per row followed by a
//! single `COMMIT`. That per-row cost is part of what the benchmark compares.
//!
//! Vertica is reached through its ODBC driver. ODBC calls block the calling thread,
//! which is fine here because a run executes one phase at a time.

use std::sync::OnceLock;
use std::time::{Duration, Instant};

use log::{debug, info};
use odbc_api::buffers::TextRowSet;
use odbc_api::{Connection, ConnectionOptions, Cursor, Environment, IntoParameter};
use snafu::ResultExt;

use crate::config::VerticaSettings;
use crate::error::{ConnectVerticaSnafu, Result, VerticaSnafu};
use crate::event::Event;

/// Rows fetched per round trip while reading
const FETCH_BATCH_ROWS: usize = 1000;
/// Upper bound for one text cell, the widest column is `VARCHAR(255)`
const MAX_CELL_BYTES: usize = 4096;
/// Vertica's text form of `TIMESTAMP`
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

static ODBC_ENV: OnceLock<Environment> = OnceLock::new();

/// The process-wide ODBC environment, every connection borrows from it
fn odbc_environment(settings: &VerticaSettings) -> Result<&'static Environment> {
    if let Some(env) = ODBC_ENV.get() {
        return Ok(env);
    }
    let env = Environment::new().context(ConnectVerticaSnafu {
        host: &settings.host,
        port: settings.port,
    })?;
    Ok(ODBC_ENV.get_or_init(|| env))
}

/// One open connection to a row store. Statements take `?` parameter markers.
pub trait RowStoreSession {
    /// Run a statement without parameters
    fn execute(&mut self, statement: &str) -> Result<()>;

    /// Run a 4-parameter insert statement bound to the fields of `event`
    fn insert_event(&mut self, statement: &str, event: &Event) -> Result<()>;

    fn commit(&mut self) -> Result<()>;

    /// Run a query, fetch every row into memory and return how many there were
    fn fetch_all(&mut self, query: &str) -> Result<usize>;
}

/// [RowStoreSession] over Vertica's ODBC driver, autocommit off
pub struct VerticaSession {
    conn: Connection<'static>,
}

impl VerticaSession {
    pub fn connect(settings: &VerticaSettings) -> Result<Self> {
        info!(
            "Connecting to Vertica at {}:{}, database '{}' as '{}'",
            settings.host, settings.port, settings.database, settings.user
        );
        let context = ConnectVerticaSnafu {
            host: &settings.host,
            port: settings.port,
        };
        let conn = odbc_environment(settings)?
            .connect_with_connection_string(
                &settings.connection_string(),
                ConnectionOptions::default(),
            )
            .context(context)?;
        conn.set_autocommit(false).context(context)?;
        info!("Connected to Vertica successfully");
        Ok(Self { conn })
    }
}

impl RowStoreSession for VerticaSession {
    fn execute(&mut self, statement: &str) -> Result<()> {
        self.conn
            .execute(statement, (), None)
            .context(VerticaSnafu { statement })?;
        Ok(())
    }

    fn insert_event(&mut self, statement: &str, event: &Event) -> Result<()> {
        let timestamp = event.timestamp.format(TIMESTAMP_FORMAT).to_string();
        let user_id = event.user_id.map(|id| id.to_string());
        let params = (
            &event.event_type.as_str().into_parameter(),
            &timestamp.as_str().into_parameter(),
            &user_id.as_deref().into_parameter(),
            &event.url.as_deref().into_parameter(),
        );
        self.conn
            .execute(statement, params, None)
            .context(VerticaSnafu { statement })?;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.conn
            .commit()
            .context(VerticaSnafu { statement: "COMMIT" })
    }

    fn fetch_all(&mut self, query: &str) -> Result<usize> {
        let context = VerticaSnafu { statement: query };
        let Some(mut cursor) = self.conn.execute(query, (), None).context(context)? else {
            return Ok(0);
        };
        let mut buffer =
            TextRowSet::for_cursor(FETCH_BATCH_ROWS, &mut cursor, Some(MAX_CELL_BYTES))
                .context(context)?;
        let mut block = cursor.bind_buffer(&mut buffer).context(context)?;

        let mut rows: Vec<Vec<Option<Vec<u8>>>> = Vec::new();
        while let Some(batch) = block.fetch().context(context)? {
            for row in 0..batch.num_rows() {
                rows.push(
                    (0..batch.num_cols())
                        .map(|col| batch.at(col, row).map(<[u8]>::to_vec))
                        .collect(),
                );
            }
        }
        Ok(rows.len())
    }
}

/// Loads events into Vertica and reads them back
pub struct RowStoreLoader<S = VerticaSession> {
    settings: VerticaSettings,
    session: S,
}

impl RowStoreLoader<VerticaSession> {
    /// Open the loader's only connection. Failing here is fatal for a run.
    pub fn connect(settings: VerticaSettings) -> Result<Self> {
        let session = VerticaSession::connect(&settings)?;
        Ok(Self::new(settings, session))
    }
}

impl<S: RowStoreSession> RowStoreLoader<S> {
    pub fn new(settings: VerticaSettings, session: S) -> Self {
        Self { settings, session }
    }

    pub fn create_table_statement(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\
             event_type VARCHAR(255), \
             timestamp TIMESTAMP, \
             user_id UUID NULL, \
             url VARCHAR(255) NULL)",
            self.settings.qualified_table()
        )
    }

    pub fn insert_statement(&self) -> String {
        format!(
            "INSERT INTO {} VALUES (?, ?, ?, ?)",
            self.settings.qualified_table()
        )
    }

    /// Create the events table unless it already exists. Existing rows are kept.
    pub fn initialize(&mut self) -> Result<()> {
        info!(
            "Creating table '{}' in schema '{}'",
            self.settings.table, self.settings.vertica_schema
        );
        let statement = self.create_table_statement();
        self.session.execute(&statement)?;
        info!(
            "Table '{}' created successfully in schema '{}'",
            self.settings.table, self.settings.vertica_schema
        );
        Ok(())
    }

    /// Insert events one statement per row, then commit once
    pub fn load_batch(&mut self, events: &[Event]) -> Result<u64> {
        if events.is_empty() {
            return Ok(0);
        }
        let statement = self.insert_statement();
        for event in events {
            self.session.insert_event(&statement, event)?;
        }
        self.session.commit()?;
        info!("Loaded {} rows into Vertica", events.len());
        Ok(events.len() as u64)
    }

    /// Time a full-table read, from issuing the query until all rows are fetched
    pub fn read_all(&mut self) -> Result<Duration> {
        let query = format!("SELECT * FROM {}", self.settings.qualified_table());
        let start = Instant::now();
        let rows = self.session.fetch_all(&query)?;
        let elapsed = start.elapsed();
        debug!("Read {rows} rows from Vertica in {elapsed:?}");
        Ok(elapsed)
    }
}
