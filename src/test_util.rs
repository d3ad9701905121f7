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

//! In-memory stand-ins for both databases, recording every statement they receive

use std::sync::Arc;

use async_trait::async_trait;
use derive_new::new;
use parking_lot::Mutex;
use snafu::ResultExt;

use crate::column_store::{ColumnStore, EventRow};
use crate::error::{ClickHouseSnafu, Result, VerticaSnafu};
use crate::event::Event;
use crate::row_store::RowStoreSession;

/// Records statements and keeps inserted rows. Statements containing `fail_on`
/// are recorded and then fail.
#[derive(Clone, new)]
pub struct FakeColumnStore {
    fail_on: Option<&'static str>,
    #[new(default)]
    statements: Arc<Mutex<Vec<String>>>,
    #[new(default)]
    rows: Arc<Mutex<Vec<EventRow>>>,
}

impl FakeColumnStore {
    pub fn statements(&self) -> Vec<String> {
        self.statements.lock().clone()
    }

    pub fn take_statements(&self) -> Vec<String> {
        std::mem::take(&mut *self.statements.lock())
    }

    pub fn rows(&self) -> Vec<EventRow> {
        self.rows.lock().clone()
    }

    fn record(&self, statement: &str) -> Result<()> {
        self.statements.lock().push(statement.to_string());
        match self.fail_on {
            Some(pattern) if statement.contains(pattern) => Err(
                clickhouse::error::Error::BadResponse(format!("rejected: {statement}")),
            )
            .context(ClickHouseSnafu { statement }),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl ColumnStore for FakeColumnStore {
    async fn execute(&self, statement: &str) -> Result<()> {
        self.record(statement)
    }

    async fn insert(&self, table: &str, rows: &[EventRow]) -> Result<u64> {
        self.record(&format!(
            "INSERT INTO {table} ({})",
            Event::COLUMNS.join(", ")
        ))?;
        self.rows.lock().extend_from_slice(rows);
        Ok(rows.len() as u64)
    }

    async fn fetch_all(&self, query: &str) -> Result<Vec<EventRow>> {
        self.record(query)?;
        Ok(self.rows())
    }
}

/// A call received by [FakeRowSession]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowCall {
    Execute(String),
    Insert(String, Event),
    Commit,
    Fetch(String),
}

/// Row store session double, see [FakeColumnStore] for `fail_on`
#[derive(Clone, new)]
pub struct FakeRowSession {
    fail_on: Option<&'static str>,
    #[new(default)]
    calls: Arc<Mutex<Vec<RowCall>>>,
    #[new(default)]
    stored: Arc<Mutex<usize>>,
}

impl FakeRowSession {
    pub fn calls(&self) -> Vec<RowCall> {
        self.calls.lock().clone()
    }

    fn record(&self, call: RowCall, statement: &str) -> Result<()> {
        self.calls.lock().push(call);
        match self.fail_on {
            Some(pattern) if statement.contains(pattern) => {
                Err(odbc_api::Error::NoDiagnostics {
                    function: "SQLExecDirect",
                })
                .context(VerticaSnafu { statement })
            }
            _ => Ok(()),
        }
    }
}

impl RowStoreSession for FakeRowSession {
    fn execute(&mut self, statement: &str) -> Result<()> {
        self.record(RowCall::Execute(statement.to_string()), statement)
    }

    fn insert_event(&mut self, statement: &str, event: &Event) -> Result<()> {
        self.record(
            RowCall::Insert(statement.to_string(), event.clone()),
            statement,
        )?;
        *self.stored.lock() += 1;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.record(RowCall::Commit, "COMMIT")
    }

    fn fetch_all(&mut self, query: &str) -> Result<usize> {
        self.record(RowCall::Fetch(query.to_string()), query)?;
        Ok(*self.stored.lock())
    }
}
