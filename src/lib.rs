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

//! Load and read benchmark of synthetic click-stream events against ClickHouse
//! (column store) and Vertica (row store).

pub mod bench;
pub mod column_store;
pub mod config;
pub mod error;
pub mod event;
pub mod generator;
pub mod logging;
pub mod report;
pub mod row_store;

#[cfg(test)]
mod test_util;

pub use self::bench::{run_benchmark, BenchmarkRunner, BenchmarkTimings, Phase};
pub use self::column_store::{ClickHouseStore, ColumnStore, ColumnStoreLoader, EventRow};
pub use self::config::{ClickHouseSettings, Settings, VerticaSettings};
pub use self::error::{Error, Result};
pub use self::event::{Event, EventType};
pub use self::generator::EventGenerator;
pub use self::report::{ChartReporter, Reporter};
pub use self::row_store::{RowStoreLoader, RowStoreSession, VerticaSession};
