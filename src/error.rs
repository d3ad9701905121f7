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

use snafu::{Location, Snafu};

use crate::bench::Phase;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Invalid value {:?} for setting {}: {}", value, key, reason))]
    InvalidSetting {
        key: String,
        value: String,
        reason: String,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Failed to initialize logging: {}", msg))]
    InitLogging {
        msg: String,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("ClickHouse request failed, statement: {}", statement))]
    ClickHouse {
        statement: String,
        source: clickhouse::error::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Failed to connect to Vertica at {}:{}", host, port))]
    ConnectVertica {
        host: String,
        port: u16,
        source: odbc_api::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Vertica statement failed: {}", statement))]
    Vertica {
        statement: String,
        source: odbc_api::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Failed to render chart to {}: {}", path, msg))]
    RenderChart {
        path: String,
        msg: String,
        #[snafu(implicit)]
        location: Location,
    },

    // Fatal failure of one orchestrator phase, the run is abandoned.
    #[snafu(display("Benchmark aborted during {:?}: {}", phase, source))]
    BenchmarkAborted {
        phase: Phase,
        #[snafu(source(from(Error, Box::new)))]
        source: Box<Error>,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// The orchestrator phase a run was aborted in, if this error aborted one.
    pub fn aborted_phase(&self) -> Option<Phase> {
        match self {
            Self::BenchmarkAborted { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    /// Indicate if the error comes from talking to one of the databases
    pub fn is_database(&self) -> bool {
        match self {
            Self::ClickHouse { .. } | Self::ConnectVertica { .. } | Self::Vertica { .. } => true,
            Self::BenchmarkAborted { source, .. } => source.is_database(),
            _ => false,
        }
    }
}
