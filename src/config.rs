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

//! Benchmark configuration
//!
//! Settings are read once at startup from the process environment, after loading a
//! `.env` file if one exists. Nested settings use `__` between the section and the
//! key, e.g. `CLICKHOUSE__HOST` or `VERTICA__VERTICA_SCHEMA`. Key case is ignored.

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use derive_builder::Builder;
use log::LevelFilter;
use snafu::ensure;

use crate::error::{InvalidSettingSnafu, Result};

/// Separator between a section name and a key in environment variable names
pub const NESTED_DELIMITER: &str = "__";

/// ClickHouse connection and table settings
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(setter(into), default)]
pub struct ClickHouseSettings {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub table: String,
    pub user: String,
    pub password: String,
}

impl Default for ClickHouseSettings {
    fn default() -> Self {
        Self {
            host: "clickhouse-node1".to_string(),
            port: 8123,
            database: "example".to_string(),
            table: "events".to_string(),
            user: "default".to_string(),
            password: String::new(),
        }
    }
}

impl ClickHouseSettings {
    pub fn builder() -> ClickHouseSettingsBuilder {
        ClickHouseSettingsBuilder::default()
    }

    /// HTTP endpoint of the server
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// `<database>.<table>`
    pub fn qualified_table(&self) -> String {
        format!("{}.{}", self.database, self.table)
    }

    fn from_source<F: Fn(&str) -> Option<String>>(source: &EnvSource<F>) -> Result<Self> {
        const SECTION: &str = "CLICKHOUSE";
        let defaults = Self::default();
        Ok(Self {
            host: source.string(SECTION, "HOST", defaults.host),
            port: source.parse(SECTION, "PORT", defaults.port)?,
            database: source.string(SECTION, "DATABASE", defaults.database),
            table: source.string(SECTION, "TABLE", defaults.table),
            user: source.string(SECTION, "USER", defaults.user),
            password: source.string(SECTION, "PASSWORD", defaults.password),
        })
    }
}

/// Vertica connection and table settings
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(setter(into), default)]
pub struct VerticaSettings {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub vertica_schema: String,
    pub table: String,
    pub user: String,
    pub password: String,
    /// Name of the Vertica ODBC driver as registered with the driver manager
    pub odbc_driver: String,
}

impl Default for VerticaSettings {
    fn default() -> Self {
        Self {
            host: "vertica".to_string(),
            port: 5433,
            database: "docker".to_string(),
            vertica_schema: "public".to_string(),
            table: "events".to_string(),
            user: "dbadmin".to_string(),
            password: String::new(),
            odbc_driver: "Vertica".to_string(),
        }
    }
}

impl VerticaSettings {
    pub fn builder() -> VerticaSettingsBuilder {
        VerticaSettingsBuilder::default()
    }

    /// `<schema>.<table>`
    pub fn qualified_table(&self) -> String {
        format!("{}.{}", self.vertica_schema, self.table)
    }

    /// ODBC connection string, values are braced so `;` in a password survives
    pub fn connection_string(&self) -> String {
        format!(
            "Driver={};Server={};Port={};Database={};UID={};PWD={};",
            braced(&self.odbc_driver),
            self.host,
            self.port,
            braced(&self.database),
            braced(&self.user),
            braced(&self.password),
        )
    }

    fn from_source<F: Fn(&str) -> Option<String>>(source: &EnvSource<F>) -> Result<Self> {
        const SECTION: &str = "VERTICA";
        let defaults = Self::default();
        Ok(Self {
            host: source.string(SECTION, "HOST", defaults.host),
            port: source.parse(SECTION, "PORT", defaults.port)?,
            database: source.string(SECTION, "DATABASE", defaults.database),
            vertica_schema: source.string(SECTION, "VERTICA_SCHEMA", defaults.vertica_schema),
            table: source.string(SECTION, "TABLE", defaults.table),
            user: source.string(SECTION, "USER", defaults.user),
            password: source.string(SECTION, "PASSWORD", defaults.password),
            odbc_driver: source.string(SECTION, "ODBC_DRIVER", defaults.odbc_driver),
        })
    }
}

fn braced(value: &str) -> String {
    format!("{{{}}}", value.replace('}', "}}"))
}

/// Top level settings of one benchmark process
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(setter(into), default)]
pub struct Settings {
    /// Events generated per run
    pub batch_size: usize,
    pub run_interval_seconds: u64,
    pub run_once: bool,
    pub log_level: LevelFilter,
    /// Wait before the first run, gives the databases time to come up
    pub startup_delay_seconds: u64,
    pub clickhouse: ClickHouseSettings,
    pub vertica: VerticaSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            run_interval_seconds: 5,
            run_once: false,
            log_level: LevelFilter::Info,
            startup_delay_seconds: 3,
            clickhouse: ClickHouseSettings::default(),
            vertica: VerticaSettings::default(),
        }
    }
}

impl Settings {
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }

    /// Load settings from `.env` (if present) and the process environment
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => log::debug!("Loaded environment file {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => log::warn!("Ignoring unreadable environment file: {e}"),
        }
        // variables that are not valid unicode cannot name a setting
        Self::from_vars(
            std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?))),
        )
    }

    /// Load settings from `(key, value)` pairs, matching keys case-insensitively
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_uppercase(), v.into()))
            .collect();
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    /// Load settings through an arbitrary key lookup, missing keys take defaults.
    /// `lookup` is called with upper-case keys only.
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self> {
        let source = EnvSource { lookup };
        let defaults = Self::default();

        let settings = Self {
            batch_size: source.parse("", "BATCH_SIZE", defaults.batch_size)?,
            run_interval_seconds: source.parse(
                "",
                "RUN_INTERVAL_SECONDS",
                defaults.run_interval_seconds,
            )?,
            run_once: source.flag("", "RUN_ONCE", defaults.run_once)?,
            log_level: source.parse("", "LOG_LEVEL", defaults.log_level)?,
            startup_delay_seconds: source.parse(
                "",
                "STARTUP_DELAY_SECONDS",
                defaults.startup_delay_seconds,
            )?,
            clickhouse: ClickHouseSettings::from_source(&source)?,
            vertica: VerticaSettings::from_source(&source)?,
        };

        ensure!(
            settings.batch_size > 0,
            InvalidSettingSnafu {
                key: "BATCH_SIZE",
                value: "0",
                reason: "must be positive",
            }
        );
        Ok(settings)
    }

    pub fn run_interval(&self) -> Duration {
        Duration::from_secs(self.run_interval_seconds)
    }

    pub fn startup_delay(&self) -> Duration {
        Duration::from_secs(self.startup_delay_seconds)
    }
}

/// Environment lookup with section nesting, keys are upper case
struct EnvSource<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> EnvSource<F> {
    fn key(section: &str, name: &str) -> String {
        if section.is_empty() {
            name.to_string()
        } else {
            format!("{section}{NESTED_DELIMITER}{name}")
        }
    }

    fn raw(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
    }

    fn string(&self, section: &str, name: &str, default: String) -> String {
        self.raw(&Self::key(section, name)).unwrap_or(default)
    }

    fn parse<T>(&self, section: &str, name: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let key = Self::key(section, name);
        match self.raw(&key) {
            None => Ok(default),
            Some(value) => value.trim().parse().map_err(|e: T::Err| {
                InvalidSettingSnafu {
                    key: key.clone(),
                    value: value.clone(),
                    reason: e.to_string(),
                }
                .build()
            }),
        }
    }

    fn flag(&self, section: &str, name: &str, default: bool) -> Result<bool> {
        let key = Self::key(section, name);
        let Some(value) = self.raw(&key) else {
            return Ok(default);
        };
        match value.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => InvalidSettingSnafu {
                key,
                value,
                reason: "expected a boolean",
            }
            .fail(),
        }
    }
}
