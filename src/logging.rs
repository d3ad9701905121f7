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

//! Console and rolling file log sinks

use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::rolling_file::policy::compound::roll::fixed_window::FixedWindowRoller;
use log4rs::append::rolling_file::policy::compound::trigger::size::SizeTrigger;
use log4rs::append::rolling_file::policy::compound::CompoundPolicy;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

use crate::error::{InitLoggingSnafu, Result};

const LOGGING_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} {l:<8} [{f}:{L}] {m}{n}";

/// Where and how much to keep of the file log
#[derive(Debug, Clone)]
pub struct LogFileOptions {
    pub path: String,
    /// Rolled once the active file grows past this many bytes
    pub max_bytes: u64,
    pub backup_count: u32,
}

impl Default for LogFileOptions {
    fn default() -> Self {
        Self {
            path: "logs/app.log".to_string(),
            max_bytes: 5_000_000,
            backup_count: 5,
        }
    }
}

impl LogFileOptions {
    /// `logs/app.log` rolls into `logs/app.{}.log`
    fn roll_pattern(&self) -> String {
        match self.path.strip_suffix(".log") {
            Some(stem) => format!("{stem}.{{}}.log"),
            None => format!("{}.{{}}", self.path),
        }
    }
}

/// Build the log4rs configuration: stderr console plus a size-rolled file
pub fn build_config(level: LevelFilter, file: &LogFileOptions) -> Result<Config> {
    let console = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(LOGGING_PATTERN)))
        .build();

    let roller = FixedWindowRoller::builder()
        .base(1)
        .build(&file.roll_pattern(), file.backup_count)
        .map_err(|e| {
            InitLoggingSnafu {
                msg: format!("invalid roll pattern: {e}"),
            }
            .build()
        })?;
    let policy = CompoundPolicy::new(
        Box::new(SizeTrigger::new(file.max_bytes)),
        Box::new(roller),
    );
    let logfile = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOGGING_PATTERN)))
        .build(&file.path, Box::new(policy))
        .map_err(|e| {
            InitLoggingSnafu {
                msg: format!("cannot open {}: {e}", file.path),
            }
            .build()
        })?;

    Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(console)))
        .appender(Appender::builder().build("logfile", Box::new(logfile)))
        .build(
            Root::builder()
                .appender("stderr")
                .appender("logfile")
                .build(level),
        )
        .map_err(|e| InitLoggingSnafu { msg: e.to_string() }.build())
}

/// Install the process-wide logger. Call once, before anything logs.
pub fn init_logging(level: LevelFilter, file: &LogFileOptions) -> Result<()> {
    let config = build_config(level, file)?;
    let _handle =
        log4rs::init_config(config).map_err(|e| InitLoggingSnafu { msg: e.to_string() }.build())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roll_pattern() {
        let options = LogFileOptions::default();
        assert_eq!(options.roll_pattern(), "logs/app.{}.log");

        let options = LogFileOptions {
            path: "bench.out".to_string(),
            ..Default::default()
        };
        assert_eq!(options.roll_pattern(), "bench.out.{}");
    }

    #[test]
    fn test_build_config_has_both_appenders() {
        let dir = std::env::temp_dir().join(format!("olap-bench-log-{}", std::process::id()));
        let options = LogFileOptions {
            path: dir.join("app.log").to_string_lossy().into_owned(),
            ..Default::default()
        };

        let config = build_config(LevelFilter::Debug, &options).unwrap();
        assert_eq!(config.root().level(), LevelFilter::Debug);
        assert_eq!(config.appenders().len(), 2);

        let _ = std::fs::remove_dir_all(dir);
    }
}
