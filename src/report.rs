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

//! Bar charts of the benchmark timings

use std::error::Error as StdError;
use std::path::{Path, PathBuf};

use log::info;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::bench::BenchmarkTimings;
use crate::error::{RenderChartSnafu, Result};

pub const REPORT_FILE: &str = "database_performance_comparison.svg";

const LABELS: [&str; 2] = ["ClickHouse", "Vertica"];
const BAR_COLORS: [RGBColor; 2] = [BLUE, GREEN];

/// Consumes the timings of a finished run
pub trait Reporter {
    fn render(&self, timings: &BenchmarkTimings) -> Result<()>;
}

/// Writes write and read comparisons side by side into one SVG file
#[derive(Debug, Clone)]
pub struct ChartReporter {
    path: PathBuf,
}

impl Default for ChartReporter {
    fn default() -> Self {
        Self::new(REPORT_FILE)
    }
}

impl ChartReporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn draw(&self, timings: &BenchmarkTimings) -> std::result::Result<(), Box<dyn StdError>> {
        let root = SVGBackend::new(&self.path, (1200, 600)).into_drawing_area();
        root.fill(&WHITE)?;
        let root = root.titled("Database Performance Comparison", ("sans-serif", 28))?;

        let panels = root.split_evenly((1, 2));
        draw_panel(
            &panels[0],
            "Write Times",
            [
                timings.clickhouse_write.as_secs_f64(),
                timings.vertica_write.as_secs_f64(),
            ],
        )?;
        draw_panel(
            &panels[1],
            "Read Times",
            [
                timings.clickhouse_read.as_secs_f64(),
                timings.vertica_read.as_secs_f64(),
            ],
        )?;

        root.present()?;
        Ok(())
    }
}

impl Reporter for ChartReporter {
    fn render(&self, timings: &BenchmarkTimings) -> Result<()> {
        self.draw(timings).map_err(|e| {
            RenderChartSnafu {
                path: self.path.display().to_string(),
                msg: e.to_string(),
            }
            .build()
        })?;
        info!("Graph saved as '{}'", self.path.display());
        Ok(())
    }
}

fn draw_panel<DB>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    seconds: [f64; 2],
) -> std::result::Result<(), Box<dyn StdError>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    // keep a visible axis when both bars are zero
    let y_max = seconds.iter().copied().fold(0.0, f64::max).max(1e-3) * 1.1;

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 22))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d((0u32..2u32).into_segmented(), 0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .y_desc("Time (seconds)")
        .x_label_formatter(&|value| match value {
            SegmentValue::CenterOf(i) => LABELS.get(*i as usize).copied().unwrap_or("").to_string(),
            _ => String::new(),
        })
        .draw()?;

    chart.draw_series(seconds.iter().enumerate().map(|(i, value)| {
        let i = i as u32;
        Rectangle::new(
            [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), *value)],
            BAR_COLORS[i as usize].mix(0.8).filled(),
        )
    }))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_render_writes_both_panels() {
        let path = std::env::temp_dir().join(format!("olap-bench-{}.svg", std::process::id()));
        let timings = BenchmarkTimings {
            clickhouse_write: Duration::from_millis(120),
            vertica_write: Duration::from_millis(4_300),
            clickhouse_read: Duration::from_millis(15),
            vertica_read: Duration::from_millis(80),
        };

        ChartReporter::new(&path).render(&timings).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("Write Times"));
        assert!(svg.contains("Read Times"));
        assert!(svg.contains("ClickHouse"));
        assert!(svg.contains("Vertica"));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_render_all_zero_timings() {
        let path = std::env::temp_dir().join(format!("olap-bench-zero-{}.svg", std::process::id()));
        ChartReporter::new(&path)
            .render(&BenchmarkTimings::default())
            .unwrap();
        assert!(path.exists());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_default_path() {
        assert_eq!(ChartReporter::default().path(), Path::new(REPORT_FILE));
    }
}
