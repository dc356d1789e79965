pub mod bar;
pub mod boxplot;
pub mod pie;

use std::path::{Path, PathBuf};
use std::process::Command;

use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use thiserror::Error;

use crate::analysis;
use crate::table::TableStore;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Drawing error: {0}")]
    Draw(String),
    #[error("Viewer `{viewer}` failed: {message}")]
    Viewer { viewer: String, message: String },
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for ChartError {
    fn from(e: DrawingAreaErrorKind<E>) -> Self {
        ChartError::Draw(e.to_string())
    }
}

/// Canvas size of every chart, in pixels.
pub(crate) const CHART_SIZE: (u32, u32) = (1000, 800);
pub(crate) const FONT: &str = "sans-serif";
pub(crate) const FREQUENCY_TITLE: &str = "Top 10 Artists Frequency";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Pie,
    Box,
}

impl ChartKind {
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Bar => "top_artists_bar.svg",
            Self::Pie => "top_artists_pie.svg",
            Self::Box => "audio_metrics_box.svg",
        }
    }
}

/// Render one chart of `table` into `dir` and return the file written.
pub fn render(kind: ChartKind, table: &TableStore, dir: &Path) -> Result<PathBuf, ChartError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(kind.file_name());

    match kind {
        ChartKind::Bar => bar::render_bar_chart(&analysis::frequency_summary(table), &path)?,
        ChartKind::Pie => pie::render_pie_chart(&analysis::frequency_summary(table), &path)?,
        ChartKind::Box => boxplot::render_box_plot(&analysis::metric_distribution(table), &path)?,
    }

    log::info!("Rendered {:?} chart to {}", kind, path.display());
    Ok(path)
}

/// Launch `viewer` on `path` and wait for it to exit. The viewer string may
/// carry extra arguments, e.g. `open -W`.
pub fn open_in_viewer(viewer: &str, path: &Path) -> Result<(), ChartError> {
    let mut parts = viewer.split_whitespace();
    let program = parts.next().ok_or_else(|| ChartError::Viewer {
        viewer: viewer.to_string(),
        message: "empty command".to_string(),
    })?;

    let status = Command::new(program)
        .args(parts)
        .arg(path)
        .status()
        .map_err(|e| ChartError::Viewer {
            viewer: viewer.to_string(),
            message: e.to_string(),
        })?;

    if !status.success() {
        return Err(ChartError::Viewer {
            viewer: viewer.to_string(),
            message: format!("exited with {status}"),
        });
    }
    Ok(())
}

/// Centered placeholder for charts with nothing to plot.
pub(crate) fn draw_no_data<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let (w, h) = area.dim_in_pixel();
    area.draw(&Text::new(
        "No data",
        (w as i32 / 2 - 40, h as i32 / 2),
        (FONT, 24),
    ))
}
