use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Error kinds surfaced by loading, rendering, exporting and displaying
// ---------------------------------------------------------------------------

/// Every failure aborts the whole operation; nothing is retried and no
/// partial chart is produced.
#[derive(Debug, Error)]
pub enum PlotError {
    #[error("dataset not found: {}", path.display())]
    DatasetNotFound { path: PathBuf },

    #[error("cannot read {} as a columnar table: {reason}", path.display())]
    DatasetFormat { path: PathBuf, reason: String },

    #[error("dataset '{dataset}' is missing required column '{column}'")]
    MissingColumn { dataset: String, column: String },

    #[error("{}", series_lookup_message(dataset, column.as_deref()))]
    SeriesLookup {
        dataset: String,
        column: Option<String>,
    },

    #[error("cannot read chart description {}: {reason}", path.display())]
    ChartFile { path: PathBuf, reason: String },

    #[error("failed to export chart to {}: {reason}", path.display())]
    ExportIo { path: PathBuf, reason: String },

    #[error("failed to open chart viewer: {0}")]
    Display(String),
}

fn series_lookup_message(dataset: &str, column: Option<&str>) -> String {
    match column {
        Some(col) => format!("series refers to column '{col}' not present in dataset '{dataset}'"),
        None => format!("series refers to unknown dataset '{dataset}'"),
    }
}

impl PlotError {
    pub(crate) fn format(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        PlotError::DatasetFormat {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn export(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        PlotError::ExportIo {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T, E = PlotError> = std::result::Result<T, E>;
