//! Sheet sources: where the dated rows come from.
//!
//! The lookup never caches; every request asks its source for a fresh set of
//! rows.

pub mod file;
pub mod google;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use readings_common::DatedRecord;
use thiserror::Error;

use crate::config::SourceConfig;

pub use file::FileSheetSource;
pub use google::GoogleSheetSource;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Sheet request failed: {0}")]
    Unavailable(#[from] reqwest::Error),

    #[error("Sheet service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected sheet data: {0}")]
    Malformed(String),

    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Supplies the rows for one lookup.
#[async_trait]
pub trait SheetSource: Send + Sync {
    /// Fetch the rows, at most `row_limit` of them when given.
    async fn fetch_records(&self, row_limit: Option<usize>) -> Result<Vec<DatedRecord>, SourceError>;
}

/// Build the configured source.
pub fn from_config(config: &SourceConfig) -> anyhow::Result<Arc<dyn SheetSource>> {
    let source: Arc<dyn SheetSource> = match config {
        SourceConfig::Google(google) => Arc::new(GoogleSheetSource::from_config(google)?),
        SourceConfig::File(file) => Arc::new(FileSheetSource::new(file.path.clone())),
    };
    Ok(source)
}

fn truncate(mut records: Vec<DatedRecord>, row_limit: Option<usize>) -> Vec<DatedRecord> {
    if let Some(limit) = row_limit {
        records.truncate(limit);
    }
    records
}
