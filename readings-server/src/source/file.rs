//! Rows read from a local JSON file, re-read on every fetch.

use std::path::PathBuf;

use async_trait::async_trait;
use readings_common::DatedRecord;
use serde_json::{Map, Value};

use super::{SheetSource, SourceError, truncate};

pub struct FileSheetSource {
    path: PathBuf,
}

impl FileSheetSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl SheetSource for FileSheetSource {
    async fn fetch_records(&self, row_limit: Option<usize>) -> Result<Vec<DatedRecord>, SourceError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.path.clone(),
                source,
            })?;

        let rows: Vec<Map<String, Value>> = serde_json::from_str(&content)
            .map_err(|e| SourceError::Malformed(format!("{:?}: {}", self.path, e)))?;

        tracing::debug!("Read {} rows from {:?}", rows.len(), self.path);

        let records = rows.into_iter().map(DatedRecord::from_row).collect();
        Ok(truncate(records, row_limit))
    }
}
