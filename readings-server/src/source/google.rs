//! Google Sheets client reading one worksheet through the v4 `values` API.
//!
//! The first row of the range is the header; every following row becomes a
//! record keyed by it.

use std::time::Duration;

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use readings_common::DatedRecord;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{SheetSource, SourceError, truncate};
use crate::config::GoogleSheetConfig;

const SHEETS_API_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets/";

/// Contents of the credentials file
#[derive(Deserialize)]
struct Credentials {
    api_key: String,
}

/// Response body of `spreadsheets.values.get`
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

pub struct GoogleSheetSource {
    client: Client,
    url: Url,
}

impl GoogleSheetSource {
    pub fn from_config(config: &GoogleSheetConfig) -> anyhow::Result<Self> {
        let spreadsheet_id = config
            .spreadsheet_id()
            .ok_or_else(|| anyhow!("No spreadsheet configured for sheet number {}", config.sheet_number))?;

        let content = std::fs::read_to_string(&config.credentials_path)
            .with_context(|| format!("Failed to read credentials file {:?}", config.credentials_path))?;
        let credentials: Credentials =
            serde_json::from_str(&content).context("Failed to parse credentials file")?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("readings-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        let url = values_url(spreadsheet_id, &config.range, &credentials.api_key)?;

        tracing::info!(
            "Google sheet source: sheet #{} ({}), range '{}'",
            config.sheet_number,
            spreadsheet_id,
            config.range
        );

        Ok(Self { client, url })
    }
}

fn values_url(spreadsheet_id: &str, range: &str, api_key: &str) -> anyhow::Result<Url> {
    let mut url = Url::parse(SHEETS_API_URL)?;
    url.path_segments_mut()
        .map_err(|_| anyhow!("Sheets API URL cannot be a base"))?
        .pop_if_empty()
        .extend([spreadsheet_id, "values", range]);
    url.query_pairs_mut().append_pair("key", api_key);
    Ok(url)
}

fn cell_text(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Turn a header row plus data rows into records.
///
/// Short rows are padded with empty strings, cells beyond the header are
/// dropped, and rows with no content at all are skipped.
fn rows_to_records(values: Vec<Vec<Value>>) -> Result<Vec<DatedRecord>, SourceError> {
    let mut rows = values.into_iter();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };

    let header: Vec<String> = header.iter().map(|cell| cell_text(cell).trim().to_string()).collect();
    if header.iter().all(String::is_empty) {
        return Err(SourceError::Malformed("header row is empty".to_string()));
    }

    let records = rows
        .filter(|row| row.iter().any(|cell| !cell_text(cell).trim().is_empty()))
        .map(|row| {
            let mut cells = row.into_iter();
            let mut map = Map::new();
            for key in &header {
                let cell = cells.next().unwrap_or(Value::Null);
                if key.is_empty() {
                    continue;
                }
                map.insert(key.clone(), Value::String(cell_text(&cell)));
            }
            DatedRecord::from_row(map)
        })
        .collect();

    Ok(records)
}

#[async_trait]
impl SheetSource for GoogleSheetSource {
    async fn fetch_records(&self, row_limit: Option<usize>) -> Result<Vec<DatedRecord>, SourceError> {
        let response = self.client.get(self.url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let range: ValueRange = response.json().await?;
        let records = rows_to_records(range.values)?;

        tracing::debug!("Fetched {} rows from Google Sheets", records.len());

        Ok(truncate(records, row_limit))
    }
}
