//! HTTP surface: `GET /sheet-data` and `GET /health`.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::{HeaderMap, HeaderValue},
    routing::get,
};
use readings_common::{LookupResult, find_entry_for_date};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{LookupConfig, ServerConfig};
use crate::error::ApiError;
use crate::source::SheetSource;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Shared, read-only request state
#[derive(Clone)]
pub struct AppState {
    pub lookup: Arc<LookupConfig>,
    pub source: Arc<dyn SheetSource>,
}

impl AppState {
    pub fn new(lookup: LookupConfig, source: Arc<dyn SheetSource>) -> Self {
        Self {
            lookup: Arc::new(lookup),
            source,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SheetDataQuery {
    pub date: Option<String>,
}

pub fn build_router(state: AppState, server: &ServerConfig) -> Router {
    Router::new()
        .route("/sheet-data", get(sheet_data))
        .route("/health", get(health_check))
        .layer(cors_layer(&server.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    // Credentials rule out wildcards, so methods and headers are mirrored
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

fn check_api_key(expected: Option<&str>, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(expected) = expected else {
        return Ok(());
    };
    let provided = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok());
    if provided == Some(expected) {
        Ok(())
    } else {
        Err(ApiError::Unauthorized)
    }
}

/// Record for `?date=` (today when absent) or the "not available" placeholder.
async fn sheet_data(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<SheetDataQuery>, QueryRejection>,
) -> Result<Json<LookupResult>, ApiError> {
    let lookup = &state.lookup;
    check_api_key(lookup.api_key.as_deref(), &headers)?;
    let Query(query) = query?;

    // Reject a bad date before touching the sheet
    if let Some(raw) = query.date.as_deref() {
        lookup.date_format.parse(raw)?;
    }

    let records = state.source.fetch_records(lookup.row_limit).await?;
    tracing::debug!("Looking up {:?} in {} rows", query.date, records.len());

    let result = find_entry_for_date(records, query.date.as_deref(), lookup.date_format)?;
    Ok(Json(result))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "running",
        "service": "readings-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_api_key() {
        let mut headers = HeaderMap::new();
        assert!(check_api_key(None, &headers).is_ok());
        assert!(matches!(check_api_key(Some("k"), &headers), Err(ApiError::Unauthorized)));

        headers.insert(API_KEY_HEADER, HeaderValue::from_static("wrong"));
        assert!(check_api_key(Some("k"), &headers).is_err());

        headers.insert(API_KEY_HEADER, HeaderValue::from_static("k"));
        assert!(check_api_key(Some("k"), &headers).is_ok());
    }
}
