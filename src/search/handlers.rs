use super::service::SearchService;
use super::types::{SearchOptions, SearchResponse, SearchResultItem};
use crate::index::types::IndexEntry;
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
}

pub async fn handle_search(
    Query(params): Query<SearchParams>,
    Extension(service): Extension<Arc<SearchService>>,
) -> Json<SearchResponse> {
    let options = SearchOptions {
        limit: params.limit.unwrap_or(service.defaults().limit),
    };
    let (results, is_sample) = service.search(&params.q, options).await;
    let results: Vec<SearchResultItem> = results.into_iter().map(Into::into).collect();

    Json(SearchResponse {
        query: params.q,
        total_count: results.len(),
        count: results.len(),
        is_sample,
        results,
    })
}

pub async fn handle_get_verse(
    Path(key): Path<String>,
    Extension(service): Extension<Arc<SearchService>>,
) -> Result<Json<IndexEntry>, StatusCode> {
    match service.lookup(&key).await {
        Some(entry) => Ok(Json(entry)),
        None => {
            tracing::debug!("No verse with key {}", key);
            Err(StatusCode::NOT_FOUND)
        }
    }
}
