use super::types::CorpusStatus;
use crate::search::service::SearchService;
use axum::{Extension, Json};
use std::sync::Arc;

pub async fn handle_corpus_status(
    Extension(service): Extension<Arc<SearchService>>,
) -> Json<CorpusStatus> {
    let snapshot = service.snapshot().await;
    Json(CorpusStatus::from(&snapshot.corpus))
}

pub async fn handle_reload_corpus(
    Extension(service): Extension<Arc<SearchService>>,
) -> Json<CorpusStatus> {
    tracing::info!("Reloading corpus from {}", service.source());
    let snapshot = service.reload().await;

    if snapshot.corpus.is_sample {
        tracing::warn!("Reload fell back to the sample corpus");
    }

    Json(CorpusStatus::from(&snapshot.corpus))
}
