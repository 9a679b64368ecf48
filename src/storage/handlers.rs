use super::annotations::AnnotationStore;
use super::types::{
    Highlights, HighlightRequest, NextUnseenParams, Note, NoteRequest, Notes, StorageError,
};
use crate::ingestion::types::Verse;
use crate::search::service::SearchService;
use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

/// Runs a store operation off the async workers; backends may block on disk I/O.
async fn run_blocking<T, F>(user_id: &str, op: F) -> Result<T, StatusCode>
where
    F: FnOnce() -> Result<T, StorageError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(op).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            tracing::error!("Annotation storage failed for {}: {}", user_id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
        Err(e) => {
            tracing::error!("Annotation task for {} panicked: {}", user_id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

pub async fn handle_get_highlights(
    Path(user_id): Path<String>,
    Extension(store): Extension<Arc<AnnotationStore>>,
) -> Result<Json<Highlights>, StatusCode> {
    let user = user_id.clone();
    run_blocking(&user_id, move || Ok(store.highlights(&user)))
        .await
        .map(Json)
}

pub async fn handle_put_highlight(
    Path(user_id): Path<String>,
    Extension(store): Extension<Arc<AnnotationStore>>,
    Json(req): Json<HighlightRequest>,
) -> Result<Json<Highlights>, StatusCode> {
    let user = user_id.clone();
    run_blocking(&user_id, move || {
        store.set_highlight(&user, &req.verse_id, &req.color)
    })
    .await
    .map(Json)
}

pub async fn handle_delete_highlight(
    Path((user_id, verse_id)): Path<(String, String)>,
    Extension(store): Extension<Arc<AnnotationStore>>,
) -> StatusCode {
    let user = user_id.clone();
    match run_blocking(&user_id, move || store.remove_highlight(&user, &verse_id)).await {
        Ok(true) => StatusCode::NO_CONTENT,
        Ok(false) => StatusCode::NOT_FOUND,
        Err(status) => status,
    }
}

pub async fn handle_get_notes(
    Path(user_id): Path<String>,
    Extension(store): Extension<Arc<AnnotationStore>>,
) -> Result<Json<Notes>, StatusCode> {
    let user = user_id.clone();
    run_blocking(&user_id, move || Ok(store.notes(&user)))
        .await
        .map(Json)
}

pub async fn handle_put_note(
    Path(user_id): Path<String>,
    Extension(store): Extension<Arc<AnnotationStore>>,
    Json(req): Json<NoteRequest>,
) -> Result<Json<Note>, StatusCode> {
    let user = user_id.clone();
    run_blocking(&user_id, move || store.set_note(&user, &req.verse_id, &req.text))
        .await
        .map(Json)
}

pub async fn handle_delete_note(
    Path((user_id, verse_id)): Path<(String, String)>,
    Extension(store): Extension<Arc<AnnotationStore>>,
) -> StatusCode {
    let user = user_id.clone();
    match run_blocking(&user_id, move || store.remove_note(&user, &verse_id)).await {
        Ok(true) => StatusCode::NO_CONTENT,
        Ok(false) => StatusCode::NOT_FOUND,
        Err(status) => status,
    }
}

/// Returns the next verse the user has not been shown in the current cycle.
///
/// With `?book=`, the cycle runs over that book alone and keeps its own seen-list.
pub async fn handle_next_unseen(
    Path(user_id): Path<String>,
    Query(params): Query<NextUnseenParams>,
    Extension(store): Extension<Arc<AnnotationStore>>,
    Extension(service): Extension<Arc<SearchService>>,
) -> Result<Json<Verse>, StatusCode> {
    let snapshot = service.snapshot().await;
    let user = user_id.clone();

    let picked = run_blocking(&user_id, move || {
        let picked = match params.book.as_deref() {
            Some(book_id) => {
                let candidates: Vec<&Verse> = snapshot.corpus.verses_in_book(book_id).collect();
                let picked = store.pick_next_unseen_in(&user, book_id, &candidates)?;
                picked.copied()
            }
            None => store.pick_next_unseen(&user, &snapshot.corpus.verses)?,
        };
        Ok(picked.cloned())
    })
    .await?;

    picked.map(Json).ok_or(StatusCode::NOT_FOUND)
}
