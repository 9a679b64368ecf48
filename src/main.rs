use axum::{
    extract::Extension,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use verse_search::config::Config;
use verse_search::ingestion::handlers::{handle_corpus_status, handle_reload_corpus};
use verse_search::search::handlers::{handle_get_verse, handle_search};
use verse_search::search::service::SearchService;
use verse_search::search::types::SearchOptions;
use verse_search::storage::annotations::AnnotationStore;
use verse_search::storage::file::FileBackend;
use verse_search::storage::handlers::*;
use verse_search::storage::memory::MemoryBackend;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!(
                "Usage: verse-search [--bind <addr:port>] [--corpus-url <url>] [--corpus-file <path>] \
                 [--corpus-version <v>] [--storage-dir <dir>] [--storage-prefix <prefix>] \
                 [--limit <n>] [--log-level <level>]"
            );
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    // 1. Corpus + index:
    let source = config.corpus_source();
    tracing::info!("Loading corpus {} from {}", config.corpus_version, source);

    let service = SearchService::load(
        source,
        &config.corpus_version,
        SearchOptions {
            limit: config.search_limit,
        },
        reqwest::Client::new(),
    )
    .await;

    if service.snapshot().await.corpus.is_sample {
        tracing::warn!("Serving the bundled sample corpus; live data failed to load");
    }

    // 2. Annotation storage:
    let store = match &config.storage_dir {
        Some(dir) => {
            tracing::info!("Persisting annotations under {}", dir.display());
            AnnotationStore::new(Arc::new(FileBackend::open(dir)?), &config.storage_prefix)
        }
        None => {
            tracing::info!("Keeping annotations in memory");
            AnnotationStore::new(Arc::new(MemoryBackend::new()), &config.storage_prefix)
        }
    };

    // 3. HTTP Router:
    let app = Router::new()
        .route("/search", get(handle_search))
        .route("/verse/:key", get(handle_get_verse))
        .route("/corpus", get(handle_corpus_status))
        .route("/corpus/reload", post(handle_reload_corpus))
        .route(
            "/users/:user_id/highlights",
            get(handle_get_highlights).post(handle_put_highlight),
        )
        .route(
            "/users/:user_id/highlights/:verse_id",
            delete(handle_delete_highlight),
        )
        .route(
            "/users/:user_id/notes",
            get(handle_get_notes).post(handle_put_note),
        )
        .route("/users/:user_id/notes/:verse_id", delete(handle_delete_note))
        .route("/users/:user_id/next", post(handle_next_unseen))
        .layer(Extension(service))
        .layer(Extension(Arc::new(store)));

    // 4. Start HTTP server:
    tracing::info!("HTTP server listening on {}", config.bind_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
