//! Corpus acquisition with sample fallback.

use super::normalizer::normalize_corpus;
use super::sample::sample_corpus;
use super::types::{Corpus, CorpusError, CorpusSource};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Placeholder substituted with the configured corpus version in URLs.
pub const VERSION_PLACEHOLDER: &str = "{version}";

/// Loads and normalizes the corpus from `source`.
///
/// Never fails: a transport error, a non-success status, unreadable or invalid JSON and
/// a document lacking both `verses` and `books` all resolve to the bundled sample with
/// `is_sample = true`.
pub async fn load_corpus(client: &reqwest::Client, source: &CorpusSource, version: &str) -> Corpus {
    match try_load_corpus(client, source, version).await {
        Ok(corpus) => {
            tracing::info!(
                "Loaded corpus {} from {}: {} books, {} verses",
                corpus.version,
                source,
                corpus.books.len(),
                corpus.verses.len()
            );
            corpus
        }
        Err(err) => {
            tracing::warn!("Failed to load corpus from {}: {}", source, err);
            tracing::warn!("Falling back to the bundled sample corpus");
            sample_corpus()
        }
    }
}

/// Loads the corpus from `source`, surfacing the failure instead of falling back.
pub async fn try_load_corpus(
    client: &reqwest::Client,
    source: &CorpusSource,
    version: &str,
) -> Result<Corpus, CorpusError> {
    let raw = match source {
        CorpusSource::Bundled => return Ok(sample_corpus()),
        CorpusSource::Url(url) => fetch_json(client, &resolve_url(url, version)).await?,
        CorpusSource::File(path) => read_json(path).await?,
    };

    let mut corpus = normalize_corpus(&raw)?;
    if raw.get("version").is_none() {
        corpus.version = version.to_string();
    }
    Ok(corpus)
}

/// Substitutes the `{version}` placeholder of a versioned asset URL.
pub fn resolve_url(url: &str, version: &str) -> String {
    url.replace(VERSION_PLACEHOLDER, version)
}

async fn fetch_json(client: &reqwest::Client, url: &str) -> Result<Value, CorpusError> {
    tracing::debug!("Fetching corpus from {}", url);
    let response = client.get(url).timeout(FETCH_TIMEOUT).send().await?;

    if !response.status().is_success() {
        return Err(CorpusError::Status(response.status().as_u16()));
    }

    Ok(response.json::<Value>().await?)
}

async fn read_json(path: &Path) -> Result<Value, CorpusError> {
    tracing::debug!("Reading corpus from {}", path.display());
    let text = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&text)?)
}
