//! Bundled sample corpus.
//!
//! Compiled into the binary so the service always has something to search, even when
//! the configured source is unreachable.

use super::normalizer::normalize_corpus;
use super::types::{Corpus, CorpusError};

const SAMPLE_CORPUS_JSON: &str = include_str!("sample_corpus.json");

/// Version reported by an empty fallback when the bundled asset itself is unusable.
const SAMPLE_VERSION: &str = "sample";

/// Returns the bundled sample, normalized and flagged with `is_sample = true`.
pub fn sample_corpus() -> Corpus {
    let parsed = serde_json::from_str::<serde_json::Value>(SAMPLE_CORPUS_JSON)
        .map_err(CorpusError::from)
        .and_then(|raw| normalize_corpus(&raw));

    match parsed {
        Ok(mut corpus) => {
            corpus.is_sample = true;
            corpus
        }
        Err(err) => {
            tracing::error!("Bundled sample corpus is unusable: {}", err);
            Corpus {
                version: SAMPLE_VERSION.to_string(),
                is_sample: true,
                books: Vec::new(),
                verses: Vec::new(),
                book_order: Vec::new(),
            }
        }
    }
}
