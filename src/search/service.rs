//! Long-lived search handle.
//!
//! `SearchService` owns the current corpus and its index. The hosting application
//! creates one and passes it to whatever needs to search; there is no global instance.

use super::engine::search;
use super::types::{RankedResult, SearchOptions};
use crate::index::builder::build_index;
use crate::index::types::{Index, IndexEntry};
use crate::ingestion::loader::load_corpus;
use crate::ingestion::types::{Corpus, CorpusSource};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A corpus together with the index built from it. Immutable once built.
#[derive(Debug)]
pub struct Snapshot {
    pub corpus: Corpus,
    pub index: Index,
}

impl Snapshot {
    pub fn build(corpus: Corpus) -> Self {
        let index = build_index(&corpus);
        Self { corpus, index }
    }
}

pub struct SearchService {
    current: RwLock<Arc<Snapshot>>,
    source: CorpusSource,
    version: String,
    defaults: SearchOptions,
    client: reqwest::Client,
}

impl SearchService {
    /// Loads the corpus from `source` and builds its index.
    pub async fn load(
        source: CorpusSource,
        version: &str,
        defaults: SearchOptions,
        client: reqwest::Client,
    ) -> Arc<Self> {
        let corpus = load_corpus(&client, &source, version).await;

        Arc::new(Self {
            current: RwLock::new(Arc::new(Snapshot::build(corpus))),
            source,
            version: version.to_string(),
            defaults,
            client,
        })
    }

    /// Wraps an already normalized corpus. Reloading re-reads the bundled sample.
    pub fn from_corpus(corpus: Corpus) -> Arc<Self> {
        let version = corpus.version.clone();
        Arc::new(Self {
            current: RwLock::new(Arc::new(Snapshot::build(corpus))),
            source: CorpusSource::Bundled,
            version,
            defaults: SearchOptions::default(),
            client: reqwest::Client::new(),
        })
    }

    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.current.read().await.clone()
    }

    pub fn source(&self) -> &CorpusSource {
        &self.source
    }

    pub fn defaults(&self) -> SearchOptions {
        self.defaults
    }

    /// Runs `query` against the current index.
    ///
    /// Also returns whether the corpus is the bundled sample.
    pub async fn search(&self, query: &str, options: SearchOptions) -> (Vec<RankedResult>, bool) {
        let snapshot = self.snapshot().await;
        let results = search(query, &snapshot.index, options);
        (results, snapshot.corpus.is_sample)
    }

    pub async fn lookup(&self, key: &str) -> Option<IndexEntry> {
        self.snapshot().await.index.get(key).cloned()
    }

    /// Reloads the corpus from the configured source and swaps in a fresh index.
    ///
    /// Concurrent reloads are not ordered; whichever finishes last wins.
    pub async fn reload(&self) -> Arc<Snapshot> {
        let corpus = load_corpus(&self.client, &self.source, &self.version).await;
        let snapshot = Arc::new(Snapshot::build(corpus));

        *self.current.write().await = snapshot.clone();
        tracing::info!(
            "Reloaded corpus {} ({} verses, sample={})",
            snapshot.corpus.version,
            snapshot.corpus.verses.len(),
            snapshot.corpus.is_sample
        );
        snapshot
    }
}
