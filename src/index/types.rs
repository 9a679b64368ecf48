use crate::ingestion::types::Verse;
use crate::search::tokenizer::Analyzer;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The searchable representation of one verse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub id: String,
    /// `"{bookId}:{chapter}:{verse}"`, unique across the index.
    pub key: String,
    pub verse: Verse,
    pub tokens: Vec<String>,
    pub stems: Vec<String>,
    pub bigrams: Vec<String>,
    pub context_tokens: Vec<String>,
    pub normalized_text: String,
}

/// A book as seen by reference resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookLabel {
    pub id: String,
    pub normalized_id: String,
    pub normalized_name: String,
}

/// Read-only search index over one corpus.
#[derive(Debug, Clone)]
pub struct Index {
    pub(crate) entries: Vec<IndexEntry>,
    pub(crate) verse_by_key: HashMap<String, usize>,
    pub(crate) books: Vec<BookLabel>,
    pub(crate) analyzer: Analyzer,
}

impl Index {
    /// Entries in corpus order.
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Direct reference lookup.
    pub fn get(&self, key: &str) -> Option<&IndexEntry> {
        self.verse_by_key.get(key).map(|&position| &self.entries[position])
    }

    /// Books in order of first appearance.
    pub fn books(&self) -> &[BookLabel] {
        &self.books
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
