use crate::index::types::IndexEntry;
use serde::{Deserialize, Serialize};

/// Default number of results returned by a search.
pub const DEFAULT_LIMIT: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    pub limit: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
        }
    }
}

/// An index entry with its query score. Produced per query, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedResult {
    #[serde(flatten)]
    pub entry: IndexEntry,
    pub score: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub total_count: usize,
    pub count: usize,
    /// Set when results come from the bundled sample instead of live data.
    pub is_sample: bool,
    pub results: Vec<SearchResultItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub id: String,
    pub key: String,
    pub book_id: String,
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
    pub score: u32,
}

impl From<RankedResult> for SearchResultItem {
    fn from(result: RankedResult) -> Self {
        let verse = result.entry.verse;
        Self {
            id: result.entry.id,
            key: result.entry.key,
            book_id: verse.book_id,
            book: verse.book,
            chapter: verse.chapter,
            verse: verse.verse,
            text: verse.text,
            score: result.score,
        }
    }
}
