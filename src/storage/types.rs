//! Annotation Data Types

use crate::ingestion::types::Verse;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The independent annotation collections kept per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Highlights,
    Notes,
    SeenItems,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Highlights, Section::Notes, Section::SeenItems];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Highlights => "highlights",
            Section::Notes => "notes",
            Section::SeenItems => "seen_items",
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verse id → highlight color.
pub type Highlights = BTreeMap<String, String>;

/// Verse id → note.
pub type Notes = BTreeMap<String, Note>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub text: String,
    /// Milliseconds since the Unix epoch.
    pub updated_at: u64,
}

/// Anything `pick_next_unseen` can cycle through.
pub trait Identified {
    fn item_id(&self) -> &str;
}

impl Identified for Verse {
    fn item_id(&self) -> &str {
        &self.id
    }
}

impl<T: Identified + ?Sized> Identified for &T {
    fn item_id(&self) -> &str {
        (**self).item_id()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Stored JSON could not be decoded. Recovered on load with an empty default.
    #[error("stored annotation data is corrupt: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("failed to encode annotation data: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("annotation storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

// --- Data Transfer Objects ---

#[derive(Debug, Serialize, Deserialize)]
pub struct HighlightRequest {
    pub verse_id: String,
    pub color: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NoteRequest {
    pub verse_id: String,
    pub text: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct NextUnseenParams {
    /// Restrict the candidates to one book.
    pub book: Option<String>,
}

/// Current system time in milliseconds.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}
