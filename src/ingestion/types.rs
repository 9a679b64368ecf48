//! Corpus Data Types
//!
//! Canonical structures produced by the normalizer. Downstream components (index
//! builder, query engine, annotation store) only ever see these shapes, never the raw
//! field-name variants accepted on input.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A single passage of text at a `(book, chapter, verse)` position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verse {
    /// Unique within the corpus. Defaults to `"{bookId}-{chapter}-{verse}"`.
    pub id: String,
    pub book_id: String,
    /// Display name of the owning book.
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
}

impl Verse {
    /// The `"{bookId}:{chapter}:{verse}"` reference key.
    pub fn key(&self) -> String {
        reference_key(&self.book_id, self.chapter, self.verse)
    }
}

/// Builds the reference key used for direct lookup and ranking identity.
pub fn reference_key(book_id: &str, chapter: u32, verse: u32) -> String {
    format!("{}:{}:{}", book_id, chapter, verse)
}

/// Builds the default verse id for sources that do not supply one.
pub fn default_verse_id(book_id: &str, chapter: u32, verse: u32) -> String {
    format!("{}-{}-{}", book_id, chapter, verse)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub name: String,
    pub order: i64,
    /// Distinct chapter numbers present in the corpus, ascending.
    pub chapters: Vec<u32>,
}

/// The full normalized set of books and verses for one session.
///
/// Built once per load and treated as immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Corpus {
    pub version: String,
    /// `true` when live data failed to load and the bundled sample was used instead.
    pub is_sample: bool,
    /// Sorted by `order` ascending.
    pub books: Vec<Book>,
    pub verses: Vec<Verse>,
    pub book_order: Vec<String>,
}

impl Corpus {
    pub fn book(&self, book_id: &str) -> Option<&Book> {
        self.books.iter().find(|book| book.id == book_id)
    }

    pub fn verses_in_book<'a>(&'a self, book_id: &'a str) -> impl Iterator<Item = &'a Verse> + 'a {
        self.verses.iter().filter(move |verse| verse.book_id == book_id)
    }
}

/// Where the service obtains its corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorpusSource {
    /// The sample compiled into the binary.
    Bundled,
    /// A JSON document served over HTTP(S).
    Url(String),
    /// A JSON document on the local filesystem.
    File(PathBuf),
}

impl std::fmt::Display for CorpusSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorpusSource::Bundled => write!(f, "bundled sample"),
            CorpusSource::Url(url) => write!(f, "{}", url),
            CorpusSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Failures while obtaining or interpreting a corpus.
///
/// None of these reach callers of [`super::loader::load_corpus`]: every variant
/// resolves to the bundled sample with `is_sample = true`.
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("corpus fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("corpus host answered with status {0}")]
    Status(u16),
    #[error("failed to read corpus file: {0}")]
    Read(#[from] std::io::Error),
    #[error("corpus is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("corpus document has neither `verses` nor `books`")]
    Shape,
    #[error("corpus document contains no verses")]
    Empty,
}

/// Summary returned by the corpus endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusStatus {
    pub version: String,
    pub is_sample: bool,
    pub book_count: usize,
    pub verse_count: usize,
    pub books: Vec<Book>,
}

impl From<&Corpus> for CorpusStatus {
    fn from(corpus: &Corpus) -> Self {
        Self {
            version: corpus.version.clone(),
            is_sample: corpus.is_sample,
            book_count: corpus.books.len(),
            verse_count: corpus.verses.len(),
            books: corpus.books.clone(),
        }
    }
}
