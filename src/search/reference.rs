//! Direct reference resolution (`"juan 3:16"`, `"Gn 1.1"`).

use super::tokenizer::normalize_text;
use crate::index::types::{BookLabel, Index};
use crate::ingestion::types::reference_key;
use regex::Regex;
use std::sync::LazyLock;

static REFERENCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s*[:.\-]\s*(\d+)").expect("reference pattern is valid")
});

/// A `(book, chapter, verse)` reference parsed from a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedReference {
    pub book_id: String,
    pub chapter: u32,
    pub verse: u32,
}

impl ResolvedReference {
    pub fn key(&self) -> String {
        reference_key(&self.book_id, self.chapter, self.verse)
    }
}

/// Parses `<book> <chapter><sep><verse>` out of `query`, `sep` being `:`, `.` or `-`.
///
/// The remaining non-numeric tokens are tried in order as book fragments. A book
/// matches when its normalized name or id contains the fragment; failing that, when
/// the fragment starts with the same letter and is a subsequence of the name, which
/// covers common abbreviations such as `gn` or `jn`.
pub fn resolve_reference(query: &str, index: &Index) -> Option<ResolvedReference> {
    let normalized = normalize_text(query);
    let captures = REFERENCE_PATTERN.captures(&normalized)?;
    let span = captures.get(0)?;
    let chapter = captures.get(1)?.as_str().parse().ok()?;
    let verse = captures.get(2)?.as_str().parse().ok()?;

    let remainder = format!("{} {}", &normalized[..span.start()], &normalized[span.end()..]);
    let book = remainder
        .split_whitespace()
        .map(|token| token.trim_matches(|c| matches!(c, ':' | '.' | '-')))
        .filter(|token| !token.is_empty() && !token.chars().all(|c| c.is_ascii_digit()))
        .find_map(|fragment| find_book(index.books(), fragment))?;

    Some(ResolvedReference {
        book_id: book.id.clone(),
        chapter,
        verse,
    })
}

fn find_book<'a>(books: &'a [BookLabel], fragment: &str) -> Option<&'a BookLabel> {
    books
        .iter()
        .find(|book| book.normalized_name.contains(fragment) || book.normalized_id.contains(fragment))
        .or_else(|| {
            books.iter().find(|book| {
                book.normalized_name.chars().next() == fragment.chars().next()
                    && is_subsequence(fragment, &book.normalized_name)
            })
        })
}

fn is_subsequence(needle: &str, haystack: &str) -> bool {
    let mut remaining = haystack.chars();
    needle.chars().all(|c| remaining.any(|h| h == c))
}
