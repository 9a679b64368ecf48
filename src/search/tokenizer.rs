//! Text normalization and tokenization.
//!
//! All functions here are pure and hold no shared mutable state, so they are safe to
//! call concurrently from any number of queries.

use super::stemmer::{Stemmer, SuffixStemmer};
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Spanish function words that carry no search signal.
pub const STOPWORDS: &[&str] = &[
    "a", "al", "algo", "ante", "antes", "aqui", "asi", "como", "con", "contra", "cual",
    "cuando", "de", "del", "desde", "donde", "e", "el", "ella", "ellas", "ellos", "en", "entre",
    "era", "eran", "es", "esa", "esas", "ese", "eso", "esos", "esta", "estaba", "estas", "este",
    "esto", "estos", "fue", "ha", "han", "hay", "la", "las", "le", "les", "lo", "los", "mas",
    "me", "mi", "mis", "muy", "ni", "no", "nos", "o", "os", "para", "pero", "por", "porque",
    "que", "se", "si", "sin", "sobre", "su", "sus", "te", "tu", "tus", "u", "un", "una", "unas",
    "uno", "unos", "y", "ya", "yo",
];

static DEFAULT_STOPWORDS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOPWORDS.iter().copied().collect());

static DEFAULT_ANALYZER: LazyLock<Analyzer> = LazyLock::new(Analyzer::default);

/// Case-folds, strips diacritics and punctuation, collapses whitespace.
///
/// Lowercase, canonical decomposition, combining marks dropped, anything outside
/// `[a-z0-9 :.-]` removed. Whitespace of any kind counts as a separator.
pub fn normalize_text(text: &str) -> String {
    let folded: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter_map(|c| match c {
            'a'..='z' | '0'..='9' | ':' | '.' | '-' => Some(c),
            c if c.is_whitespace() => Some(' '),
            _ => None,
        })
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits text into searchable tokens with the default analyzer.
pub fn tokenize(text: &str) -> Vec<String> {
    DEFAULT_ANALYZER.tokenize(text)
}

/// Stems a single token with the default analyzer.
pub fn stem(token: &str) -> String {
    DEFAULT_ANALYZER.stem(token)
}

/// Joins adjacent tokens into space-separated pairs.
pub fn bigrams(tokens: &[String]) -> Vec<String> {
    tokens
        .windows(2)
        .map(|pair| format!("{} {}", pair[0], pair[1]))
        .collect()
}

/// Stopword set and stemmer shared by the index builder and the query engine.
///
/// An index keeps the analyzer it was built with, so queries are always
/// analyzed the same way as the entries they are scored against.
#[derive(Clone)]
pub struct Analyzer {
    stopwords: HashSet<&'static str>,
    stemmer: Arc<dyn Stemmer>,
}

impl Analyzer {
    pub fn new(stopwords: HashSet<&'static str>, stemmer: Arc<dyn Stemmer>) -> Self {
        Self { stopwords, stemmer }
    }

    /// Default stopwords with a different stemmer.
    pub fn with_stemmer(stemmer: Arc<dyn Stemmer>) -> Self {
        Self::new(DEFAULT_STOPWORDS.clone(), stemmer)
    }

    /// Normalizes `text`, splits on spaces and drops empty tokens and stopwords.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        normalize_text(text)
            .split(' ')
            .map(|token| token.trim_matches(|c| matches!(c, ':' | '.' | '-')))
            .filter(|token| !token.is_empty())
            .filter(|token| !self.stopwords.contains(token))
            .map(str::to_string)
            .collect()
    }

    pub fn stem(&self, token: &str) -> String {
        self.stemmer.stem(token).into_owned()
    }

    pub fn stems(&self, tokens: &[String]) -> Vec<String> {
        tokens.iter().map(|token| self.stem(token)).collect()
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::with_stemmer(Arc::new(SuffixStemmer::spanish()))
    }
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("stopwords", &self.stopwords.len())
            .finish_non_exhaustive()
    }
}
