//! Suffix-stripping stemmer.
//!
//! The stemmer is exposed through the [`Stemmer`] trait so the index builder and the
//! query engine never depend on a concrete algorithm. [`SuffixStemmer`] is the default:
//! a lightweight heuristic tuned for Spanish inflections, not a linguistic stemmer.

use std::borrow::Cow;

/// Reduces a normalized token toward a root form.
///
/// Implementations must be pure: the same token always yields the same stem.
pub trait Stemmer: Send + Sync {
    fn stem<'a>(&self, token: &'a str) -> Cow<'a, str>;
}

/// Spanish inflectional and derivational endings, longest first.
pub const SPANISH_SUFFIXES: &[&str] = &[
    "amientos", "imientos",
    "aciones", "uciones", "amiento", "imiento",
    "idades", "adoras", "adores", "ancias", "encias", "aremos", "eremos", "iremos", "abamos",
    "acion", "ucion", "adora", "ancia", "encia", "mente", "ieron", "iendo", "ables", "ibles",
    "istas", "ismos",
    "ador", "ante", "idad", "ista", "ismo", "able", "ible", "ando", "aron", "aban", "osos",
    "osas", "ivos", "ivas",
    "oso", "osa", "ivo", "iva", "ada", "ido", "ida", "ado", "ias", "ios", "aba", "ara",
    "os", "as", "es", "io", "ia", "an", "en", "ar", "er", "ir", "ad",
    "o", "a", "e", "s",
];

/// Strips the first (longest) matching suffix from an ordered list.
///
/// A suffix is only removed when the remaining stem is longer than
/// `suffix.len() + 2`, so short words are left intact.
#[derive(Debug, Clone)]
pub struct SuffixStemmer {
    suffixes: &'static [&'static str],
}

impl SuffixStemmer {
    /// Creates a stemmer over `suffixes`.
    ///
    /// # Panics
    /// If `suffixes` is not sorted by descending length. A shorter suffix placed
    /// before a longer one with the same tail would shadow it forever.
    pub fn new(suffixes: &'static [&'static str]) -> Self {
        assert!(
            is_sorted_longest_first(suffixes),
            "suffix list must be sorted by descending length"
        );
        Self { suffixes }
    }

    /// The default Spanish stemmer.
    pub fn spanish() -> Self {
        Self::new(SPANISH_SUFFIXES)
    }

    pub fn suffixes(&self) -> &[&'static str] {
        self.suffixes
    }
}

impl Default for SuffixStemmer {
    fn default() -> Self {
        Self::spanish()
    }
}

impl Stemmer for SuffixStemmer {
    fn stem<'a>(&self, token: &'a str) -> Cow<'a, str> {
        for suffix in self.suffixes {
            if let Some(root) = token.strip_suffix(suffix) {
                if root.chars().count() > suffix.chars().count() + 2 {
                    return Cow::Borrowed(root);
                }
            }
        }
        Cow::Borrowed(token)
    }
}

/// Returns `true` when no suffix is longer than the one before it.
pub fn is_sorted_longest_first(suffixes: &[&str]) -> bool {
    suffixes
        .windows(2)
        .all(|pair| pair[0].chars().count() >= pair[1].chars().count())
}
