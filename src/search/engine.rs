use super::expansion::expand;
use super::reference::resolve_reference;
use super::tokenizer::{bigrams, normalize_text};
use super::types::{RankedResult, SearchOptions};
use crate::index::types::{Index, IndexEntry};

/// Bonus for the verse a query references directly.
pub const REFERENCE_SCORE: u32 = 100;
/// Bonus when the whole normalized query appears in the verse text.
pub const PHRASE_SCORE: u32 = 40;
pub const BIGRAM_SCORE: u32 = 10;
pub const TOKEN_SCORE: u32 = 6;
pub const CONTEXT_SCORE: u32 = 2;
pub const STEM_SCORE: u32 = 4;

/// Shortest normalized query eligible for the substring bonus.
const MIN_PHRASE_LEN: usize = 3;

/// Query features computed once and scored against every entry.
#[derive(Debug, Default)]
struct QueryPlan {
    reference_key: Option<String>,
    phrase: Option<String>,
    bigrams: Vec<String>,
    expanded_tokens: Vec<String>,
    stems: Vec<String>,
}

impl QueryPlan {
    fn new(query: &str, index: &Index) -> Self {
        let analyzer = index.analyzer();
        let normalized = normalize_text(query);
        let tokens = analyzer.tokenize(&normalized);

        let stems = analyzer.stems(&tokens);
        let query_bigrams = bigrams(&tokens);

        Self {
            reference_key: resolve_reference(&normalized, index).map(|reference| reference.key()),
            phrase: (normalized.chars().count() >= MIN_PHRASE_LEN).then_some(normalized),
            bigrams: unique(query_bigrams),
            expanded_tokens: expand(&tokens),
            stems: unique(stems),
        }
    }

    fn score(&self, entry: &IndexEntry) -> u32 {
        let mut score = 0;

        if self.reference_key.as_deref() == Some(entry.key.as_str()) {
            score += REFERENCE_SCORE;
        }

        if let Some(phrase) = &self.phrase {
            if entry.normalized_text.contains(phrase.as_str()) {
                score += PHRASE_SCORE;
            }
        }

        score += BIGRAM_SCORE * count_present(&self.bigrams, &entry.bigrams);

        for token in &self.expanded_tokens {
            if entry.tokens.contains(token) {
                score += TOKEN_SCORE;
            }
            if entry.context_tokens.contains(token) {
                score += CONTEXT_SCORE;
            }
        }

        score += STEM_SCORE * count_present(&self.stems, &entry.stems);
        score
    }
}

/// Scores every entry of `index` against `query` and returns the best matches.
///
/// Entries scoring zero are dropped. Ties keep corpus order. Empty and
/// whitespace-only queries yield no results.
pub fn search(query: &str, index: &Index, options: SearchOptions) -> Vec<RankedResult> {
    if query.trim().is_empty() || options.limit == 0 {
        return Vec::new();
    }

    let plan = QueryPlan::new(query, index);

    let mut scored: Vec<(u32, &IndexEntry)> = index
        .entries()
        .iter()
        .map(|entry| (plan.score(entry), entry))
        .filter(|(score, _)| *score > 0)
        .collect();

    // `sort_by` is stable, so equal scores stay in corpus order.
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.truncate(options.limit);

    tracing::debug!("Query {:?} matched {} entries", query, scored.len());

    scored
        .into_iter()
        .map(|(score, entry)| RankedResult {
            entry: entry.clone(),
            score,
        })
        .collect()
}

fn count_present(needles: &[String], haystack: &[String]) -> u32 {
    needles.iter().filter(|needle| haystack.contains(needle)).count() as u32
}

/// Removes repeats, keeping first occurrences in order.
fn unique(items: Vec<String>) -> Vec<String> {
    let mut unique = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    unique
}
