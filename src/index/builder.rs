use super::types::{BookLabel, Index, IndexEntry};
use crate::ingestion::types::Corpus;
use crate::search::tokenizer::{bigrams, normalize_text, Analyzer};
use std::collections::{HashMap, HashSet};

/// Builds an index with the default analyzer.
pub fn build_index(corpus: &Corpus) -> Index {
    build_index_with(corpus, Analyzer::default())
}

/// Builds an index with a caller-supplied analyzer.
///
/// Linear in the number of verses.
pub fn build_index_with(corpus: &Corpus, analyzer: Analyzer) -> Index {
    let mut entries: Vec<IndexEntry> = corpus
        .verses
        .iter()
        .map(|verse| {
            let tokens = analyzer.tokenize(&verse.text);
            let stems = analyzer.stems(&tokens);
            let pairs = bigrams(&tokens);

            IndexEntry {
                id: verse.id.clone(),
                key: verse.key(),
                verse: verse.clone(),
                tokens: dedup(tokens),
                stems: dedup(stems),
                bigrams: dedup(pairs),
                context_tokens: Vec::new(),
                normalized_text: normalize_text(&verse.text),
            }
        })
        .collect();

    attach_context(&mut entries);

    let mut verse_by_key = HashMap::with_capacity(entries.len());
    for (position, entry) in entries.iter().enumerate() {
        if verse_by_key.insert(entry.key.clone(), position).is_some() {
            tracing::warn!("Duplicate index key {}", entry.key);
        }
    }

    let books = book_labels(corpus, &entries);

    tracing::info!(
        "Built index with {} entries across {} books",
        entries.len(),
        books.len()
    );

    Index {
        entries,
        verse_by_key,
        books,
        analyzer,
    }
}

/// Fills `context_tokens` from chapter-local neighbors ordered by verse number.
fn attach_context(entries: &mut [IndexEntry]) {
    let mut chapters: HashMap<(&str, u32), Vec<usize>> = HashMap::new();
    for (position, entry) in entries.iter().enumerate() {
        chapters
            .entry((entry.verse.book_id.as_str(), entry.verse.chapter))
            .or_default()
            .push(position);
    }

    let mut contexts: Vec<(usize, Vec<String>)> = Vec::with_capacity(entries.len());
    for mut positions in chapters.into_values() {
        positions.sort_by_key(|&position| entries[position].verse.verse);

        for (slot, &position) in positions.iter().enumerate() {
            let previous = slot.checked_sub(1).map(|s| positions[s]);
            let next = positions.get(slot + 1).copied();

            let neighbor_tokens = previous
                .into_iter()
                .chain(next)
                .flat_map(|neighbor| entries[neighbor].tokens.iter().cloned());
            contexts.push((position, dedup(neighbor_tokens)));
        }
    }

    for (position, context) in contexts {
        entries[position].context_tokens = context;
    }
}

fn book_labels(corpus: &Corpus, entries: &[IndexEntry]) -> Vec<BookLabel> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter(|entry| seen.insert(entry.verse.book_id.as_str()))
        .map(|entry| {
            let name = corpus
                .book(&entry.verse.book_id)
                .map(|book| book.name.as_str())
                .unwrap_or(entry.verse.book.as_str());
            BookLabel {
                id: entry.verse.book_id.clone(),
                normalized_id: normalize_text(&entry.verse.book_id),
                normalized_name: normalize_text(name),
            }
        })
        .collect()
}

/// Removes repeats, keeping first occurrences in order.
fn dedup<I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
