//! Raw corpus normalization.
//!
//! Accepts the two document layouts seen in the wild and produces a canonical [`Corpus`]:
//!
//! - flat: `{ "verses": [ { "bookId", "book", "chapter", "verse", "text" }, ... ] }`
//! - nested: `{ "books": [ { "id", "name", "order", "chapters": [ { "number", "verses": [...] } ] } ] }`
//!
//! Each logical field is resolved through a prioritized alias list, so nothing past
//! this module needs to know about `book_name`, `chapter_number` or `canon_order`.

use super::types::{default_verse_id, Book, Corpus, CorpusError, Verse};
use crate::search::tokenizer::normalize_text;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

const VERSE_ID_FIELDS: &[&str] = &["id"];
const VERSE_BOOK_ID_FIELDS: &[&str] = &["bookId", "book_id"];
const VERSE_BOOK_NAME_FIELDS: &[&str] = &["book", "book_name"];
const VERSE_CHAPTER_FIELDS: &[&str] = &["chapter", "chapter_number"];
const VERSE_NUMBER_FIELDS: &[&str] = &["verse", "verse_number", "verseIndex"];
const VERSE_TEXT_FIELDS: &[&str] = &["text", "content"];

const BOOK_ID_FIELDS: &[&str] = &["id", "bookId", "code"];
const BOOK_NAME_FIELDS: &[&str] = &["name", "title"];
const BOOK_ORDER_FIELDS: &[&str] = &["order", "canon_order"];

const CHAPTER_NUMBER_FIELDS: &[&str] = &["number", "chapter"];

const SLUG_MAX_LEN: usize = 24;
const DEFAULT_BOOK_SLUG: &str = "book";
const UNVERSIONED: &str = "unversioned";

/// Normalizes a raw corpus document.
///
/// Returns [`CorpusError::Shape`] when the document has neither `verses` nor `books`,
/// and [`CorpusError::Empty`] when it normalizes to zero verses.
pub fn normalize_corpus(raw: &Value) -> Result<Corpus, CorpusError> {
    let root = raw.as_object().ok_or(CorpusError::Shape)?;
    let flat = root.get("verses").and_then(Value::as_array);
    let nested = root.get("books").and_then(Value::as_array);

    let mut builder = CorpusBuilder::default();

    if let Some(verses) = flat {
        // `books` alongside `verses` only seeds book metadata.
        for book in nested.into_iter().flatten().filter_map(Value::as_object) {
            builder.register_book_from(book);
        }
        for verse in verses.iter().filter_map(Value::as_object) {
            builder.add_verse(verse, &ParentContext::default(), 1);
        }
    } else if let Some(books) = nested {
        for book in books.iter().filter_map(Value::as_object) {
            builder.add_nested_book(book);
        }
    } else {
        return Err(CorpusError::Shape);
    }

    if builder.verses.is_empty() {
        return Err(CorpusError::Empty);
    }

    let version = root
        .get("version")
        .and_then(scalar_to_string)
        .unwrap_or_else(|| UNVERSIONED.to_string());
    let is_sample = root
        .get("isSample")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    Ok(builder.finish(version, is_sample))
}

/// Derives a book id from its display name: normalized, non-alphanumeric runs
/// collapsed to `-`, capped in length.
pub fn slugify(name: &str) -> String {
    let mut slug = String::new();
    for c in normalize_text(name).chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }

    let mut slug: String = slug.chars().take(SLUG_MAX_LEN).collect();
    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.is_empty() {
        DEFAULT_BOOK_SLUG.to_string()
    } else {
        slug
    }
}

/// Book and chapter context inherited by verses nested under them.
#[derive(Debug, Default, Clone)]
struct ParentContext {
    book_id: Option<String>,
    chapter: Option<u32>,
}

#[derive(Debug)]
struct BookDraft {
    id: String,
    name: String,
    order: i64,
    chapters: Vec<u32>,
}

#[derive(Debug, Default)]
struct CorpusBuilder {
    books: Vec<BookDraft>,
    book_positions: HashMap<String, usize>,
    verses: Vec<Verse>,
    seen_keys: HashSet<(String, u32, u32)>,
    seen_ids: HashSet<String>,
}

impl CorpusBuilder {
    /// Registers a book exactly once; the first occurrence wins for name and order.
    fn register_book(&mut self, id: String, name: Option<String>, order: Option<i64>) -> String {
        if self.book_positions.contains_key(&id) {
            return id;
        }

        let order = order.unwrap_or(self.books.len() as i64 + 1);
        self.book_positions.insert(id.clone(), self.books.len());
        self.books.push(BookDraft {
            name: name.unwrap_or_else(|| id.clone()),
            id: id.clone(),
            order,
            chapters: Vec::new(),
        });
        id
    }

    fn register_book_from(&mut self, book: &Map<String, Value>) -> String {
        let name = first_string(book, BOOK_NAME_FIELDS);
        let id = first_string(book, BOOK_ID_FIELDS)
            .unwrap_or_else(|| slugify(name.as_deref().unwrap_or_default()));
        let order = first_int(book, BOOK_ORDER_FIELDS);
        self.register_book(id, name, order)
    }

    fn add_nested_book(&mut self, book: &Map<String, Value>) {
        let book_id = self.register_book_from(book);

        let chapters = book.get("chapters").and_then(Value::as_array);
        for (position, chapter) in chapters.into_iter().flatten().enumerate() {
            let Some(chapter) = chapter.as_object() else {
                continue;
            };
            let number = first_u32(chapter, CHAPTER_NUMBER_FIELDS).unwrap_or(position as u32 + 1);
            let parent = ParentContext {
                book_id: Some(book_id.clone()),
                chapter: Some(number),
            };
            let verses = chapter.get("verses").and_then(Value::as_array);
            // Unnumbered verses of a chapter take their 1-based position.
            for (index, verse) in verses.into_iter().flatten().enumerate() {
                let position = index as u32 + 1;
                match verse {
                    Value::Object(fields) => self.add_verse(fields, &parent, position),
                    Value::String(text) => {
                        let mut fields = Map::new();
                        fields.insert("text".to_string(), Value::String(text.clone()));
                        self.add_verse(&fields, &parent, position);
                    }
                    _ => {}
                }
            }
        }

        // A nested book may also list its verses directly, each carrying a chapter.
        let parent = ParentContext {
            book_id: Some(book_id),
            chapter: None,
        };
        let direct = book.get("verses").and_then(Value::as_array);
        for verse in direct.into_iter().flatten().filter_map(Value::as_object) {
            self.add_verse(verse, &parent, 1);
        }
    }

    fn add_verse(&mut self, fields: &Map<String, Value>, parent: &ParentContext, default_number: u32) {
        let book_name = first_string(fields, VERSE_BOOK_NAME_FIELDS);
        let book_id = match first_string(fields, VERSE_BOOK_ID_FIELDS) {
            Some(id) => self.register_book(id, book_name, None),
            None => match (&parent.book_id, book_name) {
                (Some(id), _) => id.clone(),
                (None, Some(name)) => self.register_book(slugify(&name), Some(name), None),
                (None, None) => self.register_book(DEFAULT_BOOK_SLUG.to_string(), None, None),
            },
        };

        let chapter = first_u32(fields, VERSE_CHAPTER_FIELDS)
            .or(parent.chapter)
            .unwrap_or(1);
        let number = first_u32(fields, VERSE_NUMBER_FIELDS).unwrap_or(default_number);

        if !self.seen_keys.insert((book_id.clone(), chapter, number)) {
            tracing::warn!(
                "Dropping duplicate verse reference {}:{}:{}",
                book_id,
                chapter,
                number
            );
            return;
        }

        let id = self.unique_id(first_string(fields, VERSE_ID_FIELDS), &book_id, chapter, number);
        let text = first_string(fields, VERSE_TEXT_FIELDS).unwrap_or_default();

        let position = self.book_positions[&book_id];
        let book = &mut self.books[position];
        book.chapters.push(chapter);

        self.verses.push(Verse {
            id,
            book: book.name.clone(),
            book_id,
            chapter,
            verse: number,
            text,
        });
    }

    fn unique_id(&mut self, supplied: Option<String>, book_id: &str, chapter: u32, verse: u32) -> String {
        let fallback = default_verse_id(book_id, chapter, verse);
        let mut id = match supplied {
            Some(id) if !self.seen_ids.contains(&id) => id,
            _ => fallback.clone(),
        };

        let mut suffix = 2;
        while self.seen_ids.contains(&id) {
            id = format!("{}-{}", fallback, suffix);
            suffix += 1;
        }

        self.seen_ids.insert(id.clone());
        id
    }

    fn finish(self, version: String, is_sample: bool) -> Corpus {
        let mut books: Vec<Book> = self
            .books
            .into_iter()
            .filter(|draft| !draft.chapters.is_empty())
            .map(|draft| {
                let mut chapters = draft.chapters;
                chapters.sort_unstable();
                chapters.dedup();
                Book {
                    id: draft.id,
                    name: draft.name,
                    order: draft.order,
                    chapters,
                }
            })
            .collect();
        books.sort_by_key(|book| book.order);

        let book_order = books.iter().map(|book| book.id.clone()).collect();

        Corpus {
            version,
            is_sample,
            books,
            verses: self.verses,
            book_order,
        }
    }
}

/// First alias holding a non-empty string or a number, as a trimmed string.
fn first_string(fields: &Map<String, Value>, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .filter_map(|alias| fields.get(*alias))
        .find_map(scalar_to_string)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First alias holding an integer, a float or a numeric string.
fn first_int(fields: &Map<String, Value>, aliases: &[&str]) -> Option<i64> {
    aliases
        .iter()
        .filter_map(|alias| fields.get(*alias))
        .find_map(|value| match value {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
            Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f.trunc() as i64),
            _ => None,
        })
}

fn first_u32(fields: &Map<String, Value>, aliases: &[&str]) -> Option<u32> {
    first_int(fields, aliases).and_then(|n| u32::try_from(n).ok())
}
