//! Index Builder Module
//!
//! Turns a canonical `Corpus` into the searchable `Index` consumed by the query engine.
//!
//! ## Per-entry signals
//! - **Tokens / stems**: stopword-filtered tokens of the verse text and their stems.
//! - **Bigrams**: adjacent token pairs, for phrase-like matches.
//! - **Context tokens**: the token union of the verse's immediate predecessor and
//!   successor within the same chapter. No cross-chapter bleed.
//! - **Key**: `"{bookId}:{chapter}:{verse}"`, used for O(1) reference lookup.
//!
//! The index is rebuilt wholesale whenever the corpus changes; there is no partial path.

pub mod builder;
pub mod types;
