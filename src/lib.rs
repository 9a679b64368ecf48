//! Verse Search Engine Library
//!
//! This library crate defines the core modules of a small, self-contained verse
//! search engine. It serves as the foundation for the binary executable (`main.rs`).
//!
//! ## Architecture Modules
//! The system is composed of five loosely coupled subsystems:
//!
//! - **`config`**: Command-line and environment configuration for the service binary.
//! - **`ingestion`**: The corpus intake pipeline. Fetches raw JSON from a URL, a local
//!   file or the bundled sample, reconciles field-name variants and produces a
//!   canonical `Corpus` (books + verses).
//! - **`index`**: Builds the per-verse searchable representation (tokens, stems,
//!   bigrams, chapter-local context) and the reference-keyed lookup map.
//! - **`search`**: Text normalization, tokenization, stemming, the query engine
//!   (reference resolution, concept expansion, multi-signal scoring) and the
//!   long-lived `SearchService` handle that owns the current corpus/index snapshot.
//! - **`storage`**: The per-user annotation store (highlights, notes, seen items)
//!   with pluggable in-memory or file-backed persistence.

pub mod config;
pub mod index;
pub mod ingestion;
pub mod search;
pub mod storage;
