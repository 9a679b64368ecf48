//! Corpus Ingestion Module
//!
//! Handles the acquisition and normalization of the verse corpus.
//!
//! ## Workflow
//! 1. **Acquire**: Fetches raw JSON from a URL, reads a local file, or falls back to the
//!    bundled sample.
//! 2. **Normalize**: Reconciles field-name variants (`book` vs `book_name`, flat vs nested
//!    layouts) into the canonical `Corpus` schema.
//! 3. **Degrade**: Any fetch or shape failure resolves to the bundled sample with
//!    `is_sample = true`, the single externally observable degradation signal.

pub mod handlers;
pub mod loader;
pub mod normalizer;
pub mod sample;
pub mod types;
