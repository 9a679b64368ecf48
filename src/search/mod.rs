//! Search Service Module
//!
//! The core component responsible for executing user queries against the in-memory index.
//!
//! ## Overview
//! This module implements the text pipeline and the ranking logic. Everything here is
//! synchronous and pure except the `SearchService` handle, which owns the current
//! corpus/index snapshot and swaps it wholesale on reload.
//!
//! ## Scoring
//! Signals are additive per entry: a direct reference match (+100), the whole query as a
//! substring (+40), shared bigrams (+10 each), expanded tokens in the verse (+6 each) or in
//! its chapter-local neighbors (+2 each), and shared stems (+4 each).
//!
//! ## Submodules
//! - **`tokenizer`**: Normalization, stopword filtering, and the shared `Analyzer`.
//! - **`stemmer`**: The `Stemmer` trait and the default suffix-stripping implementation.
//! - **`reference`**: Parsing `book chapter:verse` references out of free text.
//! - **`expansion`**: The concept → related-terms table.
//! - **`engine`**: Scoring and ranking.
//! - **`service`**: The long-lived `SearchService` handle.
//! - **`handlers`**: HTTP request handlers for the Axum web server.
//! - **`types`**: Options, results, and Data Transfer Objects.

pub mod engine;
pub mod expansion;
pub mod handlers;
pub mod reference;
pub mod service;
pub mod stemmer;
pub mod tokenizer;
pub mod types;
