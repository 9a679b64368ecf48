//! Annotation Storage Module
//!
//! Persists per-user highlights, notes and seen-item lists, independently of the corpus:
//! annotations survive corpus reloads and version switches.
//!
//! ## Core Concepts
//! - **Keys**: Every value lives under `"{prefix}:{section}:{userId}"`, JSON-encoded.
//! - **Backends**: `StorageBackend` abstracts the key-value medium. `MemoryBackend` keeps
//!   everything in a `DashMap`; `FileBackend` writes one JSON file per key.
//! - **Recovery**: Corrupt stored JSON never surfaces as an error on load; callers get an
//!   empty collection instead. Backend I/O failures do surface on writes, so a failed read
//!   is never saved back over the stored value.
//! - **Cycling**: `pick_next_unseen` samples uniformly among items not yet returned and
//!   restarts the cycle once everything has been seen. Scoped cycles (one per book, say)
//!   keep seen-lists of their own.
//!
//! Writes are last-write-wins per key with no cross-process coordination.

pub mod annotations;
pub mod backend;
pub mod file;
pub mod handlers;
pub mod memory;
pub mod types;

#[cfg(test)]
mod tests;
