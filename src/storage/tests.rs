//! Storage Module Tests
//!
//! Validates annotation persistence and the unseen-item cycle.
//!
//! ## Test Scopes
//! - **AnnotationStore**: Key layout, highlight/note CRUD, corrupt data recovery, and
//!   failed reads that must leave stored data alone.
//! - **Backends**: In-memory isolation, on-disk persistence across store instances and
//!   concurrent writers.
//! - **Cycling**: `pick_next_unseen` exhausts every item before restarting, globally or
//!   per scope.
//! - **Handlers**: Axum handlers invoked directly with their extractors.

#[cfg(test)]
mod tests {
    use crate::ingestion::sample::sample_corpus;
    use crate::search::service::SearchService;
    use crate::storage::annotations::AnnotationStore;
    use crate::storage::backend::StorageBackend;
    use crate::storage::file::FileBackend;
    use crate::storage::handlers::*;
    use crate::storage::memory::MemoryBackend;
    use crate::storage::types::{
        HighlightRequest, Highlights, Identified, NextUnseenParams, NoteRequest, Section,
        StorageError,
    };
    use axum::extract::{Extension, Path, Query};
    use axum::http::StatusCode;
    use axum::Json;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[derive(Debug, PartialEq)]
    struct Item(String);

    impl Identified for Item {
        fn item_id(&self) -> &str {
            &self.0
        }
    }

    fn items(ids: &[&str]) -> Vec<Item> {
        ids.iter().map(|id| Item(id.to_string())).collect()
    }

    /// In-memory backend whose reads can be switched to fail.
    #[derive(Default)]
    struct UnreliableReads {
        inner: MemoryBackend,
        failing: AtomicBool,
    }

    impl UnreliableReads {
        fn fail_reads(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }
    }

    impl StorageBackend for UnreliableReads {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(std::io::Error::other("disk unavailable").into());
            }
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove(key)
        }

        fn keys(&self) -> Result<Vec<String>, StorageError> {
            self.inner.keys()
        }
    }

    fn store_with_backend() -> (AnnotationStore, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        (AnnotationStore::new(backend.clone(), "verse"), backend)
    }

    // ============================================================
    // ANNOTATION STORE TESTS
    // ============================================================

    #[test]
    fn test_storage_key_layout() {
        let store = AnnotationStore::in_memory("biblia");

        assert_eq!(store.storage_key("ana", Section::Highlights), "biblia:highlights:ana");
        assert_eq!(store.storage_key("ana", Section::Notes), "biblia:notes:ana");
        assert_eq!(store.storage_key("ana", Section::SeenItems), "biblia:seen_items:ana");
    }

    #[test]
    fn test_highlight_crud() {
        let (store, backend) = store_with_backend();
        assert!(store.highlights("ana").is_empty());

        store.set_highlight("ana", "jn-3-16", "yellow").unwrap();
        let highlights = store.set_highlight("ana", "gen-1-1", "blue").unwrap();
        assert_eq!(highlights.len(), 2);

        // Recoloring replaces the previous color.
        store.set_highlight("ana", "jn-3-16", "green").unwrap();
        assert_eq!(store.highlights("ana")["jn-3-16"], "green");

        let raw = backend.get("verse:highlights:ana").unwrap().unwrap();
        let decoded: Highlights = serde_json::from_str(&raw).unwrap();
        assert_eq!(decoded, store.highlights("ana"));

        assert!(store.remove_highlight("ana", "gen-1-1").unwrap());
        assert!(!store.remove_highlight("ana", "gen-1-1").unwrap());
        assert_eq!(store.highlights("ana").len(), 1);
    }

    #[test]
    fn test_note_crud() {
        let store = AnnotationStore::in_memory("verse");

        let note = store.set_note("ana", "sal-23-1", "Pastor").unwrap();
        assert_eq!(note.text, "Pastor");
        assert!(note.updated_at > 0);

        let edited = store.set_note("ana", "sal-23-1", "El Señor es mi pastor").unwrap();
        assert!(edited.updated_at >= note.updated_at);

        let notes = store.notes("ana");
        assert_eq!(notes.len(), 1);
        assert_eq!(notes["sal-23-1"].text, "El Señor es mi pastor");

        assert!(store.remove_note("ana", "sal-23-1").unwrap());
        assert!(!store.remove_note("ana", "sal-23-1").unwrap());
        assert!(store.notes("ana").is_empty());
    }

    #[test]
    fn test_corrupt_data_loads_as_empty() {
        let (store, backend) = store_with_backend();
        backend
            .set("verse:highlights:ana", "{not json".to_string())
            .unwrap();
        backend
            .set("verse:notes:ana", "[1, 2, 3]".to_string())
            .unwrap();

        assert!(store.highlights("ana").is_empty());
        assert!(store.notes("ana").is_empty());
        assert!(matches!(
            store.try_load::<Highlights>("ana", Section::Highlights),
            Err(StorageError::Parse(_))
        ));

        // Writing over corrupt data repairs it.
        store.set_highlight("ana", "jn-1-1", "red").unwrap();
        assert_eq!(store.highlights("ana").len(), 1);
    }

    #[test]
    fn test_sections_and_users_are_independent() {
        let store = AnnotationStore::in_memory("verse");
        store.set_highlight("ana", "jn-1-1", "red").unwrap();
        store.set_note("ana", "jn-1-1", "nota").unwrap();
        store.set_highlight("luis", "gen-1-1", "blue").unwrap();

        store.clear_section("ana", Section::Highlights).unwrap();
        assert!(store.highlights("ana").is_empty());
        assert_eq!(store.notes("ana").len(), 1);
        assert_eq!(store.highlights("luis").len(), 1);

        store.clear_user("ana").unwrap();
        assert!(store.notes("ana").is_empty());
        assert_eq!(store.highlights("luis").len(), 1);
    }

    #[test]
    fn test_prefixes_isolate_namespaces() {
        let backend = Arc::new(MemoryBackend::new());
        let first = AnnotationStore::new(backend.clone(), "app-a");
        let second = AnnotationStore::new(backend.clone(), "app-b");

        first.set_highlight("ana", "jn-1-1", "red").unwrap();

        assert!(second.highlights("ana").is_empty());
        assert_eq!(backend.len(), 1);
    }

    #[test]
    fn test_failed_read_leaves_stored_annotations_intact() {
        let backend = Arc::new(UnreliableReads::default());
        let store = AnnotationStore::new(backend.clone(), "verse");
        store.set_highlight("ana", "gen-1-1", "yellow").unwrap();
        store.set_highlight("ana", "gen-1-2", "blue").unwrap();
        store.set_note("ana", "gen-1-1", "Principio").unwrap();
        let pool = items(&["a", "b", "c"]);
        store.pick_next_unseen("ana", &pool).unwrap();

        backend.fail_reads(true);
        assert!(matches!(
            store.set_highlight("ana", "gen-1-3", "red"),
            Err(StorageError::Io(_))
        ));
        assert!(store.remove_highlight("ana", "gen-1-1").is_err());
        assert!(store.set_note("ana", "gen-1-2", "Luz").is_err());
        assert!(store.remove_note("ana", "gen-1-1").is_err());
        assert!(store.pick_next_unseen("ana", &pool).is_err());
        backend.fail_reads(false);

        let highlights = store.highlights("ana");
        assert_eq!(highlights.len(), 2);
        assert_eq!(highlights["gen-1-1"], "yellow");
        assert_eq!(store.notes("ana").len(), 1);
        assert_eq!(store.seen("ana").len(), 1);
    }

    // ============================================================
    // FILE BACKEND TESTS
    // ============================================================

    #[test]
    fn test_file_backend_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();

        {
            let store = AnnotationStore::new(Arc::new(FileBackend::open(dir.path()).unwrap()), "verse");
            store.set_highlight("ana maría", "jn-3-16", "yellow").unwrap();
            store.set_note("ana maría", "jn-3-16", "Porque de tal manera").unwrap();
        }

        let backend = Arc::new(FileBackend::open(dir.path()).unwrap());
        let reopened = AnnotationStore::new(backend.clone(), "verse");

        assert_eq!(reopened.highlights("ana maría")["jn-3-16"], "yellow");
        assert_eq!(reopened.notes("ana maría")["jn-3-16"].text, "Porque de tal manera");
        assert_eq!(
            backend.keys().unwrap(),
            vec!["verse:highlights:ana maría", "verse:notes:ana maría"]
        );
    }

    #[test]
    fn test_file_backend_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(dir.path().join("nested/annotations")).unwrap();

        assert_eq!(backend.get("verse:notes:nobody").unwrap(), None);
        backend.remove("verse:notes:nobody").unwrap();
        assert!(backend.keys().unwrap().is_empty());
    }

    #[test]
    fn test_file_backend_concurrent_writers() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(FileBackend::open(dir.path()).unwrap());

        let writers: Vec<_> = (0..8)
            .map(|n| {
                let backend = backend.clone();
                std::thread::spawn(move || {
                    for round in 0..20 {
                        let value = serde_json::json!({ "writer": n, "round": round }).to_string();
                        backend.set("verse:notes:ana", value).unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let stored = backend.get("verse:notes:ana").unwrap().unwrap();
        let decoded: serde_json::Value = serde_json::from_str(&stored).unwrap();
        assert_eq!(decoded["round"], 19);
        assert_eq!(backend.keys().unwrap(), vec!["verse:notes:ana"]);
        // No temp files left behind.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    // ============================================================
    // UNSEEN CYCLE TESTS
    // ============================================================

    #[test]
    fn test_pick_next_unseen_exhausts_before_repeating() {
        let store = AnnotationStore::in_memory("verse");
        let pool = items(&["a", "b", "c", "d"]);
        let mut rng = StdRng::seed_from_u64(7);

        let mut picked = HashSet::new();
        for _ in 0..pool.len() {
            let item = store
                .pick_next_unseen_with("ana", &pool, &mut rng)
                .unwrap()
                .unwrap();
            assert!(picked.insert(item.0.clone()), "{} returned twice", item.0);
        }
        assert_eq!(picked.len(), 4);
        assert_eq!(store.seen("ana").len(), 4);

        // Everything seen: the next pick restarts the cycle.
        let restart = store
            .pick_next_unseen_with("ana", &pool, &mut rng)
            .unwrap()
            .unwrap();
        assert_eq!(store.seen("ana"), vec![restart.0.clone()]);
    }

    #[test]
    fn test_pick_next_unseen_empty_items() {
        let (store, backend) = store_with_backend();
        let pool: Vec<Item> = Vec::new();

        assert_eq!(store.pick_next_unseen("ana", &pool).unwrap(), None);
        assert!(backend.is_empty());
    }

    #[test]
    fn test_pick_next_unseen_ignores_stale_and_corrupt_seen_lists() {
        let (store, backend) = store_with_backend();
        let pool = items(&["a", "b"]);

        store
            .save("ana", Section::SeenItems, &vec!["a".to_string(), "gone".to_string()])
            .unwrap();
        let item = store.pick_next_unseen("ana", &pool).unwrap().unwrap();
        assert_eq!(item.0, "b");

        backend
            .set("verse:seen_items:luis", "\"oops\"".to_string())
            .unwrap();
        let item = store.pick_next_unseen("luis", &pool).unwrap().unwrap();
        assert_eq!(store.seen("luis"), vec![item.0.clone()]);
    }

    #[test]
    fn test_scoped_cycles_keep_separate_progress() {
        let store = AnnotationStore::in_memory("verse");
        let genesis = items(&["gen-1-1", "gen-1-2"]);
        let juan = items(&["jn-1-1", "jn-1-2", "jn-1-3"]);
        let mut rng = StdRng::seed_from_u64(11);

        store
            .pick_next_unseen_in_with("ana", "jn", &juan, &mut rng)
            .unwrap();
        store
            .pick_next_unseen_in_with("ana", "jn", &juan, &mut rng)
            .unwrap();

        // Exhaust and restart the genesis cycle.
        for _ in 0..3 {
            store
                .pick_next_unseen_in_with("ana", "gen", &genesis, &mut rng)
                .unwrap();
        }
        assert_eq!(store.seen_in("ana", "gen").len(), 1);

        assert_eq!(store.seen_in("ana", "jn").len(), 2);
        assert!(store.seen("ana").is_empty());

        let last = store
            .pick_next_unseen_in_with("ana", "jn", &juan, &mut rng)
            .unwrap()
            .unwrap();
        let seen: HashSet<String> = store.seen_in("ana", "jn").into_iter().collect();
        assert_eq!(seen.len(), 3);
        assert!(seen.contains(&last.0));
    }

    #[test]
    fn test_scoped_seen_keys_and_clear_user() {
        let (store, backend) = store_with_backend();
        assert_eq!(store.scoped_seen_key("ana", "jn"), "verse:seen_items/jn:ana");
        assert_eq!(store.scoped_seen_key("ana", "a:b"), "verse:seen_items/a%3Ab:ana");

        let pool = items(&["x"]);
        store.pick_next_unseen_in("ana", "jn", &pool).unwrap();
        store.pick_next_unseen_in("ana", "a:b", &pool).unwrap();
        store.pick_next_unseen_in("x:ana", "jn", &pool).unwrap();
        store.pick_next_unseen("ana", &pool).unwrap();

        store.clear_user("ana").unwrap();

        assert_eq!(backend.keys().unwrap(), vec!["verse:seen_items/jn:x:ana"]);
    }

    // ============================================================
    // HANDLER TESTS
    // ============================================================

    #[tokio::test]
    async fn test_highlight_handlers() {
        let store = Arc::new(AnnotationStore::in_memory("verse"));

        let Json(highlights) = handle_put_highlight(
            Path("ana".to_string()),
            Extension(store.clone()),
            Json(HighlightRequest {
                verse_id: "jn-3-16".to_string(),
                color: "yellow".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(highlights["jn-3-16"], "yellow");

        let Json(listed) = handle_get_highlights(Path("ana".to_string()), Extension(store.clone()))
            .await
            .unwrap();
        assert_eq!(listed, highlights);

        let status = handle_delete_highlight(
            Path(("ana".to_string(), "jn-3-16".to_string())),
            Extension(store.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let status = handle_delete_highlight(
            Path(("ana".to_string(), "jn-3-16".to_string())),
            Extension(store),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_handlers_report_read_failures() {
        let backend = Arc::new(UnreliableReads::default());
        let store = Arc::new(AnnotationStore::new(backend.clone(), "verse"));
        store.set_highlight("ana", "jn-1-1", "red").unwrap();
        backend.fail_reads(true);

        let result = handle_put_highlight(
            Path("ana".to_string()),
            Extension(store.clone()),
            Json(HighlightRequest {
                verse_id: "jn-1-2".to_string(),
                color: "blue".to_string(),
            }),
        )
        .await;
        assert_eq!(result.unwrap_err(), StatusCode::INTERNAL_SERVER_ERROR);

        let status = handle_delete_highlight(
            Path(("ana".to_string(), "jn-1-1".to_string())),
            Extension(store.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        backend.fail_reads(false);
        assert_eq!(store.highlights("ana").len(), 1);
    }

    #[tokio::test]
    async fn test_note_handlers() {
        let store = Arc::new(AnnotationStore::in_memory("verse"));

        let Json(note) = handle_put_note(
            Path("ana".to_string()),
            Extension(store.clone()),
            Json(NoteRequest {
                verse_id: "gen-1-3".to_string(),
                text: "Sea la luz".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(note.text, "Sea la luz");

        let Json(notes) = handle_get_notes(Path("ana".to_string()), Extension(store.clone()))
            .await
            .unwrap();
        assert_eq!(notes["gen-1-3"], note);

        let status = handle_delete_note(
            Path(("ana".to_string(), "gen-1-3".to_string())),
            Extension(store),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_next_unseen_handler_cycles_through_book() {
        let store = Arc::new(AnnotationStore::in_memory("verse"));
        let service = SearchService::from_corpus(sample_corpus());
        let book_size = sample_corpus().verses_in_book("jn").count();

        let mut ids = HashSet::new();
        for _ in 0..book_size {
            let Json(verse) = handle_next_unseen(
                Path("ana".to_string()),
                Query(NextUnseenParams {
                    book: Some("jn".to_string()),
                }),
                Extension(store.clone()),
                Extension(service.clone()),
            )
            .await
            .unwrap();
            assert_eq!(verse.book_id, "jn");
            ids.insert(verse.id);
        }
        assert_eq!(ids.len(), book_size);

        let missing = handle_next_unseen(
            Path("ana".to_string()),
            Query(NextUnseenParams {
                book: Some("apocalipsis".to_string()),
            }),
            Extension(store),
            Extension(service),
        )
        .await;
        assert_eq!(missing.unwrap_err(), StatusCode::NOT_FOUND);
    }
}
