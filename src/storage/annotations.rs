use super::backend::StorageBackend;
use super::memory::MemoryBackend;
use super::types::{now_ms, Highlights, Identified, Note, Notes, Section, StorageError};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

/// Namespace used when none is configured.
pub const DEFAULT_PREFIX: &str = "verse";

/// Typed access to per-user annotations on top of a [`StorageBackend`].
#[derive(Clone)]
pub struct AnnotationStore {
    backend: Arc<dyn StorageBackend>,
    prefix: String,
}

impl AnnotationStore {
    pub fn new(backend: Arc<dyn StorageBackend>, prefix: &str) -> Self {
        Self {
            backend,
            prefix: prefix.to_string(),
        }
    }

    pub fn in_memory(prefix: &str) -> Self {
        Self::new(Arc::new(MemoryBackend::new()), prefix)
    }

    /// `"{prefix}:{section}:{userId}"`.
    pub fn storage_key(&self, user_id: &str, section: Section) -> String {
        format!("{}:{}:{}", self.prefix, section, user_id)
    }

    /// Key of a seen-list restricted to one scope (a book id, say).
    ///
    /// `"{prefix}:seen_items/{scope}:{userId}"`, with `%` and `:` escaped in the scope so
    /// the first `:` after the section always separates scope from user.
    pub fn scoped_seen_key(&self, user_id: &str, scope: &str) -> String {
        let scope = scope.replace('%', "%25").replace(':', "%3A");
        format!("{}:{}/{}:{}", self.prefix, Section::SeenItems, scope, user_id)
    }

    /// Reads and decodes a section, reporting corrupt data as [`StorageError::Parse`].
    pub fn try_load<T>(&self, user_id: &str, section: Section) -> Result<T, StorageError>
    where
        T: DeserializeOwned + Default,
    {
        self.try_load_key(&self.storage_key(user_id, section))
    }

    /// Reads a section, falling back to an empty collection on any failure.
    ///
    /// Only for reads. Read-modify-write paths go through [`Self::load_for_update`], so a
    /// transient I/O failure can never be written back as an empty collection.
    pub fn load<T>(&self, user_id: &str, section: Section) -> T
    where
        T: DeserializeOwned + Default,
    {
        self.try_load(user_id, section).unwrap_or_else(|err| {
            tracing::warn!("Resetting {} for user {}: {}", section, user_id, err);
            T::default()
        })
    }

    pub fn save<T>(&self, user_id: &str, section: Section, value: &T) -> Result<(), StorageError>
    where
        T: Serialize,
    {
        self.save_key(&self.storage_key(user_id, section), value)
    }

    pub fn clear_section(&self, user_id: &str, section: Section) -> Result<(), StorageError> {
        self.backend.remove(&self.storage_key(user_id, section))
    }

    /// Removes every section of `user_id`, scoped seen-lists included.
    pub fn clear_user(&self, user_id: &str) -> Result<(), StorageError> {
        for section in Section::ALL {
            self.clear_section(user_id, section)?;
        }

        let scoped_prefix = format!("{}:{}/", self.prefix, Section::SeenItems);
        for key in self.backend.keys()? {
            let owner = key
                .strip_prefix(&scoped_prefix)
                .and_then(|rest| rest.split_once(':'))
                .map(|(_, owner)| owner);
            if owner == Some(user_id) {
                self.backend.remove(&key)?;
            }
        }
        Ok(())
    }

    pub fn highlights(&self, user_id: &str) -> Highlights {
        self.load(user_id, Section::Highlights)
    }

    /// Sets (or recolors) the highlight on a verse and returns all highlights.
    pub fn set_highlight(
        &self,
        user_id: &str,
        verse_id: &str,
        color: &str,
    ) -> Result<Highlights, StorageError> {
        let key = self.storage_key(user_id, Section::Highlights);
        let mut highlights: Highlights = self.load_for_update(&key)?;
        highlights.insert(verse_id.to_string(), color.to_string());
        self.save_key(&key, &highlights)?;
        Ok(highlights)
    }

    /// Returns `false` when the verse was not highlighted.
    pub fn remove_highlight(&self, user_id: &str, verse_id: &str) -> Result<bool, StorageError> {
        let key = self.storage_key(user_id, Section::Highlights);
        let mut highlights: Highlights = self.load_for_update(&key)?;
        if highlights.remove(verse_id).is_none() {
            return Ok(false);
        }
        self.save_key(&key, &highlights)?;
        Ok(true)
    }

    pub fn notes(&self, user_id: &str) -> Notes {
        self.load(user_id, Section::Notes)
    }

    pub fn set_note(&self, user_id: &str, verse_id: &str, text: &str) -> Result<Note, StorageError> {
        let key = self.storage_key(user_id, Section::Notes);
        let mut notes: Notes = self.load_for_update(&key)?;
        let note = Note {
            text: text.to_string(),
            updated_at: now_ms(),
        };
        notes.insert(verse_id.to_string(), note.clone());
        self.save_key(&key, &notes)?;
        Ok(note)
    }

    /// Returns `false` when the verse had no note.
    pub fn remove_note(&self, user_id: &str, verse_id: &str) -> Result<bool, StorageError> {
        let key = self.storage_key(user_id, Section::Notes);
        let mut notes: Notes = self.load_for_update(&key)?;
        if notes.remove(verse_id).is_none() {
            return Ok(false);
        }
        self.save_key(&key, &notes)?;
        Ok(true)
    }

    pub fn seen(&self, user_id: &str) -> Vec<String> {
        self.load(user_id, Section::SeenItems)
    }

    /// The seen-list kept for `scope` only.
    pub fn seen_in(&self, user_id: &str, scope: &str) -> Vec<String> {
        let key = self.scoped_seen_key(user_id, scope);
        self.try_load_key(&key).unwrap_or_else(|err| {
            tracing::warn!("Resetting {} for user {}: {}", key, user_id, err);
            Vec::new()
        })
    }

    /// Picks a uniformly random item the user has not been given in the current cycle.
    pub fn pick_next_unseen<'a, T>(
        &self,
        user_id: &str,
        items: &'a [T],
    ) -> Result<Option<&'a T>, StorageError>
    where
        T: Identified,
    {
        self.pick_next_unseen_with(user_id, items, &mut rand::thread_rng())
    }

    /// [`pick_next_unseen`](Self::pick_next_unseen) with a caller-supplied RNG.
    ///
    /// Once every item has been returned, the pick is drawn from the full set and the
    /// seen-list restarts with only that item, so the cycle never stalls.
    pub fn pick_next_unseen_with<'a, T, R>(
        &self,
        user_id: &str,
        items: &'a [T],
        rng: &mut R,
    ) -> Result<Option<&'a T>, StorageError>
    where
        T: Identified,
        R: Rng + ?Sized,
    {
        let key = self.storage_key(user_id, Section::SeenItems);
        self.pick_from_cycle(&key, items, rng)
    }

    /// Like [`pick_next_unseen`](Self::pick_next_unseen), but cycles through a seen-list
    /// of its own, so exhausting one scope leaves the progress of others untouched.
    pub fn pick_next_unseen_in<'a, T>(
        &self,
        user_id: &str,
        scope: &str,
        items: &'a [T],
    ) -> Result<Option<&'a T>, StorageError>
    where
        T: Identified,
    {
        self.pick_next_unseen_in_with(user_id, scope, items, &mut rand::thread_rng())
    }

    pub fn pick_next_unseen_in_with<'a, T, R>(
        &self,
        user_id: &str,
        scope: &str,
        items: &'a [T],
        rng: &mut R,
    ) -> Result<Option<&'a T>, StorageError>
    where
        T: Identified,
        R: Rng + ?Sized,
    {
        let key = self.scoped_seen_key(user_id, scope);
        self.pick_from_cycle(&key, items, rng)
    }

    fn pick_from_cycle<'a, T, R>(
        &self,
        key: &str,
        items: &'a [T],
        rng: &mut R,
    ) -> Result<Option<&'a T>, StorageError>
    where
        T: Identified,
        R: Rng + ?Sized,
    {
        if items.is_empty() {
            return Ok(None);
        }

        let mut seen: Vec<String> = self.load_for_update(key)?;
        let seen_ids: HashSet<&str> = seen.iter().map(String::as_str).collect();
        let unseen: Vec<&T> = items
            .iter()
            .filter(|item| !seen_ids.contains(item.item_id()))
            .collect();

        let picked = match unseen.choose(rng) {
            Some(&item) => {
                seen.push(item.item_id().to_string());
                item
            }
            None => {
                let Some(item) = items.choose(rng) else {
                    return Ok(None);
                };
                tracing::debug!("Every item under {} seen, restarting cycle", key);
                seen = vec![item.item_id().to_string()];
                item
            }
        };

        self.save_key(key, &seen)?;
        Ok(Some(picked))
    }

    fn try_load_key<T>(&self, key: &str) -> Result<T, StorageError>
    where
        T: DeserializeOwned + Default,
    {
        match self.backend.get(key)? {
            Some(raw) => serde_json::from_str(&raw).map_err(StorageError::Parse),
            None => Ok(T::default()),
        }
    }

    /// Corrupt data restarts from the default; backend failures propagate untouched.
    fn load_for_update<T>(&self, key: &str) -> Result<T, StorageError>
    where
        T: DeserializeOwned + Default,
    {
        match self.try_load_key(key) {
            Err(StorageError::Parse(err)) => {
                tracing::warn!("Overwriting corrupt data under {}: {}", key, err);
                Ok(T::default())
            }
            other => other,
        }
    }

    fn save_key<T>(&self, key: &str, value: &T) -> Result<(), StorageError>
    where
        T: Serialize,
    {
        let encoded = serde_json::to_string(value).map_err(StorageError::Encode)?;
        self.backend.set(key, encoded)
    }
}

impl std::fmt::Debug for AnnotationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotationStore")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}
