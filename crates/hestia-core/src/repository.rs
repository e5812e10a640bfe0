//! In-memory item repository.
//!
//! [`ItemRepository`] is the single owner of item state. It keeps items in
//! an insertion-ordered map, so listing is deterministic: updates keep an
//! item's position and deletes preserve the relative order of the rest.
//!
//! All operations take one lock for their whole duration and never await
//! while holding it, so the repository can be shared across request tasks
//! behind an `Arc`. An optional count observer runs under that same lock
//! after every create and delete, so the counts it sees arrive in order.

use indexmap::IndexMap;
use parking_lot::Mutex;
use thiserror::Error;

use crate::id::{IdGenerator, ItemId};
use crate::item::{Item, ItemDraft};

/// Result type alias for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors returned by [`ItemRepository`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// No item is stored under the identifier.
    #[error("item {0} not found")]
    NotFound(ItemId),
}

#[derive(Debug, Default)]
struct RepositoryState {
    ids: IdGenerator,
    items: IndexMap<ItemId, Item>,
}

/// Ordered, thread-safe in-memory store of items.
///
/// # Example
///
/// ```
/// use hestia_core::{ItemDraft, ItemRepository, RepositoryError};
///
/// let repo = ItemRepository::new();
/// let a = repo.create(ItemDraft::new("A", None, 1.0));
/// let b = repo.create(ItemDraft::new("B", None, 2.0));
///
/// repo.delete(a.id).unwrap();
/// assert_eq!(repo.list(), vec![b]);
/// assert_eq!(repo.get(a.id), Err(RepositoryError::NotFound(a.id)));
/// ```
#[derive(Default)]
pub struct ItemRepository {
    state: Mutex<RepositoryState>,
    count_observer: Option<CountObserver>,
}

type CountObserver = Box<dyn Fn(usize) + Send + Sync>;

impl std::fmt::Debug for ItemRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemRepository")
            .field("state", &self.state)
            .field("count_observer", &self.count_observer.is_some())
            .finish()
    }
}

impl ItemRepository {
    /// Creates an empty repository whose first item will get id 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls `observer` with the new item count after every create and
    /// delete, while the repository lock is still held.
    ///
    /// The observer must not call back into the repository.
    #[must_use]
    pub fn with_count_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.count_observer = Some(Box::new(observer));
        self
    }

    fn notify_count(&self, state: &RepositoryState) {
        if let Some(observer) = &self.count_observer {
            observer(state.items.len());
        }
    }

    /// Stores a new item under a freshly generated identifier.
    pub fn create(&self, draft: ItemDraft) -> Item {
        let mut state = self.state.lock();
        let id = state.ids.next_id();
        let item = Item::from_draft(id, draft);
        state.items.insert(id, item.clone());
        self.notify_count(&state);
        tracing::debug!(item_id = %id, "item created");
        item
    }

    /// Returns every stored item in insertion order.
    #[must_use]
    pub fn list(&self) -> Vec<Item> {
        self.state.lock().items.values().cloned().collect()
    }

    /// Returns the item stored under `id`.
    pub fn get(&self, id: ItemId) -> RepositoryResult<Item> {
        self.state
            .lock()
            .items
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound(id))
    }

    /// Replaces every field of the item under `id` except the id itself.
    pub fn update(&self, id: ItemId, draft: ItemDraft) -> RepositoryResult<Item> {
        let mut state = self.state.lock();
        let item = state
            .items
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound(id))?;
        item.replace_with(draft);
        tracing::debug!(item_id = %id, "item updated");
        Ok(item.clone())
    }

    /// Removes the item under `id`. Its identifier is never handed out again.
    pub fn delete(&self, id: ItemId) -> RepositoryResult<()> {
        let mut state = self.state.lock();
        state
            .items
            .shift_remove(&id)
            .ok_or(RepositoryError::NotFound(id))?;
        self.notify_count(&state);
        tracing::debug!(item_id = %id, "item deleted");
        Ok(())
    }

    /// Returns the number of stored items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    /// Returns `true` if no items are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }
}
