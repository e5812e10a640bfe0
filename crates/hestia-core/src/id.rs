//! Item identifiers and their generator.

use serde::{Deserialize, Serialize};

/// Identifier of a stored item.
///
/// Identifiers are assigned by the repository when an item is created and
/// are never reassigned to a different item, even after deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(u64);

impl ItemId {
    /// Wraps a raw identifier value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw identifier value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ItemId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<ItemId> for u64 {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

/// Produces a strictly increasing sequence of [`ItemId`]s starting at 1.
///
/// # Example
///
/// ```
/// use hestia_core::IdGenerator;
///
/// let mut ids = IdGenerator::new();
/// assert_eq!(ids.next_id().get(), 1);
/// assert_eq!(ids.next_id().get(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    /// First identifier handed out by a fresh generator.
    pub const FIRST: u64 = 1;

    /// Creates a generator whose first identifier is [`IdGenerator::FIRST`].
    #[must_use]
    pub const fn new() -> Self {
        Self { next: Self::FIRST }
    }

    /// Returns the next identifier and advances the counter.
    ///
    /// # Panics
    ///
    /// Panics if the 64-bit identifier space is exhausted.
    pub fn next_id(&mut self) -> ItemId {
        let id = ItemId(self.next);
        self.next = self
            .next
            .checked_add(1)
            .expect("item id space exhausted");
        id
    }

    /// Returns the identifier the next call to [`next_id`](Self::next_id) will produce.
    #[must_use]
    pub const fn peek(&self) -> ItemId {
        ItemId(self.next)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_generator_starts_at_one() {
        let mut ids = IdGenerator::new();
        assert_eq!(ids.next_id(), ItemId::new(1));
    }

    #[test]
    fn test_generator_peek_does_not_advance() {
        let mut ids = IdGenerator::default();
        assert_eq!(ids.peek().get(), 1);
        assert_eq!(ids.peek().get(), 1);
        ids.next_id();
        assert_eq!(ids.peek().get(), 2);
    }

    #[test]
    fn test_item_id_display_and_serde() {
        let id = ItemId::from(42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");

        let parsed: ItemId = serde_json::from_str("7").unwrap();
        assert_eq!(u64::from(parsed), 7);
    }

    proptest! {
        #[test]
        fn test_ids_strictly_increase(count in 1usize..500) {
            let mut ids = IdGenerator::new();
            let mut previous = None;
            for _ in 0..count {
                let id = ids.next_id();
                if let Some(prev) = previous {
                    prop_assert!(id > prev);
                }
                previous = Some(id);
            }
            prop_assert_eq!(previous.map(ItemId::get), Some(count as u64));
        }
    }
}
