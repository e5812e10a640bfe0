//! Item records.

use serde::{Deserialize, Serialize};

use crate::id::ItemId;

/// A stored item.
///
/// `description` is always serialized, as `null` when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Repository-assigned identifier.
    pub id: ItemId,
    /// Display name. Never empty.
    pub name: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Unit price. Not constrained to be positive.
    pub price: f64,
}

impl Item {
    /// Builds an item from a draft and the identifier the repository assigned.
    #[must_use]
    pub fn from_draft(id: ItemId, draft: ItemDraft) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            price: draft.price,
        }
    }

    /// Replaces every field except `id` with the draft's values.
    pub fn replace_with(&mut self, draft: ItemDraft) {
        self.name = draft.name;
        self.description = draft.description;
        self.price = draft.price;
    }
}

/// The caller-controlled fields of an item.
///
/// Used both as the candidate for creation and as the full replacement on
/// update. It has no `id` field, so a caller-supplied identifier can never
/// reach the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDraft {
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Unit price.
    pub price: f64,
}

impl ItemDraft {
    /// Creates a draft.
    #[must_use]
    pub fn new(name: impl Into<String>, description: Option<&str>, price: f64) -> Self {
        Self {
            name: name.into(),
            description: description.map(ToString::to_string),
            price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_serializes_null_description() {
        let item = Item::from_draft(ItemId::new(3), ItemDraft::new("Cup", None, 2.5));
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"id": 3, "name": "Cup", "description": null, "price": 2.5})
        );
    }

    #[test]
    fn test_replace_with_keeps_id() {
        let mut item = Item::from_draft(ItemId::new(9), ItemDraft::new("Old", Some("d"), 1.0));
        item.replace_with(ItemDraft::new("New", None, 4.0));

        assert_eq!(item.id, ItemId::new(9));
        assert_eq!(item.name, "New");
        assert_eq!(item.description, None);
        assert!((item.price - 4.0).abs() < f64::EPSILON);
    }
}
