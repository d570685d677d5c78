use crate::domain::{
    id::{CardId, ListId},
    ordering::{Nested, Positioned},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fields a caller supplies when creating a card
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCard {
    pub title: String,
    pub description: String,
}

impl NewCard {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Partial update for a card
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardPatch {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Leaf task unit within a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub list_id: ListId,
    pub position: usize,
    pub created_at: DateTime<Utc>,
    /// Absent until the first edit or move
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Card {
    pub fn new(list_id: ListId, data: NewCard, position: usize) -> Self {
        Self {
            id: CardId::new(),
            title: data.title.trim().to_string(),
            description: data.description,
            list_id,
            position,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn patched(&self, patch: &CardPatch) -> Self {
        let mut card = self.clone();
        if let Some(title) = &patch.title {
            card.title = title.trim().to_string();
        }
        if let Some(description) = &patch.description {
            card.description = description.clone();
        }
        card.touch();
        card
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

impl Positioned for Card {
    fn position(&self) -> usize {
        self.position
    }

    fn set_position(&mut self, position: usize) {
        self.position = position;
    }
}

impl Nested for Card {
    const KIND: &'static str = "Card";
    type Id = CardId;
    type ParentId = ListId;

    fn id(&self) -> CardId {
        self.id
    }

    fn parent_id(&self) -> ListId {
        self.list_id
    }

    fn set_parent_id(&mut self, parent: ListId) {
        self.list_id = parent;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_creation() {
        let list_id = ListId::new();
        let card = Card::new(list_id, NewCard::new("Write docs").with_description("API"), 0);

        assert_eq!(card.list_id, list_id);
        assert_eq!(card.description, "API");
        assert!(card.updated_at.is_none());
    }

    #[test]
    fn test_reparenting_through_nested() {
        let (from, to) = (ListId::new(), ListId::new());
        let mut card = Card::new(from, NewCard::new("A"), 0);
        assert_eq!(card.parent_id(), from);

        card.set_parent_id(to);
        assert_eq!(card.parent_id(), to);
        assert_eq!(card.list_id, to);
    }

    #[test]
    fn test_patch_merges_fields() {
        let card = Card::new(ListId::new(), NewCard::new("A"), 0);
        let patched = card.patched(&CardPatch {
            title: Some("B".to_string()),
            description: None,
        });

        assert_eq!(patched.title, "B");
        assert_eq!(patched.description, card.description);
        assert_eq!(patched.created_at, card.created_at);
        assert!(patched.updated_at.is_some());
    }

    #[test]
    fn test_card_serialization_round_trip_keeps_precision() {
        let mut card = Card::new(ListId::new(), NewCard::new("A"), 2);
        card.touch();

        let json = serde_json::to_string(&card).unwrap();
        let restored: Card = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, card);
    }

    #[test]
    fn test_never_updated_card_has_no_update_timestamp() {
        let json = r#"{
            "id": "0b6f3d4c-2c3a-4f7e-9a61-2f5d3c1b8e90",
            "title": "Imported",
            "list_id": "5a1e0c9d-7b2f-4e3a-8c6d-1f0e9d8c7b6a",
            "position": 0,
            "created_at": "2024-03-01T12:30:45.123456789Z"
        }"#;

        let card: Card = serde_json::from_str(json).unwrap();
        assert!(card.updated_at.is_none());
        assert_eq!(card.created_at.timestamp_subsec_nanos(), 123_456_789);
    }
}
