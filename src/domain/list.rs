use crate::domain::{
    id::{BoardId, ListId},
    ordering::{Nested, Positioned},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Partial update for a list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPatch {
    pub title: Option<String>,
}

/// Ordered container of cards within a board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    pub id: ListId,
    pub title: String,
    pub board_id: BoardId,
    pub position: usize,
    pub created_at: DateTime<Utc>,
}

impl List {
    pub fn new(board_id: BoardId, title: &str, position: usize) -> Self {
        Self {
            id: ListId::new(),
            title: title.trim().to_string(),
            board_id,
            position,
            created_at: Utc::now(),
        }
    }

    /// Lists carry no update timestamp, so a patch only touches the title
    pub fn patched(&self, patch: &ListPatch) -> Self {
        let mut list = self.clone();
        if let Some(title) = &patch.title {
            list.title = title.trim().to_string();
        }
        list
    }
}

impl Positioned for List {
    fn position(&self) -> usize {
        self.position
    }

    fn set_position(&mut self, position: usize) {
        self.position = position;
    }
}

impl Nested for List {
    const KIND: &'static str = "List";
    type Id = ListId;
    type ParentId = BoardId;

    fn id(&self) -> ListId {
        self.id
    }

    fn parent_id(&self) -> BoardId {
        self.board_id
    }

    fn set_parent_id(&mut self, parent: BoardId) {
        self.board_id = parent;
    }
}
