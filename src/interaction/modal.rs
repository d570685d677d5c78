use crate::domain::{BoardId, CardId, ListId};

/// Entity a delete confirmation refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteTarget {
    Board(BoardId),
    List(ListId),
    Card(CardId),
}

/// The modal currently shown, carrying only what each kind needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modal {
    CreateBoard,
    EditBoard { board_id: BoardId },
    CreateList { board_id: BoardId },
    EditList { list_id: ListId },
    CreateCard { list_id: ListId },
    EditCard { card_id: CardId },
    ConfirmDelete(DeleteTarget),
}

impl Modal {
    pub fn title(&self) -> &'static str {
        match self {
            Self::CreateBoard => "Create board",
            Self::EditBoard { .. } => "Edit board",
            Self::CreateList { .. } => "Add list",
            Self::EditList { .. } => "Edit list",
            Self::CreateCard { .. } => "Add card",
            Self::EditCard { .. } => "Edit card",
            Self::ConfirmDelete(DeleteTarget::Board(_)) => "Delete board",
            Self::ConfirmDelete(DeleteTarget::List(_)) => "Delete list",
            Self::ConfirmDelete(DeleteTarget::Card(_)) => "Delete card",
        }
    }
}
