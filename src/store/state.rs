use crate::{
    domain::{Board, BoardId, Card, CardId, List, ListId},
    interaction::Modal,
};
use std::{collections::HashMap, sync::Arc};

/// Load state of one in-memory collection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadStatus {
    #[default]
    Unloaded,
    Loading,
    Loaded,
    /// Last load failed; the previous contents are still served
    Error(String),
}

/// Addresses one in-memory collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Boards,
    Lists(BoardId),
    Cards(ListId),
}

/// Immutable view of the whole store.
///
/// Collections sit behind `Arc`s, so cloning a snapshot is cheap and a
/// clone never observes later commits. Mutation replaces whole
/// collections and keeps the id -> parent indexes in step.
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    boards: Arc<Vec<Board>>,
    lists: Arc<HashMap<BoardId, Vec<List>>>,
    cards: Arc<HashMap<ListId, Vec<Card>>>,
    list_owner: Arc<HashMap<ListId, BoardId>>,
    card_owner: Arc<HashMap<CardId, ListId>>,
    statuses: Arc<HashMap<Collection, LoadStatus>>,
    error: Option<String>,
    modal: Option<Modal>,
}

impl StoreSnapshot {
    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    pub fn board(&self, id: BoardId) -> Option<&Board> {
        self.boards.iter().find(|board| board.id == id)
    }

    /// Lists of a board in position order; empty when not loaded
    pub fn lists(&self, board_id: BoardId) -> &[List] {
        self.lists.get(&board_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn list(&self, id: ListId) -> Option<&List> {
        let board_id = self.list_owner.get(&id)?;
        self.lists(*board_id).iter().find(|list| list.id == id)
    }

    /// Cards of a list in position order; empty when not loaded
    pub fn cards(&self, list_id: ListId) -> &[Card] {
        self.cards.get(&list_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        let list_id = self.card_owner.get(&id)?;
        self.cards(*list_id).iter().find(|card| card.id == id)
    }

    pub fn board_of_list(&self, id: ListId) -> Option<BoardId> {
        self.list_owner.get(&id).copied()
    }

    pub fn list_of_card(&self, id: CardId) -> Option<ListId> {
        self.card_owner.get(&id).copied()
    }

    pub fn status(&self, collection: Collection) -> LoadStatus {
        self.statuses.get(&collection).cloned().unwrap_or_default()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    pub(crate) fn set_status(&mut self, collection: Collection, status: LoadStatus) {
        Arc::make_mut(&mut self.statuses).insert(collection, status);
    }

    pub(crate) fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    pub(crate) fn set_modal(&mut self, modal: Option<Modal>) {
        self.modal = modal;
    }

    /// Replaces the board collection, dropping lists and cards of boards that disappeared
    pub(crate) fn replace_boards(&mut self, boards: Vec<Board>) {
        let removed: Vec<BoardId> = self
            .boards
            .iter()
            .map(|board| board.id)
            .filter(|id| !boards.iter().any(|board| board.id == *id))
            .collect();

        self.boards = Arc::new(boards);
        for board_id in removed {
            self.replace_lists(board_id, Vec::new());
            Arc::make_mut(&mut self.lists).remove(&board_id);
            Arc::make_mut(&mut self.statuses).remove(&Collection::Lists(board_id));
        }
    }

    /// Replaces the lists of one board, dropping cards of lists that disappeared
    pub(crate) fn replace_lists(&mut self, board_id: BoardId, lists: Vec<List>) {
        let previous: Vec<ListId> = self.lists(board_id).iter().map(|list| list.id).collect();

        let owners = Arc::make_mut(&mut self.list_owner);
        for id in &previous {
            if owners.get(id) == Some(&board_id) {
                owners.remove(id);
            }
        }
        for list in &lists {
            owners.insert(list.id, board_id);
        }

        let removed: Vec<ListId> = previous
            .into_iter()
            .filter(|id| !lists.iter().any(|list| list.id == *id))
            .collect();

        Arc::make_mut(&mut self.lists).insert(board_id, lists);
        for list_id in removed {
            self.drop_cards(list_id);
        }
    }

    /// Forgets a list's cards entirely, including their index entries and load status
    pub(crate) fn drop_cards(&mut self, list_id: ListId) {
        self.replace_cards(list_id, Vec::new());
        Arc::make_mut(&mut self.cards).remove(&list_id);
        Arc::make_mut(&mut self.statuses).remove(&Collection::Cards(list_id));
    }

    pub(crate) fn replace_cards(&mut self, list_id: ListId, cards: Vec<Card>) {
        let owners = Arc::make_mut(&mut self.card_owner);
        for card in self.cards.get(&list_id).into_iter().flatten() {
            // A card moved here by an earlier replace already points elsewhere
            if owners.get(&card.id) == Some(&list_id) {
                owners.remove(&card.id);
            }
        }
        for card in &cards {
            owners.insert(card.id, list_id);
        }

        Arc::make_mut(&mut self.cards).insert(list_id, cards);
    }
}
