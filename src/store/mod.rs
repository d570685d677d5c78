//! The in-memory authoritative board state.
//!
//! Every mutation is persist-first: the new collection is computed from a
//! snapshot, written to storage, and only committed to memory once the
//! write succeeded. A failed operation leaves memory untouched and puts its
//! message in the error slot.

mod state;

pub use state::{Collection, LoadStatus, StoreSnapshot};

use crate::{
    config::{Limits, StoreConfig},
    domain::{
        move_across, renumber, reorder, sort_boards, Board, BoardId, BoardPatch, Card, CardId,
        CardPatch, List, ListId, ListPatch, NewBoard, NewCard, Positioned, SortField, SortOrder,
    },
    error::{BoardwalkError, Result},
    interaction::{DeleteTarget, Modal},
    storage::{persistence::encode, CollectionKeys, Persistence, Storage},
};
use std::sync::{PoisonError, RwLock};

/// Owns the board state and the persistence adapter behind it.
///
/// Construct one at startup and pass it to whatever needs it. Operations
/// take `&self`; the state is swapped whole under a short lock that is
/// never held across an await.
pub struct BoardStore<S> {
    persistence: Persistence<S>,
    limits: Limits,
    state: RwLock<StoreSnapshot>,
}

impl<S: Storage> BoardStore<S> {
    pub fn new(storage: S, config: StoreConfig) -> Self {
        Self {
            persistence: Persistence::new(storage, CollectionKeys::with_prefix(&config.key_prefix)),
            limits: config.limits,
            state: RwLock::new(StoreSnapshot::default()),
        }
    }

    pub fn with_defaults(storage: S) -> Self {
        Self::new(storage, StoreConfig::default())
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    /// Consistent view of the current state
    pub fn snapshot(&self) -> StoreSnapshot {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn boards(&self) -> Vec<Board> {
        self.snapshot().boards().to_vec()
    }

    pub fn board(&self, id: BoardId) -> Option<Board> {
        self.snapshot().board(id).cloned()
    }

    pub fn lists(&self, board_id: BoardId) -> Vec<List> {
        self.snapshot().lists(board_id).to_vec()
    }

    pub fn list(&self, id: ListId) -> Option<List> {
        self.snapshot().list(id).cloned()
    }

    pub fn cards(&self, list_id: ListId) -> Vec<Card> {
        self.snapshot().cards(list_id).to_vec()
    }

    pub fn card(&self, id: CardId) -> Option<Card> {
        self.snapshot().card(id).cloned()
    }

    pub fn status(&self, collection: Collection) -> LoadStatus {
        self.snapshot().status(collection)
    }

    /// Message of the most recent failure, if any
    pub fn last_error(&self) -> Option<String> {
        self.snapshot().error().map(str::to_string)
    }

    pub fn clear_error(&self) {
        self.commit(|state| state.set_error(None));
    }

    /// Boards ordered for the overview page
    pub fn sorted_boards(&self, field: SortField, order: SortOrder) -> Vec<Board> {
        let mut boards = self.boards();
        sort_boards(&mut boards, field, order);
        boards
    }

    pub fn active_modal(&self) -> Option<Modal> {
        self.snapshot().modal().cloned()
    }

    /// Opens a modal after checking the entity it refers to exists
    pub fn open_modal(&self, modal: Modal) -> Result<()> {
        let snapshot = self.snapshot();
        let check = match &modal {
            Modal::CreateBoard => Ok(()),
            Modal::EditBoard { board_id }
            | Modal::CreateList { board_id }
            | Modal::ConfirmDelete(DeleteTarget::Board(board_id)) => {
                require(snapshot.board(*board_id), "Board", board_id).map(drop)
            }
            Modal::EditList { list_id }
            | Modal::CreateCard { list_id }
            | Modal::ConfirmDelete(DeleteTarget::List(list_id)) => {
                require(snapshot.list(*list_id), "List", list_id).map(drop)
            }
            Modal::EditCard { card_id } | Modal::ConfirmDelete(DeleteTarget::Card(card_id)) => {
                require(snapshot.card(*card_id), "Card", card_id).map(drop)
            }
        };
        let result = check.map(|()| self.commit(|state| state.set_modal(Some(modal))));
        self.record("open_modal", result)
    }

    pub fn close_modal(&self) {
        self.commit(|state| state.set_modal(None));
    }

    // ---------------------------------------------------------------------
    // Loading
    // ---------------------------------------------------------------------

    /// Reloads all boards. On failure the previous boards stay in place.
    pub async fn load_boards(&self) -> Result<()> {
        self.begin();
        let result = self.fetch_boards().await;
        self.record("load_boards", result)
    }

    pub async fn load_lists(&self, board_id: BoardId) -> Result<()> {
        self.begin();
        let result = self.fetch_lists(board_id).await;
        self.record("load_lists", result)
    }

    pub async fn load_cards(&self, list_id: ListId) -> Result<()> {
        self.begin();
        let result = self.fetch_cards(list_id).await;
        self.record("load_cards", result)
    }

    async fn fetch_boards(&self) -> Result<()> {
        let collection = Collection::Boards;
        self.commit(|state| state.set_status(collection, LoadStatus::Loading));
        match self.persistence.try_load_boards().await {
            Ok(boards) => {
                log::info!("[boardwalk.store.load] Loaded {} boards", boards.len());
                self.commit(|state| {
                    state.replace_boards(boards);
                    state.set_status(collection, LoadStatus::Loaded);
                });
                Ok(())
            }
            Err(e) => self.load_failed(collection, e),
        }
    }

    async fn fetch_lists(&self, board_id: BoardId) -> Result<()> {
        let collection = Collection::Lists(board_id);
        self.commit(|state| state.set_status(collection, LoadStatus::Loading));
        match self.persistence.try_load_lists().await {
            Ok(mut all) => {
                let lists = in_position_order(all.remove(&board_id).unwrap_or_default());
                self.commit(|state| {
                    state.replace_lists(board_id, lists);
                    state.set_status(collection, LoadStatus::Loaded);
                });
                Ok(())
            }
            Err(e) => self.load_failed(collection, e),
        }
    }

    async fn fetch_cards(&self, list_id: ListId) -> Result<()> {
        let collection = Collection::Cards(list_id);
        self.commit(|state| state.set_status(collection, LoadStatus::Loading));
        match self.persistence.try_load_cards().await {
            Ok(mut all) => {
                let cards = in_position_order(all.remove(&list_id).unwrap_or_default());
                self.commit(|state| {
                    state.replace_cards(list_id, cards);
                    state.set_status(collection, LoadStatus::Loaded);
                });
                Ok(())
            }
            Err(e) => self.load_failed(collection, e),
        }
    }

    fn load_failed(&self, collection: Collection, e: BoardwalkError) -> Result<()> {
        let message = e.to_string();
        self.commit(|state| state.set_status(collection, LoadStatus::Error(message)));
        Err(e)
    }

    /// Loads a collection before appending to it, so unseen durable rows survive
    async fn ensure_loaded(&self, collection: Collection) -> Result<()> {
        if self.status(collection) == LoadStatus::Loaded {
            return Ok(());
        }
        match collection {
            Collection::Boards => self.fetch_boards().await,
            Collection::Lists(board_id) => self.fetch_lists(board_id).await,
            Collection::Cards(list_id) => self.fetch_cards(list_id).await,
        }
    }

    // ---------------------------------------------------------------------
    // Boards
    // ---------------------------------------------------------------------

    pub async fn create_board(&self, data: NewBoard) -> Result<Board> {
        self.begin();
        let result = self.try_create_board(data).await;
        self.record("create_board", result)
    }

    async fn try_create_board(&self, data: NewBoard) -> Result<Board> {
        self.limits
            .check_title("Board", &data.title, self.limits.max_board_title)?;
        self.limits.check_description(&data.description)?;
        self.ensure_loaded(Collection::Boards).await?;

        let board = Board::new(data);
        let mut boards = self.snapshot().boards().to_vec();
        boards.push(board.clone());

        self.persistence.save_boards(&boards).await?;
        self.commit(|state| state.replace_boards(boards));
        Ok(board)
    }

    pub async fn update_board(&self, id: BoardId, patch: BoardPatch) -> Result<Board> {
        self.begin();
        let result = self.try_update_board(id, patch).await;
        self.record("update_board", result)
    }

    async fn try_update_board(&self, id: BoardId, patch: BoardPatch) -> Result<Board> {
        if let Some(title) = &patch.title {
            self.limits
                .check_title("Board", title, self.limits.max_board_title)?;
        }
        if let Some(description) = &patch.description {
            self.limits.check_description(description)?;
        }

        let snapshot = self.snapshot();
        let updated = require(snapshot.board(id), "Board", id)?.patched(&patch);
        let boards: Vec<Board> = snapshot
            .boards()
            .iter()
            .map(|board| {
                if board.id == id {
                    updated.clone()
                } else {
                    board.clone()
                }
            })
            .collect();

        self.persistence.save_boards(&boards).await?;
        self.commit(|state| state.replace_boards(boards));
        Ok(updated)
    }

    /// Deletes a board together with its lists and their cards
    pub async fn delete_board(&self, id: BoardId) -> Result<()> {
        self.begin();
        let result = self.try_delete_board(id).await;
        self.record("delete_board", result)
    }

    async fn try_delete_board(&self, id: BoardId) -> Result<()> {
        let snapshot = self.snapshot();
        require(snapshot.board(id), "Board", id)?;
        let boards: Vec<Board> = snapshot
            .boards()
            .iter()
            .filter(|board| board.id != id)
            .cloned()
            .collect();

        // Durable lists may include some this session never loaded
        let mut all_lists = self.persistence.try_load_lists().await?;
        let mut all_cards = self.persistence.try_load_cards().await?;
        let mut doomed: Vec<ListId> = snapshot.lists(id).iter().map(|list| list.id).collect();
        for list in all_lists.remove(&id).unwrap_or_default() {
            if !doomed.contains(&list.id) {
                doomed.push(list.id);
            }
        }
        let card_count: usize = doomed
            .iter()
            .filter_map(|list_id| all_cards.remove(list_id))
            .map(|cards| cards.len())
            .sum();

        let keys = self.persistence.keys();
        // Parent first: an interrupted sequential batch leaves orphans, not gaps
        let ops = [
            encode(&keys.boards, &boards)?,
            encode(&keys.lists, &all_lists)?,
            encode(&keys.cards, &all_cards)?,
        ];
        self.persistence.commit(&ops).await?;

        log::info!(
            "[boardwalk.store.delete] Deleted board {} with {} lists and {} cards",
            id,
            doomed.len(),
            card_count
        );
        // Cards may be loaded for lists whose board never had its lists loaded
        self.commit(|state| {
            state.replace_boards(boards);
            for list_id in &doomed {
                state.drop_cards(*list_id);
            }
        });
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Lists
    // ---------------------------------------------------------------------

    /// Appends a new list to the end of a board
    pub async fn create_list(&self, board_id: BoardId, title: &str) -> Result<List> {
        self.begin();
        let result = self.try_create_list(board_id, title).await;
        self.record("create_list", result)
    }

    async fn try_create_list(&self, board_id: BoardId, title: &str) -> Result<List> {
        self.limits
            .check_title("List", title, self.limits.max_list_title)?;
        self.ensure_loaded(Collection::Boards).await?;
        require(self.snapshot().board(board_id), "Board", board_id)?;
        self.ensure_loaded(Collection::Lists(board_id)).await?;

        let mut lists = self.snapshot().lists(board_id).to_vec();
        let list = List::new(board_id, title, lists.len());
        lists.push(list.clone());

        self.persist_lists(board_id, &lists).await?;
        self.commit(|state| state.replace_lists(board_id, lists));
        Ok(list)
    }

    pub async fn update_list(&self, id: ListId, patch: ListPatch) -> Result<List> {
        self.begin();
        let result = self.try_update_list(id, patch).await;
        self.record("update_list", result)
    }

    async fn try_update_list(&self, id: ListId, patch: ListPatch) -> Result<List> {
        if let Some(title) = &patch.title {
            self.limits
                .check_title("List", title, self.limits.max_list_title)?;
        }

        let snapshot = self.snapshot();
        let updated = require(snapshot.list(id), "List", id)?.patched(&patch);
        let board_id = updated.board_id;
        let lists: Vec<List> = snapshot
            .lists(board_id)
            .iter()
            .map(|list| {
                if list.id == id {
                    updated.clone()
                } else {
                    list.clone()
                }
            })
            .collect();

        self.persist_lists(board_id, &lists).await?;
        self.commit(|state| state.replace_lists(board_id, lists));
        Ok(updated)
    }

    /// Deletes a list and its cards, closing the gap in the board's positions
    pub async fn delete_list(&self, id: ListId) -> Result<()> {
        self.begin();
        let result = self.try_delete_list(id).await;
        self.record("delete_list", result)
    }

    async fn try_delete_list(&self, id: ListId) -> Result<()> {
        let snapshot = self.snapshot();
        let board_id = require(snapshot.list(id), "List", id)?.board_id;
        let lists = renumber(
            snapshot
                .lists(board_id)
                .iter()
                .filter(|list| list.id != id)
                .cloned()
                .collect(),
        );

        let mut all_lists = self.persistence.try_load_lists().await?;
        let mut all_cards = self.persistence.try_load_cards().await?;
        all_lists.insert(board_id, lists.clone());
        let card_count = all_cards.remove(&id).map(|cards| cards.len()).unwrap_or(0);

        let keys = self.persistence.keys();
        let ops = [
            encode(&keys.lists, &all_lists)?,
            encode(&keys.cards, &all_cards)?,
        ];
        self.persistence.commit(&ops).await?;

        log::info!(
            "[boardwalk.store.delete] Deleted list {} with {} cards",
            id,
            card_count
        );
        self.commit(|state| state.replace_lists(board_id, lists));
        Ok(())
    }

    pub async fn reorder_lists_in_board(
        &self,
        board_id: BoardId,
        from_index: usize,
        to_index: usize,
    ) -> Result<()> {
        self.begin();
        let result = self.try_reorder_lists(board_id, from_index, to_index).await;
        self.record("reorder_lists", result)
    }

    async fn try_reorder_lists(&self, board_id: BoardId, from: usize, to: usize) -> Result<()> {
        let snapshot = self.snapshot();
        require(snapshot.board(board_id), "Board", board_id)?;
        let current = snapshot.lists(board_id);
        let Some(to) = checked_move(current.len(), from, to)? else {
            return Ok(());
        };

        let lists = renumber(reorder(current, from, to));
        log::debug!(
            "[boardwalk.store.reorder] Board {}: list {} -> {}",
            board_id,
            from,
            to
        );
        self.persist_lists(board_id, &lists).await?;
        self.commit(|state| state.replace_lists(board_id, lists));
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Cards
    // ---------------------------------------------------------------------

    /// Appends a new card to the end of a list
    pub async fn create_card(&self, list_id: ListId, data: NewCard) -> Result<Card> {
        self.begin();
        let result = self.try_create_card(list_id, data).await;
        self.record("create_card", result)
    }

    async fn try_create_card(&self, list_id: ListId, data: NewCard) -> Result<Card> {
        self.limits
            .check_title("Card", &data.title, self.limits.max_card_title)?;
        self.limits.check_description(&data.description)?;
        require(self.snapshot().list(list_id), "List", list_id)?;
        self.ensure_loaded(Collection::Cards(list_id)).await?;

        let mut cards = self.snapshot().cards(list_id).to_vec();
        let card = Card::new(list_id, data, cards.len());
        cards.push(card.clone());

        self.persist_cards(&[(list_id, &cards)]).await?;
        self.commit(|state| state.replace_cards(list_id, cards));
        Ok(card)
    }

    pub async fn update_card(&self, id: CardId, patch: CardPatch) -> Result<Card> {
        self.begin();
        let result = self.try_update_card(id, patch).await;
        self.record("update_card", result)
    }

    async fn try_update_card(&self, id: CardId, patch: CardPatch) -> Result<Card> {
        if let Some(title) = &patch.title {
            self.limits
                .check_title("Card", title, self.limits.max_card_title)?;
        }
        if let Some(description) = &patch.description {
            self.limits.check_description(description)?;
        }

        let snapshot = self.snapshot();
        let updated = require(snapshot.card(id), "Card", id)?.patched(&patch);
        let list_id = updated.list_id;
        let cards: Vec<Card> = snapshot
            .cards(list_id)
            .iter()
            .map(|card| {
                if card.id == id {
                    updated.clone()
                } else {
                    card.clone()
                }
            })
            .collect();

        self.persist_cards(&[(list_id, &cards)]).await?;
        // Concurrent edits of the same list resolve last-write-wins here
        self.commit(|state| state.replace_cards(list_id, cards));
        Ok(updated)
    }

    pub async fn delete_card(&self, id: CardId) -> Result<()> {
        self.begin();
        let result = self.try_delete_card(id).await;
        self.record("delete_card", result)
    }

    async fn try_delete_card(&self, id: CardId) -> Result<()> {
        let snapshot = self.snapshot();
        let list_id = require(snapshot.card(id), "Card", id)?.list_id;
        let cards = renumber(
            snapshot
                .cards(list_id)
                .iter()
                .filter(|card| card.id != id)
                .cloned()
                .collect(),
        );

        self.persist_cards(&[(list_id, &cards)]).await?;
        self.commit(|state| state.replace_cards(list_id, cards));
        Ok(())
    }

    pub async fn reorder_cards_in_list(
        &self,
        list_id: ListId,
        from_index: usize,
        to_index: usize,
    ) -> Result<()> {
        self.begin();
        let result = self.try_reorder_cards(list_id, from_index, to_index).await;
        self.record("reorder_cards", result)
    }

    async fn try_reorder_cards(&self, list_id: ListId, from: usize, to: usize) -> Result<()> {
        let snapshot = self.snapshot();
        require(snapshot.list(list_id), "List", list_id)?;
        let current = snapshot.cards(list_id);
        let Some(to) = checked_move(current.len(), from, to)? else {
            return Ok(());
        };

        let cards = renumber(reorder(current, from, to));
        log::debug!(
            "[boardwalk.store.reorder] List {}: card {} -> {}",
            list_id,
            from,
            to
        );
        self.persist_cards(&[(list_id, &cards)]).await?;
        self.commit(|state| state.replace_cards(list_id, cards));
        Ok(())
    }

    /// Moves a card to `dest_index` of `dest_list_id`.
    ///
    /// When both ids name the same list this is a reorder within it. Both
    /// sides are renumbered and written in one write of the cards collection.
    pub async fn move_card(
        &self,
        card_id: CardId,
        source_list_id: ListId,
        dest_list_id: ListId,
        dest_index: usize,
    ) -> Result<()> {
        self.begin();
        let result = if source_list_id == dest_list_id {
            self.try_reorder_card_to(card_id, source_list_id, dest_index)
                .await
        } else {
            self.try_move_card(card_id, source_list_id, dest_list_id, dest_index)
                .await
        };
        self.record("move_card", result)
    }

    async fn try_reorder_card_to(&self, card_id: CardId, list_id: ListId, to: usize) -> Result<()> {
        let from = self
            .snapshot()
            .cards(list_id)
            .iter()
            .position(|card| card.id == card_id)
            .ok_or_else(|| BoardwalkError::not_found("Card", card_id))?;
        self.try_reorder_cards(list_id, from, to).await
    }

    async fn try_move_card(
        &self,
        card_id: CardId,
        source: ListId,
        dest: ListId,
        dest_index: usize,
    ) -> Result<()> {
        {
            let snapshot = self.snapshot();
            require(snapshot.list(source), "List", source)?;
            require(snapshot.list(dest), "List", dest)?;
        }
        self.ensure_loaded(Collection::Cards(dest)).await?;

        let snapshot = self.snapshot();
        let (source_cards, dest_cards) = move_across(
            snapshot.cards(source),
            snapshot.cards(dest),
            card_id,
            dest,
            dest_index,
        )?;
        let source_cards = renumber(source_cards);
        let mut dest_cards = renumber(dest_cards);
        let mut landed = dest_index;
        if let Some(card) = dest_cards.iter_mut().find(|card| card.id == card_id) {
            card.touch();
            landed = card.position;
        }

        log::debug!(
            "[boardwalk.store.move] Card {}: list {} -> list {} at {}",
            card_id,
            source,
            dest,
            landed
        );
        self.persist_cards(&[(source, &source_cards), (dest, &dest_cards)])
            .await?;
        self.commit(|state| {
            state.replace_cards(source, source_cards);
            state.replace_cards(dest, dest_cards);
        });
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------------

    /// Rewrites one board's entry in the durable lists collection
    async fn persist_lists(&self, board_id: BoardId, lists: &[List]) -> Result<()> {
        let mut all = self.persistence.try_load_lists().await?;
        all.insert(board_id, lists.to_vec());
        self.persistence.save_lists(&all).await
    }

    /// Rewrites the given lists' entries in the durable cards collection in one write
    async fn persist_cards(&self, entries: &[(ListId, &Vec<Card>)]) -> Result<()> {
        let mut all = self.persistence.try_load_cards().await?;
        for (list_id, cards) in entries {
            all.insert(*list_id, (*cards).clone());
        }
        self.persistence.save_cards(&all).await
    }

    fn commit(&self, apply: impl FnOnce(&mut StoreSnapshot)) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        apply(&mut state);
    }

    fn begin(&self) {
        self.clear_error();
    }

    pub(crate) fn record<T>(&self, operation: &str, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            log::warn!("[boardwalk.store.{}] {}", operation, e);
            let message = e.to_string();
            self.commit(|state| state.set_error(Some(message)));
        }
        result
    }
}

fn require<'a, T>(entity: Option<&'a T>, kind: &'static str, id: impl ToString) -> Result<&'a T> {
    entity.ok_or_else(|| BoardwalkError::not_found(kind, id))
}

/// Validates a move inside a collection of `len` elements.
///
/// Returns the clamped target, or `None` when nothing would change.
fn checked_move(len: usize, from: usize, to: usize) -> Result<Option<usize>> {
    if from >= len {
        return Err(BoardwalkError::Validation(format!(
            "index {} out of range for {} elements",
            from, len
        )));
    }
    let to = to.min(len - 1);
    Ok((from != to).then_some(to))
}

fn in_position_order<T: Positioned>(mut items: Vec<T>) -> Vec<T> {
    items.sort_by_key(|item| item.position());
    renumber(items)
}
