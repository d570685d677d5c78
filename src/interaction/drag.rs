//! Turns raw drag-end events into store operations.
//!
//! The UI reports ids only. Whether a drop stays inside one collection is
//! decided here from those ids, and again by the store itself.

use crate::{
    domain::{BoardId, CardId, ListId},
    error::{BoardwalkError, Result},
    storage::Storage,
    store::{BoardStore, StoreSnapshot},
};
use uuid::Uuid;

/// What is being dragged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    List,
    Card,
}

/// Where the element was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// Onto the slot of an existing sibling
    Item { id: Uuid, parent: Uuid },
    /// Past the last element of `parent`
    End { parent: Uuid },
}

impl DropTarget {
    pub fn parent(&self) -> Uuid {
        match self {
            Self::Item { parent, .. } | Self::End { parent } => *parent,
        }
    }
}

/// A completed drag as reported by the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropEvent {
    pub kind: DragKind,
    pub id: Uuid,
    pub origin_parent: Uuid,
    pub target: DropTarget,
}

/// A classified drop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    ReorderLists {
        board_id: BoardId,
        from: usize,
        to: usize,
    },
    ReorderCards {
        list_id: ListId,
        from: usize,
        to: usize,
    },
    MoveCard {
        card_id: CardId,
        source: ListId,
        dest: ListId,
        dest_index: usize,
    },
}

/// Classifies a drop against the current state.
///
/// `Ok(None)` means the element would land where it already is.
pub fn resolve_drop(snapshot: &StoreSnapshot, event: &DropEvent) -> Result<Option<Intent>> {
    match event.kind {
        DragKind::List => resolve_list_drop(snapshot, event),
        DragKind::Card => resolve_card_drop(snapshot, event),
    }
}

fn resolve_list_drop(snapshot: &StoreSnapshot, event: &DropEvent) -> Result<Option<Intent>> {
    let board_id = BoardId::from_uuid(event.origin_parent);
    let list_id = ListId::from_uuid(event.id);
    if event.target.parent() != event.origin_parent {
        return Err(BoardwalkError::Validation(
            "lists cannot be moved to another board".to_string(),
        ));
    }

    let lists = snapshot.lists(board_id);
    let from = lists
        .iter()
        .position(|list| list.id == list_id)
        .ok_or_else(|| BoardwalkError::not_found("List", list_id))?;
    let to = match event.target {
        DropTarget::Item { id, .. } => {
            let target = ListId::from_uuid(id);
            lists
                .iter()
                .position(|list| list.id == target)
                .ok_or_else(|| BoardwalkError::not_found("List", target))?
        }
        DropTarget::End { .. } => lists.len() - 1,
    };

    Ok((from != to).then_some(Intent::ReorderLists { board_id, from, to }))
}

fn resolve_card_drop(snapshot: &StoreSnapshot, event: &DropEvent) -> Result<Option<Intent>> {
    let card_id = CardId::from_uuid(event.id);
    let source = ListId::from_uuid(event.origin_parent);
    let dest = ListId::from_uuid(event.target.parent());

    let source_cards = snapshot.cards(source);
    let from = source_cards
        .iter()
        .position(|card| card.id == card_id)
        .ok_or_else(|| BoardwalkError::not_found("Card", card_id))?;

    if snapshot.list(dest).is_none() {
        return Err(BoardwalkError::not_found("List", dest));
    }
    let dest_cards = snapshot.cards(dest);
    let index_in_dest = match event.target {
        DropTarget::Item { id, .. } => {
            let target = CardId::from_uuid(id);
            dest_cards
                .iter()
                .position(|card| card.id == target)
                .ok_or_else(|| BoardwalkError::not_found("Card", target))?
        }
        // The destination may not be loaded yet; the store clamps after loading it
        DropTarget::End { .. } => usize::MAX,
    };

    if source == dest {
        let to = index_in_dest.min(source_cards.len() - 1);
        return Ok((from != to).then_some(Intent::ReorderCards {
            list_id: source,
            from,
            to,
        }));
    }

    Ok(Some(Intent::MoveCard {
        card_id,
        source,
        dest,
        dest_index: index_in_dest,
    }))
}

/// Applies a classified drop to the store
pub async fn apply_intent<S: Storage>(store: &BoardStore<S>, intent: Intent) -> Result<()> {
    match intent {
        Intent::ReorderLists { board_id, from, to } => {
            store.reorder_lists_in_board(board_id, from, to).await
        }
        Intent::ReorderCards { list_id, from, to } => {
            store.reorder_cards_in_list(list_id, from, to).await
        }
        Intent::MoveCard {
            card_id,
            source,
            dest,
            dest_index,
        } => store.move_card(card_id, source, dest, dest_index).await,
    }
}

/// Resolves a drop against the store's current state and applies it
pub async fn dispatch_drop<S: Storage>(store: &BoardStore<S>, event: &DropEvent) -> Result<()> {
    let resolved = resolve_drop(&store.snapshot(), event);
    match store.record("drop", resolved)? {
        Some(intent) => {
            log::debug!("[boardwalk.interaction.drag] {:?}", intent);
            apply_intent(store, intent).await
        }
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Board, Card, List, NewBoard, NewCard};

    struct Fixture {
        snapshot: StoreSnapshot,
        board: Board,
        l1: List,
        l2: List,
        cards: Vec<Card>,
    }

    /// L1 holds X, Y; L2 holds Z
    fn fixture() -> Fixture {
        let board = Board::new(NewBoard::new("Backlog"));
        let l1 = List::new(board.id, "L1", 0);
        let l2 = List::new(board.id, "L2", 1);
        let x = Card::new(l1.id, NewCard::new("X"), 0);
        let y = Card::new(l1.id, NewCard::new("Y"), 1);
        let z = Card::new(l2.id, NewCard::new("Z"), 0);

        let mut snapshot = StoreSnapshot::default();
        snapshot.replace_boards(vec![board.clone()]);
        snapshot.replace_lists(board.id, vec![l1.clone(), l2.clone()]);
        snapshot.replace_cards(l1.id, vec![x.clone(), y.clone()]);
        snapshot.replace_cards(l2.id, vec![z.clone()]);

        Fixture {
            snapshot,
            board,
            l1,
            l2,
            cards: vec![x, y, z],
        }
    }

    fn card_drop(card: &Card, target: DropTarget) -> DropEvent {
        DropEvent {
            kind: DragKind::Card,
            id: *card.id.as_uuid(),
            origin_parent: *card.list_id.as_uuid(),
            target,
        }
    }

    #[test]
    fn test_list_drop_onto_sibling_reorders() {
        let f = fixture();
        let event = DropEvent {
            kind: DragKind::List,
            id: *f.l1.id.as_uuid(),
            origin_parent: *f.board.id.as_uuid(),
            target: DropTarget::End {
                parent: *f.board.id.as_uuid(),
            },
        };

        let intent = resolve_drop(&f.snapshot, &event).unwrap();
        assert_eq!(
            intent,
            Some(Intent::ReorderLists {
                board_id: f.board.id,
                from: 0,
                to: 1
            })
        );
    }

    #[test]
    fn test_list_drop_on_itself_is_noop() {
        let f = fixture();
        let event = DropEvent {
            kind: DragKind::List,
            id: *f.l2.id.as_uuid(),
            origin_parent: *f.board.id.as_uuid(),
            target: DropTarget::Item {
                id: *f.l2.id.as_uuid(),
                parent: *f.board.id.as_uuid(),
            },
        };

        assert_eq!(resolve_drop(&f.snapshot, &event).unwrap(), None);
    }

    #[test]
    fn test_list_drop_on_other_board_is_rejected() {
        let f = fixture();
        let event = DropEvent {
            kind: DragKind::List,
            id: *f.l1.id.as_uuid(),
            origin_parent: *f.board.id.as_uuid(),
            target: DropTarget::End {
                parent: Uuid::new_v4(),
            },
        };

        let err = resolve_drop(&f.snapshot, &event).unwrap_err();
        assert!(matches!(err, BoardwalkError::Validation(_)));
    }

    #[test]
    fn test_card_drop_in_same_list_is_reorder() {
        let f = fixture();
        let (x, y) = (&f.cards[0], &f.cards[1]);
        let event = card_drop(
            x,
            DropTarget::Item {
                id: *y.id.as_uuid(),
                parent: *f.l1.id.as_uuid(),
            },
        );

        assert_eq!(
            resolve_drop(&f.snapshot, &event).unwrap(),
            Some(Intent::ReorderCards {
                list_id: f.l1.id,
                from: 0,
                to: 1
            })
        );
    }

    #[test]
    fn test_card_drop_at_end_of_own_list_when_already_last() {
        let f = fixture();
        let y = &f.cards[1];
        let event = card_drop(
            y,
            DropTarget::End {
                parent: *f.l1.id.as_uuid(),
            },
        );

        assert_eq!(resolve_drop(&f.snapshot, &event).unwrap(), None);
    }

    #[test]
    fn test_card_drop_on_other_list_is_move() {
        let f = fixture();
        let (x, z) = (&f.cards[0], &f.cards[2]);
        let event = card_drop(
            x,
            DropTarget::Item {
                id: *z.id.as_uuid(),
                parent: *f.l2.id.as_uuid(),
            },
        );

        assert_eq!(
            resolve_drop(&f.snapshot, &event).unwrap(),
            Some(Intent::MoveCard {
                card_id: x.id,
                source: f.l1.id,
                dest: f.l2.id,
                dest_index: 0
            })
        );
    }

    #[test]
    fn test_card_drop_at_end_of_other_list() {
        let f = fixture();
        let x = &f.cards[0];
        let event = card_drop(
            x,
            DropTarget::End {
                parent: *f.l2.id.as_uuid(),
            },
        );

        let intent = resolve_drop(&f.snapshot, &event).unwrap();
        assert!(matches!(
            intent,
            Some(Intent::MoveCard {
                dest_index: usize::MAX,
                ..
            })
        ));
    }

    #[test]
    fn test_card_drop_with_wrong_origin_is_not_found() {
        let f = fixture();
        let z = &f.cards[2];
        let event = DropEvent {
            kind: DragKind::Card,
            id: *z.id.as_uuid(),
            origin_parent: *f.l1.id.as_uuid(),
            target: DropTarget::End {
                parent: *f.l1.id.as_uuid(),
            },
        };

        let err = resolve_drop(&f.snapshot, &event).unwrap_err();
        assert!(matches!(err, BoardwalkError::NotFound { kind: "Card", .. }));
    }
}
