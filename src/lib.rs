//! # Boardwalk Core
//!
//! State, ordering and persistence for a task board of boards, lists and
//! cards with drag-and-drop reordering.
//!
//! The crate knows nothing about rendering. A UI reads [`StoreSnapshot`]s
//! from a [`BoardStore`] and sends user intents back through its
//! operations or through [`interaction::dispatch_drop`].

pub mod config;
pub mod domain;
pub mod error;
pub mod interaction;
pub mod storage;
pub mod store;

// Re-export commonly used types
pub use config::{Limits, StoreConfig};
pub use domain::{
    board::{Board, BoardColor, BoardPatch, NewBoard},
    card::{Card, CardPatch, NewCard},
    id::{BoardId, CardId, ListId},
    list::{List, ListPatch},
};
pub use error::{BoardwalkError, Result};
pub use storage::{MemoryStorage, Storage};
pub use store::{BoardStore, Collection, LoadStatus, StoreSnapshot};
