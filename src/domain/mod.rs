pub mod board;
pub mod card;
pub mod id;
pub mod list;
pub mod ordering;
pub mod sorting;

pub use board::{Board, BoardColor, BoardPatch, NewBoard};
pub use card::{Card, CardPatch, NewCard};
pub use id::{BoardId, CardId, ListId};
pub use list::{List, ListPatch};
pub use ordering::{move_across, renumber, reorder, Nested, Positioned};
pub use sorting::{sort_boards, SortField, SortOrder};
