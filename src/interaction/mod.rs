pub mod drag;
pub mod modal;

pub use drag::{apply_intent, dispatch_drop, resolve_drop, DragKind, DropEvent, DropTarget, Intent};
pub use modal::{DeleteTarget, Modal};
