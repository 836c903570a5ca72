//! Manual schedule editing: the assignment state machine, its dirty check and
//! the drag-and-drop protocol that feeds it.

pub mod dirty;
pub mod drag;
pub mod state;

pub use dirty::is_dirty;
pub use drag::{decode, encode, resolve_drop, DragSource, DragToken, DropTarget};
pub use state::{replay, transition, EditViolation, EditorEvent, EditorState};
