//! Drag-and-drop encoding for the schedule grid.
//!
//! The grid's drag library identifies draggables and drop zones by string id.
//! [`DragSource`] and [`DropTarget`] are the typed forms; [`DragToken`] is the
//! string form. Decoding never panics: malformed tokens yield `None` and the
//! caller ignores the gesture.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::state::EditorEvent;
use crate::models::{ShiftId, StudentId};

const SEPARATOR: &str = "::";
const POOL: &str = "pool";
const CELL: &str = "cell";
const SHIFT: &str = "shift";

/// Where a dragged student currently sits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DragSource {
    /// In the unassigned pool.
    Pool { student_id: StudentId },
    /// On a shift in the grid.
    Cell {
        shift_id: ShiftId,
        student_id: StudentId,
    },
}

impl DragSource {
    pub fn student_id(&self) -> &StudentId {
        match self {
            DragSource::Pool { student_id } | DragSource::Cell { student_id, .. } => student_id,
        }
    }
}

/// Where a dragged student was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DropTarget {
    Pool,
    Shift { shift_id: ShiftId },
}

/// String id handed to the drag library.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DragToken(pub String);

impl DragToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DragToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DragToken {
    fn from(value: &str) -> Self {
        DragToken(value.to_string())
    }
}

/// Encode a drag source as `pool::<student>` or `cell::<shift>::<student>`.
///
/// Ids containing `::` produce tokens that [`decode`] rejects.
pub fn encode(source: &DragSource) -> DragToken {
    let raw = match source {
        DragSource::Pool { student_id } => [POOL, student_id.as_str()].join(SEPARATOR),
        DragSource::Cell {
            shift_id,
            student_id,
        } => [CELL, shift_id.as_str(), student_id.as_str()].join(SEPARATOR),
    };
    DragToken(raw)
}

/// Decode a drag token. Unknown prefixes, empty ids and extra segments yield
/// `None`.
pub fn decode(token: &str) -> Option<DragSource> {
    let parts: Vec<&str> = token.split(SEPARATOR).collect();
    match parts.as_slice() {
        [POOL, student] if !student.is_empty() => Some(DragSource::Pool {
            student_id: StudentId::new(*student),
        }),
        [CELL, shift, student] if !shift.is_empty() && !student.is_empty() => {
            Some(DragSource::Cell {
                shift_id: ShiftId::new(*shift),
                student_id: StudentId::new(*student),
            })
        }
        _ => None,
    }
}

/// Encode a drop zone as `pool` or `shift::<shift>`.
pub fn encode_target(target: &DropTarget) -> DragToken {
    match target {
        DropTarget::Pool => DragToken(POOL.to_string()),
        DropTarget::Shift { shift_id } => DragToken([SHIFT, shift_id.as_str()].join(SEPARATOR)),
    }
}

pub fn decode_target(token: &str) -> Option<DropTarget> {
    let parts: Vec<&str> = token.split(SEPARATOR).collect();
    match parts.as_slice() {
        [POOL] => Some(DropTarget::Pool),
        [SHIFT, shift] if !shift.is_empty() => Some(DropTarget::Shift {
            shift_id: ShiftId::new(*shift),
        }),
        _ => None,
    }
}

/// Translate a completed gesture into the editor event it stands for.
///
/// Pool to shift assigns, shift to another shift moves, shift to pool
/// unassigns. Dropping back where the student came from does nothing.
pub fn resolve_drop(source: &DragSource, target: &DropTarget) -> Option<EditorEvent> {
    match (source, target) {
        (DragSource::Pool { .. }, DropTarget::Pool) => None,
        (DragSource::Pool { student_id }, DropTarget::Shift { shift_id }) => {
            Some(EditorEvent::AssignStudent {
                shift_id: shift_id.clone(),
                student_id: student_id.clone(),
            })
        }
        (
            DragSource::Cell {
                shift_id,
                student_id,
            },
            DropTarget::Pool,
        ) => Some(EditorEvent::UnassignStudent {
            shift_id: shift_id.clone(),
            student_id: student_id.clone(),
        }),
        (
            DragSource::Cell {
                shift_id: from,
                student_id,
            },
            DropTarget::Shift { shift_id: to },
        ) => {
            if from == to {
                None
            } else {
                Some(EditorEvent::MoveStudent {
                    from_shift_id: from.clone(),
                    to_shift_id: to.clone(),
                    student_id: student_id.clone(),
                })
            }
        }
    }
}

/// Decode both ends of a gesture and resolve it. Any malformed token yields
/// `None`.
pub fn resolve_drop_tokens(source: &str, target: &str) -> Option<EditorEvent> {
    resolve_drop(&decode(source)?, &decode_target(target)?)
}
