//! Editor state machine for manual schedule adjustments.
//!
//! [`EditorState`] is only changed through [`transition`] (or the consuming
//! [`EditorState::apply`]), so any state can be rebuilt from its initial value
//! and the list of events applied to it.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::debug;
use serde::{Deserialize, Serialize};

use super::dirty::is_dirty;
use crate::models::{
    Assignment, AssignmentMap, Schedule, ShiftId, ShiftTemplate, Student, StudentId,
};
use crate::scheduler::is_student_available;
use crate::services::assignments::{flatten_assignments, group_by_shift};

/// Events accepted by the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EditorEvent {
    /// Add a student to a shift. No-op if already there.
    AssignStudent {
        shift_id: ShiftId,
        student_id: StudentId,
    },
    /// Remove a student from a shift. No-op if absent.
    UnassignStudent {
        shift_id: ShiftId,
        student_id: StudentId,
    },
    /// Move a student between shifts. Rejected as a no-op when the student is
    /// already on the destination shift.
    MoveStudent {
        from_shift_id: ShiftId,
        to_shift_id: ShiftId,
        student_id: StudentId,
    },
    /// Install a solver result wholesale and clear the generating flag.
    ReplaceWithGenerated { assignments: AssignmentMap },
    SetGenerating { is_generating: bool },
    SetSaving { is_saving: bool },
    /// Adopt the working map as the new baseline.
    MarkSaved,
}

/// Full editor state after some sequence of events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditorState {
    assignments: AssignmentMap,
    baseline: AssignmentMap,
    included_student_ids: Vec<StudentId>,
    is_dirty: bool,
    is_generating: bool,
    is_saving: bool,
}

/// Pure transition function: the state after applying `event` to `state`.
pub fn transition(state: &EditorState, event: EditorEvent) -> EditorState {
    state.clone().apply(event)
}

/// Apply `events` in order, starting from `initial`.
pub fn replay(initial: EditorState, events: impl IntoIterator<Item = EditorEvent>) -> EditorState {
    events.into_iter().fold(initial, EditorState::apply)
}

impl EditorState {
    /// Start a session whose baseline is `baseline`.
    pub fn new(baseline: AssignmentMap, included_student_ids: Vec<StudentId>) -> Self {
        Self {
            assignments: baseline.clone(),
            baseline,
            included_student_ids,
            is_dirty: false,
            is_generating: false,
            is_saving: false,
        }
    }

    pub fn from_assignments(assignments: &[Assignment], included_student_ids: Vec<StudentId>) -> Self {
        Self::new(group_by_shift(assignments), included_student_ids)
    }

    pub fn from_schedule(schedule: &Schedule, included_student_ids: Vec<StudentId>) -> Self {
        Self::from_assignments(&schedule.assignments, included_student_ids)
    }

    /// Consume the state and return the state after `event`.
    pub fn apply(mut self, event: EditorEvent) -> Self {
        match event {
            EditorEvent::AssignStudent { shift_id, student_id } => {
                let list = self.assignments.entry(shift_id).or_default();
                if list.contains(&student_id) {
                    debug!("assign ignored: {} already staffed", student_id);
                    return self;
                }
                list.push(student_id);
                self.refresh_dirty();
            }
            EditorEvent::UnassignStudent { shift_id, student_id } => {
                let Some(list) = self.assignments.get_mut(&shift_id) else {
                    return self;
                };
                let before = list.len();
                list.retain(|id| id != &student_id);
                if list.len() != before {
                    self.refresh_dirty();
                }
            }
            EditorEvent::MoveStudent {
                from_shift_id,
                to_shift_id,
                student_id,
            } => {
                let already_there = self
                    .assignments
                    .get(&to_shift_id)
                    .is_some_and(|list| list.contains(&student_id));
                if already_there {
                    debug!(
                        "move rejected: {} already on shift {}",
                        student_id, to_shift_id
                    );
                    return self;
                }
                if let Some(from) = self.assignments.get_mut(&from_shift_id) {
                    from.retain(|id| id != &student_id);
                }
                self.assignments
                    .entry(to_shift_id)
                    .or_default()
                    .push(student_id);
                self.refresh_dirty();
            }
            EditorEvent::ReplaceWithGenerated { assignments } => {
                self.assignments = assignments;
                self.is_generating = false;
                self.refresh_dirty();
            }
            EditorEvent::SetGenerating { is_generating } => {
                self.is_generating = is_generating;
            }
            EditorEvent::SetSaving { is_saving } => {
                self.is_saving = is_saving;
            }
            EditorEvent::MarkSaved => {
                self.baseline = self.assignments.clone();
                self.is_dirty = false;
                self.is_saving = false;
            }
        }
        self
    }

    fn refresh_dirty(&mut self) {
        self.is_dirty = is_dirty(&self.assignments, &self.baseline);
    }

    pub fn assignments(&self) -> &AssignmentMap {
        &self.assignments
    }

    pub fn baseline(&self) -> &AssignmentMap {
        &self.baseline
    }

    pub fn included_student_ids(&self) -> &[StudentId] {
        &self.included_student_ids
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    pub fn is_generating(&self) -> bool {
        self.is_generating
    }

    pub fn is_saving(&self) -> bool {
        self.is_saving
    }

    /// Students currently on `shift_id`, in insertion order.
    pub fn students_on(&self, shift_id: &ShiftId) -> &[StudentId] {
        self.assignments
            .get(shift_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn assigned_student_ids(&self) -> BTreeSet<&StudentId> {
        self.assignments.values().flatten().collect()
    }

    /// Students from `students` not placed on any shift.
    pub fn unassigned_students<'a>(&self, students: &'a [Student]) -> Vec<&'a Student> {
        let assigned = self.assigned_student_ids();
        students
            .iter()
            .filter(|s| !assigned.contains(&s.id))
            .collect()
    }

    pub fn assignment_count(&self) -> usize {
        self.assignments.values().map(Vec::len).sum()
    }

    /// Weekly hours per student implied by the working map. Shifts missing
    /// from `shifts` contribute nothing.
    pub fn student_hours(&self, shifts: &[ShiftTemplate]) -> BTreeMap<StudentId, f64> {
        let by_id: HashMap<&ShiftId, &ShiftTemplate> = shifts.iter().map(|s| (&s.id, s)).collect();
        let mut hours = BTreeMap::new();
        for (shift_id, students) in &self.assignments {
            let Some(shift) = by_id.get(shift_id) else {
                continue;
            };
            for student_id in students {
                *hours.entry(student_id.clone()).or_insert(0.0) += shift.duration_hours();
            }
        }
        hours
    }

    /// Flat assignment records to hand to the host for persistence.
    pub fn save_payload(&self, shifts: &[ShiftTemplate]) -> Vec<Assignment> {
        flatten_assignments(&self.assignments, shifts)
    }

    /// Constraint problems in the working map. Manual edits are never blocked;
    /// callers surface these to the operator.
    pub fn violations(&self, shifts: &[ShiftTemplate], students: &[Student]) -> Vec<EditViolation> {
        let shift_by_id: HashMap<&ShiftId, &ShiftTemplate> = shifts.iter().map(|s| (&s.id, s)).collect();
        let student_by_id: HashMap<&StudentId, &Student> = students.iter().map(|s| (&s.id, s)).collect();
        let mut violations = Vec::new();

        for (shift_id, assigned) in &self.assignments {
            let Some(shift) = shift_by_id.get(shift_id) else {
                if !assigned.is_empty() {
                    violations.push(EditViolation::UnknownShift {
                        shift_id: shift_id.clone(),
                    });
                }
                continue;
            };
            if let Some(max_staff) = shift.max_staff {
                if assigned.len() as u32 > max_staff {
                    violations.push(EditViolation::OverStaffed {
                        shift_id: shift_id.clone(),
                        assigned: assigned.len() as u32,
                        max_staff,
                    });
                }
            }
            for student_id in assigned {
                let available = student_by_id
                    .get(student_id)
                    .is_some_and(|student| is_student_available(student, shift));
                if !available {
                    violations.push(EditViolation::Unavailable {
                        shift_id: shift_id.clone(),
                        student_id: student_id.clone(),
                    });
                }
            }
        }

        let hours = self.student_hours(shifts);
        for student in students {
            let worked = hours.get(&student.id).copied().unwrap_or(0.0);
            if let Some(max) = student.max_weekly_hours {
                if worked > max {
                    violations.push(EditViolation::OverMaxHours {
                        student_id: student.id.clone(),
                        assigned_hours: worked,
                        max_weekly_hours: max,
                    });
                }
            }
            if worked < student.min_weekly_hours {
                violations.push(EditViolation::UnderMinHours {
                    student_id: student.id.clone(),
                    assigned_hours: worked,
                    min_weekly_hours: student.min_weekly_hours,
                });
            }
        }

        violations
    }
}

/// A constraint the working map currently breaks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EditViolation {
    /// Student is not available for every hour of the shift (or is unknown).
    Unavailable {
        shift_id: ShiftId,
        student_id: StudentId,
    },
    OverMaxHours {
        student_id: StudentId,
        assigned_hours: f64,
        max_weekly_hours: f64,
    },
    UnderMinHours {
        student_id: StudentId,
        assigned_hours: f64,
        min_weekly_hours: f64,
    },
    OverStaffed {
        shift_id: ShiftId,
        assigned: u32,
        max_staff: u32,
    },
    /// Students placed on a shift id with no template.
    UnknownShift { shift_id: ShiftId },
}
