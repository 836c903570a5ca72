//! Conversions between flat assignment records and the shift-keyed map.

use std::collections::HashMap;

use log::warn;

use crate::models::{Assignment, AssignmentMap, ShiftId, ShiftTemplate};

/// Group flat records by shift, keeping record order within each shift and
/// dropping repeated (shift, student) pairs.
pub fn group_by_shift(assignments: &[Assignment]) -> AssignmentMap {
    let mut map = AssignmentMap::new();
    for assignment in assignments {
        let list = map.entry(assignment.shift_id.clone()).or_default();
        if !list.contains(&assignment.student_id) {
            list.push(assignment.student_id.clone());
        }
    }
    map
}

/// Expand a shift-keyed map into flat records using each template's day and
/// window. Shifts without a template are skipped.
pub fn flatten_assignments(map: &AssignmentMap, shifts: &[ShiftTemplate]) -> Vec<Assignment> {
    let by_id: HashMap<&ShiftId, &ShiftTemplate> = shifts.iter().map(|s| (&s.id, s)).collect();

    let mut out = Vec::with_capacity(map.values().map(Vec::len).sum());
    for (shift_id, students) in map {
        let Some(shift) = by_id.get(shift_id) else {
            if !students.is_empty() {
                warn!(
                    "skipping {} assignment(s) for unknown shift {}",
                    students.len(),
                    shift_id
                );
            }
            continue;
        };
        out.extend(
            students
                .iter()
                .map(|student_id| Assignment::from_template(student_id.clone(), shift)),
        );
    }
    out
}
