//! Availability predicate shared by the solver and the editor's advisories.

use crate::models::{Availability, ShiftTemplate, Student};

/// Returns true if `availability` lists every whole hour the shift spans on the
/// shift's day. A day with no availability data is never available.
pub fn is_available(availability: &Availability, shift: &ShiftTemplate) -> bool {
    availability.covers(shift.day_of_week, shift.covered_hours())
}

pub fn is_student_available(student: &Student, shift: &ShiftTemplate) -> bool {
    is_available(&student.availability, shift)
}
