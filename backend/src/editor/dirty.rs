//! Order-independent comparison of two assignment maps.

use crate::models::{AssignmentMap, StudentId};

/// True when any shift present in either map is staffed by a different set of
/// students. List order is ignored and a missing shift equals an empty one.
pub fn is_dirty(current: &AssignmentMap, baseline: &AssignmentMap) -> bool {
    current
        .keys()
        .chain(baseline.keys())
        .any(|shift_id| {
            let a = current.get(shift_id).map(Vec::as_slice).unwrap_or_default();
            let b = baseline.get(shift_id).map(Vec::as_slice).unwrap_or_default();
            !same_members(a, b)
        })
}

fn same_members(a: &[StudentId], b: &[StudentId]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a: Vec<&StudentId> = a.iter().collect();
    let mut b: Vec<&StudentId> = b.iter().collect();
    a.sort_unstable();
    b.sort_unstable();
    a == b
}
