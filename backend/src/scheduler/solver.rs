//! Greedy shift assignment.
//!
//! Shifts are filled neediest first (highest `min_staff`, then shift id). For each
//! shift the eligible students are those available for every hour it spans and
//! whose weekly total would stay within their cap; they are taken in order of
//! fewest minutes assigned so far (then student id) until the shift reaches its
//! fill target. Shifts that cannot reach `min_staff` are left short and reported
//! in [`SolveResult::unfilled`].

use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use serde::{Deserialize, Serialize};

use super::availability::is_student_available;
use crate::models::{AssignmentMap, ShiftId, ShiftTemplate, Student, StudentId};

/// How many students the solver places on each shift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillPolicy {
    /// Stop at `min_staff`, leaving headroom for manual top-up.
    #[default]
    Minimum,
    /// Keep going up to `max_staff` (or `min_staff` when uncapped).
    Maximum,
}

impl FillPolicy {
    /// Number of students to place on `shift`. Never exceeds `max_staff`.
    pub fn target(&self, shift: &ShiftTemplate) -> u32 {
        match (self, shift.max_staff) {
            (FillPolicy::Minimum, Some(max)) => shift.min_staff.min(max),
            (FillPolicy::Minimum, None) => shift.min_staff,
            (FillPolicy::Maximum, Some(max)) => max,
            (FillPolicy::Maximum, None) => shift.min_staff,
        }
    }
}

/// A shift the solver could not staff to its minimum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftShortfall {
    pub shift_id: ShiftId,
    pub required: u32,
    pub assigned: u32,
}

/// Output of one solver run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveResult {
    /// Every input shift id, mapped to the students placed on it (possibly none).
    pub assignments: AssignmentMap,
    /// Shifts left below `min_staff`, in the order they were processed.
    pub unfilled: Vec<ShiftShortfall>,
    /// Weekly minutes assigned to each candidate, including those left at zero.
    pub assigned_minutes: BTreeMap<StudentId, u32>,
}

impl SolveResult {
    pub fn is_fully_staffed(&self) -> bool {
        self.unfilled.is_empty()
    }

    pub fn assignment_count(&self) -> usize {
        self.assignments.values().map(Vec::len).sum()
    }
}

/// Deterministic greedy solver.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedySolver {
    policy: FillPolicy,
}

impl GreedySolver {
    pub fn new(policy: FillPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> FillPolicy {
        self.policy
    }

    /// Assign `students` to `shifts`.
    ///
    /// Input is assumed validated (see `validate_shift_templates`). Identical
    /// input, including ordering, always produces identical output.
    pub fn solve(&self, shifts: &[ShiftTemplate], students: &[Student]) -> SolveResult {
        let mut order: Vec<&ShiftTemplate> = shifts.iter().collect();
        order.sort_by(|a, b| b.min_staff.cmp(&a.min_staff).then_with(|| a.id.cmp(&b.id)));

        // A student listed more than once is one candidate; the first entry wins.
        let mut seen = BTreeSet::new();
        let candidates: Vec<&Student> = students
            .iter()
            .filter(|student| seen.insert(&student.id))
            .collect();

        // Indexed by position in `candidates`.
        let mut load = vec![0u32; candidates.len()];
        let mut result = SolveResult::default();

        for shift in order {
            let duration = shift.duration_minutes();

            let mut eligible: Vec<usize> = candidates
                .iter()
                .enumerate()
                .filter(|(i, student)| {
                    is_student_available(student, shift)
                        && student.fits_within_cap(load[*i] + duration)
                })
                .map(|(i, _)| i)
                .collect();
            eligible.sort_by(|&a, &b| {
                load[a]
                    .cmp(&load[b])
                    .then_with(|| candidates[a].id.cmp(&candidates[b].id))
            });

            let target = self.policy.target(shift) as usize;
            let chosen: Vec<StudentId> = eligible
                .into_iter()
                .take(target)
                .map(|i| {
                    load[i] += duration;
                    candidates[i].id.clone()
                })
                .collect();

            debug!(
                "shift {} ({} {}-{}): placed {}/{} (min {})",
                shift.id,
                shift.day_of_week,
                shift.start_time,
                shift.end_time,
                chosen.len(),
                target,
                shift.min_staff
            );

            let assigned = chosen.len() as u32;
            if assigned < shift.min_staff {
                result.unfilled.push(ShiftShortfall {
                    shift_id: shift.id.clone(),
                    required: shift.min_staff,
                    assigned,
                });
            }
            result.assignments.insert(shift.id.clone(), chosen);
        }

        for (student, minutes) in candidates.iter().zip(load) {
            result.assigned_minutes.insert(student.id.clone(), minutes);
        }

        if !result.unfilled.is_empty() {
            debug!("{} shift(s) left below min_staff", result.unfilled.len());
        }
        result
    }
}

/// Run the solver with the default (fill-to-minimum) policy and return only the
/// mapping.
pub fn auto_generate(shifts: &[ShiftTemplate], students: &[Student]) -> AssignmentMap {
    GreedySolver::default().solve(shifts, students).assignments
}
