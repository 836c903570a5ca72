//! Students, shift templates, assignments and schedules.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::time::{hms, DayOfWeek, TimeOfDay};
use crate::error::{RosterError, RosterResult};
use crate::services::job_tracker::JobId;
use crate::{define_string_id, define_uuid_id};

define_string_id!(
    /// Student (helpdesk assistant) identifier.
    StudentId
);
define_string_id!(
    /// Shift template identifier.
    ShiftId
);
define_uuid_id!(
    /// Schedule identifier.
    ScheduleId
);

/// Working set of the editor and output of the solver: shift id to the ordered
/// list of students staffing it.
pub type AssignmentMap = BTreeMap<ShiftId, Vec<StudentId>>;

/// Weekly availability: day index to the set of whole hours the student can work.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Availability(BTreeMap<u8, BTreeSet<u8>>);

impl Availability {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper that replaces the hours available on `day`.
    pub fn with_hours(mut self, day: DayOfWeek, hours: impl IntoIterator<Item = u8>) -> Self {
        self.set_hours(day, hours);
        self
    }

    pub fn set_hours(&mut self, day: DayOfWeek, hours: impl IntoIterator<Item = u8>) {
        self.0.insert(day.index(), hours.into_iter().collect());
    }

    pub fn hours_on(&self, day: DayOfWeek) -> Option<&BTreeSet<u8>> {
        self.0.get(&day.index())
    }

    /// True when every hour in `hours` is listed for `day`.
    pub fn covers(&self, day: DayOfWeek, hours: Range<u8>) -> bool {
        match self.hours_on(day) {
            Some(available) => hours.into_iter().all(|h| available.contains(&h)),
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(BTreeSet::is_empty)
    }
}

/// A staffing candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    #[serde(alias = "student_id")]
    pub id: StudentId,
    #[serde(default)]
    pub availability: Availability,
    #[serde(default)]
    pub min_weekly_hours: f64,
    #[serde(default)]
    pub max_weekly_hours: Option<f64>,
}

impl Student {
    pub fn new(id: impl Into<StudentId>, availability: Availability) -> Self {
        Self {
            id: id.into(),
            availability,
            min_weekly_hours: 0.0,
            max_weekly_hours: None,
        }
    }

    pub fn with_max_hours(mut self, max_weekly_hours: f64) -> Self {
        self.max_weekly_hours = Some(max_weekly_hours);
        self
    }

    pub fn with_min_hours(mut self, min_weekly_hours: f64) -> Self {
        self.min_weekly_hours = min_weekly_hours;
        self
    }

    /// Whether `minutes` of work stay within the weekly cap. Uncapped students
    /// always fit.
    pub fn fits_within_cap(&self, minutes: u32) -> bool {
        match self.max_weekly_hours {
            Some(max) => minutes as f64 / 60.0 <= max,
            None => true,
        }
    }
}

fn default_active() -> bool {
    true
}

/// A recurring weekly staffing slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftTemplate {
    pub id: ShiftId,
    #[serde(default)]
    pub name: String,
    pub day_of_week: DayOfWeek,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub min_staff: u32,
    #[serde(default)]
    pub max_staff: Option<u32>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl ShiftTemplate {
    pub fn new(
        id: impl Into<ShiftId>,
        day_of_week: DayOfWeek,
        start_time: TimeOfDay,
        end_time: TimeOfDay,
        min_staff: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            day_of_week,
            start_time,
            end_time,
            min_staff,
            max_staff: None,
            is_active: true,
        }
    }

    pub fn with_max_staff(mut self, max_staff: u32) -> Self {
        self.max_staff = Some(max_staff);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn duration_minutes(&self) -> u32 {
        self.start_time.minutes_until(self.end_time)
    }

    pub fn duration_hours(&self) -> f64 {
        self.duration_minutes() as f64 / 60.0
    }

    /// Whole hours a student must be available for to work this shift.
    pub fn covered_hours(&self) -> Range<u8> {
        self.start_time.hours_until(self.end_time)
    }

    /// Check the window and staffing bounds.
    pub fn validate(&self) -> RosterResult<()> {
        if self.end_time <= self.start_time {
            return Err(RosterError::InvalidShiftWindow {
                shift_id: self.id.clone(),
                start: self.start_time.to_string(),
                end: self.end_time.to_string(),
            });
        }
        if let Some(max_staff) = self.max_staff {
            if self.min_staff > max_staff {
                return Err(RosterError::InvalidStaffing {
                    shift_id: self.id.clone(),
                    min_staff: self.min_staff,
                    max_staff,
                });
            }
        }
        Ok(())
    }
}

/// Validate a batch of templates before handing them to the solver.
///
/// Checks each template and rejects repeated shift ids.
pub fn validate_shift_templates(shifts: &[ShiftTemplate]) -> RosterResult<()> {
    let mut seen = BTreeSet::new();
    for shift in shifts {
        shift.validate()?;
        if !seen.insert(&shift.id) {
            return Err(RosterError::DuplicateShift(shift.id.clone()));
        }
    }
    Ok(())
}

/// One student occupying one weekly shift occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(alias = "assistant_id")]
    pub student_id: StudentId,
    pub shift_id: ShiftId,
    pub day_of_week: DayOfWeek,
    #[serde(with = "hms")]
    pub start: TimeOfDay,
    #[serde(with = "hms")]
    pub end: TimeOfDay,
}

impl Assignment {
    /// Bind `student_id` to the day and window of `shift`.
    pub fn from_template(student_id: StudentId, shift: &ShiftTemplate) -> Self {
        Self {
            student_id,
            shift_id: shift.id.clone(),
            day_of_week: shift.day_of_week,
            start: shift.start_time,
            end: shift.end_time,
        }
    }

    /// Start and end of the first occurrence on or after `effective_from`.
    pub fn first_occurrence(&self, effective_from: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
        let date = first_weekday_on_or_after(effective_from, self.day_of_week);
        (
            date.and_time(self.start.to_naive_time()),
            date.and_time(self.end.to_naive_time()),
        )
    }
}

fn first_weekday_on_or_after(from: NaiveDate, day: DayOfWeek) -> NaiveDate {
    let current = from.weekday().num_days_from_monday() as i64;
    let target = day.index() as i64;
    from + Duration::days((target - current).rem_euclid(7))
}

/// A dated instance of an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub student_id: StudentId,
    pub shift_id: ShiftId,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// A persisted (or to-be-persisted) schedule and its flat assignment list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub schedule_id: ScheduleId,
    pub title: String,
    pub is_active: bool,
    pub assignments: Vec<Assignment>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
    pub generation_id: Option<JobId>,
    pub config_id: Option<String>,
}

impl Schedule {
    /// Expand the weekly assignments into dated occurrences.
    ///
    /// Open-ended schedules expand the first week only.
    pub fn occurrences(&self) -> Vec<Occurrence> {
        let horizon = self
            .effective_to
            .unwrap_or(self.effective_from + Duration::days(6));

        let mut out = Vec::new();
        for assignment in &self.assignments {
            let (mut start, mut end) = assignment.first_occurrence(self.effective_from);
            while start.date() <= horizon {
                out.push(Occurrence {
                    student_id: assignment.student_id.clone(),
                    shift_id: assignment.shift_id.clone(),
                    start,
                    end,
                });
                start += Duration::weeks(1);
                end += Duration::weeks(1);
            }
        }
        out.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.student_id.cmp(&b.student_id)));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(h: u8, m: u8) -> TimeOfDay {
        TimeOfDay::from_hm(h, m).unwrap()
    }

    #[test]
    fn test_availability_covers() {
        let availability = Availability::new().with_hours(DayOfWeek::MONDAY, [8, 9, 10]);
        assert!(availability.covers(DayOfWeek::MONDAY, 8..11));
        assert!(!availability.covers(DayOfWeek::MONDAY, 8..12));
        assert!(!availability.covers(DayOfWeek::TUESDAY, 8..9));
    }

    #[test]
    fn test_availability_json_uses_day_keys() {
        let json = r#"{"0": [8, 9], "3": [14]}"#;
        let availability: Availability = serde_json::from_str(json).unwrap();
        assert!(availability.covers(DayOfWeek::MONDAY, 8..10));
        assert!(availability.covers(DayOfWeek::THURSDAY, 14..15));
    }

    #[test]
    fn test_student_accepts_legacy_field_names() {
        let json = r#"{"student_id": "816000001", "availability": {}, "max_weekly_hours": 12}"#;
        let student: Student = serde_json::from_str(json).unwrap();
        assert_eq!(student.id, StudentId::new("816000001"));
        assert_eq!(student.max_weekly_hours, Some(12.0));
        assert_eq!(student.min_weekly_hours, 0.0);
    }

    #[test]
    fn test_fits_within_cap() {
        let capped = Student::new("a", Availability::new()).with_max_hours(4.0);
        assert!(capped.fits_within_cap(240));
        assert!(!capped.fits_within_cap(241));
        let uncapped = Student::new("b", Availability::new());
        assert!(uncapped.fits_within_cap(u32::MAX));
    }

    #[test]
    fn test_shift_validation() {
        let ok = ShiftTemplate::new("s1", DayOfWeek::MONDAY, hm(8, 0), hm(11, 0), 2).with_max_staff(3);
        assert!(ok.validate().is_ok());
        assert_eq!(ok.duration_minutes(), 180);
        assert_eq!(ok.covered_hours(), 8..11);

        let empty = ShiftTemplate::new("s2", DayOfWeek::MONDAY, hm(11, 0), hm(11, 0), 1);
        assert!(matches!(
            empty.validate(),
            Err(RosterError::InvalidShiftWindow { .. })
        ));

        let overstaffed = ShiftTemplate::new("s3", DayOfWeek::MONDAY, hm(8, 0), hm(9, 0), 4).with_max_staff(2);
        assert!(matches!(
            overstaffed.validate(),
            Err(RosterError::InvalidStaffing { min_staff: 4, max_staff: 2, .. })
        ));
    }

    #[test]
    fn test_validate_batch_rejects_duplicates() {
        let a = ShiftTemplate::new("s1", DayOfWeek::MONDAY, hm(8, 0), hm(9, 0), 1);
        let b = ShiftTemplate::new("s2", DayOfWeek::TUESDAY, hm(8, 0), hm(9, 0), 1);
        assert!(validate_shift_templates(&[a.clone(), b]).is_ok());
        assert_eq!(
            validate_shift_templates(&[a.clone(), a]),
            Err(RosterError::DuplicateShift(ShiftId::new("s1")))
        );
    }

    #[test]
    fn test_shift_template_rejects_bad_day_on_deserialize() {
        let json = r#"{"id": "x", "day_of_week": 5, "start_time": "08:00", "end_time": "09:00", "min_staff": 1}"#;
        assert!(serde_json::from_str::<ShiftTemplate>(json).is_err());
    }

    #[test]
    fn test_assignment_wire_format() {
        let shift = ShiftTemplate::new("fri", DayOfWeek::FRIDAY, hm(13, 0), hm(15, 30), 1);
        let assignment = Assignment::from_template(StudentId::new("s1"), &shift);
        let value = serde_json::to_value(&assignment).unwrap();
        assert_eq!(value["start"], "13:00:00");
        assert_eq!(value["end"], "15:30:00");
        assert_eq!(value["day_of_week"], 4);

        let back: Assignment = serde_json::from_value(value).unwrap();
        assert_eq!(back, assignment);
    }

    #[test]
    fn test_first_occurrence_anchoring() {
        let shift = ShiftTemplate::new("wed", DayOfWeek::WEDNESDAY, hm(9, 0), hm(12, 0), 1);
        let assignment = Assignment::from_template(StudentId::new("s1"), &shift);
        // 2025-01-06 is a Monday.
        let monday = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let (start, end) = assignment.first_occurrence(monday);
        assert_eq!(start.date(), NaiveDate::from_ymd_opt(2025, 1, 8).unwrap());
        assert_eq!(start.time(), hm(9, 0).to_naive_time());
        assert_eq!(end.time(), hm(12, 0).to_naive_time());

        // Starting on a Thursday rolls over to the next Wednesday.
        let thursday = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();
        let (start, _) = assignment.first_occurrence(thursday);
        assert_eq!(start.date(), NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
    }

    #[test]
    fn test_schedule_occurrences_within_range() {
        let shift = ShiftTemplate::new("mon", DayOfWeek::MONDAY, hm(8, 0), hm(10, 0), 1);
        let schedule = Schedule {
            schedule_id: ScheduleId::nil(),
            title: "Term".into(),
            is_active: false,
            assignments: vec![Assignment::from_template(StudentId::new("s1"), &shift)],
            created_at: Utc::now(),
            created_by: None,
            updated_at: None,
            archived_at: None,
            effective_from: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
            effective_to: NaiveDate::from_ymd_opt(2025, 1, 27),
            generation_id: None,
            config_id: None,
        };
        let occurrences = schedule.occurrences();
        assert_eq!(occurrences.len(), 4);
        assert_eq!(
            occurrences.last().unwrap().start.date(),
            NaiveDate::from_ymd_opt(2025, 1, 27).unwrap()
        );
    }
}
