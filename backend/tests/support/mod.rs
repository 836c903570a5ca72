#![allow(dead_code)]

use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use helpdesk_roster::error::{RosterError, RosterResult};
use helpdesk_roster::models::{Availability, DayOfWeek, ShiftTemplate, Student, StudentId, TimeOfDay};
use helpdesk_roster::scheduler::auto_generate;
use helpdesk_roster::services::{
    flatten_assignments, GenerationBackend, GenerationInput, GenerationOutcome, GenerationRequest,
    JobId, RequestContext,
};

pub fn hm(hour: u8, minute: u8) -> TimeOfDay {
    TimeOfDay::from_hm(hour, minute).expect("valid time")
}

pub fn shift(id: &str, day: DayOfWeek, start: u8, end: u8, min_staff: u32) -> ShiftTemplate {
    ShiftTemplate::new(id, day, hm(start, 0), hm(end, 0), min_staff)
}

pub fn student(id: &str, days: &[DayOfWeek], hours: Range<u8>) -> Student {
    let mut availability = Availability::new();
    for day in days {
        availability.set_hours(*day, hours.clone());
    }
    Student::new(id, availability)
}

/// A small helpdesk week: mornings and afternoons Monday to Wednesday.
pub fn weekly_shifts() -> Vec<ShiftTemplate> {
    vec![
        shift("mon-am", DayOfWeek::MONDAY, 8, 12, 2).with_name("Monday AM"),
        shift("mon-pm", DayOfWeek::MONDAY, 13, 17, 1).with_name("Monday PM"),
        shift("tue-am", DayOfWeek::TUESDAY, 8, 12, 2).with_name("Tuesday AM"),
        shift("tue-pm", DayOfWeek::TUESDAY, 13, 17, 1).with_name("Tuesday PM"),
        shift("wed-am", DayOfWeek::WEDNESDAY, 8, 12, 1).with_name("Wednesday AM"),
    ]
}

pub fn weekly_students() -> Vec<Student> {
    let all_week = [DayOfWeek::MONDAY, DayOfWeek::TUESDAY, DayOfWeek::WEDNESDAY];
    vec![
        student("s1", &all_week, 8..17).with_max_hours(12.0),
        student("s2", &all_week, 8..12),
        student("s3", &[DayOfWeek::MONDAY, DayOfWeek::TUESDAY], 13..17),
        student("s4", &[DayOfWeek::TUESDAY, DayOfWeek::WEDNESDAY], 8..17).with_min_hours(4.0),
    ]
}

pub fn generation_input(student_ids: &[&str]) -> GenerationInput {
    GenerationInput {
        request: GenerationRequest {
            title: "Spring rota".to_string(),
            effective_from: NaiveDate::from_ymd_opt(2026, 1, 12).expect("valid date"),
            effective_to: NaiveDate::from_ymd_opt(2026, 5, 1),
            config_id: Some("spring-2026".to_string()),
            student_ids: student_ids.iter().map(|id| StudentId::new(*id)).collect(),
        },
        context: RequestContext {
            actor: Some("coordinator".to_string()),
        },
        shifts: weekly_shifts(),
        students: weekly_students(),
    }
}

/// What a [`ScriptedBackend`] answers with.
#[derive(Debug, Clone)]
pub enum Script {
    /// Solve with the default greedy solver and complete.
    Complete,
    Infeasible(String),
    Failed(String),
    /// Return an error instead of an outcome.
    Error,
}

/// Backend with a fixed answer, an optional delay and a call counter.
pub struct ScriptedBackend {
    script: Script,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new(script: Script) -> Arc<Self> {
        Self::with_delay(script, Duration::ZERO)
    }

    pub fn with_delay(script: Script, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            script,
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    /// Calls that ran to completion.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn generate(&self, job_id: JobId, input: &GenerationInput) -> RosterResult<GenerationOutcome> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.script {
            Script::Complete => {
                let students = input.selected_students()?;
                let map = auto_generate(&input.shifts, &students);
                let assignments = flatten_assignments(&map, &input.shifts);
                Ok(GenerationOutcome::Completed(input.build_schedule(job_id, assignments)))
            }
            Script::Infeasible(message) => Ok(GenerationOutcome::Infeasible(message.clone())),
            Script::Failed(message) => Ok(GenerationOutcome::Failed(message.clone())),
            Script::Error => Err(RosterError::Serialization("backend exploded".to_string())),
        }
    }
}
