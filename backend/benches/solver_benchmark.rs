use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use helpdesk_roster::editor::{replay, EditorEvent, EditorState};
use helpdesk_roster::models::{Availability, DayOfWeek, ShiftTemplate, Student, TimeOfDay};
use helpdesk_roster::scheduler::{FillPolicy, GreedySolver};

/// Hourly shifts 08:00-18:00 every weekday.
fn week_of_shifts() -> Vec<ShiftTemplate> {
    DayOfWeek::all()
        .flat_map(|day| {
            (8u8..18).map(move |hour| {
                ShiftTemplate::new(
                    format!("{}-{:02}", day.index(), hour),
                    day,
                    TimeOfDay::from_hm(hour, 0).unwrap(),
                    TimeOfDay::from_hm(hour + 1, 0).unwrap(),
                    2,
                )
                .with_max_staff(4)
            })
        })
        .collect()
}

fn students(count: usize) -> Vec<Student> {
    (0..count)
        .map(|i| {
            let mut availability = Availability::new();
            for day in DayOfWeek::all() {
                let start = 8 + ((i + day.index() as usize) % 5) as u8;
                availability.set_hours(day, start..start + 6);
            }
            Student::new(format!("{:05}", i), availability).with_max_hours(10.0 + (i % 10) as f64)
        })
        .collect()
}

fn bench_solver(c: &mut Criterion) {
    let mut group = c.benchmark_group("greedy_solver");
    let shifts = week_of_shifts();

    for count in [10usize, 50, 200] {
        let pool = students(count);
        group.bench_with_input(BenchmarkId::new("minimum", count), &pool, |b, pool| {
            let solver = GreedySolver::new(FillPolicy::Minimum);
            b.iter(|| solver.solve(black_box(&shifts), black_box(pool)));
        });
        group.bench_with_input(BenchmarkId::new("maximum", count), &pool, |b, pool| {
            let solver = GreedySolver::new(FillPolicy::Maximum);
            b.iter(|| solver.solve(black_box(&shifts), black_box(pool)));
        });
    }

    group.finish();
}

fn bench_editor_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("editor");
    let shifts = week_of_shifts();
    let generated = GreedySolver::default().solve(&shifts, &students(50)).assignments;

    let events: Vec<EditorEvent> = shifts
        .windows(2)
        .flat_map(|pair| {
            let student_id = generated[&pair[0].id]
                .first()
                .cloned()
                .unwrap_or_else(|| "00000".into());
            [
                EditorEvent::MoveStudent {
                    from_shift_id: pair[0].id.clone(),
                    to_shift_id: pair[1].id.clone(),
                    student_id: student_id.clone(),
                },
                EditorEvent::AssignStudent {
                    shift_id: pair[0].id.clone(),
                    student_id,
                },
            ]
        })
        .collect();

    group.bench_function("replay_moves", |b| {
        b.iter(|| {
            let initial = EditorState::new(generated.clone(), Vec::new());
            black_box(replay(initial, events.iter().cloned()))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_solver, bench_editor_replay);
criterion_main!(benches);
