// Benchmark for slot indexing and grid projection
// Measures rebuild and full-week projection cost as the week fills up

use chrono::{Duration, Local, NaiveDate, TimeZone};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use visit_scheduler::models::appointment::Appointment;
use visit_scheduler::services::reschedule::{PendingMoveLedger, ProjectedGrid, SlotIndex};
use visit_scheduler::utils::date::{slot_key_of, week_containing, TimeGrid};

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
}

/// `per_slot` appointments in every bookable slot of the week except the
/// last one on Sunday.
fn dense_week(per_slot: usize) -> Vec<Appointment> {
    let grid = TimeGrid::default();
    let mut appointments = Vec::new();
    for day in 0..7 {
        let date = monday() + Duration::days(day);
        for hour in grid.work_hours().into_iter().filter(|h| grid.is_bookable(*h)) {
            if day == 6 && hour == grid.last_hour() {
                continue;
            }
            let start = grid.start_of_slot(slot_key_of(date, hour)).unwrap();
            for n in 0..per_slot {
                let id = format!("{}-{:02}-{}", date, hour, n);
                appointments.push(Appointment::new(id, start).unwrap());
            }
        }
    }
    appointments
}

fn bench_slot_index_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("slot_index_build");

    for per_slot in [1, 4, 16].iter() {
        let appointments = dense_week(*per_slot);
        group.bench_with_input(
            BenchmarkId::from_parameter(appointments.len()),
            &appointments,
            |b, appointments| {
                b.iter(|| SlotIndex::build(black_box(appointments.clone())));
            },
        );
    }

    group.finish();
}

fn bench_projected_week(c: &mut Criterion) {
    let mut group = c.benchmark_group("projected_week");
    let grid = TimeGrid::default();
    let range = week_containing(monday()).unwrap();
    let now = Local.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();

    for per_slot in [1, 4, 16].iter() {
        let appointments = dense_week(*per_slot);
        let first_id = appointments[0].id.clone();
        let index = SlotIndex::build(appointments);

        // One pending move into the free Sunday evening slot
        let mut ledger = PendingMoveLedger::new();
        let sunday = monday() + Duration::days(6);
        let _ = ledger.propose(&index, &grid, &first_id, sunday, grid.last_hour(), now);

        group.bench_with_input(
            BenchmarkId::from_parameter(index.len()),
            &(index, ledger),
            |b, (index, ledger)| {
                b.iter(|| ProjectedGrid::build(black_box(index), black_box(ledger), &grid, &range));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_slot_index_build, bench_projected_week);
criterion_main!(benches);
