use std::collections::HashSet;

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use service::calendar::working_days;
use service::leave::domain::DayPlan;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn bench_working_days(c: &mut Criterion) {
    let holidays: HashSet<NaiveDate> =
        ["2025-01-01", "2025-04-18", "2025-05-01", "2025-12-25", "2025-12-26"].into_iter().map(d).collect();
    let (start, end) = (d("2025-01-01"), d("2025-12-31"));

    c.bench_function("working_days_full_year", |b| {
        b.iter(|| working_days(black_box(start), black_box(end), &holidays))
    });

    c.bench_function("day_plan_two_weeks", |b| {
        b.iter(|| DayPlan::build(black_box(d("2025-04-14")), black_box(d("2025-04-25")), &holidays, None).unwrap())
    });
}

criterion_group!(benches, bench_working_days);
criterion_main!(benches);
