use chrono::{Duration, NaiveDate};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use servint::{
    core::record::VehicleRecord,
    operation::Operation,
    text::{read_operations, write_operations},
    types::Span,
};

fn definitions(count: usize) -> Vec<Operation> {
    (0..count)
        .map(|i| {
            Operation::new(
                format!("Operation {i}"),
                5_000.0 * (1 + i % 12) as f64,
                Span::from_months((6 * (1 + i % 8)) as f64).unwrap(),
            )
            .unwrap()
        })
        .collect()
}

fn filled_record(defs: &[Operation], entries: usize) -> VehicleRecord {
    let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
    let mut car = VehicleRecord::new("Bench car", start);
    for i in 0..entries {
        let def = &defs[i % defs.len()];
        let done = def
            .complete(
                (i * 37) as f64,
                start + Duration::days(i as i64),
                "",
            )
            .expect("complete");
        car.add_operation_to_log(done).expect("log");
    }
    car
}

fn bench_log_inserts(c: &mut Criterion) {
    let defs = definitions(40);
    c.bench_function("log_insert_5k", |b| {
        b.iter(|| filled_record(&defs, 5_000));
    });
}

fn bench_remove_from_log(c: &mut Criterion) {
    let defs = definitions(40);
    let base = filled_record(&defs, 2_000);
    let victims: Vec<Operation> = base.log().entries().iter().step_by(10).cloned().collect();
    c.bench_function("log_remove_200_of_2k", |b| {
        b.iter(|| {
            let mut car = base.clone();
            car.remove_from_log(&victims).expect("remove");
        });
    });
}

fn bench_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("maintenance_plan");
    for n in [10usize, 100usize, 1000usize] {
        let defs = definitions(n);
        let mut car = filled_record(&defs, n * 3);
        car.set_haul(1_000_000.0).expect("haul");
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| car.make_maintenance_plan(None, true).expect("plan"));
        });
    }
    group.finish();
}

fn bench_text_export(c: &mut Criterion) {
    let car = filled_record(&definitions(40), 2_000);
    let text = write_operations(car.log().entries());
    c.bench_function("text_write_2k", |b| {
        b.iter(|| write_operations(car.log().entries()));
    });
    c.bench_function("text_read_2k", |b| {
        b.iter(|| read_operations(&text).expect("read"));
    });
}

criterion_group!(
    benches,
    bench_log_inserts,
    bench_remove_from_log,
    bench_plan,
    bench_text_export
);
criterion_main!(benches);
