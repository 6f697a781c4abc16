use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tabprep::dataset::{Table, Value};
use tabprep::preprocessing::{
    infer, materialize, ColumnTransformer, FittedTransformer, Transformer,
};

const CITIES: [&str; 5] = ["NY", "LA", "SF", "CHI", "BOS"];

/// Mixed-type table: two numeric features with gaps, two categorical, a label.
fn synthetic_table(rows: usize) -> Table {
    let data = (0..rows)
        .map(|i| {
            let age = if i % 7 == 0 {
                Value::Missing
            } else {
                Value::Int(20 + (i % 50) as i64)
            };
            let income = Value::Float(1000.0 + (i * 37 % 500) as f64 * 1.5);
            let city = if i % 11 == 0 {
                Value::Missing
            } else {
                Value::from(CITIES[i % CITIES.len()])
            };
            let member = Value::Bool(i % 3 == 0);
            vec![age, income, city, member, Value::Int((i % 2) as i64)]
        })
        .collect();

    Table::from_rows(
        vec![
            "age".into(),
            "income".into(),
            "city".into(),
            "member".into(),
            "label".into(),
        ],
        data,
    )
    .expect("Failed to build synthetic table")
}

fn bench_fit(c: &mut Criterion) {
    for rows in [100, 1_000, 10_000].iter() {
        let table = synthetic_table(*rows);
        let partition = infer(&table).expect("Failed to infer schema");
        let ct = ColumnTransformer::from_partition(&partition);

        c.bench_with_input(BenchmarkId::new("fit", rows), &table, |b, t| {
            b.iter(|| {
                let fitted = ct.fit(black_box(t)).expect("Failed to fit");
                black_box(fitted);
            });
        });
    }
}

fn bench_transform(c: &mut Criterion) {
    let train = synthetic_table(1_000);
    let partition = infer(&train).expect("Failed to infer schema");
    let fitted = ColumnTransformer::from_partition(&partition)
        .fit(&train)
        .expect("Failed to fit");

    for rows in [100, 1_000, 10_000].iter() {
        let table = synthetic_table(*rows);
        c.bench_with_input(BenchmarkId::new("transform", rows), &table, |b, t| {
            b.iter(|| {
                let matrix = fitted.transform(black_box(t)).expect("Failed to transform");
                black_box(matrix);
            });
        });
    }
}

fn bench_materialize(c: &mut Criterion) {
    let train = synthetic_table(10_000);
    let partition = infer(&train).expect("Failed to infer schema");
    let fitted = ColumnTransformer::from_partition(&partition)
        .fit(&train)
        .expect("Failed to fit");
    let matrix = fitted.transform(&train).expect("Failed to transform");
    let names = fitted.feature_names_out();

    c.bench_function("materialize_10000", |b| {
        b.iter(|| {
            let table = materialize(black_box(&matrix), &names).expect("Failed to materialize");
            black_box(table);
        });
    });
}

criterion_group!(benches, bench_fit, bench_transform, bench_materialize);
criterion_main!(benches);
