use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sheetsync_core::{
    driver, CellConstraint, Column, ResolveContext, Resolver, RowCriterion, SourceRow, SyncConfig,
    TargetValue,
};
use sheetsync_sheet::{Book, CellValue, Sheet};

const SOURCE: usize = 0;
const TARGET: usize = 1;

/// A keyed source table of `rows` rows and a target listing the keys in
/// reverse order.
fn book_with_rows(rows: usize) -> Book {
    let mut source = vec![vec![
        CellValue::from("ID"),
        CellValue::from("Name"),
        CellValue::from("Price"),
    ]];
    let mut target = vec![vec![CellValue::from("ID")]];
    for i in 0..rows {
        source.push(vec![
            CellValue::Int(i as i64),
            CellValue::String(format!("item {i}")),
            CellValue::Float(i as f64 * 1.5),
        ]);
        target.push(vec![CellValue::Int((rows - 1 - i) as i64)]);
    }

    let mut book = Book::new();
    book.add_sheet("Source", Sheet::from_data(source)).unwrap();
    book.add_sheet("Target", Sheet::from_data(target)).unwrap();
    book
}

fn bench_resolve_column(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_column");
    let book = book_with_rows(10);
    let resolver = Resolver::new(&book, TARGET);

    let letters = Column::from("AB");
    let matched = Column::Matched(vec![CellConstraint {
        row: 1,
        value: CellValue::from("Price"),
    }]);

    group.bench_function("letters", |b| {
        b.iter(|| resolver.resolve_column(SOURCE, black_box(&letters)))
    });

    group.bench_function("find_in_row", |b| {
        b.iter(|| resolver.resolve_column(SOURCE, black_box(&matched)))
    });

    group.finish();
}

fn bench_resolve_row(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_row");

    for size in [10, 100, 1000, 10000].iter() {
        let book = book_with_rows(*size);
        let resolver = Resolver::new(&book, TARGET);
        // Worst case: the key sits in the last source row
        let spec = SourceRow::Matched(vec![RowCriterion {
            source_column: Column::from("A"),
            target_value: TargetValue::Literal(CellValue::Int(*size as i64 - 1)),
        }]);
        let ctx = ResolveContext::for_row(2);

        group.bench_with_input(BenchmarkId::new("find_in_column", size), size, |b, _| {
            b.iter(|| resolver.resolve_row(SOURCE, black_box(&spec), black_box(&ctx)))
        });
    }

    group.finish();
}

fn bench_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("run");
    let config = SyncConfig::from_yaml_str(
        r#"
update_target:
  source: { sheet: Source }
  target:
    sheet: Target
    start_row: 2
    update_columns:
      - column: B
        source_value_coord:
          column: { find_in_row: [[1, "Name"]] }
          row:
            find_in_column:
              - source_column: A
                target_value: { column_for_current_row: A }
      - column: C
        source_value_coord:
          column: { find_in_row: [[1, "Price"]] }
          row: same_with_previous_column
"#,
    )
    .unwrap();

    for size in [10, 100, 1000].iter() {
        let book = book_with_rows(*size);

        group.bench_with_input(BenchmarkId::new("lookup_two_columns", size), size, |b, _| {
            b.iter_batched(
                || book.clone(),
                |mut book| driver::run(black_box(&config), &mut book),
                criterion::BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_resolve_column, bench_resolve_row, bench_run);
criterion_main!(benches);
