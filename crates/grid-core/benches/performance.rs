use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use grid_core::{
    Column, ColumnFilter, FilterValue, GridController, GridInfo, GridOptions, GridPayload,
    RowKey, RowModel, SortSpec, SortState, TypeHint, Virtualizer, VirtualizerOptions,
};
use serde_json::{Value, json};

const ROWS: usize = 100_000;

fn large_dataset(row_count: usize) -> Vec<Vec<Value>> {
    (0..row_count)
        .map(|i| {
            vec![
                json!(i),
                json!(format!("row {i:06} the quick brown fox")),
                json!((i * 7919) % 1000),
            ]
        })
        .collect()
}

fn columns() -> Vec<Column> {
    vec![
        Column::new(0, "id", TypeHint::Numeric),
        Column::new(1, "text", TypeHint::String),
        Column::new(2, "score", TypeHint::Numeric),
    ]
}

fn bench_row_model_rebuild(c: &mut Criterion) {
    let data = large_dataset(ROWS);
    let columns = columns();
    let sort = SortState::from_specs([
        SortSpec {
            column: 2,
            descending: true,
        },
        SortSpec {
            column: 1,
            descending: false,
        },
    ]);
    let filters = [ColumnFilter::new(1, FilterValue::text("fox"))];

    c.bench_function("row_model/100k_sort_filter", |b| {
        b.iter(|| {
            let model = RowModel::build(&columns, black_box(&data), &sort, &filters);
            black_box(model.len());
        })
    });
}

fn bench_visible_range(c: &mut Criterion) {
    let mut virtualizer = Virtualizer::new(VirtualizerOptions::default());
    virtualizer.set_items((0..ROWS).map(RowKey).collect());
    virtualizer.set_viewport(900.0);
    // Measure a sprinkling of rows so offsets are not uniform.
    for i in (0..ROWS).step_by(97) {
        virtualizer.measure(RowKey(i), 48.0, true);
    }

    c.bench_function("virtualizer/100k_visible_range", |b| {
        let mut offset = 0.0;
        b.iter(|| {
            offset = (offset + 7_919.0) % virtualizer.total_size();
            virtualizer.set_scroll_offset(offset);
            black_box(virtualizer.range_with_overscan());
        })
    });
}

fn bench_render_model(c: &mut Criterion) {
    let info = GridInfo {
        payload: GridPayload {
            columns: vec!["id".into(), "text".into(), "score".into()],
            type_hints: vec![TypeHint::Numeric, TypeHint::String, TypeHint::Numeric],
            data: large_dataset(ROWS),
            options: GridOptions::default(),
        },
        ..GridInfo::default()
    };

    c.bench_function("grid/100k_scroll_and_render", |b| {
        b.iter_batched(
            || {
                let mut grid = GridController::new(info.clone()).unwrap();
                grid.set_viewport(900.0);
                grid
            },
            |mut grid| {
                for step in 0..20 {
                    grid.scroll_to_offset(f64::from(step) * 15_000.0);
                    black_box(grid.render_model());
                }
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(
    benches,
    bench_row_model_rebuild,
    bench_visible_range,
    bench_render_model
);
criterion_main!(benches);
