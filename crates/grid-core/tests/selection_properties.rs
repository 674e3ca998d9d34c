//! Selection-set algebra and range resolution properties.

use grid_core::{
    Column, ColumnFilter, FilterValue, ImmutableSelectionSet, RowKey, RowModel, RowOrder,
    SortSpec, SortState, TypeHint,
};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use std::collections::BTreeSet;

fn sorted(set: &ImmutableSelectionSet<u32>) -> Vec<u32> {
    let members: BTreeSet<u32> = set.iter().copied().collect();
    members.into_iter().collect()
}

/// Random add/delete/toggle/clear sequences never alter a set that is already held.
#[test]
fn test_mutators_never_mutate_existing_references() {
    let mut rng = StdRng::seed_from_u64(0x5e1ec7);
    let mut history: Vec<(ImmutableSelectionSet<u32>, Vec<u32>)> = Vec::new();
    let mut current = ImmutableSelectionSet::empty();

    for _ in 0..2_000 {
        let key = rng.gen_range(0..32u32);
        let next = match rng.gen_range(0..5) {
            0 => current.add([key]),
            1 => current.add([key, key + 1, key + 2]),
            2 => current.delete(&key),
            3 => current.toggle(&key),
            _ => {
                if rng.gen_bool(0.1) {
                    current.clear()
                } else {
                    current.toggle(&key)
                }
            }
        };
        history.push((current.clone(), current.to_list()));
        current = next;
    }

    for (set, snapshot) in &history {
        assert_eq!(&set.to_list(), snapshot);
    }
}

#[test]
fn test_just_collapses_duplicates() {
    let set = ImmutableSelectionSet::just(["k1", "k2", "k1"]);
    assert_eq!(set.to_list(), vec!["k1", "k2"]);
    assert!(set.has(&"k1"));
    assert!(set.has(&"k2"));
    assert_eq!(set, ImmutableSelectionSet::just(["k2", "k1"]));
}

#[test]
fn test_toggle_twice_is_identity() {
    let base = ImmutableSelectionSet::just([1u32, 5, 9]);
    for key in 0..12 {
        let round_trip = base.toggle(&key).toggle(&key);
        assert_eq!(sorted(&round_trip), sorted(&base));
    }
}

fn shuffled_model(rng: &mut StdRng, rows: usize) -> (Vec<Column>, RowModel) {
    let columns = vec![
        Column::new(0, "n", TypeHint::Numeric),
        Column::new(1, "tag", TypeHint::String),
    ];
    let data: Vec<Vec<_>> = (0..rows)
        .map(|_| {
            vec![
                json!(rng.gen_range(0..50)),
                json!(if rng.gen_bool(0.5) { "even" } else { "odd" }),
            ]
        })
        .collect();
    let sort = SortState::from_specs([SortSpec {
        column: 0,
        descending: rng.gen_bool(0.5),
    }]);
    let filters = [ColumnFilter::new(1, FilterValue::text("e"))];
    let model = RowModel::build(&columns, &data, &sort, &filters);
    (columns, model)
}

/// `between(a, b)` and `between(b, a)` span the same keys, in view order.
#[test]
fn test_between_is_symmetric_and_follows_view() {
    let mut rng = StdRng::seed_from_u64(42);
    let (_, model) = shuffled_model(&mut rng, 200);
    let keys = model.keys().to_vec();
    assert!(!keys.is_empty());

    for _ in 0..200 {
        let a = keys[rng.gen_range(0..keys.len())];
        let b = keys[rng.gen_range(0..keys.len())];
        let forward = model.between(&a, &b);
        let backward = model.between(&b, &a);
        assert_eq!(forward, backward);

        let (pa, pb) = (model.position(a).unwrap(), model.position(b).unwrap());
        let (lo, hi) = (pa.min(pb), pa.max(pb));
        assert_eq!(forward, keys[lo..=hi].to_vec());
    }
}

#[test]
fn test_between_rows_outside_view_is_empty() {
    let columns = vec![Column::new(0, "n", TypeHint::Numeric)];
    let data = vec![vec![json!(1)], vec![json!(2)], vec![json!(3)]];
    let filters = [ColumnFilter::new(0, FilterValue::range(Some(2.0), None))];
    let model = RowModel::build(&columns, &data, &SortState::new(), &filters);
    assert_eq!(model.between(&RowKey(0), &RowKey(2)), Vec::<RowKey>::new());
    assert_eq!(model.between(&RowKey(1), &RowKey(2)), vec![RowKey(1), RowKey(2)]);
}
