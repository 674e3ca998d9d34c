//! Demo dataset and the in-process edit handler answering for it.

use grid_core::{GridInfo, GridOptions, GridPayload, Patch, PatchInfo, TypeHint};
use serde_json::{Value, json};

/// Edit-handler id used by the generated dataset.
pub const SAMPLE_METHOD: &str = "edit_cell";

const CITIES: [&str; 8] = [
    "Lisbon", "Nairobi", "Osaka", "Quito", "Tromsø", "Montréal", "Adelaide", "Kraków",
];
const STATUS: [&str; 3] = ["open", "pending", "closed"];

/// A reproducible editable dataset of `rows` rows.
pub fn sample_info(rows: usize) -> GridInfo {
    let data = (0..rows)
        .map(|i| {
            vec![
                json!(i),
                json!(CITIES[i % CITIES.len()]),
                json!((i * 7_919) % 1_000),
                json!(((i * 104_729) % 10_000) as f64 / 100.0),
                json!(STATUS[(i / 3) % STATUS.len()]),
            ]
        })
        .collect();

    GridInfo {
        payload: GridPayload {
            columns: vec![
                "id".into(),
                "city".into(),
                "units".into(),
                "price".into(),
                "status".into(),
            ],
            type_hints: vec![
                TypeHint::Numeric,
                TypeHint::String,
                TypeHint::Numeric,
                TypeHint::Numeric,
                TypeHint::Categorical {
                    categories: STATUS.iter().map(|s| s.to_string()).collect(),
                },
            ],
            data,
            options: GridOptions {
                editable: true,
                filters: true,
                ..GridOptions::default()
            },
        },
        patch_info: Some(PatchInfo {
            key: SAMPLE_METHOD.into(),
        }),
        ..GridInfo::default()
    }
}

/// Authority logic for the demo: numeric columns are coerced, categorical columns are checked
/// against their categories, and everything else is accepted trimmed.
pub fn demo_handler(
    type_hints: Vec<TypeHint>,
) -> impl FnMut(&str, Vec<Patch>) -> Result<Value, Value> + Send + 'static {
    move |_method: &str, patches: Vec<Patch>| {
        let mut accepted = Vec::with_capacity(patches.len());
        for patch in patches {
            let text = match &patch.value {
                Value::String(s) => s.trim().to_string(),
                other => other.to_string(),
            };
            let value = match type_hints.get(patch.column_index) {
                Some(TypeHint::Numeric) => {
                    let number = text
                        .parse::<f64>()
                        .ok()
                        .filter(|n| n.is_finite())
                        .ok_or_else(|| json!(format!("'{text}' is not a number")))?;
                    json!(number)
                }
                Some(TypeHint::Categorical { categories })
                    if !categories.is_empty() && !categories.contains(&text) =>
                {
                    return Err(json!(format!(
                        "'{text}' is not one of: {}",
                        categories.join(", ")
                    )));
                }
                _ => json!(text),
            };
            accepted.push(json!({
                "row_index": patch.row_index,
                "column_index": patch.column_index,
                "value": value,
            }));
        }
        Ok(Value::Array(accepted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_info_is_valid() {
        let info = sample_info(50);
        info.validate().unwrap();
        assert_eq!(info.payload.data.len(), 50);
        assert_eq!(info.columns().len(), 5);
    }

    #[test]
    fn test_handler_coerces_numbers() {
        let mut handler = demo_handler(sample_info(1).payload.type_hints);
        let reply = handler(SAMPLE_METHOD, vec![Patch::new(0, 2, " 12 ")]).unwrap();
        assert_eq!(
            reply,
            json!([{"row_index": 0, "column_index": 2, "value": 12.0}])
        );
    }

    #[test]
    fn test_handler_rejects_bad_values() {
        let mut handler = demo_handler(sample_info(1).payload.type_hints);
        assert_eq!(
            handler(SAMPLE_METHOD, vec![Patch::new(0, 3, "cheap")]),
            Err(json!("'cheap' is not a number"))
        );
        assert_eq!(
            handler(SAMPLE_METHOD, vec![Patch::new(0, 4, "maybe")]),
            Err(json!("'maybe' is not one of: open, pending, closed"))
        );
        assert_eq!(
            handler(SAMPLE_METHOD, vec![Patch::new(0, 1, " Porto ")]),
            Ok(json!([{"row_index": 0, "column_index": 1, "value": "Porto"}]))
        );
    }
}
