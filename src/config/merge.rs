//! Layer merging
//!
//! - Tables merge key by key, recursively
//! - Arrays and scalars from the higher layer replace the lower one
//! - A missing key in the higher layer leaves the lower value alone

use serde_json::Value;

/// Overlay `upper` onto `lower`
pub fn deep_merge(lower: Value, upper: Value) -> Value {
    match (lower, upper) {
        (Value::Object(mut merged), Value::Object(upper)) => {
            for (key, value) in upper {
                let next = match merged.remove(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                merged.insert(key, next);
            }
            Value::Object(merged)
        }
        (_, upper) => upper,
    }
}

/// Fold layers lowest-precedence first
pub fn merge_layers(layers: impl IntoIterator<Item = Value>) -> Value {
    layers
        .into_iter()
        .fold(Value::Object(Default::default()), deep_merge)
}

/// Convert a parsed TOML document into the JSON form used for merging
pub fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_table_merge_keeps_siblings() {
        let lower = json!({"store": {"path": "./instances", "kind": "dir"}});
        let upper = json!({"store": {"path": "/srv/tenants"}});

        let merged = deep_merge(lower, upper);
        assert_eq!(merged["store"]["path"], "/srv/tenants");
        assert_eq!(merged["store"]["kind"], "dir");
    }

    #[test]
    fn test_scalar_and_array_replace() {
        let merged = deep_merge(
            json!({"overwrite_target_holidays": true, "targets": ["a", "b"]}),
            json!({"overwrite_target_holidays": false, "targets": ["c"]}),
        );
        assert_eq!(merged["overwrite_target_holidays"], false);
        assert_eq!(merged["targets"], json!(["c"]));
    }

    #[test]
    fn test_layers_apply_in_order() {
        let merged = merge_layers(vec![
            json!({"output": "human", "on_target_failure": "continue"}),
            json!({"output": "json"}),
            json!({"on_target_failure": "abort"}),
        ]);
        assert_eq!(merged, json!({"output": "json", "on_target_failure": "abort"}));
    }

    #[test]
    fn test_toml_conversion() {
        let doc: toml::Value = toml::from_str(
            r#"
            overwrite_target_holidays = false
            [store]
            path = "/srv/tenants"
            "#,
        )
        .unwrap();
        assert_eq!(
            toml_to_json(doc),
            json!({"overwrite_target_holidays": false, "store": {"path": "/srv/tenants"}})
        );
    }
}
