//! JSON-schema shaping for structured-output requests.
//!
//! The provider's strict mode requires `additionalProperties: false` on every
//! object and every property listed under `required`. The response types here
//! are flat, but the walk recurses anyway so a nested type won't silently
//! break strict mode.

use schemars::{schema_for, JsonSchema};

/// Build a strict-mode-compatible schema for `T`.
pub fn response_schema<T: JsonSchema>() -> serde_json::Value {
    let schema = schema_for!(T);
    let mut value = serde_json::to_value(schema).unwrap_or_default();

    tighten_objects(&mut value);

    if let serde_json::Value::Object(map) = &mut value {
        map.remove("$schema");
        map.remove("definitions");
    }

    value
}

fn tighten_objects(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            if map.get("type") == Some(&serde_json::Value::String("object".to_string())) {
                map.insert("additionalProperties".to_string(), serde_json::Value::Bool(false));
                if let Some(serde_json::Value::Object(props)) = map.get("properties") {
                    let keys: Vec<serde_json::Value> = props
                        .keys()
                        .map(|k| serde_json::Value::String(k.clone()))
                        .collect();
                    map.insert("required".to_string(), serde_json::Value::Array(keys));
                }
            }
            for (_, v) in map.iter_mut() {
                tighten_objects(v);
            }
        }
        serde_json::Value::Array(arr) => {
            for item in arr.iter_mut() {
                tighten_objects(item);
            }
        }
        _ => {}
    }
}
