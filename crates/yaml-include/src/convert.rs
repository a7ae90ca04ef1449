//! Conversion from YAML values to JSON.

use serde_json::{Map, Number, Value};
use yaml_rust2::Yaml;

/// Convert a `Yaml` value to a `serde_json::Value`.
///
/// Non-string mapping keys are stringified. Floats that JSON cannot
/// represent (NaN, infinities) and unresolved aliases become `null`.
pub fn yaml_to_json(yaml: &Yaml) -> Value {
    match yaml {
        Yaml::Null | Yaml::BadValue | Yaml::Alias(_) => Value::Null,
        Yaml::Boolean(b) => Value::Bool(*b),
        Yaml::Integer(i) => Value::Number((*i).into()),
        Yaml::Real(_) => yaml
            .as_f64()
            .and_then(Number::from_f64)
            .map_or(Value::Null, Value::Number),
        Yaml::String(s) => Value::String(s.clone()),
        Yaml::Array(items) => Value::Array(items.iter().map(yaml_to_json).collect()),
        Yaml::Hash(hash) => {
            let mut map = Map::new();
            for (key, value) in hash {
                map.insert(key_to_string(key), yaml_to_json(value));
            }
            Value::Object(map)
        }
    }
}

fn key_to_string(key: &Yaml) -> String {
    match key {
        Yaml::String(s) | Yaml::Real(s) => s.clone(),
        Yaml::Integer(i) => i.to_string(),
        Yaml::Boolean(b) => b.to_string(),
        Yaml::Null => "null".to_owned(),
        other => yaml_to_json(other).to_string(),
    }
}
