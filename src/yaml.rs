use serde_json::Map;
use crate::json::JsonValue;
use crate::model::{IntoModel, Model};
pub use serde_yaml::Value as YamlValue;


impl IntoModel for YamlValue {
    fn into_model(&self) -> Model {
        Model::from_value(&to_json(self))
    }
}


fn to_json(value: &YamlValue) -> JsonValue {
    match value {
        YamlValue::Null => JsonValue::Null,
        YamlValue::Bool(b) => JsonValue::Bool(*b),
        YamlValue::Number(n) => number_to_json(n),
        YamlValue::String(s) => JsonValue::String(s.clone()),
        YamlValue::Sequence(seq) => JsonValue::Array(
            seq.iter().map(to_json).collect()
        ),
        YamlValue::Mapping(mapping) => JsonValue::Object(
            mapping.iter()
                .map(|(key, value)| (key_to_string(key), to_json(value)))
                .collect::<Map<_, _>>()
        ),
        YamlValue::Tagged(tagged) => to_json(&tagged.value)
    }
}

fn number_to_json(n: &serde_yaml::Number) -> JsonValue {
    if let Some(i) = n.as_i64() {
        JsonValue::from(i)
    } else if let Some(u) = n.as_u64() {
        JsonValue::from(u)
    } else {
        // non finite floats have no json form
        n.as_f64()
            .and_then(serde_json::Number::from_f64)
            .map_or(JsonValue::Null, JsonValue::Number)
    }
}

fn key_to_string(key: &YamlValue) -> String {
    match key {
        YamlValue::String(s) => s.clone(),
        YamlValue::Number(n) => n.to_string(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Null => String::new(),
        other => serde_yaml::to_string(other)
            .map(|it| it.trim_end().to_owned())
            .unwrap_or_default()
    }
}
