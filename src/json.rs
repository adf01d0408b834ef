use crate::model::{IntoModel, Model};
pub use serde_json::Value as JsonValue;


impl IntoModel for JsonValue {
    fn into_model(&self) -> Model {
        Model::from_value(self)
    }
}


pub(crate) trait ModelValue {
    fn is_falsy(&self) -> bool;
    fn to_text(&self) -> String;
}

impl ModelValue for JsonValue {
    fn is_falsy(&self) -> bool {
        match self {
            JsonValue::Null => true,
            JsonValue::Bool(b) => !*b,
            JsonValue::Number(n) => n.as_f64().map_or(false, |it| it == 0.0 || it.is_nan()),
            JsonValue::String(s) => s.is_empty(),
            _ => false
        }
    }

    // sequences and mappings render as compact json
    fn to_text(&self) -> String {
        match self {
            JsonValue::Null => String::new(),
            JsonValue::String(s) => s.clone(),
            JsonValue::Number(n) => n.to_string(),
            JsonValue::Bool(b) => b.to_string(),
            other => other.to_string()
        }
    }
}
