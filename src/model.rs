use serde_json::Map;
use crate::json::JsonValue;


/// The data a template renders against.
///
/// Keys are lower-cased at every level of nested mappings when a model is
/// built, which makes `{User.Name}` and `{user.name}` the same variable.
/// If two keys only differ by case the later one wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    root: Map<String, JsonValue>
}

impl Model {
    pub fn new() -> Self {
        Model { root: Map::new() }
    }

    /// Flattened copy of `value`; anything but a mapping gives an empty model.
    pub fn from_value(value: &JsonValue) -> Self {
        match flatten(value) {
            JsonValue::Object(root) => Model { root },
            _ => Model::new()
        }
    }

    /// Resolve a dotted path such as `user.name`, `list.0` or `list[0]`.
    /// Malformed paths resolve to nothing.
    pub fn get(&self, path: &str) -> Option<&JsonValue> {
        let segments = parse_path(path)?;
        let (first, rest) = segments.split_first()?;
        let start = match first {
            Segment::Key(key) => lookup_key(&self.root, key),
            Segment::Index(index) => lookup_key(&self.root, &index.to_string())
        };
        rest.iter().try_fold(start?, |value, segment| lookup(value, segment))
    }

    pub fn set(&mut self, name: &str, value: JsonValue) {
        self.root.insert(name.to_lowercase(), value);
    }

    pub fn as_map(&self) -> &Map<String, JsonValue> {
        &self.root
    }
}


/// Conversion of caller data into a flattened [Model].
pub trait IntoModel {
    fn into_model(&self) -> Model;
}

impl IntoModel for Model {
    fn into_model(&self) -> Model {
        self.clone()
    }
}

impl IntoModel for Map<String, JsonValue> {
    fn into_model(&self) -> Model {
        Model { root: flatten_map(self) }
    }
}


/// Lower-case every mapping key, recursively. Sequences are kept as they are.
pub fn flatten(value: &JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(map) => JsonValue::Object(flatten_map(map)),
        other => other.clone()
    }
}

fn flatten_map(map: &Map<String, JsonValue>) -> Map<String, JsonValue> {
    map.iter()
        .map(|(key, value)| (key.to_lowercase(), flatten(value)))
        .collect()
}


#[derive(Debug, PartialEq)]
enum Segment<'a> {
    Key(&'a str),
    Index(usize)
}

fn is_delimiter(c: char) -> bool {
    c == '.' || c == '[' || c == ']' || c == '"' || c == '\'' || c.is_whitespace()
}

fn parse_path(path: &str) -> Option<Vec<Segment<'_>>> {
    let mut segments = Vec::new();
    let mut rest = path;
    let mut expect_key = true;
    while expect_key || !rest.is_empty() {
        if expect_key {
            let len = rest.find(is_delimiter).unwrap_or(rest.len());
            if len == 0 {
                return None;
            }
            segments.push(Segment::Key(&rest[..len]));
            rest = &rest[len..];
            expect_key = false;
        } else if let Some(tail) = rest.strip_prefix('.') {
            rest = tail;
            expect_key = true;
        } else if let Some(tail) = rest.strip_prefix('[') {
            let close = tail.find(']')?;
            segments.push(bracket_segment(&tail[..close])?);
            rest = &tail[close + 1..];
        } else {
            return None;
        }
    }
    Some(segments)
}

fn bracket_segment(inner: &str) -> Option<Segment<'_>> {
    let quoted = inner.len() >= 2
        && (inner.starts_with('"') && inner.ends_with('"')
            || inner.starts_with('\'') && inner.ends_with('\''));
    if quoted {
        Some(Segment::Key(&inner[1..inner.len() - 1]))
    } else {
        inner.parse::<usize>().ok().map(Segment::Index)
    }
}

fn lookup<'v>(value: &'v JsonValue, segment: &Segment) -> Option<&'v JsonValue> {
    match (value, segment) {
        (JsonValue::Object(map), Segment::Key(key)) => lookup_key(map, key),
        (JsonValue::Object(map), Segment::Index(index)) => lookup_key(map, &index.to_string()),
        (JsonValue::Array(seq), Segment::Key(key)) => {
            key.parse::<usize>().ok().and_then(|index| seq.get(index))
        },
        (JsonValue::Array(seq), Segment::Index(index)) => seq.get(*index),
        _ => None
    }
}

// mappings inside sequences are not flattened, fall back to a case-insensitive scan
fn lookup_key<'v>(map: &'v Map<String, JsonValue>, key: &str) -> Option<&'v JsonValue> {
    let lowered = key.to_lowercase();
    map.get(&lowered).or_else(
        || map.iter()
            .find(|(name, _)| name.to_lowercase() == lowered)
            .map(|(_, value)| value)
    )
}
