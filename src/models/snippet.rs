use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;
use uuid::Uuid;

pub const ID_FIELD: &str = "id";
pub const CREATED_AT_FIELD: &str = "createdAt";
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// Current time as integer milliseconds since the epoch
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// A stored snippet: a JSON object whose only known keys are `id`,
/// `createdAt` and `updatedAt`. Every other field is carried through as is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snippet(Map<String, Value>);

impl Snippet {
    /// Wraps a JSON object; anything else is not a snippet
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.0.get(ID_FIELD).and_then(Value::as_str)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Fills in the fields assigned at first persistence. Values already
    /// present are kept; an `id` that is not a non-empty string is replaced.
    pub fn stamp_defaults(&mut self, now_ms: i64) {
        if self.id().is_none_or(str::is_empty) {
            self.0.insert(
                ID_FIELD.to_string(),
                Value::String(Uuid::new_v4().to_string()),
            );
        }

        for field in [CREATED_AT_FIELD, UPDATED_AT_FIELD] {
            let slot = self.0.entry(field).or_insert(Value::Null);
            if slot.is_null() {
                *slot = Value::from(now_ms);
            }
        }
    }

    /// Shallow merge: fields in `patch` overwrite, fields absent from it stay.
    /// The `id` is immutable and never taken from the patch.
    pub fn merge(&mut self, patch: Map<String, Value>) {
        for (key, value) in patch {
            if key == ID_FIELD {
                continue;
            }
            self.0.insert(key, value);
        }
    }
}

/// One element of the snippets document. Elements that are not objects are
/// not snippets, but they are written back exactly as they were read.
#[derive(Debug, Clone, PartialEq)]
enum Entry {
    Snippet(Snippet),
    Foreign(Value),
}

impl Entry {
    fn snippet(&self) -> Option<&Snippet> {
        match self {
            Entry::Snippet(snippet) => Some(snippet),
            Entry::Foreign(_) => None,
        }
    }

    fn has_id(&self, id: &str) -> bool {
        self.snippet().and_then(Snippet::id) == Some(id)
    }
}

/// The ordered snippets document. Insertion order is the only ordering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnippetCollection {
    entries: Vec<Entry>,
}

impl SnippetCollection {
    /// Reads a loaded document. A document that is not an array is treated
    /// as corrupt and replaced by an empty collection; array elements are
    /// kept whatever their shape.
    pub fn from_document(value: Value) -> Self {
        let elements = match value {
            Value::Array(elements) => elements,
            other => {
                warn!(kind = json_kind(&other), "snippets document is not an array, treating it as empty");
                return Self::default();
            }
        };

        let entries: Vec<Entry> = elements
            .into_iter()
            .map(|element| match element {
                Value::Object(fields) => Entry::Snippet(Snippet(fields)),
                other => Entry::Foreign(other),
            })
            .collect();

        let foreign = entries
            .iter()
            .filter(|entry| matches!(entry, Entry::Foreign(_)))
            .count();
        if foreign > 0 {
            warn!(foreign, "snippets document holds non-object elements, keeping them as is");
        }

        Self { entries }
    }

    pub fn to_document(&self) -> Value {
        Value::Array(
            self.entries
                .iter()
                .map(|entry| match entry {
                    Entry::Snippet(snippet) => Value::Object(snippet.0.clone()),
                    Entry::Foreign(value) => value.clone(),
                })
                .collect(),
        )
    }

    /// Number of elements in the document, snippets or not
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The snippets, skipping elements that are not objects
    pub fn iter(&self) -> impl Iterator<Item = &Snippet> {
        self.entries.iter().filter_map(Entry::snippet)
    }

    pub fn find(&self, id: &str) -> Option<&Snippet> {
        self.iter().find(|snippet| snippet.id() == Some(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    pub fn push(&mut self, snippet: Snippet) {
        self.entries.push(Entry::Snippet(snippet));
    }

    /// Merges `patch` into the snippet with `id`. Returns false when no
    /// snippet matched, leaving the collection untouched.
    pub fn update(&mut self, id: &str, patch: Map<String, Value>) -> bool {
        let matched = self.entries.iter_mut().find_map(|entry| match entry {
            Entry::Snippet(snippet) if snippet.id() == Some(id) => Some(snippet),
            _ => None,
        });

        match matched {
            Some(snippet) => {
                snippet.merge(patch);
                true
            }
            None => false,
        }
    }

    /// Removes every snippet with `id`, returning how many went
    pub fn remove(&mut self, id: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| !entry.has_id(id));
        before - self.entries.len()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
