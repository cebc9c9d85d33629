use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// The flat tag document. Duplicates are stored as given; the list is only
/// ever replaced as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagList(Vec<String>);

impl TagList {
    pub fn new(tags: Vec<String>) -> Self {
        Self(tags)
    }

    /// Reads a loaded document, treating anything but an array of strings
    /// as corrupt
    pub fn from_document(value: Value) -> Self {
        match Self::parse(value) {
            Ok(tags) => tags,
            Err(e) => {
                warn!(error = %e, "tags document has the wrong shape, treating it as empty");
                Self::default()
            }
        }
    }

    /// Strict parse, used for request bodies
    pub fn parse(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn to_document(&self) -> Value {
        Value::Array(self.0.iter().cloned().map(Value::String).collect())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}
