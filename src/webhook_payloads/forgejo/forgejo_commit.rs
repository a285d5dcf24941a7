use serde_json::{Map, Value};

/// The `head_commit` object of a push.
///
/// Only `id` is interpreted here; every other field is kept as received so the
/// release platform sees the commit exactly as Forgejo sent it.
#[derive(serde::Deserialize, serde::Serialize, Clone, Debug, Default, PartialEq)]
pub struct HeadCommit {
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub id: String,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl HeadCommit {
    pub fn message(&self) -> Option<&str> {
        self.rest.get("message").and_then(Value::as_str)
    }

    /// First eight characters of the commit id.
    pub fn short_id(&self) -> String {
        self.id.chars().take(8).collect()
    }
}
