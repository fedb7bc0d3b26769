use crate::interpret::GenerationResult;
use serde_json::{Map, Value};

/// Code-bearing fields, in order of preference.
pub const SNIPPET_FIELDS: [&str; 2] = ["code", "fixed_code"];

pub const EMPTY_SLOT_WARNING: &str = "No snippet generated yet.";

/// First non-empty string among [`SNIPPET_FIELDS`].
pub fn select_snippet(map: &Map<String, Value>) -> Option<&str> {
    SNIPPET_FIELDS
        .iter()
        .filter_map(|field| map.get(*field).and_then(Value::as_str))
        .find(|code| !code.is_empty())
}

/// The most recent insertable code of a session.
///
/// Only overwritten by a result that carries a snippet; reading it never
/// clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnippetSlot {
    last: Option<String>,
}

impl SnippetSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember the snippet carried by `result`, if any. Returns whether the
    /// slot changed.
    pub fn record(&mut self, result: &GenerationResult) -> bool {
        match result.as_structured().and_then(select_snippet) {
            Some(code) => {
                self.last = Some(code.to_string());
                true
            }
            None => false,
        }
    }

    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.last.is_none()
    }
}
