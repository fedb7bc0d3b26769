use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Strictly parse `raw` as a JSON object.
///
/// Returns `None` for anything else: invalid JSON, fenced JSON, trailing
/// prose, truncated output, or a JSON value that is not an object. No
/// recovery is attempted.
pub fn safe_parse(raw: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Interpretation of the model text: either the structured object the
/// prompt asked for, or the raw text to display verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationResult {
    Structured(Map<String, Value>),
    Raw(String),
}

impl GenerationResult {
    pub fn interpret(text: String) -> Self {
        match safe_parse(&text) {
            Some(map) => GenerationResult::Structured(map),
            None => GenerationResult::Raw(text),
        }
    }

    pub fn as_structured(&self) -> Option<&Map<String, Value>> {
        match self {
            GenerationResult::Structured(map) => Some(map),
            GenerationResult::Raw(_) => None,
        }
    }

    pub fn plan(&self) -> Option<PlanResult> {
        self.view()
    }

    pub fn code(&self) -> Option<CodeResult> {
        self.view()
    }

    pub fn debug(&self) -> Option<DebugResult> {
        self.view()
    }

    fn view<T: for<'de> Deserialize<'de>>(&self) -> Option<T> {
        let map = self.as_structured()?;
        serde_json::from_value(Value::Object(map.clone())).ok()
    }
}

/// `plan` mode fields. Any subset may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanResult {
    pub steps: Vec<String>,
    pub difficulty: Vec<String>,
    pub time: Vec<f64>,
}

impl PlanResult {
    /// Zip steps with their difficulty and time; shorter lists pad with `None`.
    pub fn rows(&self) -> Vec<(String, Option<String>, Option<f64>)> {
        self.steps
            .iter()
            .enumerate()
            .map(|(i, step)| {
                (
                    step.clone(),
                    self.difficulty.get(i).cloned(),
                    self.time.get(i).copied(),
                )
            })
            .collect()
    }

    pub fn total_minutes(&self) -> f64 {
        self.time.iter().sum()
    }
}

/// `code` mode fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeResult {
    pub code: String,
    pub explanation: String,
}

/// `debug` mode fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugResult {
    pub cause: String,
    pub fix: String,
    pub fixed_code: String,
}

impl DebugResult {
    /// Plain-text report: cause, fix and corrected code, skipping empty parts.
    pub fn report(&self) -> String {
        let mut sections = Vec::new();

        if !self.cause.is_empty() {
            sections.push(format!("Cause: {}", self.cause));
        }
        if !self.fix.is_empty() {
            sections.push(format!("Fix: {}", self.fix));
        }
        if !self.fixed_code.is_empty() {
            sections.push(format!("\nCorrected code:\n{}", self.fixed_code));
        }

        sections.join("\n\n")
    }
}
