use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Selects the prompt template and the response schema of a generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Break a task into steps with difficulty and time estimates.
    Plan,
    /// Produce a code snippet with a short explanation.
    Code,
    /// Explain an error and propose corrected code.
    Debug,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Plan, Mode::Code, Mode::Debug];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Plan => "plan",
            Mode::Code => "code",
            Mode::Debug => "debug",
        }
    }

    /// Field names the model is asked to return for this mode.
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            Mode::Plan => &["steps", "difficulty", "time"],
            Mode::Code => &["code", "explanation"],
            Mode::Debug => &["cause", "fix", "fixed_code"],
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown mode '{0}' (expected one of: plan, code, debug)")]
pub struct UnknownMode(pub String);

impl FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s.trim())
            .ok_or_else(|| UnknownMode(s.to_string()))
    }
}
