//! Gemini `generateContent` wire format.
//!
//! Request/response types and the pure pieces of a call: endpoint
//! construction, success-body text extraction and error-body rendering.
//! The HTTP round trip itself lives in the binary crate.

use serde::{Deserialize, Serialize};

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Minimal single-turn request envelope: `{"contents":[{"parts":[{"text": …}]}]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

impl GenerateContentRequest {
    pub fn single_turn(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        }
    }
}

/// Successful response body. Every level is optional; a missing level
/// yields empty text rather than an error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    pub candidates: Option<Vec<Option<Candidate>>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateContent {
    pub parts: Option<Vec<Option<CandidatePart>>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidatePart {
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenate the text of every part of the first candidate.
    pub fn text(&self) -> String {
        self.candidates
            .as_deref()
            .and_then(|candidates| candidates.first())
            .and_then(|candidate| candidate.as_ref())
            .and_then(|candidate| candidate.content.as_ref())
            .and_then(|content| content.parts.as_deref())
            .map(|parts| {
                parts
                    .iter()
                    .flatten()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Build the `generateContent` endpoint for `model`.
///
/// The key travels as the `key` query parameter, which is how the API
/// authenticates. Callers must not log the returned URL.
pub fn generate_content_url(api_base: &str, model: &str, api_key: &str) -> String {
    format!(
        "{}/v1beta/models/{}:generateContent?key={}",
        api_base.trim_end_matches('/'),
        model,
        urlencoding::encode(api_key)
    )
}

/// Same endpoint with the key elided, for diagnostics.
pub fn redacted_url(api_base: &str, model: &str) -> String {
    format!(
        "{}/v1beta/models/{}:generateContent?key=<redacted>",
        api_base.trim_end_matches('/'),
        model
    )
}

/// Parse a success body and extract the first candidate's text. Only a body
/// that is not JSON at all is an error; `null` counts as an empty response.
pub fn parse_success_body(body: &str) -> Result<String, serde_json::Error> {
    let response: Option<GenerateContentResponse> = serde_json::from_str(body)?;
    Ok(response.map(|r| r.text()).unwrap_or_default())
}

/// Render an error body for display: pretty JSON when it parses, the raw
/// text otherwise.
pub fn describe_error_body(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(json) => serde_json::to_string_pretty(&json).unwrap_or_else(|_| body.to_string()),
        Err(_) => body.to_string(),
    }
}
