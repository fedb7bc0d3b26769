use crate::mode::Mode;

/// One user action: a mode, the primary text and optional context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub mode: Mode,
    pub text: String,
    pub context: Option<String>,
}

impl GenerationRequest {
    pub fn new(mode: Mode, text: impl Into<String>, context: Option<String>) -> Self {
        Self {
            mode,
            text: text.into(),
            context,
        }
    }

    pub fn prompt(&self) -> String {
        build_prompt(self.mode, &self.text, self.context.as_deref())
    }
}

/// Build the instruction sent to the model for a generation request.
///
/// The user text and the optional context are embedded verbatim. Neither is
/// validated here: an empty `text` still renders the full template with an
/// empty section, and an absent context renders an empty context section.
pub fn build_prompt(mode: Mode, text: &str, extra_context: Option<&str>) -> String {
    let context = extra_context.unwrap_or("");

    match mode {
        Mode::Plan => format!(
            "You are CodeXR, an AI assistant for AR/VR developers.\n\n\
             Break the following task into subtasks. Add difficulty (easy/medium/hard) and time (minutes) for each.\n\
             Return STRICT JSON with fields: steps (string[]), difficulty (string[]), time (number[]). Do NOT include markdown fences.\n\n\
             Task:\n{text}\n\n\
             If helpful context is provided, use it:\n{context}"
        ),
        Mode::Code => format!(
            "You are CodeXR. Generate a concise code snippet with a short explanation.\n\
             Return STRICT JSON with fields: code (string), explanation (string). Do NOT include markdown fences.\n\n\
             Request:\n{text}\n\n\
             Context (optional):\n{context}"
        ),
        Mode::Debug => format!(
            "You are CodeXR. Explain the error and provide a fix with corrected code if possible.\n\
             Return STRICT JSON: {{\"cause\": string, \"fix\": string, \"fixed_code\": string}}. Do NOT include markdown fences.\n\n\
             Error:\n{text}\n\n\
             Related code (optional):\n{context}"
        ),
    }
}

/// Build a documentation question prompt.
///
/// The answer is free-form text; no JSON contract is requested.
pub fn build_docs_prompt(question: &str, docs: Option<&str>) -> String {
    let docs = docs
        .filter(|d| !d.trim().is_empty())
        .unwrap_or("No additional context provided.");

    format!(
        "You are CodeXR, a helpful coding assistant for AR/VR developers.\n\
         Use the following documentation context to answer the question concisely and accurately.\n\
         Include code if it helps.\n\n\
         Question:\n{question}\n\n\
         Documentation Context:\n{docs}"
    )
}
