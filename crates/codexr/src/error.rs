/// Failures of a generation request, reported to the surface that started it.
#[derive(thiserror::Error, Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum Error {
    #[error("Missing Gemini API key. Run `codexr key set` or export GEMINI_API_KEY")]
    CredentialMissing,

    #[error("Gemini API Error {status} {status_text}\nDetails: {details}")]
    DownstreamApi {
        status: u16,
        status_text: String,
        details: String,
    },

    #[error("Gemini returned an unreadable response: {0}")]
    InvalidResponse(String),

    #[error("Gemini request timed out after {0} ms")]
    Timeout(u64),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Credential store error: {0}")]
    CredentialStore(String),

    #[error("Request was superseded by a newer one")]
    Superseded,
}

impl From<codexr_core::secrets::SecretError> for Error {
    fn from(err: codexr_core::secrets::SecretError) -> Self {
        Error::CredentialStore(err.to_string())
    }
}
