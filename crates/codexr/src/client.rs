use crate::error::Error;
use async_trait::async_trait;
use codexr_core::gemini::{
    describe_error_body, generate_content_url, parse_success_body, redacted_url,
    GenerateContentRequest,
};
use codexr_core::settings::Settings;
use std::time::Duration;

/// Text returned by the model for one prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelReply {
    pub text: String,
}

#[async_trait]
pub trait ModelClient: Send + Sync {
    /// One request/response round trip. Implementations never retry.
    async fn generate(&self, prompt: &str, model: &str, api_key: &str)
        -> Result<ModelReply, Error>;
}

/// Gemini `generateContent` over HTTPS.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_base: String,
    timeout: Option<Duration>,
}

impl GeminiClient {
    pub fn new(settings: &Settings) -> Result<Self, Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.timeout() {
            builder = builder.timeout(timeout);
        }

        let http = builder
            .build()
            .map_err(|e| Error::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self::with_http(http, &settings.api_base, settings.timeout()))
    }

    /// Use a prebuilt reqwest client. `timeout` must match the one configured
    /// on `http`; it is only used for error reporting.
    pub fn with_http(http: reqwest::Client, api_base: &str, timeout: Option<Duration>) -> Self {
        Self {
            http,
            api_base: api_base.to_string(),
            timeout,
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            let millis = self.timeout.map(|t| t.as_millis() as u64).unwrap_or_default();
            return Error::Timeout(millis);
        }
        // The request URL carries the API key.
        Error::Network(err.without_url().to_string())
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        model: &str,
        api_key: &str,
    ) -> Result<ModelReply, Error> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(Error::CredentialMissing);
        }

        let url = generate_content_url(&self.api_base, model, api_key);
        log::debug!("POST {}", redacted_url(&self.api_base, model));
        log::debug!("Prompt length: {} chars", prompt.len());

        let response = self
            .http
            .post(&url)
            .json(&GenerateContentRequest::single_turn(prompt))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        log::debug!("Gemini responded {} ({} bytes)", status, body.len());

        if !status.is_success() {
            let details = describe_error_body(&body);
            log::warn!("Gemini API error {}: {}", status, details);

            return Err(Error::DownstreamApi {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                details,
            });
        }

        let text = parse_success_body(&body).map_err(|e| Error::InvalidResponse(e.to_string()))?;

        Ok(ModelReply { text })
    }
}
