//! Orchestration of user actions.
//!
//! A [`Session`] owns the state that outlives a single request (the last
//! snippet and the request sequencer) and reaches the outside world only
//! through the injected [`CredentialStore`], [`ModelClient`],
//! [`ResultSink`] and [`LogSink`].

use crate::client::ModelClient;
use crate::credentials::CredentialStore;
use crate::error::Error;
use crate::sinks::{LogSink, ResultSink};
use codexr_core::interpret::GenerationResult;
use codexr_core::mode::Mode;
use codexr_core::prompt::{build_docs_prompt, GenerationRequest};
use codexr_core::sequence::{RequestSequencer, Ticket};
use codexr_core::settings::Settings;
use codexr_core::snippet::{SnippetSlot, EMPTY_SLOT_WARNING};
use futures::future::BoxFuture;
use std::sync::Arc;

pub const EMPTY_SELECTION_WARNING: &str = "Select an error message in the editor first.";
pub const DEBUG_READY_NOTICE: &str = "Debug result ready (see output).";

/// A request that has been issued but not yet completed.
pub struct PendingGeneration {
    pub ticket: Ticket,
    pub mode: Mode,
    pub future: BoxFuture<'static, Result<GenerationResult, Error>>,
}

pub struct Session {
    settings: Settings,
    credentials: Arc<dyn CredentialStore>,
    client: Arc<dyn ModelClient>,
    snippets: SnippetSlot,
    sequencer: RequestSequencer,
}

impl Session {
    pub fn new(
        settings: Settings,
        credentials: Arc<dyn CredentialStore>,
        client: Arc<dyn ModelClient>,
    ) -> Self {
        Self {
            settings,
            credentials,
            client,
            snippets: SnippetSlot::new(),
            sequencer: RequestSequencer::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn last_snippet(&self) -> Option<&str> {
        self.snippets.last()
    }

    /// Issue a ticket and build the request future. The future reads the
    /// credential when it runs and does not touch session state, so it can
    /// be spawned; hand its outcome back through [`Session::finish`].
    pub fn start(&mut self, request: GenerationRequest) -> PendingGeneration {
        let ticket = self.sequencer.issue();
        let prompt = request.prompt();
        let credentials = self.credentials.clone();
        let client = self.client.clone();
        let model = self.settings.model.clone();

        log::debug!("Request #{} ({} mode)", ticket.id(), request.mode);

        let future: BoxFuture<'static, Result<GenerationResult, Error>> = Box::pin(async move {
            let api_key = credentials.get()?.unwrap_or_default();
            let reply = client.generate(&prompt, &model, &api_key).await?;
            Ok::<_, Error>(GenerationResult::interpret(reply.text))
        });

        PendingGeneration {
            ticket,
            mode: request.mode,
            future,
        }
    }

    /// Apply the outcome of `ticket`. Returns `None` when a newer request
    /// has been issued since, in which case the outcome is discarded.
    pub fn finish(
        &mut self,
        ticket: Ticket,
        outcome: Result<GenerationResult, Error>,
    ) -> Option<Result<GenerationResult, Error>> {
        if !self.sequencer.is_current(ticket) {
            log::debug!("Dropping stale response for request #{}", ticket.id());
            return None;
        }

        if let Ok(result) = &outcome {
            if self.snippets.record(result) {
                log::debug!("Snippet updated by request #{}", ticket.id());
            }
        }

        Some(outcome)
    }

    /// Like [`Session::finish`], with a stale outcome reported as
    /// [`Error::Superseded`].
    pub fn settle(
        &mut self,
        ticket: Ticket,
        outcome: Result<GenerationResult, Error>,
    ) -> Result<GenerationResult, Error> {
        self.finish(ticket, outcome).unwrap_or(Err(Error::Superseded))
    }

    /// Run one request to completion.
    pub async fn generate(&mut self, request: GenerationRequest) -> Result<GenerationResult, Error> {
        let pending = self.start(request);
        let outcome = pending.future.await;
        self.settle(pending.ticket, outcome)
    }

    /// Hand the last snippet to `sink`, or warn when there is none. The slot
    /// is left as is, so repeated calls insert the same text.
    pub fn insert_last(&self, sink: &mut dyn ResultSink) -> color_eyre::eyre::Result<bool> {
        match self.snippets.last() {
            Some(snippet) => {
                sink.insert(snippet)?;
                Ok(true)
            }
            None => {
                sink.warn(EMPTY_SLOT_WARNING)?;
                Ok(false)
            }
        }
    }

    /// Explain an error selected in the editor: run the debug flow and
    /// append the report to `log`.
    pub async fn explain(
        &mut self,
        selection: &str,
        sink: &mut dyn ResultSink,
        log: &mut dyn LogSink,
    ) -> color_eyre::eyre::Result<()> {
        if selection.trim().is_empty() {
            sink.warn(EMPTY_SELECTION_WARNING)?;
            return Ok(());
        }

        let request = GenerationRequest::new(Mode::Debug, selection, None);
        let result = self.generate(request).await?;

        match &result {
            GenerationResult::Structured(map) => {
                let report = match result.debug() {
                    Some(debug) => debug.report(),
                    None => serde_json::to_string_pretty(map)?,
                };
                sink.notice(DEBUG_READY_NOTICE)?;
                log.append(&report)?;
            }
            GenerationResult::Raw(text) => log.append(text)?,
        }

        Ok(())
    }

    /// Answer a documentation question. Plain text, no snippet handling.
    pub async fn ask(&self, question: &str, docs: Option<&str>) -> Result<String, Error> {
        let prompt = build_docs_prompt(question, docs);
        let api_key = self.credentials.get()?.unwrap_or_default();
        let reply = self
            .client
            .generate(&prompt, &self.settings.model, &api_key)
            .await?;
        Ok(reply.text)
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use crate::client::ModelReply;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Scripted model: replies are matched by a substring of the prompt.
    #[derive(Default)]
    pub struct ScriptedClient {
        replies: Mutex<Vec<(String, Duration, Result<String, Error>)>>,
        pub calls: AtomicUsize,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedClient {
        pub fn reply(self, needle: &str, text: &str) -> Self {
            self.reply_after(needle, Duration::ZERO, text)
        }

        pub fn reply_after(self, needle: &str, delay: Duration, text: &str) -> Self {
            self.replies
                .lock()
                .unwrap()
                .push((needle.to_string(), delay, Ok(text.to_string())));
            self
        }

        pub fn fail(self, needle: &str, error: Error) -> Self {
            self.replies
                .lock()
                .unwrap()
                .push((needle.to_string(), Duration::ZERO, Err(error)));
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ModelClient for ScriptedClient {
        async fn generate(
            &self,
            prompt: &str,
            _model: &str,
            api_key: &str,
        ) -> Result<ModelReply, Error> {
            if api_key.trim().is_empty() {
                return Err(Error::CredentialMissing);
            }

            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());

            let (delay, outcome) = self
                .replies
                .lock()
                .unwrap()
                .iter()
                .find(|(needle, _, _)| prompt.contains(needle.as_str()))
                .map(|(_, delay, outcome)| (*delay, outcome.clone()))
                .unwrap_or((Duration::ZERO, Ok(String::new())));

            tokio::time::sleep(delay).await;
            outcome.map(|text| ModelReply { text })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::ScriptedClient;
    use super::*;
    use crate::credentials::memory::MemoryCredentialStore;
    use crate::sinks::memory::{MemoryLog, RecordingSink};

    fn session(client: Arc<ScriptedClient>, key: Option<&str>) -> Session {
        let credentials = match key {
            Some(key) => MemoryCredentialStore::with_key(key),
            None => MemoryCredentialStore::default(),
        };
        Session::new(Settings::default(), Arc::new(credentials), client)
    }

    #[tokio::test]
    async fn test_generate_structured_result_records_snippet() {
        let client = Arc::new(
            ScriptedClient::default().reply("Rotate", r#"{"code":"A","explanation":"spins"}"#),
        );
        let mut session = session(client.clone(), Some("key"));

        let result = session
            .generate(GenerationRequest::new(Mode::Code, "Rotate a cube", None))
            .await
            .unwrap();

        assert_eq!(result.code().unwrap().code, "A");
        assert_eq!(session.last_snippet(), Some("A"));
        assert!(client.prompts.lock().unwrap()[0].contains("Request:\nRotate a cube"));
    }

    #[tokio::test]
    async fn test_raw_result_keeps_previous_snippet() {
        let client = Arc::new(
            ScriptedClient::default()
                .reply("first", r#"{"fixed_code":"B"}"#)
                .reply("second", "Sorry, I cannot help with that."),
        );
        let mut session = session(client, Some("key"));

        session
            .generate(GenerationRequest::new(Mode::Debug, "first", None))
            .await
            .unwrap();
        let result = session
            .generate(GenerationRequest::new(Mode::Code, "second", None))
            .await
            .unwrap();

        assert_eq!(
            result,
            GenerationResult::Raw("Sorry, I cannot help with that.".to_string())
        );
        assert_eq!(session.last_snippet(), Some("B"));
    }

    #[tokio::test]
    async fn test_missing_credential_aborts_before_the_model() {
        let client = Arc::new(ScriptedClient::default());
        let mut session = session(client.clone(), None);

        let err = session
            .generate(GenerationRequest::new(Mode::Plan, "Build a level", None))
            .await
            .unwrap_err();

        assert_eq!(err, Error::CredentialMissing);
        assert_eq!(client.calls(), 0);
        assert_eq!(session.last_snippet(), None);
    }

    #[tokio::test]
    async fn test_credential_is_read_at_call_time() {
        let client = Arc::new(ScriptedClient::default().reply("x", "{}"));
        let credentials = Arc::new(MemoryCredentialStore::default());
        let mut session = Session::new(Settings::default(), credentials.clone(), client);

        let pending = session.start(GenerationRequest::new(Mode::Code, "x", None));
        credentials.set("late-key").unwrap();

        assert!(pending.future.await.is_ok());
    }

    #[tokio::test]
    async fn test_stale_outcome_is_discarded() {
        let client = Arc::new(
            ScriptedClient::default()
                .reply("old", r#"{"code":"OLD"}"#)
                .reply("new", r#"{"code":"NEW"}"#),
        );
        let mut session = session(client, Some("key"));

        let old = session.start(GenerationRequest::new(Mode::Code, "old", None));
        let new = session.start(GenerationRequest::new(Mode::Code, "new", None));

        let new_outcome = new.future.await;
        let old_outcome = old.future.await;

        assert!(session.finish(new.ticket, new_outcome).is_some());
        assert!(session.finish(old.ticket, old_outcome).is_none());
        assert_eq!(session.last_snippet(), Some("NEW"));
    }

    #[tokio::test]
    async fn test_settle_reports_superseded_request() {
        let client = Arc::new(ScriptedClient::default().reply("old", r#"{"code":"OLD"}"#));
        let mut session = session(client, Some("key"));

        let old = session.start(GenerationRequest::new(Mode::Code, "old", None));
        let _new = session.start(GenerationRequest::new(Mode::Code, "new", None));
        let outcome = old.future.await;

        assert_eq!(session.settle(old.ticket, outcome), Err(Error::Superseded));
        assert_eq!(session.last_snippet(), None);
    }

    #[tokio::test]
    async fn test_insert_last_is_idempotent_and_warns_when_empty() {
        let client = Arc::new(ScriptedClient::default().reply("x", r#"{"code":"let a = 1;"}"#));
        let mut session = session(client, Some("key"));
        let mut sink = RecordingSink::default();

        assert!(!session.insert_last(&mut sink).unwrap());
        assert_eq!(sink.warnings, vec![EMPTY_SLOT_WARNING.to_string()]);

        session
            .generate(GenerationRequest::new(Mode::Code, "x", None))
            .await
            .unwrap();

        assert!(session.insert_last(&mut sink).unwrap());
        assert!(session.insert_last(&mut sink).unwrap());
        assert_eq!(sink.inserted, vec!["let a = 1;", "let a = 1;"]);
    }

    #[tokio::test]
    async fn test_explain_logs_debug_report() {
        let client = Arc::new(ScriptedClient::default().reply(
            "NullReferenceException",
            r#"{"cause":"cube is null","fix":"assign it","fixed_code":"cube = GetComponent<Cube>();"}"#,
        ));
        let mut session = session(client.clone(), Some("key"));
        let mut sink = RecordingSink::default();
        let mut log = MemoryLog::default();

        session
            .explain("NullReferenceException at Update()", &mut sink, &mut log)
            .await
            .unwrap();

        assert_eq!(
            log.entries,
            vec!["Cause: cube is null\n\nFix: assign it\n\n\nCorrected code:\ncube = GetComponent<Cube>();"]
        );
        assert_eq!(sink.notices, vec![DEBUG_READY_NOTICE.to_string()]);
        assert_eq!(session.last_snippet(), Some("cube = GetComponent<Cube>();"));
        assert!(client.prompts.lock().unwrap()[0].contains("Error:\nNullReferenceException at Update()"));
    }

    #[tokio::test]
    async fn test_explain_logs_raw_text() {
        let client = Arc::new(ScriptedClient::default().reply("oops", "It is a typo."));
        let mut session = session(client, Some("key"));
        let mut sink = RecordingSink::default();
        let mut log = MemoryLog::default();

        session.explain("oops", &mut sink, &mut log).await.unwrap();

        assert_eq!(log.entries, vec!["It is a typo."]);
        assert!(sink.notices.is_empty());
    }

    #[tokio::test]
    async fn test_explain_empty_selection_warns_without_request() {
        let client = Arc::new(ScriptedClient::default());
        let mut session = session(client.clone(), Some("key"));
        let mut sink = RecordingSink::default();
        let mut log = MemoryLog::default();

        session.explain("  \n", &mut sink, &mut log).await.unwrap();

        assert_eq!(sink.warnings, vec![EMPTY_SELECTION_WARNING.to_string()]);
        assert!(log.entries.is_empty());
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_explain_propagates_api_errors() {
        let client = Arc::new(ScriptedClient::default().fail(
            "boom",
            Error::DownstreamApi {
                status: 429,
                status_text: "Too Many Requests".to_string(),
                details: "quota".to_string(),
            },
        ));
        let mut session = session(client, Some("key"));
        let mut sink = RecordingSink::default();
        let mut log = MemoryLog::default();

        let err = session.explain("boom", &mut sink, &mut log).await.unwrap_err();

        assert!(err.to_string().contains("429"));
        assert!(log.entries.is_empty());
    }

    #[tokio::test]
    async fn test_ask_returns_plain_text() {
        let client = Arc::new(ScriptedClient::default().reply("How do I anchor?", "Use ARAnchorManager."));
        let session = session(client.clone(), Some("key"));

        let answer = session
            .ask("How do I anchor?", Some("ARFoundation docs"))
            .await
            .unwrap();

        assert_eq!(answer, "Use ARAnchorManager.");
        assert!(client.prompts.lock().unwrap()[0].contains("ARFoundation docs"));
    }
}
