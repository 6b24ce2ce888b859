//! Answers free-form questions with a local model

use super::Action;
use crate::dispatcher::CollectingDispatcher;
use crate::error::CliError;
use crate::llm::{ExchangeRecord, ExchangeSink, ModelRunner};
use crate::models::{Domain, Event, Tracker};
use crate::Result;
use std::sync::Arc;
use tracing::{info, warn};

pub const LAST_MESSAGE_SLOT: &str = "last_user_message";

const NO_MESSAGE: &str = "Sorry, I didn't receive any message to answer.";
const CLI_NOT_FOUND: &str =
    "⚠️ Ollama CLI not found. Please install Ollama and make sure it is on PATH.";

pub struct AskOllamaAction {
    runner: Arc<dyn ModelRunner>,
    sink: Arc<dyn ExchangeSink>,
}

impl AskOllamaAction {
    pub fn new(runner: Arc<dyn ModelRunner>, sink: Arc<dyn ExchangeSink>) -> Self {
        Self { runner, sink }
    }
}

/// Turn a CLI outcome into the text shown to the user
fn answer_text(outcome: std::result::Result<String, CliError>) -> String {
    match outcome {
        Ok(answer) => answer,
        Err(CliError::NonZeroExit { stderr, status, .. }) => {
            let detail = if stderr.is_empty() { status } else { stderr };
            format!("⚠️ Error from model: {}", detail)
        }
        Err(CliError::NotFound(_)) => CLI_NOT_FOUND.to_string(),
        Err(e @ CliError::Spawn { .. }) => format!("⚠️ Error running model: {}", e),
    }
}

#[async_trait::async_trait]
impl Action for AskOllamaAction {
    fn name(&self) -> &'static str {
        "action_ask_ollama"
    }

    async fn run(
        &self,
        dispatcher: &mut CollectingDispatcher,
        tracker: &Tracker,
        _domain: &Domain,
    ) -> Result<Vec<Event>> {
        let Some(message) = tracker.latest_text() else {
            dispatcher.utter_message(NO_MESSAGE);
            return Ok(vec![]);
        };

        let outcome = self.runner.ask(message).await;
        if let Err(e) = &outcome {
            warn!(error = %e, "Model CLI failed");
        }

        let answer = answer_text(outcome);
        info!(answer_len = answer.len(), "Model answered");
        dispatcher.utter_message(answer.clone());

        self.sink.submit(ExchangeRecord {
            query: message.to_string(),
            answer,
            intent: tracker.latest_intent_name().map(str::to_string),
        });

        Ok(vec![Event::slot_set(LAST_MESSAGE_SLOT, message)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::testing::texts;
    use crate::llm::OllamaCli;
    use crate::models::Intent;
    use std::sync::Mutex;

    enum Scripted {
        Answer(&'static str),
        Exit(&'static str),
        Missing,
    }

    struct ScriptedRunner(Scripted);

    #[async_trait::async_trait]
    impl ModelRunner for ScriptedRunner {
        async fn ask(&self, _message: &str) -> std::result::Result<String, CliError> {
            match &self.0 {
                Scripted::Answer(a) => Ok(a.to_string()),
                Scripted::Exit(stderr) => Err(CliError::NonZeroExit {
                    program: "ollama".to_string(),
                    status: "exit status: 1".to_string(),
                    stderr: stderr.to_string(),
                }),
                Scripted::Missing => Err(CliError::NotFound("ollama".to_string())),
            }
        }
    }

    #[derive(Default)]
    struct RecordingSink(Mutex<Vec<ExchangeRecord>>);

    impl ExchangeSink for RecordingSink {
        fn submit(&self, record: ExchangeRecord) {
            self.0.lock().unwrap().push(record);
        }
    }

    fn tracker(text: Option<&str>) -> Tracker {
        let mut tracker = Tracker {
            sender_id: "user-42".to_string(),
            ..Default::default()
        };
        tracker.latest_message.text = text.map(str::to_string);
        tracker.latest_message.intent = Some(Intent {
            name: Some("ask_general".to_string()),
            confidence: Some(0.8),
        });
        tracker
    }

    async fn run(
        runner: Arc<dyn ModelRunner>,
        text: Option<&str>,
    ) -> (Vec<String>, Vec<Event>, Vec<ExchangeRecord>) {
        let sink = Arc::new(RecordingSink::default());
        let action = AskOllamaAction::new(runner, sink.clone());
        let mut dispatcher = CollectingDispatcher::new();
        let events = action
            .run(&mut dispatcher, &tracker(text), &Domain::Null)
            .await
            .unwrap();
        let records = sink.0.lock().unwrap().clone();
        (texts(&dispatcher), events, records)
    }

    #[tokio::test]
    async fn test_answer_is_replied_and_logged() {
        let runner = Arc::new(ScriptedRunner(Scripted::Answer("Budget 50/30/20.")));
        let (replies, events, records) = run(runner, Some("how should I budget?")).await;

        assert_eq!(replies, vec!["Budget 50/30/20.".to_string()]);
        assert_eq!(
            events,
            vec![Event::slot_set(LAST_MESSAGE_SLOT, "how should I budget?")]
        );
        assert_eq!(
            records,
            vec![ExchangeRecord {
                query: "how should I budget?".to_string(),
                answer: "Budget 50/30/20.".to_string(),
                intent: Some("ask_general".to_string()),
            }]
        );
    }

    #[tokio::test]
    async fn test_non_zero_exit_surfaces_stderr() {
        let runner = Arc::new(ScriptedRunner(Scripted::Exit("model not found")));
        let (replies, events, _) = run(runner, Some("hello")).await;

        assert_eq!(replies.len(), 1);
        assert!(replies[0].contains("model not found"));
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_cli_still_records_message() {
        let runner = Arc::new(ScriptedRunner(Scripted::Missing));
        let (replies, events, _) = run(runner, Some("hello")).await;

        assert_eq!(replies, vec![CLI_NOT_FOUND.to_string()]);
        assert_eq!(events, vec![Event::slot_set(LAST_MESSAGE_SLOT, "hello")]);
    }

    #[tokio::test]
    async fn test_missing_cli_with_real_runner() {
        let runner = Arc::new(OllamaCli::new("definitely-not-an-installed-binary-9f3a", "llama3"));
        let (replies, events, _) = run(runner, Some("hello")).await;

        assert_eq!(replies, vec![CLI_NOT_FOUND.to_string()]);
        assert_eq!(events, vec![Event::slot_set(LAST_MESSAGE_SLOT, "hello")]);
    }

    #[tokio::test]
    async fn test_no_message_short_circuits() {
        let runner = Arc::new(ScriptedRunner(Scripted::Answer("unused")));
        let (replies, events, records) = run(runner, None).await;

        assert_eq!(replies, vec![NO_MESSAGE.to_string()]);
        assert!(events.is_empty());
        assert!(records.is_empty());
    }

    #[test]
    fn test_empty_stderr_falls_back_to_status() {
        let text = answer_text(Err(CliError::NonZeroExit {
            program: "ollama".to_string(),
            status: "exit status: 2".to_string(),
            stderr: String::new(),
        }));
        assert_eq!(text, "⚠️ Error from model: exit status: 2");
    }
}
