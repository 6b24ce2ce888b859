//! Action trait and registry
//!
//! Each action handles one intent: it resolves the turn context, calls
//! one collaborator and emits a reply. Collaborator failures never leave
//! the action; they become a user-facing message.

use crate::backend::{BackendClient, FinanceApi};
use crate::config::ActionServerConfig;
use crate::context::{resolve_period, resolve_token, Period, PERIOD_SLOT};
use crate::dispatcher::CollectingDispatcher;
use crate::llm::{HttpExchangeLogger, OllamaCli};
use crate::models::{Domain, Event, Tracker};
use crate::Result;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

pub mod ollama;
pub mod redirect;
pub mod suggestion;
pub mod summary;

pub use ollama::AskOllamaAction;
pub use redirect::AddTransactionAction;
pub use suggestion::GetSuggestionsAction;
pub use summary::{SummaryAction, SummaryKind};

/// A single webhook-invoked action
#[async_trait::async_trait]
pub trait Action: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(
        &self,
        dispatcher: &mut CollectingDispatcher,
        tracker: &Tracker,
        domain: &Domain,
    ) -> Result<Vec<Event>>;
}

/// Action registry for looking up actions by name
pub struct ActionRegistry {
    actions: HashMap<String, Arc<dyn Action>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
        }
    }

    pub fn register(&mut self, action: Arc<dyn Action>) {
        self.actions.insert(action.name().to_string(), action);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Action>> {
        self.actions.get(name).cloned()
    }

    /// Registered action names, sorted
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.actions.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-turn inputs shared by the backend-backed actions
#[derive(Debug, Clone, PartialEq)]
pub struct TurnContext {
    pub user_id: String,
    pub period: Period,
    pub token: String,
}

impl TurnContext {
    pub fn resolve(tracker: &Tracker, default_token: &str) -> Self {
        Self {
            user_id: tracker.sender_id.clone(),
            period: resolve_period(tracker.slot_str(PERIOD_SLOT)),
            token: resolve_token(tracker, default_token),
        }
    }
}

/// Render a numeric payload field; absent or null renders as `0`
pub(crate) fn format_amount(data: &Value, key: &str) -> String {
    match data.get(key) {
        None | Some(Value::Null) => "0".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Create the registry with every finance action wired to live collaborators.
pub fn create_default_registry(config: &ActionServerConfig) -> Result<ActionRegistry> {
    let backend: Arc<dyn FinanceApi> = Arc::new(BackendClient::from_config(config)?);
    let default_token: Arc<str> = Arc::from(config.default_token.as_str());

    let mut registry = ActionRegistry::new();

    for kind in [SummaryKind::Income, SummaryKind::Expense, SummaryKind::Balance] {
        registry.register(Arc::new(SummaryAction::new(
            kind,
            backend.clone(),
            default_token.clone(),
        )));
    }
    registry.register(Arc::new(GetSuggestionsAction::new(
        backend,
        default_token,
    )));
    registry.register(Arc::new(AddTransactionAction));
    registry.register(Arc::new(AskOllamaAction::new(
        Arc::new(OllamaCli::from_config(config)),
        Arc::new(HttpExchangeLogger::from_config(config)?),
    )));

    Ok(registry)
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared doubles for action tests

    use super::*;
    use crate::error::ActionServerError;
    use crate::models::Endpoint;
    use std::sync::Mutex;

    /// Records each call and answers with a fixed payload, or fails
    pub struct StubFinanceApi {
        response: Option<Value>,
        pub calls: Mutex<Vec<(Endpoint, String, String, String)>>,
    }

    impl StubFinanceApi {
        pub fn ok(response: Value) -> Self {
            Self {
                response: Some(response),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn failing() -> Self {
            Self {
                response: None,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl FinanceApi for StubFinanceApi {
        async fn fetch(
            &self,
            endpoint: Endpoint,
            user_id: &str,
            period: &Period,
            token: &str,
        ) -> Result<Value> {
            self.calls.lock().unwrap().push((
                endpoint,
                user_id.to_string(),
                period.to_string(),
                token.to_string(),
            ));

            self.response.clone().ok_or_else(|| ActionServerError::BackendStatus {
                endpoint: endpoint.to_string(),
                status: 503,
                body: "unavailable".to_string(),
            })
        }
    }

    pub fn tracker(period: Option<&str>) -> Tracker {
        let mut tracker = Tracker {
            sender_id: "user-42".to_string(),
            ..Default::default()
        };
        if let Some(period) = period {
            tracker
                .slots
                .insert(PERIOD_SLOT.to_string(), Value::from(period));
        }
        tracker
    }

    pub fn texts(dispatcher: &CollectingDispatcher) -> Vec<String> {
        dispatcher
            .messages()
            .iter()
            .filter_map(|m| m.text.clone())
            .collect()
    }
}
