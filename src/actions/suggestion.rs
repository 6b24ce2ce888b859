//! Spending-profile suggestion from the `suggestion` endpoint

use super::{Action, TurnContext};
use crate::backend::FinanceApi;
use crate::dispatcher::CollectingDispatcher;
use crate::models::{Domain, Endpoint, Event, Tracker};
use crate::Result;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

const UNKNOWN_USER_TYPE: &str = "Unknown";
const NO_SUGGESTION: &str = "No suggestion available";
const APOLOGY: &str = "Unable to fetch suggestions right now.";

pub struct GetSuggestionsAction {
    backend: Arc<dyn FinanceApi>,
    default_token: Arc<str>,
}

impl GetSuggestionsAction {
    pub fn new(backend: Arc<dyn FinanceApi>, default_token: Arc<str>) -> Self {
        Self {
            backend,
            default_token,
        }
    }
}

fn render(data: &Value) -> String {
    let user_type = data
        .get("userType")
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_USER_TYPE);
    let suggestion = data
        .get("suggestion")
        .and_then(Value::as_str)
        .unwrap_or(NO_SUGGESTION);

    format!("User type: {}. {}", user_type, suggestion)
}

#[async_trait::async_trait]
impl Action for GetSuggestionsAction {
    fn name(&self) -> &'static str {
        "action_get_suggestions"
    }

    async fn run(
        &self,
        dispatcher: &mut CollectingDispatcher,
        tracker: &Tracker,
        _domain: &Domain,
    ) -> Result<Vec<Event>> {
        let ctx = TurnContext::resolve(tracker, &self.default_token);
        info!(period = %ctx.period, "Fetching suggestions");

        match self
            .backend
            .fetch(Endpoint::Suggestion, &ctx.user_id, &ctx.period, &ctx.token)
            .await
        {
            Ok(data) => dispatcher.utter_message(render(&data)),
            Err(e) => {
                error!(error = %e, "Failed to fetch suggestions");
                dispatcher.utter_message(APOLOGY);
            }
        }

        Ok(vec![])
    }
}
