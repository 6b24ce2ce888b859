//! Income, expense and balance lookups against the `summary` endpoint

use super::{format_amount, Action, TurnContext};
use crate::backend::FinanceApi;
use crate::dispatcher::CollectingDispatcher;
use crate::models::{Domain, Endpoint, Event, Tracker};
use crate::Result;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryKind {
    Income,
    Expense,
    Balance,
}

impl SummaryKind {
    fn action_name(&self) -> &'static str {
        match self {
            SummaryKind::Income => "action_check_income",
            SummaryKind::Expense => "action_check_expense",
            SummaryKind::Balance => "action_check_balance",
        }
    }

    fn apology(&self) -> &'static str {
        match self {
            SummaryKind::Income => "Sorry, I couldn't fetch your income.",
            SummaryKind::Expense => "Sorry, I couldn't fetch your expenses.",
            SummaryKind::Balance => "Sorry, I couldn't fetch your balance.",
        }
    }

    fn reply(&self, ctx: &TurnContext, data: &Value) -> String {
        match self {
            SummaryKind::Income => format!(
                "Your total income for {} is ₹{}.",
                ctx.period,
                format_amount(data, "income")
            ),
            SummaryKind::Expense => format!(
                "Your total expense for {} is ₹{}.",
                ctx.period,
                format_amount(data, "expense")
            ),
            SummaryKind::Balance => format!(
                "💰 For {}, income ₹{}, expense ₹{}, balance ₹{}.",
                ctx.period,
                format_amount(data, "income"),
                format_amount(data, "expense"),
                format_amount(data, "balance")
            ),
        }
    }
}

pub struct SummaryAction {
    kind: SummaryKind,
    backend: Arc<dyn FinanceApi>,
    default_token: Arc<str>,
}

impl SummaryAction {
    pub fn new(kind: SummaryKind, backend: Arc<dyn FinanceApi>, default_token: Arc<str>) -> Self {
        Self {
            kind,
            backend,
            default_token,
        }
    }
}

#[async_trait::async_trait]
impl Action for SummaryAction {
    fn name(&self) -> &'static str {
        self.kind.action_name()
    }

    async fn run(
        &self,
        dispatcher: &mut CollectingDispatcher,
        tracker: &Tracker,
        _domain: &Domain,
    ) -> Result<Vec<Event>> {
        let ctx = TurnContext::resolve(tracker, &self.default_token);
        info!(action = self.name(), period = %ctx.period, "Fetching summary");

        match self
            .backend
            .fetch(Endpoint::Summary, &ctx.user_id, &ctx.period, &ctx.token)
            .await
        {
            Ok(data) => dispatcher.utter_message(self.kind.reply(&ctx, &data)),
            Err(e) => {
                error!(action = self.name(), error = %e, "Failed to fetch summary");
                dispatcher.utter_message(self.kind.apology());
            }
        }

        Ok(vec![])
    }
}
