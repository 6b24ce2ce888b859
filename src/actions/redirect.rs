//! Sends the client to the add-transaction page

use super::Action;
use crate::dispatcher::CollectingDispatcher;
use crate::models::{Domain, Event, Tracker};
use crate::Result;
use serde_json::{Map, Value};

pub const ADD_TRANSACTION_PATH: &str = "/add-transaction";

pub struct AddTransactionAction;

#[async_trait::async_trait]
impl Action for AddTransactionAction {
    fn name(&self) -> &'static str {
        "action_add_transaction"
    }

    async fn run(
        &self,
        dispatcher: &mut CollectingDispatcher,
        _tracker: &Tracker,
        _domain: &Domain,
    ) -> Result<Vec<Event>> {
        dispatcher.utter_message("Redirecting you to the Add Transaction page...");

        let mut hint = Map::new();
        hint.insert("redirect".to_string(), Value::from(ADD_TRANSACTION_PATH));
        dispatcher.utter_custom(hint);

        Ok(vec![])
    }
}
