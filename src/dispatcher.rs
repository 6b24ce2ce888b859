//! Collects the replies an action emits during one turn

use crate::models::BotMessage;
use serde_json::{Map, Value};

#[derive(Debug, Default)]
pub struct CollectingDispatcher {
    messages: Vec<BotMessage>,
}

impl CollectingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn utter_message(&mut self, text: impl Into<String>) {
        self.messages.push(BotMessage::text(text));
    }

    /// Structured (non-text) message, delivered in the `custom` field
    pub fn utter_custom(&mut self, custom: Map<String, Value>) {
        self.messages.push(BotMessage::custom(custom));
    }

    pub fn messages(&self) -> &[BotMessage] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<BotMessage> {
        self.messages
    }
}
