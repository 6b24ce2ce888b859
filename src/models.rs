//! Core data models exchanged with the conversational framework

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// Domain description sent along with each invocation. Actions only pass it through.
pub type Domain = Value;

//
// ================= Tracker =================
//

/// Read-only view of the conversation state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tracker {
    pub sender_id: String,
    #[serde(default)]
    pub slots: HashMap<String, Value>,
    #[serde(default)]
    pub latest_message: LatestMessage,
    #[serde(default)]
    pub latest_action_name: Option<String>,
    #[serde(default)]
    pub events: Vec<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LatestMessage {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub intent: Option<Intent>,
    #[serde(default)]
    pub entities: Vec<Value>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Intent {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

impl Tracker {
    pub fn get_slot(&self, name: &str) -> Option<&Value> {
        self.slots.get(name).filter(|v| !v.is_null())
    }

    /// Slot value as a non-empty string
    pub fn slot_str(&self, name: &str) -> Option<&str> {
        self.get_slot(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Latest-message metadata value as a non-empty string
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.latest_message
            .metadata
            .as_ref()
            .and_then(|m| m.get(key))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn latest_text(&self) -> Option<&str> {
        self.latest_message
            .text
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }

    pub fn latest_intent_name(&self) -> Option<&str> {
        self.latest_message
            .intent
            .as_ref()
            .and_then(|i| i.name.as_deref())
    }
}

//
// ================= Events =================
//

/// State-mutation events returned to the framework
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum Event {
    #[serde(rename = "slot")]
    SlotSet {
        name: String,
        value: Value,
        #[serde(default)]
        timestamp: Option<f64>,
    },
}

impl Event {
    pub fn slot_set(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Event::SlotSet {
            name: name.into(),
            value: value.into(),
            timestamp: None,
        }
    }
}

//
// ================= Bot Messages =================
//

/// A single reply emitted through the dispatcher
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BotMessage {
    pub text: Option<String>,
    #[serde(default)]
    pub buttons: Vec<Value>,
    #[serde(default)]
    pub elements: Vec<Value>,
    #[serde(default)]
    pub custom: Map<String, Value>,
    pub image: Option<String>,
    pub attachment: Option<Value>,
    pub response: Option<String>,
}

impl BotMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn custom(custom: Map<String, Value>) -> Self {
        Self {
            custom,
            ..Default::default()
        }
    }
}

//
// ================= Webhook I/O =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionCall {
    pub next_action: String,
    #[serde(default)]
    pub sender_id: Option<String>,
    pub tracker: Tracker,
    #[serde(default)]
    pub domain: Domain,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    pub events: Vec<Event>,
    pub responses: Vec<BotMessage>,
}

//
// ================= Backend Endpoints =================
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Summary,
    Suggestion,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Summary => "summary",
            Endpoint::Suggestion => "suggestion",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}
