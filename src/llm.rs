//! Local language-model bridge
//!
//! Runs the `ollama` CLI for an answer and forwards each exchange to the
//! logging endpoint on a detached task.

use crate::config::ActionServerConfig;
use crate::error::CliError;
use crate::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

/// Seam for producing a model answer
#[async_trait::async_trait]
pub trait ModelRunner: Send + Sync {
    async fn ask(&self, message: &str) -> std::result::Result<String, CliError>;
}

/// Invokes `<bin> run <model> <message>` and waits for it to exit
pub struct OllamaCli {
    program: String,
    model: String,
}

impl OllamaCli {
    pub fn new(program: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            model: model.into(),
        }
    }

    pub fn from_config(config: &ActionServerConfig) -> Self {
        Self::new(config.ollama_bin.clone(), config.model.clone())
    }
}

#[async_trait::async_trait]
impl ModelRunner for OllamaCli {
    async fn ask(&self, message: &str) -> std::result::Result<String, CliError> {
        info!(program = %self.program, model = %self.model, "Running model CLI");

        let output = Command::new(&self.program)
            .arg("run")
            .arg(&self.model)
            .arg(message)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => CliError::NotFound(self.program.clone()),
                _ => CliError::Spawn {
                    program: self.program.clone(),
                    source: e,
                },
            })?;

        if !output.status.success() {
            return Err(CliError::NonZeroExit {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

//
// ================= Exchange Logging =================
//

/// One question/answer pair sent to the logging endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExchangeRecord {
    pub query: String,
    pub answer: String,
    pub intent: Option<String>,
}

/// Fire-and-forget sink. `submit` must return without waiting on delivery.
pub trait ExchangeSink: Send + Sync {
    fn submit(&self, record: ExchangeRecord);
}

/// Posts exchanges to `MERN_API_URL` from a spawned task
pub struct HttpExchangeLogger {
    client: Client,
    url: String,
}

impl HttpExchangeLogger {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn from_config(config: &ActionServerConfig) -> Result<Self> {
        Self::new(config.mern_api_url.clone(), config.log_timeout)
    }
}

impl ExchangeSink for HttpExchangeLogger {
    fn submit(&self, record: ExchangeRecord) {
        if self.url.is_empty() {
            return;
        }

        let client = self.client.clone();
        let url = self.url.clone();

        tokio::spawn(async move {
            match client.post(&url).json(&record).send().await {
                Ok(response) => debug!(status = response.status().as_u16(), "Exchange logged"),
                Err(e) => debug!(error = %e, "Exchange logging failed"),
            }
        });
    }
}
