//! Ollama client used to synthesize SPARQL for questions no template covers.
//!
//! The LLM is only consulted on a template miss. Everything else in the
//! pipeline (classification, sanitizing, validation) is deterministic.

use std::time::Duration;

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

use crate::transport::{self, Failure};

/// Errors from the LLM subsystem.
#[derive(Debug, Error, Diagnostic)]
pub enum LlmError {
    #[error("Ollama is not available at {url}")]
    #[diagnostic(
        code(smartcity::llm::unavailable),
        help("Start Ollama with `ollama serve`, or set SMARTCITY_LLM_ENABLED=false to answer from templates only.")
    )]
    Unavailable { url: String },

    #[error("Ollama request failed: {message}")]
    #[diagnostic(
        code(smartcity::llm::request_failed),
        help("Check that Ollama is running and the model is pulled (`ollama pull codellama:7b`).")
    )]
    RequestFailed { message: String },

    #[error("Failed to parse Ollama response: {message}")]
    #[diagnostic(
        code(smartcity::llm::parse_error),
        help("The model returned an unexpected response format.")
    )]
    ParseError { message: String },

    #[error("Ollama request timed out after {timeout_secs}s")]
    #[diagnostic(
        code(smartcity::llm::timeout),
        help("Increase SMARTCITY_LLM_TIMEOUT_SECS or use a smaller model.")
    )]
    Timeout { timeout_secs: u64 },
}

/// Configuration for the Ollama client.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Base URL for the Ollama API.
    pub base_url: String,
    /// Model name to use.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".into(),
            model: "codellama:7b".into(),
            timeout_secs: 90,
        }
    }
}

/// Sampling options sent with every generation request.
///
/// Defaults favor near-deterministic output, since the task is structured
/// query generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub top_p: f32,
    pub num_predict: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            top_p: 0.9,
            num_predict: 500,
        }
    }
}

/// A prompt-completion backend.
pub trait TextGenerator: Send + Sync {
    /// One completion, no retries.
    fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String, LlmError>;

    /// Model identifier, for logging.
    fn model(&self) -> &str;
}

/// Result of [`OllamaClient::probe`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProbeReport {
    /// Whether `/api/tags` answered 200.
    pub available: bool,
    /// Models available locally.
    pub models: Vec<String>,
    /// Whether the configured model is among them.
    pub model_available: bool,
    /// Failure description when not available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Client for the Ollama REST API.
pub struct OllamaClient {
    config: OllamaConfig,
}

impl OllamaClient {
    /// Create a new Ollama client with the given configuration.
    pub fn new(config: OllamaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    /// Probe the Ollama server.
    ///
    /// Sends a lightweight request to `/api/tags` with a short timeout and
    /// parses the list of locally available models.
    pub fn probe(&self) -> ProbeReport {
        let url = format!("{}/api/tags", self.config.base_url);
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(5))
            .build();

        match agent.get(&url).call() {
            Ok(resp) => {
                let models: Vec<String> = resp
                    .into_json::<serde_json::Value>()
                    .ok()
                    .and_then(|json| {
                        json["models"].as_array().map(|arr| {
                            arr.iter()
                                .filter_map(|m| m["name"].as_str().map(|s| s.to_string()))
                                .collect()
                        })
                    })
                    .unwrap_or_default();
                let model_available = has_model(&models, &self.config.model);
                ProbeReport {
                    available: true,
                    models,
                    model_available,
                    error: None,
                }
            }
            Err(e) => ProbeReport {
                error: Some(e.to_string()),
                ..ProbeReport::default()
            },
        }
    }

    fn map_failure(&self, err: ureq::Error) -> LlmError {
        match transport::classify(err) {
            Failure::Timeout => LlmError::Timeout {
                timeout_secs: self.config.timeout_secs,
            },
            Failure::Unreachable => LlmError::Unavailable {
                url: self.config.base_url.clone(),
            },
            Failure::Status { code, body } => LlmError::RequestFailed {
                message: format!("server returned status {code}: {}", body.trim()),
            },
            Failure::Other(message) => LlmError::RequestFailed { message },
        }
    }
}

/// Whether `target` is among `models`, with or without a tag suffix.
fn has_model(models: &[String], target: &str) -> bool {
    models
        .iter()
        .any(|m| m == target || m.split(':').next() == Some(target))
}

impl TextGenerator for OllamaClient {
    fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.config.base_url);
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .build();

        let body = serde_json::json!({
            "model": self.config.model,
            "prompt": prompt,
            "stream": false,
            "options": options,
        });

        let body_str = serde_json::to_string(&body).map_err(|e| LlmError::RequestFailed {
            message: format!("JSON serialize error: {e}"),
        })?;

        let resp = agent
            .post(&url)
            .set("Content-Type", "application/json")
            .send_string(&body_str)
            .map_err(|e| self.map_failure(e))?;

        let resp_str = resp.into_string().map_err(|e| {
            if transport::io_timed_out(&e) {
                LlmError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                }
            } else {
                LlmError::ParseError {
                    message: e.to_string(),
                }
            }
        })?;

        let json: serde_json::Value =
            serde_json::from_str(&resp_str).map_err(|e| LlmError::ParseError {
                message: e.to_string(),
            })?;

        json["response"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| LlmError::ParseError {
                message: "missing 'response' field".into(),
            })
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

impl std::fmt::Debug for OllamaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaClient")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .field("timeout_secs", &self.config.timeout_secs)
            .finish()
    }
}
