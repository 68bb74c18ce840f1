//! Question answering pipeline.
//!
//! question → classify → template (instantiate) or model (synthesize →
//! sanitize → repair) → validate → execute → format. At most one fallback
//! per request: any model failure or refused query is replaced by the
//! deterministic query from [`crate::fallback`].

use std::fmt;
use std::sync::Arc;

use miette::Diagnostic;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::error::{CatalogError, StoreError};
use crate::fallback::fallback_query;
use crate::intent::{self, IntentMatch};
use crate::llm::{LlmError, TextGenerator};
use crate::ontology::OntologySchema;
use crate::results::ResultRecord;
use crate::sanitize::sanitize_for_question;
use crate::store::TripleStore;
use crate::synth::synthesize;
use crate::template::instantiate;
use crate::validate::{InvalidReason, validate};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures surfaced to the caller of [`QueryPipeline::ask`].
#[derive(Debug, Error, Diagnostic)]
pub enum AskError {
    #[error("question is empty")]
    #[diagnostic(
        code(smartcity::ask::empty_question),
        help("Send a non-empty `question` field, e.g. \"Quel est le trajet de Wala?\".")
    )]
    EmptyQuestion,

    #[error("query execution failed: {source}")]
    #[diagnostic(
        code(smartcity::ask::execution),
        help("The triple store could not run the query. The attempted query is attached to the error.")
    )]
    Execution {
        query: String,
        #[source]
        source: StoreError,
    },
}

impl AskError {
    /// The query that was attempted, when one was built.
    pub fn query(&self) -> Option<&str> {
        match self {
            Self::EmptyQuestion => None,
            Self::Execution { query, .. } => Some(query),
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// Which path produced the executed query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuerySource {
    /// A catalog template.
    Template,
    /// The model path, including its deterministic fallback.
    Ia,
}

/// Why the model path was replaced by the fallback query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// No generator configured.
    LlmDisabled,
    LlmUnavailable,
    LlmTimeout,
    /// The model answered with an error status or an unreadable body.
    LlmFailed,
    /// The sanitized model output was refused by the validator.
    InvalidQuery(InvalidReason),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LlmDisabled => f.write_str("llm_disabled"),
            Self::LlmUnavailable => f.write_str("llm_unavailable"),
            Self::LlmTimeout => f.write_str("llm_timeout"),
            Self::LlmFailed => f.write_str("llm_failed"),
            Self::InvalidQuery(reason) => {
                let reason = serde_json::to_value(reason)
                    .ok()
                    .and_then(|v| v.as_str().map(str::to_string))
                    .unwrap_or_default();
                write!(f, "invalid_query:{reason}")
            }
        }
    }
}

impl Serialize for FallbackReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<&LlmError> for FallbackReason {
    fn from(err: &LlmError) -> Self {
        match err {
            LlmError::Unavailable { .. } => Self::LlmUnavailable,
            LlmError::Timeout { .. } => Self::LlmTimeout,
            LlmError::RequestFailed { .. } | LlmError::ParseError { .. } => Self::LlmFailed,
        }
    }
}

/// The query chosen for a question, before execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineOutcome {
    pub query: String,
    pub source: QuerySource,
    pub degraded: bool,
    pub fallback_reason: Option<FallbackReason>,
    /// Catalog key, when a template was used.
    pub template_key: Option<&'static str>,
}

impl PipelineOutcome {
    fn template(query: String, key: &'static str) -> Self {
        Self {
            query,
            source: QuerySource::Template,
            degraded: false,
            fallback_reason: None,
            template_key: Some(key),
        }
    }

    fn generated(query: String) -> Self {
        Self {
            query,
            source: QuerySource::Ia,
            degraded: false,
            fallback_reason: None,
            template_key: None,
        }
    }

    fn fallback(question: &str, reason: FallbackReason) -> Self {
        Self {
            query: fallback_query(question),
            source: QuerySource::Ia,
            degraded: true,
            fallback_reason: Some(reason),
            template_key: None,
        }
    }
}

/// Answer to a question.
#[derive(Debug, Clone, Serialize)]
pub struct AskResponse {
    pub question: String,
    pub sparql_query: String,
    pub results: Vec<ResultRecord>,
    pub count: usize,
    pub source: QuerySource,
    pub degraded: bool,
    pub fallback_reason: Option<FallbackReason>,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Where the synthesizer's schema excerpt comes from.
#[derive(Debug, Clone)]
pub enum SchemaMode {
    /// A fixed excerpt.
    Fixed(OntologySchema),
    /// Rediscovered from the store on every model call.
    Discover,
}

/// Orchestrates classification, synthesis, validation and execution.
pub struct QueryPipeline {
    store: Arc<dyn TripleStore>,
    generator: Option<Arc<dyn TextGenerator>>,
    schema: SchemaMode,
}

impl QueryPipeline {
    /// Pipeline without a model: every template miss uses the fallback.
    pub fn new(store: Arc<dyn TripleStore>) -> Self {
        Self {
            store,
            generator: None,
            schema: SchemaMode::Fixed(OntologySchema::curated()),
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_schema(mut self, schema: SchemaMode) -> Self {
        self.schema = schema;
        self
    }

    pub fn store(&self) -> &Arc<dyn TripleStore> {
        &self.store
    }

    pub fn generator(&self) -> Option<&Arc<dyn TextGenerator>> {
        self.generator.as_ref()
    }

    /// Choose the query for a question without executing it.
    pub fn plan(&self, question: &str) -> PipelineOutcome {
        let intent = intent::classify(question);
        if let Some(outcome) = self.plan_from_template(&intent) {
            return outcome;
        }
        tracing::debug!(?intent, "no predefined template, using model path");
        self.plan_from_model(question)
    }

    /// Answer a question end to end.
    pub fn ask(&self, question: &str) -> Result<AskResponse, AskError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AskError::EmptyQuestion);
        }

        let outcome = self.plan(question);
        tracing::debug!(query = %outcome.query, source = ?outcome.source, "executing query");

        let results = match self.store.select(&outcome.query) {
            Ok(results) => results,
            Err(source) => {
                tracing::error!(
                    error = %source,
                    query = %outcome.query,
                    endpoint = %self.store.endpoint(),
                    "query execution failed"
                );
                return Err(AskError::Execution {
                    query: outcome.query,
                    source,
                });
            }
        };

        let records = results.to_records();
        tracing::info!(
            count = records.len(),
            source = ?outcome.source,
            degraded = outcome.degraded,
            "question answered"
        );
        Ok(AskResponse {
            question: question.to_string(),
            sparql_query: outcome.query,
            count: records.len(),
            results: records,
            source: outcome.source,
            degraded: outcome.degraded,
            fallback_reason: outcome.fallback_reason,
        })
    }

    fn plan_from_template(&self, intent: &IntentMatch) -> Option<PipelineOutcome> {
        if !intent.is_predefined() {
            return None;
        }
        let key = intent.template_key?;
        match instantiate(key, intent.entity.as_deref()) {
            Ok(query) => {
                let verdict = validate(&query);
                if verdict.is_valid() {
                    tracing::info!(key, source = "template", "using predefined template");
                    Some(PipelineOutcome::template(query, key))
                } else {
                    tracing::error!(key, reason = ?verdict.reason(), "catalog template failed validation");
                    None
                }
            }
            Err(CatalogError::TemplateNotFound { key }) => {
                debug_assert!(
                    crate::catalog::lookup(&key).is_some(),
                    "classifier produced unknown template key {key}"
                );
                tracing::error!(key = %key, "classifier produced unknown template key");
                None
            }
            Err(e) => {
                tracing::error!(error = %e, "template instantiation failed");
                None
            }
        }
    }

    fn plan_from_model(&self, question: &str) -> PipelineOutcome {
        let Some(generator) = &self.generator else {
            tracing::warn!("model disabled, using fallback query");
            return PipelineOutcome::fallback(question, FallbackReason::LlmDisabled);
        };

        let schema = match &self.schema {
            SchemaMode::Fixed(schema) => schema.clone(),
            SchemaMode::Discover => OntologySchema::discover(self.store.as_ref()),
        };

        let raw = match synthesize(generator.as_ref(), question, &schema) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "generation failed, using fallback query");
                return PipelineOutcome::fallback(question, FallbackReason::from(&e));
            }
        };

        let query = sanitize_for_question(question, raw.as_str());
        tracing::debug!(query = %query, "sanitized model query");
        match validate(query.as_str()).reason() {
            None => PipelineOutcome::generated(query.into_string()),
            Some(reason) => {
                tracing::warn!(%reason, query = %query, "generated query refused, using fallback query");
                PipelineOutcome::fallback(question, FallbackReason::InvalidQuery(reason))
            }
        }
    }
}

impl fmt::Debug for QueryPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryPipeline")
            .field("store", &self.store.endpoint())
            .field("model", &self.generator.as_ref().map(|g| g.model().to_string()))
            .field("schema", &self.schema)
            .finish()
    }
}
