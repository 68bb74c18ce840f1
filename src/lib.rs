// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # smartcity-nlq
//!
//! Natural-language questions over a smart city mobility ontology, answered
//! with SPARQL against an RDF triple store.
//!
//! ## Architecture
//!
//! - **Catalog** (`catalog`): hand-written query templates and the keyword rule table
//! - **Intent** (`intent`): keyword classification of questions onto templates
//! - **Synthesis** (`synth`, `llm`): grounded prompts sent to a local Ollama model
//! - **Sanitizer** (`sanitize`): turns raw model text into well-formed SPARQL
//! - **Validator** (`validate`): structural gate before execution
//! - **Store** (`store`): Fuseki over HTTP, or an embedded oxigraph store
//! - **Pipeline** (`pipeline`): orchestration with a deterministic fallback
//!
//! ## Library usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use smartcity_nlq::pipeline::QueryPipeline;
//! use smartcity_nlq::store::{FusekiConfig, FusekiStore};
//!
//! let store = Arc::new(FusekiStore::new(FusekiConfig::default()));
//! let pipeline = QueryPipeline::new(store);
//! let answer = pipeline.ask("Quel est le trajet de Wala?").unwrap();
//! println!("{} rows from {}", answer.count, answer.sparql_query);
//! ```

pub mod catalog;
pub mod config;
pub mod entities;
pub mod error;
pub mod fallback;
pub mod intent;
pub mod llm;
pub mod ontology;
pub mod pipeline;
pub mod results;
pub mod sanitize;
pub mod store;
pub mod synth;
pub mod template;
pub mod validate;

mod transport;
