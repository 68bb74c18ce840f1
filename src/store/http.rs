//! SPARQL 1.1 protocol client for Apache Jena Fuseki.
//!
//! Queries go to `{base}/{dataset}/sparql`, updates to `{base}/{dataset}/update`
//! and Turtle uploads to the Graph Store endpoint `{base}/{dataset}/data`.
//! All requests are blocking `ureq` calls bounded by the agent timeout.

use std::time::Duration;

use oxigraph::io::{RdfFormat, RdfParser};
use oxigraph::model::Term;

use super::memory::to_rdf_term;
use super::{GRAPH_VARS, StoreResult, TripleStore};
use crate::error::StoreError;
use crate::results::{RdfTerm, RowBinding, SparqlResults};
use crate::transport::{Failure, classify, io_timed_out};
use crate::validate::{QueryForm, query_form};

const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";
const N_TRIPLES: &str = "application/n-triples";
const TURTLE: &str = "text/turtle";

/// Connection settings for a Fuseki dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FusekiConfig {
    /// Server root, e.g. `http://localhost:3030`.
    pub base_url: String,
    /// Dataset name, e.g. `smartcity`.
    pub dataset: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for FusekiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3030".into(),
            dataset: "smartcity".into(),
            timeout_secs: 30,
        }
    }
}

impl FusekiConfig {
    fn dataset_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.dataset.trim_matches('/')
        )
    }

    pub fn query_url(&self) -> String {
        format!("{}/sparql", self.dataset_url())
    }

    pub fn update_url(&self) -> String {
        format!("{}/update", self.dataset_url())
    }

    pub fn data_url(&self) -> String {
        format!("{}/data", self.dataset_url())
    }
}

/// Which endpoint a request targeted, for error mapping.
#[derive(Clone, Copy)]
enum Operation {
    Query,
    Update,
}

/// Blocking HTTP client for a Fuseki dataset.
pub struct FusekiStore {
    config: FusekiConfig,
    agent: ureq::Agent,
}

impl FusekiStore {
    pub fn new(config: FusekiConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();
        Self { config, agent }
    }

    pub fn config(&self) -> &FusekiConfig {
        &self.config
    }

    fn map_failure(&self, err: ureq::Error, url: &str, op: Operation) -> StoreError {
        match classify(err) {
            Failure::Timeout => StoreError::Timeout {
                endpoint: url.to_string(),
                timeout_secs: self.config.timeout_secs,
            },
            Failure::Unreachable => StoreError::Unreachable {
                endpoint: url.to_string(),
            },
            Failure::Status { code, body } => {
                let message = format!("HTTP {code}: {}", body.trim());
                match op {
                    Operation::Query => StoreError::Query { message },
                    Operation::Update => StoreError::Update { message },
                }
            }
            Failure::Other(message) => match op {
                Operation::Query => StoreError::Query { message },
                Operation::Update => StoreError::Update { message },
            },
        }
    }

    fn map_body_error(&self, err: std::io::Error, url: &str) -> StoreError {
        if io_timed_out(&err) {
            StoreError::Timeout {
                endpoint: url.to_string(),
                timeout_secs: self.config.timeout_secs,
            }
        } else {
            StoreError::MalformedResults {
                message: err.to_string(),
            }
        }
    }

    fn select_graph(&self, query: &str, url: &str) -> StoreResult<SparqlResults> {
        let resp = self
            .agent
            .post(url)
            .set("Accept", N_TRIPLES)
            .send_form(&[("query", query)])
            .map_err(|e| self.map_failure(e, url, Operation::Query))?;

        let parser = RdfParser::from_format(RdfFormat::NTriples).for_reader(resp.into_reader());
        let mut rows = Vec::new();
        for quad in parser {
            let quad = quad.map_err(|e| StoreError::MalformedResults {
                message: format!("invalid N-Triples from store: {e}"),
            })?;
            let subject = Term::from(quad.subject);
            let row: RowBinding = [
                (GRAPH_VARS[0].to_string(), to_rdf_term(&subject)),
                (GRAPH_VARS[1].to_string(), RdfTerm::uri(quad.predicate.as_str())),
                (GRAPH_VARS[2].to_string(), to_rdf_term(&quad.object)),
            ]
            .into_iter()
            .collect();
            rows.push(row);
        }
        let vars = GRAPH_VARS.iter().map(|v| v.to_string()).collect();
        Ok(SparqlResults::solutions(vars, rows))
    }
}

impl TripleStore for FusekiStore {
    fn select(&self, query: &str) -> StoreResult<SparqlResults> {
        let url = self.config.query_url();
        if matches!(
            query_form(query),
            Some(QueryForm::Construct | QueryForm::Describe)
        ) {
            return self.select_graph(query, &url);
        }

        tracing::debug!(endpoint = %url, "sending SPARQL query");
        let resp = self
            .agent
            .post(&url)
            .set("Accept", SPARQL_RESULTS_JSON)
            .send_form(&[("query", query)])
            .map_err(|e| self.map_failure(e, &url, Operation::Query))?;

        resp.into_json::<SparqlResults>()
            .map_err(|e| self.map_body_error(e, &url))
    }

    fn update(&self, update: &str) -> StoreResult<()> {
        let url = self.config.update_url();
        tracing::debug!(endpoint = %url, "sending SPARQL update");
        self.agent
            .post(&url)
            .send_form(&[("update", update)])
            .map_err(|e| self.map_failure(e, &url, Operation::Update))?;
        Ok(())
    }

    fn load_turtle(&self, turtle: &str) -> StoreResult<()> {
        let url = self.config.data_url();
        self.agent
            .post(&url)
            .set("Content-Type", TURTLE)
            .send_string(turtle)
            .map_err(|e| self.map_failure(e, &url, Operation::Update))?;
        Ok(())
    }

    fn endpoint(&self) -> String {
        self.config.query_url()
    }
}

impl std::fmt::Debug for FusekiStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FusekiStore")
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_store() -> FusekiStore {
        FusekiStore::new(FusekiConfig {
            base_url: "http://127.0.0.1:1".into(),
            dataset: "smartcity".into(),
            timeout_secs: 2,
        })
    }

    #[test]
    fn default_config() {
        let config = FusekiConfig::default();
        assert_eq!(config.query_url(), "http://localhost:3030/smartcity/sparql");
        assert_eq!(config.update_url(), "http://localhost:3030/smartcity/update");
        assert_eq!(config.data_url(), "http://localhost:3030/smartcity/data");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn urls_tolerate_slashes() {
        let config = FusekiConfig {
            base_url: "http://fuseki:3030/".into(),
            dataset: "/city/".into(),
            timeout_secs: 5,
        };
        assert_eq!(config.query_url(), "http://fuseki:3030/city/sparql");
    }

    #[test]
    fn select_unreachable() {
        let err = unreachable_store()
            .select("SELECT ?s WHERE { ?s ?p ?o }")
            .unwrap_err();
        assert!(matches!(err, StoreError::Unreachable { .. }), "{err:?}");
    }

    #[test]
    fn update_unreachable() {
        let err = unreachable_store()
            .update("INSERT DATA { <urn:a> <urn:b> <urn:c> }")
            .unwrap_err();
        assert!(matches!(err, StoreError::Unreachable { .. }));
    }

    #[test]
    fn ping_unreachable() {
        assert!(unreachable_store().ping().is_err());
    }

    #[test]
    fn endpoint_is_query_url() {
        assert_eq!(
            unreachable_store().endpoint(),
            "http://127.0.0.1:1/smartcity/sparql"
        );
    }
}
