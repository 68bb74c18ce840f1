//! Rich diagnostic error types for the smartcity query service.
//!
//! Errors shared by several modules: the triple store and the template
//! catalog. Subsystem-local errors (`LlmError`, `ConfigError`, `EntityError`,
//! `AskError`) live next to their code.

use miette::Diagnostic;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Catalog errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum CatalogError {
    #[error("query template not found: \"{key}\"")]
    #[diagnostic(
        code(smartcity::catalog::template_not_found),
        help(
            "The classifier produced a template key with no catalog entry. \
             Every key in the keyword rule table must have a matching template; \
             add the template or fix the rule."
        )
    )]
    TemplateNotFound { key: String },

    #[error("template \"{key}\" requires an entity reference")]
    #[diagnostic(
        code(smartcity::catalog::missing_entity),
        help("Entity-scoped templates need a known user name, e.g. \"Wala\" or \"Oumaima\".")
    )]
    MissingEntity { key: String },

    #[error("invalid entity reference \"{entity}\" for template \"{key}\"")]
    #[diagnostic(
        code(smartcity::catalog::invalid_entity),
        help("Entity references must be plain ontology local names (letters, digits, underscore).")
    )]
    InvalidEntity { key: String, entity: String },
}

// ---------------------------------------------------------------------------
// Triple store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("triple store is not reachable at {endpoint}")]
    #[diagnostic(
        code(smartcity::store::unreachable),
        help(
            "Start Fuseki (e.g. `fuseki-server --mem /smartcity`) or point \
             SMARTCITY_FUSEKI_URL at a running instance."
        )
    )]
    Unreachable { endpoint: String },

    #[error("triple store request to {endpoint} timed out after {timeout_secs}s")]
    #[diagnostic(
        code(smartcity::store::timeout),
        help("The query may be too expensive. Add a LIMIT or raise `store.timeout_secs`.")
    )]
    Timeout { endpoint: String, timeout_secs: u64 },

    #[error("SPARQL query failed: {message}")]
    #[diagnostic(
        code(smartcity::store::query),
        help("The triple store rejected the query. Inspect the logged query text for syntax errors.")
    )]
    Query { message: String },

    #[error("SPARQL update failed: {message}")]
    #[diagnostic(
        code(smartcity::store::update),
        help("The update endpoint rejected the request. Check the dataset name and write permissions.")
    )]
    Update { message: String },

    #[error("malformed SPARQL results: {message}")]
    #[diagnostic(
        code(smartcity::store::malformed_results),
        help("The store answered with something other than SPARQL JSON results.")
    )]
    MalformedResults { message: String },

    #[error("embedded store error: {message}")]
    #[diagnostic(
        code(smartcity::store::embedded),
        help("The embedded oxigraph store failed. Check the seed file format (Turtle expected).")
    )]
    Embedded { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_template_names_the_key() {
        let err = CatalogError::TemplateNotFound {
            key: "nope".into(),
        };
        assert!(err.to_string().contains("\"nope\""));
    }

    #[test]
    fn timeout_message_mentions_duration() {
        let err = StoreError::Timeout {
            endpoint: "http://localhost:3030/smartcity/sparql".into(),
            timeout_secs: 30,
        };
        let msg = format!("{err}");
        assert!(msg.contains("30s"));
        assert!(msg.contains("localhost:3030"));
    }
}
