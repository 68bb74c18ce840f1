//! Triple store access.
//!
//! The store is the single source of truth. Two backends implement
//! [`TripleStore`]:
//!
//! - [`FusekiStore`]: SPARQL 1.1 protocol over HTTP (production)
//! - [`MemoryStore`]: embedded oxigraph store (offline CLI, tests)

pub mod http;
pub mod memory;

pub use http::{FusekiConfig, FusekiStore};
pub use memory::MemoryStore;

use crate::error::StoreError;
use crate::results::SparqlResults;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// A SPARQL endpoint pair (query + update).
///
/// Implementations are shared across request handlers and must be
/// `Send + Sync`. All calls block and are bounded by a timeout.
pub trait TripleStore: Send + Sync {
    /// Run a read query. SELECT gives bindings, ASK a boolean, and
    /// CONSTRUCT/DESCRIBE bindings over `subject`, `predicate`, `object`.
    fn select(&self, query: &str) -> StoreResult<SparqlResults>;

    /// Run a SPARQL update (`INSERT DATA`, `DELETE WHERE`, …).
    fn update(&self, update: &str) -> StoreResult<()>;

    /// Load Turtle data into the default graph.
    fn load_turtle(&self, turtle: &str) -> StoreResult<()>;

    /// Human-readable endpoint, for logs and error messages.
    fn endpoint(&self) -> String;

    /// Run an ASK query.
    fn ask(&self, query: &str) -> StoreResult<bool> {
        self.select(query)?
            .boolean
            .ok_or_else(|| StoreError::MalformedResults {
                message: "expected a boolean result for ASK query".into(),
            })
    }

    /// Cheap liveness check.
    fn ping(&self) -> StoreResult<()> {
        self.ask("ASK { }").map(|_| ())
    }
}

/// Graph results flattened into `subject`/`predicate`/`object` rows.
pub(crate) const GRAPH_VARS: [&str; 3] = ["subject", "predicate", "object"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ask_default_reads_boolean() {
        let store = MemoryStore::new().unwrap();
        assert!(store.ask("ASK { }").unwrap());
        assert!(store.ping().is_ok());
    }

    #[test]
    fn ask_default_rejects_solutions() {
        let store = MemoryStore::new().unwrap();
        let err = store.ask("SELECT ?s WHERE { ?s ?p ?o }").unwrap_err();
        assert!(matches!(err, StoreError::MalformedResults { .. }));
    }

    #[test]
    fn trait_objects_are_shareable() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn TripleStore>();
    }
}
