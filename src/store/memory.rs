//! Embedded SPARQL store backed by oxigraph.
//!
//! Used by the CLI's `--memory` mode and by tests. Speaks the same
//! [`TripleStore`] contract as the HTTP backend.

use std::io::Read;
use std::path::Path;

use oxigraph::io::RdfFormat;
use oxigraph::model::Term;
use oxigraph::sparql::QueryResults;
use oxigraph::store::Store;

use super::{GRAPH_VARS, StoreResult, TripleStore};
use crate::error::StoreError;
use crate::results::{RdfTerm, RowBinding, SparqlResults, TermKind};

/// In-memory SPARQL store.
pub struct MemoryStore {
    store: Store,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    pub fn new() -> StoreResult<Self> {
        let store = Store::new().map_err(|e| StoreError::Embedded {
            message: format!("failed to create oxigraph store: {e}"),
        })?;
        Ok(Self { store })
    }

    /// Create a store seeded from a Turtle file.
    pub fn from_turtle_file(path: &Path) -> StoreResult<Self> {
        let file = std::fs::File::open(path).map_err(|e| StoreError::Embedded {
            message: format!("failed to open {}: {e}", path.display()),
        })?;
        let store = Self::new()?;
        store.load_reader(file)?;
        tracing::info!(path = %path.display(), triples = store.len()?, "seeded embedded store");
        Ok(store)
    }

    fn load_reader(&self, reader: impl Read) -> StoreResult<()> {
        self.store
            .load_from_reader(RdfFormat::Turtle, reader)
            .map_err(|e| StoreError::Embedded {
                message: format!("failed to load Turtle: {e}"),
            })
    }

    /// Number of triples in the store.
    pub fn len(&self) -> StoreResult<usize> {
        self.store.len().map_err(|e| StoreError::Embedded {
            message: e.to_string(),
        })
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        self.len().map(|n| n == 0)
    }
}

impl TripleStore for MemoryStore {
    fn select(&self, query: &str) -> StoreResult<SparqlResults> {
        let results = self.store.query(query).map_err(|e| StoreError::Query {
            message: e.to_string(),
        })?;

        match results {
            QueryResults::Solutions(solutions) => {
                let vars: Vec<String> = solutions
                    .variables()
                    .iter()
                    .map(|v| v.as_str().to_string())
                    .collect();
                let mut rows = Vec::new();
                for solution in solutions {
                    let solution = solution.map_err(|e| StoreError::Query {
                        message: format!("solution error: {e}"),
                    })?;
                    let row: RowBinding = solution
                        .iter()
                        .map(|(var, term)| (var.as_str().to_string(), to_rdf_term(term)))
                        .collect();
                    rows.push(row);
                }
                Ok(SparqlResults::solutions(vars, rows))
            }
            QueryResults::Boolean(b) => Ok(SparqlResults::boolean(b)),
            QueryResults::Graph(triples) => {
                let mut rows = Vec::new();
                for triple in triples {
                    let triple = triple.map_err(|e| StoreError::Query {
                        message: format!("triple error: {e}"),
                    })?;
                    let subject = Term::from(triple.subject);
                    let object = triple.object;
                    let row: RowBinding = [
                        (GRAPH_VARS[0].to_string(), to_rdf_term(&subject)),
                        (GRAPH_VARS[1].to_string(), RdfTerm::uri(triple.predicate.as_str())),
                        (GRAPH_VARS[2].to_string(), to_rdf_term(&object)),
                    ]
                    .into_iter()
                    .collect();
                    rows.push(row);
                }
                let vars = GRAPH_VARS.iter().map(|v| v.to_string()).collect();
                Ok(SparqlResults::solutions(vars, rows))
            }
        }
    }

    fn update(&self, update: &str) -> StoreResult<()> {
        self.store.update(update).map_err(|e| StoreError::Update {
            message: e.to_string(),
        })
    }

    fn load_turtle(&self, turtle: &str) -> StoreResult<()> {
        self.load_reader(turtle.as_bytes())
    }

    fn endpoint(&self) -> String {
        "embedded oxigraph store".into()
    }
}

/// Convert an oxigraph term into its SPARQL JSON shape.
pub(crate) fn to_rdf_term(term: &Term) -> RdfTerm {
    match term {
        Term::NamedNode(node) => RdfTerm::uri(node.as_str()),
        Term::BlankNode(node) => RdfTerm::bnode(node.as_str()),
        Term::Literal(literal) => match literal.language() {
            Some(lang) => RdfTerm {
                kind: TermKind::Literal,
                value: literal.value().to_string(),
                datatype: None,
                lang: Some(lang.to_string()),
            },
            None => RdfTerm::typed(literal.value(), literal.datatype().as_str()),
        },
        #[allow(unreachable_patterns)]
        other => RdfTerm {
            kind: TermKind::Triple,
            value: other.to_string(),
            datatype: None,
            lang: None,
        },
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::MOBILITE_NS;
    use std::io::Write;

    const SEED: &str = r#"
@prefix mobilite: <http://www.semanticweb.org/smartcity/ontologies/mobilite#> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
mobilite:Wala a mobilite:Personne ;
    mobilite:prenom "Wala" ;
    mobilite:age "28"^^xsd:integer .
"#;

    fn seeded() -> MemoryStore {
        let store = MemoryStore::new().unwrap();
        store.load_turtle(SEED).unwrap();
        store
    }

    #[test]
    fn load_and_select() {
        let store = seeded();
        assert_eq!(store.len().unwrap(), 3);
        let results = store
            .select(&format!("SELECT ?p ?a WHERE {{ <{MOBILITE_NS}Wala> <{MOBILITE_NS}prenom> ?p ; <{MOBILITE_NS}age> ?a }}"))
            .unwrap();
        assert_eq!(results.vars(), ["p", "a"]);
        let row = &results.bindings()[0];
        assert_eq!(row["p"].value, "Wala");
        assert_eq!(row["a"].value, "28");
        assert_eq!(
            row["a"].datatype.as_deref(),
            Some("http://www.w3.org/2001/XMLSchema#integer")
        );
    }

    #[test]
    fn ask_query() {
        let store = seeded();
        assert!(store.ask(&format!("ASK {{ <{MOBILITE_NS}Wala> ?p ?o }}")).unwrap());
        assert!(!store.ask(&format!("ASK {{ <{MOBILITE_NS}Nobody> ?p ?o }}")).unwrap());
    }

    #[test]
    fn construct_flattened_to_triples() {
        let store = seeded();
        let results = store
            .select("CONSTRUCT { ?s ?p ?o } WHERE { ?s ?p ?o }")
            .unwrap();
        assert_eq!(results.vars(), GRAPH_VARS);
        assert_eq!(results.bindings().len(), 3);
    }

    #[test]
    fn update_and_delete() {
        let store = seeded();
        store
            .update(&format!("INSERT DATA {{ <{MOBILITE_NS}Bus28> a <{MOBILITE_NS}Bus> }}"))
            .unwrap();
        assert_eq!(store.len().unwrap(), 4);
        store
            .update(&format!("DELETE WHERE {{ <{MOBILITE_NS}Wala> ?p ?o }}"))
            .unwrap();
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn malformed_query_is_query_error() {
        let err = seeded().select("SELEC nothing").unwrap_err();
        assert!(matches!(err, StoreError::Query { .. }));
    }

    #[test]
    fn seed_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SEED.as_bytes()).unwrap();
        let store = MemoryStore::from_turtle_file(file.path()).unwrap();
        assert!(!store.is_empty().unwrap());
    }

    #[test]
    fn bad_turtle_rejected() {
        let store = MemoryStore::new().unwrap();
        let err = store.load_turtle("this is not turtle").unwrap_err();
        assert!(matches!(err, StoreError::Embedded { .. }));
    }
}
