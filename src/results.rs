//! SPARQL JSON results and their flattening into plain records.
//!
//! [`SparqlResults`] models the W3C `application/sparql-results+json` format.
//! [`format`] turns bindings into flat JSON objects with URIs shortened to
//! their local names.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::ontology::{XSD_NS, local_name};

/// One flattened result row: variable → string, number or null.
pub type ResultRecord = Map<String, Value>;

/// One result row as returned by the store.
pub type RowBinding = HashMap<String, RdfTerm>;

/// Kind of an RDF term in SPARQL JSON results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermKind {
    Uri,
    Literal,
    /// Emitted by some older stores instead of `literal` + `datatype`.
    #[serde(rename = "typed-literal")]
    TypedLiteral,
    Bnode,
    /// RDF-star quoted triple.
    Triple,
}

/// A bound value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RdfTerm {
    #[serde(rename = "type")]
    pub kind: TermKind,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(rename = "xml:lang", default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl RdfTerm {
    pub fn uri(value: impl Into<String>) -> Self {
        Self {
            kind: TermKind::Uri,
            value: value.into(),
            datatype: None,
            lang: None,
        }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            kind: TermKind::Literal,
            value: value.into(),
            datatype: None,
            lang: None,
        }
    }

    pub fn typed(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            kind: TermKind::Literal,
            value: value.into(),
            datatype: Some(datatype.into()),
            lang: None,
        }
    }

    pub fn bnode(value: impl Into<String>) -> Self {
        Self {
            kind: TermKind::Bnode,
            value: value.into(),
            datatype: None,
            lang: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsHead {
    #[serde(default)]
    pub vars: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsBody {
    #[serde(default)]
    pub bindings: Vec<RowBinding>,
}

/// A SPARQL JSON results document (SELECT solutions or ASK boolean).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparqlResults {
    #[serde(default)]
    pub head: ResultsHead,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<ResultsBody>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boolean: Option<bool>,
}

impl SparqlResults {
    pub fn solutions(vars: Vec<String>, bindings: Vec<RowBinding>) -> Self {
        Self {
            head: ResultsHead { vars },
            results: Some(ResultsBody { bindings }),
            boolean: None,
        }
    }

    pub fn boolean(value: bool) -> Self {
        Self {
            head: ResultsHead::default(),
            results: None,
            boolean: Some(value),
        }
    }

    pub fn vars(&self) -> &[String] {
        &self.head.vars
    }

    pub fn bindings(&self) -> &[RowBinding] {
        self.results
            .as_ref()
            .map(|r| r.bindings.as_slice())
            .unwrap_or(&[])
    }

    /// Flatten into records. Every head variable appears in every record;
    /// ASK results become a single `{"boolean": …}` record.
    pub fn to_records(&self) -> Vec<ResultRecord> {
        if let Some(b) = self.boolean {
            let mut record = ResultRecord::new();
            record.insert("boolean".into(), Value::Bool(b));
            return vec![record];
        }
        format_with_vars(self.vars(), self.bindings())
    }
}

/// Flatten bindings into records, preserving row order. Only bound
/// variables appear in each record.
pub fn format(bindings: &[RowBinding]) -> Vec<ResultRecord> {
    bindings
        .iter()
        .map(|row| {
            let mut keys: Vec<&String> = row.keys().collect();
            keys.sort();
            keys.into_iter()
                .map(|k| (k.clone(), scalar(&row[k])))
                .collect()
        })
        .collect()
}

/// Like [`format`], but every variable in `vars` is present, `null` when
/// unbound. Variables missing from `vars` but bound in a row are appended.
pub fn format_with_vars(vars: &[String], bindings: &[RowBinding]) -> Vec<ResultRecord> {
    bindings
        .iter()
        .map(|row| {
            let mut record = ResultRecord::new();
            for var in vars {
                let value = row.get(var).map(scalar).unwrap_or(Value::Null);
                record.insert(var.clone(), value);
            }
            let mut extra: Vec<&String> = row.keys().filter(|k| !record.contains_key(*k)).collect();
            extra.sort();
            for k in extra {
                record.insert(k.clone(), scalar(&row[k]));
            }
            record
        })
        .collect()
}

/// Flatten one term: URIs to local names, numeric literals to numbers.
pub fn scalar(term: &RdfTerm) -> Value {
    match term.kind {
        TermKind::Uri => Value::String(local_name(&term.value).to_string()),
        TermKind::Literal | TermKind::TypedLiteral => term
            .datatype
            .as_deref()
            .and_then(|dt| numeric(&term.value, dt))
            .unwrap_or_else(|| Value::String(term.value.clone())),
        TermKind::Bnode | TermKind::Triple => Value::String(term.value.clone()),
    }
}

fn numeric(value: &str, datatype: &str) -> Option<Value> {
    let local = datatype.strip_prefix(XSD_NS)?;
    match local {
        "integer" | "int" | "long" | "short" | "byte" | "nonNegativeInteger"
        | "positiveInteger" | "nonPositiveInteger" | "negativeInteger" | "unsignedInt"
        | "unsignedLong" | "unsignedShort" | "unsignedByte" => {
            let trimmed = value.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .map(|n| Value::Number(n.into()))
                .or_else(|| trimmed.parse::<u64>().ok().map(|n| Value::Number(n.into())))
        }
        "decimal" | "double" | "float" => value
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, RdfTerm)]) -> RowBinding {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn uri_shortened_to_fragment() {
        let records = format(&[row(&[("name", RdfTerm::uri("http://x#Wala"))])]);
        assert_eq!(Value::Object(records[0].clone()), json!({"name": "Wala"}));
    }

    #[test]
    fn uri_without_fragment_uses_last_segment() {
        let records = format(&[row(&[("p", RdfTerm::uri("http://example.org/people/Oumaima"))])]);
        assert_eq!(records[0]["p"], json!("Oumaima"));
    }

    #[test]
    fn literals_verbatim_and_numbers_typed() {
        let records = format(&[row(&[
            ("nom", RdfTerm::literal("Ben Ali")),
            ("age", RdfTerm::typed("28", format!("{XSD_NS}integer"))),
            ("prix", RdfTerm::typed("2.5", format!("{XSD_NS}decimal"))),
            ("bad", RdfTerm::typed("n/a", format!("{XSD_NS}integer"))),
            ("date", RdfTerm::typed("2024-01-01", format!("{XSD_NS}date"))),
        ])]);
        let r = &records[0];
        assert_eq!(r["nom"], json!("Ben Ali"));
        assert_eq!(r["age"], json!(28));
        assert_eq!(r["prix"], json!(2.5));
        assert_eq!(r["bad"], json!("n/a"));
        assert_eq!(r["date"], json!("2024-01-01"));
    }

    #[test]
    fn unbound_variables_become_null() {
        let vars = vec!["trajet".to_string(), "duree".to_string()];
        let records = format_with_vars(&vars, &[row(&[("trajet", RdfTerm::uri("http://x#T1"))])]);
        assert_eq!(Value::Object(records[0].clone()), json!({"trajet": "T1", "duree": null}));
    }

    #[test]
    fn row_order_preserved() {
        let rows: Vec<RowBinding> = ["C", "A", "B"]
            .iter()
            .map(|n| row(&[("x", RdfTerm::uri(format!("http://x#{n}")))]))
            .collect();
        let names: Vec<_> = format(&rows).iter().map(|r| r["x"].clone()).collect();
        assert_eq!(names, vec![json!("C"), json!("A"), json!("B")]);
    }

    #[test]
    fn parses_w3c_json() {
        let doc = r#"{
            "head": {"vars": ["s", "label"]},
            "results": {"bindings": [
                {"s": {"type": "uri", "value": "http://x#Bus28"},
                 "label": {"type": "literal", "value": "Ligne 28", "xml:lang": "fr"}},
                {"s": {"type": "bnode", "value": "b0"}}
            ]}
        }"#;
        let results: SparqlResults = serde_json::from_str(doc).unwrap();
        assert_eq!(results.vars(), ["s", "label"]);
        let records = results.to_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["label"], json!("Ligne 28"));
        assert_eq!(records[1]["s"], json!("b0"));
        assert_eq!(records[1]["label"], Value::Null);
    }

    #[test]
    fn parses_ask_result() {
        let results: SparqlResults = serde_json::from_str(r#"{"head": {}, "boolean": true}"#).unwrap();
        assert_eq!(results.boolean, Some(true));
        assert!(results.bindings().is_empty());
        assert_eq!(results.to_records()[0]["boolean"], json!(true));
    }
}
