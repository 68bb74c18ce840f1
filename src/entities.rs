//! Generic entity service over the triple store.
//!
//! One validated write path for every ontology class. Identifiers, class
//! names and property names are checked against the local-name grammar and
//! literals are escaped before anything is interpolated into SPARQL.

use std::collections::BTreeMap;
use std::sync::Arc;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::error::StoreError;
use crate::ontology::{
    MOBILITE_NS, RDFS_NS, XSD_NS, fold_accents, is_object_property, local_name,
};
use crate::results::{ResultRecord, scalar};
use crate::store::TripleStore;
use crate::template::is_local_name;

/// Classes the service may instantiate.
pub const ENTITY_CLASSES: &[&str] = &[
    "Personne",
    "Conducteur",
    "Pieton",
    "Voyageur",
    "Trajet",
    "Voiture",
    "Bus",
    "Metro",
    "Velo",
    "Trottinette",
    "Avis",
    "AvisPositif",
    "AvisNegatif",
    "Ticket",
    "TicketBus",
    "TicketMetro",
    "TicketParking",
    "Infrastructure",
    "Route",
    "Parking",
    "Batiment",
    "StationsBus",
    "StationsMetro",
    "StationRecharge",
    "RechargeElectrique",
    "Statistiques",
    "StatistiquesAccidents",
    "StatistiquesPollution",
    "StatistiquesUtilisation",
    "SmartCity",
];

const PERSON_KINDS: &[&str] = &["Conducteur", "Pieton", "Voyageur"];

const SEARCH_LIMIT: usize = 50;

#[derive(Debug, Error, Diagnostic)]
pub enum EntityError {
    #[error("invalid identifier \"{id}\"")]
    #[diagnostic(
        code(smartcity::entity::invalid_identifier),
        help("Identifiers must be plain local names: letters, digits and underscore.")
    )]
    InvalidIdentifier { id: String },

    #[error("unknown entity class \"{class}\"")]
    #[diagnostic(
        code(smartcity::entity::unknown_class),
        help("Use one of the ontology classes, e.g. Personne, Trajet, Bus, Avis, Ticket, Route.")
    )]
    UnknownClass { class: String },

    #[error("\"{property}\" is not an object property")]
    #[diagnostic(
        code(smartcity::entity::unknown_property),
        help("Links use object properties such as effectueTrajet, donneAvis or possedeTicket.")
    )]
    UnknownProperty { property: String },

    #[error("invalid value for property \"{property}\"")]
    #[diagnostic(
        code(smartcity::entity::invalid_value),
        help("Numbers must be finite.")
    )]
    InvalidValue { property: String },

    #[error("entity not found: \"{id}\"")]
    #[diagnostic(code(smartcity::entity::not_found))]
    NotFound { id: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),
}

pub type EntityResult<T> = std::result::Result<T, EntityError>;

/// A literal property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl PropertyValue {
    /// Typed SPARQL literal, or `None` for non-finite floats.
    fn to_literal(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(format!("\"{}\"^^<{XSD_NS}string>", escape_literal(s))),
            Self::Integer(n) => Some(format!("\"{n}\"^^<{XSD_NS}integer>")),
            Self::Float(f) if f.is_finite() => Some(format!("\"{f}\"^^<{XSD_NS}decimal>")),
            Self::Float(_) => None,
            Self::Bool(b) => Some(format!("\"{b}\"^^<{XSD_NS}boolean>")),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<i64> for PropertyValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<f64> for PropertyValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// An instance to insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEntity {
    pub id: String,
    pub class: String,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
}

impl NewEntity {
    pub fn new(id: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            class: class.into(),
            properties: BTreeMap::new(),
        }
    }

    /// A person whose kind is one of the person subclasses, or plain
    /// `Personne` for anything else.
    pub fn person(id: impl Into<String>, kind: &str) -> Self {
        Self::new(id, person_class(kind))
    }

    pub fn with(mut self, property: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(property.into(), value.into());
        self
    }
}

/// An object-property triple to insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLink {
    pub subject: String,
    pub property: String,
    pub object: String,
}

/// One listed instance with its literal properties.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityRecord {
    pub id: String,
    pub class: String,
    pub properties: ResultRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassCount {
    pub class: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub id: String,
    #[serde(rename = "type")]
    pub class: String,
    pub label: String,
}

/// Escape a string for use inside a double-quoted SPARQL literal.
pub fn escape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

/// Canonical spelling of an instantiable class, matched case-insensitively
/// with accents folded ("piéton" → `Pieton`).
pub fn resolve_class(name: &str) -> Option<&'static str> {
    let folded = fold_accents(name.trim());
    ENTITY_CLASSES
        .iter()
        .copied()
        .find(|c| c.eq_ignore_ascii_case(&folded))
}

fn person_class(kind: &str) -> &'static str {
    resolve_class(kind)
        .filter(|c| PERSON_KINDS.contains(c))
        .unwrap_or("Personne")
}

fn check_id(id: &str) -> EntityResult<()> {
    if is_local_name(id) {
        Ok(())
    } else {
        Err(EntityError::InvalidIdentifier { id: id.to_string() })
    }
}

fn iri(local: &str) -> String {
    format!("<{MOBILITE_NS}{local}>")
}

/// CRUD over ontology instances.
pub struct EntityService {
    store: Arc<dyn TripleStore>,
}

impl EntityService {
    pub fn new(store: Arc<dyn TripleStore>) -> Self {
        Self { store }
    }

    /// Insert an instance and its literal properties. Returns the class used.
    pub fn create(&self, entity: &NewEntity) -> EntityResult<&'static str> {
        check_id(&entity.id)?;
        let class = resolve_class(&entity.class).ok_or_else(|| EntityError::UnknownClass {
            class: entity.class.clone(),
        })?;

        let subject = iri(&entity.id);
        let mut triples = vec![format!("{subject} a {} .", iri(class))];
        for (property, value) in &entity.properties {
            check_id(property)?;
            let literal = value.to_literal().ok_or_else(|| EntityError::InvalidValue {
                property: property.clone(),
            })?;
            triples.push(format!("{subject} {} {literal} .", iri(property)));
        }

        let update = format!("INSERT DATA {{\n{}\n}}", triples.join("\n"));
        self.store.update(&update)?;
        tracing::info!(id = %entity.id, class, properties = entity.properties.len(), "entity created");
        Ok(class)
    }

    /// Insert an object-property triple between two instances.
    pub fn link(&self, link: &NewLink) -> EntityResult<()> {
        check_id(&link.subject)?;
        check_id(&link.object)?;
        if !is_object_property(&link.property) {
            return Err(EntityError::UnknownProperty {
                property: link.property.clone(),
            });
        }
        let update = format!(
            "INSERT DATA {{ {} {} {} . }}",
            iri(&link.subject),
            iri(&link.property),
            iri(&link.object)
        );
        self.store.update(&update)?;
        tracing::info!(subject = %link.subject, property = %link.property, object = %link.object, "link created");
        Ok(())
    }

    /// Instances of `class` or its subclasses, one record per instance.
    pub fn list(&self, class: &str) -> EntityResult<Vec<EntityRecord>> {
        let class = resolve_class(class).ok_or_else(|| EntityError::UnknownClass {
            class: class.to_string(),
        })?;
        let query = format!(
            "SELECT ?id ?type ?p ?v WHERE {{\n\
             ?id a ?type .\n\
             ?type <{RDFS_NS}subClassOf>* {} .\n\
             OPTIONAL {{ ?id ?p ?v . FILTER(isLiteral(?v)) }}\n\
             }}\n\
             ORDER BY ?id",
            iri(class)
        );
        let results = self.store.select(&query)?;

        let mut records: Vec<EntityRecord> = Vec::new();
        for row in results.bindings() {
            let (Some(id), Some(kind)) = (row.get("id"), row.get("type")) else {
                continue;
            };
            let id = local_name(&id.value).to_string();
            let position = match records.iter().position(|r| r.id == id) {
                Some(pos) => pos,
                None => {
                    records.push(EntityRecord {
                        id,
                        class: local_name(&kind.value).to_string(),
                        properties: ResultRecord::new(),
                    });
                    records.len() - 1
                }
            };
            if let (Some(p), Some(v)) = (row.get("p"), row.get("v")) {
                records[position]
                    .properties
                    .insert(local_name(&p.value).to_string(), scalar(v));
            }
        }
        Ok(records)
    }

    /// Remove every triple with `id` as subject or object.
    pub fn delete(&self, id: &str) -> EntityResult<()> {
        check_id(id)?;
        let node = iri(id);
        let exists = self
            .store
            .ask(&format!("ASK {{ {{ {node} ?p ?o }} UNION {{ ?s ?p {node} }} }}"))?;
        if !exists {
            return Err(EntityError::NotFound { id: id.to_string() });
        }
        let update = format!("DELETE WHERE {{ {node} ?p ?o }} ;\nDELETE WHERE {{ ?s ?p {node} }}");
        self.store.update(&update)?;
        tracing::info!(id, "entity deleted");
        Ok(())
    }

    /// Instance count per ontology class, largest first.
    pub fn class_counts(&self) -> EntityResult<Vec<ClassCount>> {
        let query = format!(
            "SELECT ?class (COUNT(?s) AS ?count) WHERE {{\n\
             ?s a ?class .\n\
             FILTER(STRSTARTS(STR(?class), \"{MOBILITE_NS}\"))\n\
             }}\n\
             GROUP BY ?class\n\
             ORDER BY DESC(?count) ?class"
        );
        let results = self.store.select(&query)?;
        Ok(results
            .bindings()
            .iter()
            .filter_map(|row| {
                let class = local_name(&row.get("class")?.value).to_string();
                let count = row.get("count")?.value.parse().ok()?;
                Some(ClassCount { class, count })
            })
            .collect())
    }

    /// Instances whose label (full name, comment or address) or local name
    /// contains `text`, case-insensitively.
    pub fn search(&self, text: &str) -> EntityResult<Vec<SearchHit>> {
        let needle = escape_literal(text);
        let query = format!(
            "SELECT DISTINCT ?instance ?type ?label WHERE {{\n\
             ?instance a ?type .\n\
             FILTER(STRSTARTS(STR(?type), \"{ns}\"))\n\
             OPTIONAL {{ ?instance <{ns}nom> ?nom . ?instance <{ns}prenom> ?prenom . }}\n\
             OPTIONAL {{ ?instance <{ns}commentaire> ?commentaire . }}\n\
             OPTIONAL {{ ?instance <{ns}adresse> ?adresse . }}\n\
             BIND(COALESCE(CONCAT(STR(?prenom), \" \", STR(?nom)), STR(?commentaire), STR(?adresse)) AS ?label)\n\
             FILTER(CONTAINS(LCASE(COALESCE(?label, STR(?instance))), LCASE(\"{needle}\")))\n\
             }}\n\
             LIMIT {SEARCH_LIMIT}",
            ns = MOBILITE_NS
        );
        let results = self.store.select(&query)?;
        Ok(results
            .bindings()
            .iter()
            .filter_map(|row| {
                let id = local_name(&row.get("instance")?.value).to_string();
                let class = local_name(&row.get("type")?.value).to_string();
                let label = match row.get("label").map(scalar) {
                    Some(Value::String(s)) => s,
                    _ => id.clone(),
                };
                Some(SearchHit { id, class, label })
            })
            .collect())
    }
}

impl std::fmt::Debug for EntityService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityService")
            .field("store", &self.store.endpoint())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_quotes_and_control_chars() {
        assert_eq!(escape_literal(r#"a "b" \ c"#), r#"a \"b\" \\ c"#);
        assert_eq!(escape_literal("l1\nl2\r\tx"), "l1\\nl2\\r\\tx");
        assert_eq!(escape_literal("très bien"), "très bien");
    }

    #[test]
    fn class_resolution() {
        assert_eq!(resolve_class("bus"), Some("Bus"));
        assert_eq!(resolve_class("Piéton"), Some("Pieton"));
        assert_eq!(resolve_class("avispositif"), Some("AvisPositif"));
        assert_eq!(resolve_class("Dragon"), None);
    }

    #[test]
    fn person_kind_falls_back_to_personne() {
        assert_eq!(NewEntity::person("p1", "conducteur").class, "Conducteur");
        assert_eq!(NewEntity::person("p1", "piéton").class, "Pieton");
        assert_eq!(NewEntity::person("p1", "etudiant").class, "Personne");
        assert_eq!(NewEntity::person("p1", "bus").class, "Personne");
    }

    #[test]
    fn literals_are_typed() {
        assert_eq!(
            PropertyValue::from(28i64).to_literal().unwrap(),
            format!("\"28\"^^<{XSD_NS}integer>")
        );
        assert_eq!(
            PropertyValue::from(2.5).to_literal().unwrap(),
            format!("\"2.5\"^^<{XSD_NS}decimal>")
        );
        assert!(PropertyValue::from(f64::NAN).to_literal().is_none());
        assert_eq!(
            PropertyValue::from("x\"y").to_literal().unwrap(),
            format!("\"x\\\"y\"^^<{XSD_NS}string>")
        );
    }

    #[test]
    fn property_values_deserialize_untagged() {
        let props: BTreeMap<String, PropertyValue> =
            serde_json::from_str(r#"{"age": 28, "prix": 1.5, "nom": "Ben", "disponible": true}"#)
                .unwrap();
        assert_eq!(props["age"], PropertyValue::Integer(28));
        assert_eq!(props["prix"], PropertyValue::Float(1.5));
        assert_eq!(props["nom"], PropertyValue::String("Ben".into()));
        assert_eq!(props["disponible"], PropertyValue::Bool(true));
    }

    #[test]
    fn entity_classes_exist_in_ontology() {
        for class in ENTITY_CLASSES {
            assert!(crate::ontology::canonical_class(class).is_some(), "{class}");
        }
    }
}
