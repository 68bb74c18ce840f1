//! Vocabulary of the smart city mobility ontology.
//!
//! Holds the canonical namespace, a curated schema excerpt (classes, data
//! properties, object properties) used to ground LLM prompts, and the class
//! hierarchy the sanitizer consults for its semantic repairs.

use serde::Serialize;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::results::SparqlResults;
use crate::store::TripleStore;

/// Canonical namespace of the mobility ontology.
pub const MOBILITE_NS: &str = "http://www.semanticweb.org/smartcity/ontologies/mobilite#";

/// Prefix label bound to [`MOBILITE_NS`] in every generated query.
pub const MOBILITE_PREFIX: &str = "mobilite";

pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS_NS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";

/// Ontology classes known to exist, parents before children.
pub const CLASSES: &[&str] = &[
    "Personne",
    "Conducteur",
    "Pieton",
    "Voyageur",
    "ReseauTransport",
    "TransportPublic",
    "TransportPrive",
    "MobiliteDouce",
    "Bus",
    "Metro",
    "Voiture",
    "Velo",
    "Trottinette",
    "Infrastructure",
    "Route",
    "StationsBus",
    "StationsMetro",
    "Parking",
    "Batiment",
    "Trajet",
    "TrajetOptimal",
    "TrajetCourt",
    "Avis",
    "AvisPositif",
    "AvisNegatif",
    "Ticket",
    "TicketBus",
    "TicketMetro",
    "TicketParking",
    "StationRecharge",
    "RechargeElectrique",
    "Statistiques",
    "StatistiquesAccidents",
    "StatistiquesPollution",
    "StatistiquesUtilisation",
    "SmartCity",
];

/// Datatype properties (`?x mobilite:prop "literal"`).
pub const DATA_PROPERTIES: &[&str] = &[
    "nom",
    "prenom",
    "age",
    "email",
    "telephone",
    "numeroPermis",
    "categoriePermis",
    "distance",
    "duree",
    "heureDepart",
    "heureArrivee",
    "commentaire",
    "note",
    "dateAvis",
    "typeTicket",
    "prix",
    "statutTicket",
    "dateAchat",
    "adresse",
    "coordonneesGPS",
    "capaciteAccueil",
    "typeConnecteur",
    "puissanceMax",
    "prixKwh",
    "disponible",
    "marque",
    "modele",
    "immatriculation",
    "valeur",
    "unite",
    "dateMesure",
];

/// Object properties (`?x mobilite:prop ?y`).
pub const OBJECT_PROPERTIES: &[&str] = &[
    "effectueTrajet",
    "utiliseReseauTransport",
    "donneAvis",
    "possedeTicket",
    "utiliseStationRecharge",
    "commenceA",
    "termineA",
    "utiliseMoyenTransport",
    "prefereMoyenTransport",
    "circuleSur",
    "conduitPar",
    "appartientA",
    "proposePar",
    "habiteA",
    "travailleA",
    "frequenteZone",
    "disposeDe",
    "concerneTransport",
    "concerneInfrastructure",
];

/// Direct `rdfs:subClassOf` edges: `(child, parent)`.
const CLASS_HIERARCHY: &[(&str, &str)] = &[
    ("Conducteur", "Personne"),
    ("Pieton", "Personne"),
    ("Voyageur", "Personne"),
    ("TransportPublic", "ReseauTransport"),
    ("TransportPrive", "ReseauTransport"),
    ("MobiliteDouce", "ReseauTransport"),
    ("Bus", "TransportPublic"),
    ("Metro", "TransportPublic"),
    ("Voiture", "TransportPrive"),
    ("Velo", "MobiliteDouce"),
    ("Trottinette", "MobiliteDouce"),
    ("Route", "Infrastructure"),
    ("StationsBus", "Infrastructure"),
    ("StationsMetro", "Infrastructure"),
    ("Parking", "Infrastructure"),
    ("Batiment", "Infrastructure"),
    ("TrajetOptimal", "Trajet"),
    ("TrajetCourt", "Trajet"),
    ("AvisPositif", "Avis"),
    ("AvisNegatif", "Avis"),
    ("TicketBus", "Ticket"),
    ("TicketMetro", "Ticket"),
    ("TicketParking", "Ticket"),
    ("RechargeElectrique", "StationRecharge"),
    ("StatistiquesAccidents", "Statistiques"),
    ("StatistiquesPollution", "Statistiques"),
    ("StatistiquesUtilisation", "Statistiques"),
];

/// `PREFIX mobilite: <…>` declaration line.
pub fn prefix_declaration() -> String {
    format!("PREFIX {MOBILITE_PREFIX}: <{MOBILITE_NS}>")
}

/// Shorten an IRI to its local name: the part after the last `#`, or after
/// the last `/` when there is no fragment. IRIs ending in a delimiter are
/// returned unchanged.
pub fn local_name(iri: &str) -> &str {
    let tail = match iri.rfind('#') {
        Some(idx) => &iri[idx + 1..],
        None => match iri.rfind('/') {
            Some(idx) => &iri[idx + 1..],
            None => iri,
        },
    };
    if tail.is_empty() { iri } else { tail }
}

/// Direct parent of an ontology class, if any.
pub fn parent_of(class: &str) -> Option<&'static str> {
    CLASS_HIERARCHY
        .iter()
        .find(|(child, _)| *child == class)
        .map(|(_, parent)| *parent)
}

/// Whether `class` is `ancestor` or one of its (transitive) subclasses.
pub fn is_subclass_of(class: &str, ancestor: &str) -> bool {
    let mut current = Some(class);
    while let Some(c) = current {
        if c == ancestor {
            return true;
        }
        current = parent_of(c);
    }
    false
}

/// Case-insensitive lookup of a class name, returning its canonical spelling.
pub fn canonical_class(name: &str) -> Option<&'static str> {
    CLASSES.iter().copied().find(|c| c.eq_ignore_ascii_case(name))
}

pub fn is_object_property(name: &str) -> bool {
    OBJECT_PROPERTIES.contains(&name)
}

/// Where a schema excerpt came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaSource {
    /// Built-in curated lists.
    Curated,
    /// Discovered from the live triple store.
    Discovered,
}

/// One class or property name, with its usage count when discovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaEntry {
    pub name: String,
    pub count: Option<u64>,
}

impl SchemaEntry {
    fn curated(name: &str) -> Self {
        Self {
            name: name.to_string(),
            count: None,
        }
    }
}

/// Schema excerpt embedded in synthesis prompts.
#[derive(Debug, Clone, Serialize)]
pub struct OntologySchema {
    pub namespace: String,
    pub classes: Vec<SchemaEntry>,
    pub data_properties: Vec<SchemaEntry>,
    pub object_properties: Vec<SchemaEntry>,
    pub source: SchemaSource,
}

const DISCOVER_CLASSES_QUERY: &str = r#"
PREFIX mobilite: <http://www.semanticweb.org/smartcity/ontologies/mobilite#>
SELECT ?class (COUNT(?instance) AS ?instance_count) WHERE {
  ?instance a ?class .
  FILTER(STRSTARTS(STR(?class), STR(mobilite:)))
}
GROUP BY ?class
ORDER BY DESC(?instance_count)
"#;

const DISCOVER_PROPERTIES_QUERY: &str = r#"
PREFIX mobilite: <http://www.semanticweb.org/smartcity/ontologies/mobilite#>
SELECT ?property (COUNT(?s) AS ?usage_count) WHERE {
  ?s ?property ?o .
  FILTER(STRSTARTS(STR(?property), STR(mobilite:)))
}
GROUP BY ?property
ORDER BY DESC(?usage_count)
LIMIT 20
"#;

impl OntologySchema {
    /// The built-in schema excerpt.
    pub fn curated() -> Self {
        Self {
            namespace: MOBILITE_NS.to_string(),
            classes: CLASSES.iter().map(|c| SchemaEntry::curated(c)).collect(),
            data_properties: DATA_PROPERTIES
                .iter()
                .map(|p| SchemaEntry::curated(p))
                .collect(),
            object_properties: OBJECT_PROPERTIES
                .iter()
                .map(|p| SchemaEntry::curated(p))
                .collect(),
            source: SchemaSource::Curated,
        }
    }

    /// Discover the classes and properties actually in use in the store.
    ///
    /// Falls back to [`OntologySchema::curated`] when the store is unreachable
    /// or holds no ontology instances. Object properties keep the curated list
    /// when none of the discovered properties is a known object property.
    pub fn discover(store: &dyn TripleStore) -> Self {
        let classes = match store.select(DISCOVER_CLASSES_QUERY) {
            Ok(results) => counted_entries(&results, "class", "instance_count"),
            Err(e) => {
                tracing::warn!(error = %e, "ontology discovery failed, using curated schema");
                return Self::curated();
            }
        };
        let properties = match store.select(DISCOVER_PROPERTIES_QUERY) {
            Ok(results) => counted_entries(&results, "property", "usage_count"),
            Err(e) => {
                tracing::warn!(error = %e, "property discovery failed, using curated schema");
                return Self::curated();
            }
        };
        if classes.is_empty() {
            return Self::curated();
        }

        let (mut object_properties, data_properties): (Vec<_>, Vec<_>) = properties
            .into_iter()
            .partition(|p| is_object_property(&p.name));
        if object_properties.is_empty() {
            object_properties = OBJECT_PROPERTIES
                .iter()
                .map(|p| SchemaEntry::curated(p))
                .collect();
        }

        tracing::debug!(
            classes = classes.len(),
            data_properties = data_properties.len(),
            "discovered ontology schema"
        );
        Self {
            namespace: MOBILITE_NS.to_string(),
            classes,
            data_properties,
            object_properties,
            source: SchemaSource::Discovered,
        }
    }
}

fn counted_entries(results: &SparqlResults, name_var: &str, count_var: &str) -> Vec<SchemaEntry> {
    results
        .bindings()
        .iter()
        .filter_map(|row| {
            let iri = &row.get(name_var)?.value;
            let count = row.get(count_var).and_then(|c| c.value.parse().ok());
            Some(SchemaEntry {
                name: local_name(iri).to_string(),
                count,
            })
        })
        .collect()
}

/// Strip diacritics: "Piéton" → "Pieton".
pub fn fold_accents(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_name_prefers_fragment() {
        assert_eq!(local_name("http://x#Wala"), "Wala");
        assert_eq!(local_name(&format!("{MOBILITE_NS}Trajet")), "Trajet");
    }

    #[test]
    fn local_name_falls_back_to_last_segment() {
        assert_eq!(local_name("http://example.org/people/Oumaima"), "Oumaima");
        assert_eq!(local_name("http://example.org/people/"), "http://example.org/people/");
        assert_eq!(local_name("plain"), "plain");
    }

    #[test]
    fn hierarchy_is_transitive() {
        assert!(is_subclass_of("Bus", "ReseauTransport"));
        assert!(is_subclass_of("Route", "Infrastructure"));
        assert!(is_subclass_of("Avis", "Avis"));
        assert!(!is_subclass_of("Avis", "Personne"));
        assert_eq!(parent_of("Conducteur"), Some("Personne"));
        assert_eq!(parent_of("SmartCity"), None);
    }

    #[test]
    fn every_hierarchy_edge_names_known_classes() {
        for (child, parent) in CLASS_HIERARCHY {
            assert!(CLASSES.contains(child), "{child} missing from CLASSES");
            assert!(CLASSES.contains(parent), "{parent} missing from CLASSES");
        }
    }

    #[test]
    fn accents_are_folded() {
        assert_eq!(fold_accents("Piéton"), "Pieton");
        assert_eq!(fold_accents("Étudiant à vélo, garçon"), "Etudiant a velo, garcon");
        assert_eq!(fold_accents("plain"), "plain");
    }

    #[test]
    fn canonical_class_is_case_insensitive() {
        assert_eq!(canonical_class("voiture"), Some("Voiture"));
        assert_eq!(canonical_class("AVISPOSITIF"), Some("AvisPositif"));
        assert_eq!(canonical_class("Spaceship"), None);
    }

    #[test]
    fn curated_schema_lists_everything() {
        let schema = OntologySchema::curated();
        assert_eq!(schema.source, SchemaSource::Curated);
        assert_eq!(schema.classes.len(), CLASSES.len());
        assert!(schema.object_properties.iter().any(|p| p.name == "effectueTrajet"));
    }
}
