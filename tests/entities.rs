//! Entity service tests against the embedded store.

use std::sync::Arc;

use serde_json::json;

use smartcity_nlq::entities::{EntityError, EntityService, NewEntity, NewLink};
use smartcity_nlq::store::{MemoryStore, TripleStore};

fn service() -> (Arc<MemoryStore>, EntityService) {
    let store = Arc::new(MemoryStore::new().unwrap());
    store
        .load_turtle(
            "@prefix mobilite: <http://www.semanticweb.org/smartcity/ontologies/mobilite#> .\n\
             @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .\n\
             mobilite:Conducteur rdfs:subClassOf mobilite:Personne .\n",
        )
        .unwrap();
    let service = EntityService::new(store.clone());
    (store, service)
}

#[test]
fn create_and_list_with_subclasses() {
    let (_, service) = service();
    service
        .create(
            &NewEntity::person("Wala", "voyageuse")
                .with("prenom", "Wala")
                .with("age", 28i64),
        )
        .unwrap();
    let class = service
        .create(
            &NewEntity::new("Sami", "conducteur")
                .with("prenom", "Sami")
                .with("numeroPermis", "TN-1234"),
        )
        .unwrap();
    assert_eq!(class, "Conducteur");

    let people = service.list("Personne").unwrap();
    assert_eq!(people.len(), 2);
    let sami = people.iter().find(|p| p.id == "Sami").unwrap();
    assert_eq!(sami.class, "Conducteur");
    assert_eq!(sami.properties["numeroPermis"], json!("TN-1234"));
    let wala = people.iter().find(|p| p.id == "Wala").unwrap();
    assert_eq!(wala.class, "Personne");
    assert_eq!(wala.properties["age"], json!(28));

    assert_eq!(service.list("conducteur").unwrap().len(), 1);
}

#[test]
fn injection_attempts_stay_literal() {
    let (store, service) = service();
    let payload = r#"x" . } ; DELETE WHERE { ?s ?p ?o } ; INSERT DATA { <urn:a> <urn:b> "y"#;
    service
        .create(&NewEntity::new("Avis_1", "Avis").with("commentaire", payload))
        .unwrap();

    let reviews = service.list("Avis").unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].properties["commentaire"], json!(payload));
    assert!(!store.ask("ASK { <urn:a> ?p ?o }").unwrap());
}

#[test]
fn invalid_identifiers_rejected() {
    let (_, service) = service();
    let err = service
        .create(&NewEntity::new("Wala> <urn:x", "Personne"))
        .unwrap_err();
    assert!(matches!(err, EntityError::InvalidIdentifier { .. }));

    let err = service
        .create(&NewEntity::new("Wala", "Personne").with("nom> <urn:x", "v"))
        .unwrap_err();
    assert!(matches!(err, EntityError::InvalidIdentifier { .. }));

    let err = service.create(&NewEntity::new("Wala", "Licorne")).unwrap_err();
    assert!(matches!(err, EntityError::UnknownClass { .. }));
}

#[test]
fn links_require_object_properties() {
    let (store, service) = service();
    service.create(&NewEntity::new("Wala", "Personne")).unwrap();
    service.create(&NewEntity::new("Trajet_1", "Trajet")).unwrap();

    service
        .link(&NewLink {
            subject: "Wala".into(),
            property: "effectueTrajet".into(),
            object: "Trajet_1".into(),
        })
        .unwrap();
    assert!(store
        .ask(
            "ASK { <http://www.semanticweb.org/smartcity/ontologies/mobilite#Wala> \
             <http://www.semanticweb.org/smartcity/ontologies/mobilite#effectueTrajet> \
             <http://www.semanticweb.org/smartcity/ontologies/mobilite#Trajet_1> }"
        )
        .unwrap());

    let err = service
        .link(&NewLink {
            subject: "Wala".into(),
            property: "prenom".into(),
            object: "Trajet_1".into(),
        })
        .unwrap_err();
    assert!(matches!(err, EntityError::UnknownProperty { .. }));
}

#[test]
fn delete_removes_incoming_and_outgoing() {
    let (store, service) = service();
    service.create(&NewEntity::new("Wala", "Personne")).unwrap();
    service
        .create(&NewEntity::new("Trajet_1", "Trajet").with("distance", 7.5))
        .unwrap();
    service
        .link(&NewLink {
            subject: "Wala".into(),
            property: "effectueTrajet".into(),
            object: "Trajet_1".into(),
        })
        .unwrap();

    service.delete("Trajet_1").unwrap();

    assert!(service.list("Trajet").unwrap().is_empty());
    assert!(!store
        .ask("ASK { ?s <http://www.semanticweb.org/smartcity/ontologies/mobilite#effectueTrajet> ?o }")
        .unwrap());
    assert_eq!(service.list("Personne").unwrap().len(), 1);

    let err = service.delete("Trajet_1").unwrap_err();
    assert!(matches!(err, EntityError::NotFound { .. }));
}

#[test]
fn class_counts_and_search() {
    let (_, service) = service();
    service
        .create(&NewEntity::new("Wala", "Personne").with("prenom", "Wala").with("nom", "Ben Salem"))
        .unwrap();
    service.create(&NewEntity::new("Bus_28", "Bus")).unwrap();
    service.create(&NewEntity::new("Bus_29", "Bus")).unwrap();
    service
        .create(&NewEntity::new("Parking_Lac", "Parking").with("adresse", "Rue du Lac"))
        .unwrap();

    let counts = service.class_counts().unwrap();
    assert_eq!(counts[0].class, "Bus");
    assert_eq!(counts[0].count, 2);
    assert_eq!(counts.iter().map(|c| c.count).sum::<u64>(), 4);

    let hits = service.search("ben salem").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "Wala");
    assert_eq!(hits[0].label, "Wala Ben Salem");

    let hits = service.search("lac").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].class, "Parking");

    let hits = service.search("bus_2").unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].label, hits[0].id);
}
