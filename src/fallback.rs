//! Deterministic fallback queries.
//!
//! Used when the model is unavailable, disabled, or produced something the
//! validator refused. Picks a broad but well-formed query from keywords in
//! the question; the last resort lists a handful of triples.

/// A fallback query body (without prefixes) and the keywords that select it.
struct FallbackRule {
    keywords: &'static [&'static str],
    /// Additional keyword that must also appear for this rule to apply.
    requires: Option<&'static str>,
    body: &'static str,
}

static FALLBACK_RULES: &[FallbackRule] = &[
    FallbackRule {
        keywords: &["route", "rue", "avenue", "autoroute"],
        requires: None,
        body: r#"SELECT ?route WHERE {
?route a mobilite:Route .
}"#,
    },
    FallbackRule {
        keywords: &["personne", "utilisateur", "conducteur", "piéton", "pieton"],
        requires: Some("avis"),
        body: r#"SELECT DISTINCT ?utilisateur ?nom ?prenom WHERE {
?utilisateur a/rdfs:subClassOf* mobilite:Personne .
?utilisateur mobilite:donneAvis ?avis .
OPTIONAL { ?utilisateur mobilite:nom ?nom . }
OPTIONAL { ?utilisateur mobilite:prenom ?prenom . }
}"#,
    },
    FallbackRule {
        keywords: &["personne", "utilisateur", "conducteur", "piéton", "pieton"],
        requires: None,
        body: r#"SELECT ?personne ?nom ?prenom ?type WHERE {
?personne a ?type .
?type rdfs:subClassOf* mobilite:Personne .
OPTIONAL { ?personne mobilite:nom ?nom . }
OPTIONAL { ?personne mobilite:prenom ?prenom . }
}
LIMIT 20"#,
    },
    FallbackRule {
        keywords: &["statistique", "pollution"],
        requires: None,
        body: r#"SELECT ?statistique ?valeur ?unite WHERE {
?statistique a/rdfs:subClassOf* mobilite:StatistiquesPollution .
OPTIONAL { ?statistique mobilite:valeur ?valeur . }
OPTIONAL { ?statistique mobilite:unite ?unite . }
}"#,
    },
    FallbackRule {
        keywords: &["avis", "commentaire", "note"],
        requires: None,
        body: r#"SELECT ?avis ?commentaire ?note ?type WHERE {
?avis a ?type .
?type rdfs:subClassOf* mobilite:Avis .
OPTIONAL { ?avis mobilite:commentaire ?commentaire . }
OPTIONAL { ?avis mobilite:note ?note . }
}
LIMIT 20"#,
    },
    FallbackRule {
        keywords: &["trajet", "parcours", "itinéraire", "itineraire"],
        requires: None,
        body: r#"SELECT ?trajet ?distance ?duree ?personne WHERE {
?trajet a/rdfs:subClassOf* mobilite:Trajet .
OPTIONAL { ?trajet mobilite:distance ?distance . }
OPTIONAL { ?trajet mobilite:duree ?duree . }
OPTIONAL { ?personne mobilite:effectueTrajet ?trajet . }
}
LIMIT 10"#,
    },
    FallbackRule {
        keywords: &["bus", "métro", "metro", "véhicule", "vehicule", "transport"],
        requires: None,
        body: r#"SELECT ?vehicule ?type ?marque ?modele WHERE {
?vehicule a ?type .
?type rdfs:subClassOf* mobilite:ReseauTransport .
OPTIONAL { ?vehicule mobilite:marque ?marque . }
OPTIONAL { ?vehicule mobilite:modele ?modele . }
}
LIMIT 20"#,
    },
];

const LAST_RESORT: &str = r#"SELECT ?s ?p ?o WHERE {
?s ?p ?o .
}
LIMIT 10"#;

/// Build the fallback query for a question. Always valid SPARQL with the
/// canonical prefixes declared.
pub fn fallback_query(question: &str) -> String {
    let lower = question.to_lowercase();
    let body = FALLBACK_RULES
        .iter()
        .find(|rule| {
            rule.keywords.iter().any(|k| lower.contains(k))
                && rule.requires.is_none_or(|r| lower.contains(r))
        })
        .map(|rule| rule.body)
        .unwrap_or(LAST_RESORT);

    let mut query = crate::ontology::prefix_declaration();
    if body.contains("rdfs:") {
        query.push_str(&format!("\nPREFIX rdfs: <{}>", crate::ontology::RDFS_NS));
    }
    query.push('\n');
    query.push_str(body);
    query
}
