//! Question-aware repairs applied after [`super::sanitize`].
//!
//! - a class named in the question but queried through a parent class and
//!   `rdfs:subClassOf` is queried directly,
//! - `mobilite:type "x"` becomes `rdf:type mobilite:X`,
//! - generic variables bound to a person, trip or review class get a
//!   meaningful name, and a narrow projection gains the family's usual
//!   properties.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{SanitizedQuery, collapse_whitespace, ensure_w3c_prefixes};
use crate::ontology::{self, MOBILITE_PREFIX, fold_accents};

/// Question phrases naming a specific class. Longer phrases first.
const QUESTION_CLASSES: &[(&str, &str)] = &[
    ("stations de bus", "StationsBus"),
    ("stations de métro", "StationsMetro"),
    ("stations de metro", "StationsMetro"),
    ("avis positifs", "AvisPositif"),
    ("avis positif", "AvisPositif"),
    ("avis négatifs", "AvisNegatif"),
    ("avis négatif", "AvisNegatif"),
    ("trajets optimaux", "TrajetOptimal"),
    ("trajet optimal", "TrajetOptimal"),
    ("trajets courts", "TrajetCourt"),
    ("trajet court", "TrajetCourt"),
    ("routes", "Route"),
    ("route", "Route"),
    ("parkings", "Parking"),
    ("parking", "Parking"),
    ("bâtiments", "Batiment"),
    ("bâtiment", "Batiment"),
    ("batiments", "Batiment"),
    ("conducteurs", "Conducteur"),
    ("conducteur", "Conducteur"),
    ("piétons", "Pieton"),
    ("piéton", "Pieton"),
    ("voyageurs", "Voyageur"),
    ("voyageur", "Voyageur"),
    ("bus", "Bus"),
    ("métros", "Metro"),
    ("métro", "Metro"),
    ("metro", "Metro"),
    ("voitures", "Voiture"),
    ("voiture", "Voiture"),
    ("vélos", "Velo"),
    ("vélo", "Velo"),
    ("trottinettes", "Trottinette"),
    ("trottinette", "Trottinette"),
];

/// Subject families that get descriptive names and standard properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Person,
    Trip,
    Review,
}

impl Family {
    const ALL: [Family; 3] = [Family::Person, Family::Trip, Family::Review];

    fn root_class(self) -> &'static str {
        match self {
            Family::Person => "Personne",
            Family::Trip => "Trajet",
            Family::Review => "Avis",
        }
    }

    fn variable(self) -> &'static str {
        match self {
            Family::Person => "personne",
            Family::Trip => "trajet",
            Family::Review => "avis",
        }
    }

    fn properties(self) -> &'static [&'static str] {
        match self {
            Family::Person => &["nom", "prenom", "age", "email"],
            Family::Trip => &["distance", "duree", "heureDepart", "heureArrivee"],
            Family::Review => &["note", "commentaire", "dateAvis"],
        }
    }

    fn keywords(self) -> &'static [&'static str] {
        match self {
            Family::Person => &["personne", "utilisateur", "conducteur", "piéton", "voyageur", "qui "],
            Family::Trip => &["trajet", "parcours", "itinéraire", "déplacement"],
            Family::Review => &["avis", "commentaire", "note", "évaluation"],
        }
    }

    fn of_class(class: &str) -> Option<Family> {
        Family::ALL
            .into_iter()
            .find(|f| ontology::is_subclass_of(class, f.root_class()))
    }

    fn from_question(lower: &str) -> Option<Family> {
        Family::ALL
            .into_iter()
            .find(|f| f.keywords().iter().any(|k| lower.contains(k)))
    }
}

static RE_TYPE_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"mobilite:type\s+"([^"]+)""#).unwrap());

/// `?v a mobilite:C`, `?v rdf:type mobilite:C`, `?v a/rdfs:subClassOf* mobilite:C`.
static RE_TYPE_ASSERTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\?(\w+)\s+(?:a|rdf:type)(?:/rdfs:subClassOf\*)?\s+mobilite:(\w+)").unwrap()
});

static RE_GENERIC_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:var\d*|[xyzso]\d*|item\d*|results?|entity|instance|obj|object|subject|resource|thing)$",
    )
    .unwrap()
});

/// Projection of a SELECT: group 1 is the variable list.
static RE_PROJECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\bSELECT\s+(?:DISTINCT\s+|REDUCED\s+)?(.*?)\s*(?:\bWHERE\b|\{)").unwrap()
});

static RE_VARIABLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\?(\w+)").unwrap());

/// Apply the question-aware repairs to a sanitized query.
pub fn repair(question: &str, query: SanitizedQuery) -> SanitizedQuery {
    let lower = question.to_lowercase();
    let mut text = query.into_string();

    if let Some(direct) = direct_class_query(&lower, &text) {
        tracing::debug!(query = %direct, "replaced subclass traversal with direct type query");
        text = direct;
    }

    if RE_TYPE_LITERAL.is_match(&text) {
        text = RE_TYPE_LITERAL
            .replace_all(&text, |caps: &Captures| {
                format!("rdf:type {MOBILITE_PREFIX}:{}", class_name(&caps[1]))
            })
            .into_owned();
        text = ensure_w3c_prefixes(text);
    }

    text = rename_generic_variables(&lower, text);
    text = enrich_projection(text);

    SanitizedQuery(collapse_whitespace(&text))
}

/// Subclass-closure pattern rewritten to the class the question names.
fn direct_class_query(lower_question: &str, query: &str) -> Option<String> {
    if !query.contains("rdfs:subClassOf") {
        return None;
    }
    let padded = format!(" {} ", normalize_words(lower_question));
    let class = QUESTION_CLASSES
        .iter()
        .find(|(phrase, _)| padded.contains(&format!(" {phrase} ")))
        .map(|(_, class)| *class)?;

    if query.contains(&format!("{MOBILITE_PREFIX}:{class}")) {
        return None;
    }
    let queried_parent = ancestors(class)
        .into_iter()
        .any(|parent| query.contains(&format!("{MOBILITE_PREFIX}:{parent}")));
    if !queried_parent {
        return None;
    }

    let var = lower_first(class);
    Some(format!(
        "{}\nSELECT ?{var} WHERE {{\n?{var} a {MOBILITE_PREFIX}:{class} .\n}}",
        ontology::prefix_declaration()
    ))
}

fn ancestors(class: &str) -> Vec<&'static str> {
    let mut out = Vec::new();
    let mut current = ontology::parent_of(class);
    while let Some(parent) = current {
        out.push(parent);
        current = ontology::parent_of(parent);
    }
    out
}

/// `"stations de bus"` → `StationsBus`, canonical spelling when known.
fn class_name(literal: &str) -> String {
    let camel: String = literal
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let folded = fold_accents(part);
            let mut chars = folded.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect();
    ontology::canonical_class(&camel)
        .map(str::to_string)
        .unwrap_or(camel)
}

fn rename_generic_variables(lower_question: &str, mut text: String) -> String {
    let assertions: Vec<(String, String)> = RE_TYPE_ASSERTION
        .captures_iter(&text)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect();

    let mut renamed: Vec<Family> = Vec::new();
    for (var, class) in assertions {
        if !RE_GENERIC_VAR.is_match(&var) {
            continue;
        }
        let family = match Family::of_class(&class) {
            Some(family) => Some(family),
            None if ontology::canonical_class(&class).is_none() => {
                Family::from_question(lower_question)
            }
            None => None,
        };
        let Some(family) = family else {
            continue;
        };
        if renamed.contains(&family) || uses_variable(&text, family.variable()) {
            continue;
        }
        let Ok(re) = Regex::new(&format!(r"\?{}\b", regex::escape(&var))) else {
            continue;
        };
        text = re
            .replace_all(&text, format!("?{}", family.variable()).as_str())
            .into_owned();
        renamed.push(family);
    }
    text
}

fn enrich_projection(text: String) -> String {
    if text.to_ascii_uppercase().contains("GROUP BY") {
        return text;
    }
    let Some(caps) = RE_PROJECTION.captures(&text) else {
        return text;
    };
    let Some(projection) = caps.get(1) else {
        return text;
    };
    let proj = projection.as_str();
    if proj.contains('*') || proj.contains('(') {
        return text;
    }
    let projected: Vec<&str> = RE_VARIABLE
        .captures_iter(proj)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();
    if projected.len() >= 3 {
        return text;
    }

    let subject = RE_TYPE_ASSERTION.captures_iter(&text).find_map(|c| {
        let var = c[1].to_string();
        let family = Family::of_class(&c[2])?;
        projected.contains(&var.as_str()).then_some((var, family))
    });
    let Some((var, family)) = subject else {
        return text;
    };

    let missing: Vec<&str> = family
        .properties()
        .iter()
        .copied()
        .filter(|p| !uses_variable(&text, p))
        .collect();
    let proj_end = projection.end();
    let Some(close) = where_group_close(&text, proj_end) else {
        return text;
    };
    if missing.is_empty() {
        return text;
    }

    let extra_vars: String = missing.iter().map(|p| format!(" ?{p}")).collect();
    let optionals: String = missing
        .iter()
        .map(|p| format!("OPTIONAL {{ ?{var} {MOBILITE_PREFIX}:{p} ?{p} . }}\n"))
        .collect();

    let mut out = String::with_capacity(text.len() + extra_vars.len() + optionals.len() + 2);
    out.push_str(&text[..proj_end]);
    out.push_str(&extra_vars);
    out.push_str(&text[proj_end..close]);
    out.push('\n');
    out.push_str(&optionals);
    out.push_str(&text[close..]);
    out
}

/// Byte offset of the `}` closing the first group opened at or after `from`.
/// Braces inside string literals and IRIs are skipped.
fn where_group_close(text: &str, from: usize) -> Option<usize> {
    let open = from + text.get(from..)?.find('{')?;
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut in_iri = false;
    for (idx, c) in text[open..].char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') if !in_iri => quote = Some(c),
            (None, '<') => {
                in_iri = text[open + idx + 1..]
                    .chars()
                    .next()
                    .is_some_and(|n| !n.is_whitespace() && n != '=');
            }
            (None, '>') => in_iri = false,
            (None, '{') if !in_iri => depth += 1,
            (None, '}') if !in_iri => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + idx);
                }
            }
            _ => {}
        }
    }
    None
}

fn uses_variable(text: &str, name: &str) -> bool {
    RE_VARIABLE
        .captures_iter(text)
        .any(|c| c.get(1).is_some_and(|m| m.as_str() == name))
}

fn normalize_words(lower: &str) -> String {
    lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
