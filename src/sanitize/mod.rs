//! Turns raw model output into something that looks like SPARQL.
//!
//! [`sanitize`] is a total, deterministic and idempotent text transform. It
//! never fails: garbage in gives garbage out, and [`crate::validate`] decides
//! whether the result may run. Steps, in order:
//!
//! 1. drop everything before the first query keyword,
//! 2. strip markdown fences (escaped `\n` sequences are expanded up front so
//!    the line-based steps see real lines),
//! 3. drop commentary lines and trailing prose after the final `}`,
//! 4. normalize the empty or misbound `mobilite` prefix,
//! 5. add the `mobilite` prefix when missing,
//! 6. qualify bare `:Name` shorthand,
//! 7. declare `rdf:`/`rdfs:` when used,
//! 8. trim lines and collapse whitespace.
//!
//! Question-aware repairs live in [`repair`].

pub mod repair;

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::ontology::{self, RDF_NS, RDFS_NS};

/// Output of the sanitizer. Not proven valid; see [`crate::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedQuery(String);

impl SanitizedQuery {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SanitizedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SanitizedQuery {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Keyword at the start of a line, any case.
static RE_LINE_VERB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t]*(?:PREFIX|SELECT|ASK|CONSTRUCT|DESCRIBE|INSERT|DELETE|CREATE|DROP)\b")
        .unwrap()
});

/// Upper-case keyword anywhere, for output like "Voici: ```SELECT …".
static RE_ANY_VERB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:PREFIX|SELECT|ASK|CONSTRUCT|DESCRIBE|INSERT|DELETE|CREATE|DROP)\b").unwrap()
});

static RE_LEADING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*```[A-Za-z0-9_-]*").unwrap());

static RE_COMMENTARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:note\s*:|nb\s*:|notez\b|remarque|explication|explanation|cette requ[eê]te|la requ[eê]te sparql|voici\b|here is|here's|this query|the query|sparql\s*:?\s*$)",
    )
    .unwrap()
});

static RE_MODIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:ORDER\s+BY|LIMIT|OFFSET|GROUP\s+BY|HAVING|VALUES)\b").unwrap()
});

static RE_PREFIX_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)PREFIX\s*([A-Za-z][\w.-]*)?\s*:\s*<([^>\s]*)>[ \t]*").unwrap()
});

static RE_SHORTHAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)(^|[^\w:]):([A-Za-z_][\w-]*)").unwrap());

static RE_RDFS_USE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\brdfs:[A-Za-z]").unwrap());
static RE_RDF_USE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\brdf:[A-Za-z]").unwrap());
static RE_RDFS_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^\s*PREFIX\s+rdfs\s*:").unwrap());
static RE_RDF_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^\s*PREFIX\s+rdf\s*:").unwrap());

static RE_BLANKS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());

/// Run steps 1–8 over raw model output.
pub fn sanitize(raw: &str) -> SanitizedQuery {
    let text = raw.replace("\r\n", "\n").replace("\\n", "\n");
    let text = truncate_to_query(&text);
    let text = strip_fences(text);
    let text = remove_commentary(text);
    let text = normalize_prefixes(&text);
    let text = ensure_mobilite_prefix(text);
    let text = qualify_shorthand(&text);
    let text = ensure_w3c_prefixes(text);
    SanitizedQuery(collapse_whitespace(&text))
}

/// [`sanitize`] followed by the question-aware [`repair::repair`] pass.
pub fn sanitize_for_question(question: &str, raw: &str) -> SanitizedQuery {
    repair::repair(question, sanitize(raw))
}

/// Whether the first line after the prefix block starts with a query keyword.
pub fn starts_with_query_form(query: &str) -> bool {
    query
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.to_ascii_uppercase().starts_with("PREFIX"))
        .is_some_and(|l| RE_LINE_VERB.is_match(l))
}

// Step 1.
fn truncate_to_query(text: &str) -> &str {
    if let Some(m) = RE_LINE_VERB.find(text) {
        return &text[m.start()..];
    }
    match RE_ANY_VERB.find(text) {
        Some(m) => &text[m.start()..],
        None => text,
    }
}

// Step 2.
fn strip_fences(text: &str) -> &str {
    let text = match RE_LEADING_FENCE.find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    };
    match text.find("```") {
        Some(idx) => &text[..idx],
        None => text,
    }
}

// Step 3.
fn remove_commentary(text: &str) -> String {
    let lines: Vec<&str> = text
        .lines()
        .filter(|line| !RE_COMMENTARY.is_match(line))
        .collect();
    let last_brace = lines.iter().rposition(|line| line.contains('}'));
    let mut kept = Vec::with_capacity(lines.len());
    for (idx, line) in lines.iter().enumerate() {
        let trailing = last_brace.is_some_and(|last| idx > last);
        if !trailing || RE_MODIFIER.is_match(line) {
            kept.push(*line);
        }
    }
    kept.join("\n")
}

// Step 4. Declarations end up one per line, duplicates removed.
fn normalize_prefixes(text: &str) -> String {
    let canonical = ontology::prefix_declaration();
    let split = RE_PREFIX_DECL.replace_all(text, |caps: &regex::Captures| {
        let label = caps.get(1).map(|m| m.as_str());
        match label {
            None => format!("\n{canonical}\n"),
            Some(l) if l.eq_ignore_ascii_case(ontology::MOBILITE_PREFIX) => {
                format!("\n{canonical}\n")
            }
            Some(l) => format!("\nPREFIX {l}: <{}>\n", &caps[2]),
        }
    });

    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::new();
    for line in split.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("PREFIX ") {
            if seen.iter().any(|s| s == trimmed) {
                continue;
            }
            seen.push(trimmed.to_string());
        }
        out.push(line);
    }
    out.join("\n")
}

// Step 5.
fn ensure_mobilite_prefix(text: String) -> String {
    let canonical = ontology::prefix_declaration();
    if text.lines().any(|l| l.trim() == canonical) {
        text
    } else {
        format!("{canonical}\n{text}")
    }
}

// Step 6.
fn qualify_shorthand(text: &str) -> String {
    RE_SHORTHAND
        .replace_all(text, |caps: &regex::Captures| {
            format!("{}{}:{}", &caps[1], ontology::MOBILITE_PREFIX, &caps[2])
        })
        .into_owned()
}

// Step 7.
pub(crate) fn ensure_w3c_prefixes(mut text: String) -> String {
    if RE_RDFS_USE.is_match(&text) && !RE_RDFS_DECL.is_match(&text) {
        text = format!("PREFIX rdfs: <{RDFS_NS}>\n{text}");
    }
    if RE_RDF_USE.is_match(&text) && !RE_RDF_DECL.is_match(&text) {
        text = format!("PREFIX rdf: <{RDF_NS}>\n{text}");
    }
    text
}

// Step 8. Comment-only lines go too.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.lines()
        .map(|line| RE_BLANKS.replace_all(line.trim(), " ").into_owned())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::MOBILITE_NS;

    fn canonical() -> String {
        ontology::prefix_declaration()
    }

    #[test]
    fn prose_and_fences_removed() {
        let raw = "Voici la requête: ```SELECT ?var1 WHERE { ?var1 a mobilite:Avis }```";
        let q = sanitize(raw);
        assert_eq!(
            q.as_str(),
            format!("{}\nSELECT ?var1 WHERE {{ ?var1 a mobilite:Avis }}", canonical())
        );
    }

    #[test]
    fn fenced_block_with_language_tag() {
        let raw = "Here is the query:\n```sparql\nSELECT ?bus WHERE {\n  ?bus a mobilite:Bus .\n}\n```\nThis query lists buses.";
        let q = sanitize(raw);
        assert!(q.as_str().starts_with(&canonical()));
        assert!(q.as_str().ends_with("?bus a mobilite:Bus .\n}"));
        assert!(!q.as_str().contains("```"));
        assert!(!q.as_str().contains("lists buses"));
    }

    #[test]
    fn escaped_newlines_expanded() {
        let q = sanitize(r"SELECT ?r WHERE {\n  ?r a mobilite:Route .\n}");
        assert_eq!(q.as_str().lines().count(), 4);
    }

    #[test]
    fn commentary_lines_dropped() {
        let raw = "PREFIX mobilite: <http://www.semanticweb.org/smartcity/ontologies/mobilite#>\nSELECT ?p WHERE {\nNote: this finds people\n?p a mobilite:Personne .\n}\nExplication: la requête liste les personnes";
        let q = sanitize(raw);
        assert!(!q.as_str().to_lowercase().contains("note:"));
        assert!(!q.as_str().contains("Explication"));
        assert!(q.as_str().contains("?p a mobilite:Personne ."));
    }

    #[test]
    fn modifiers_after_last_brace_kept() {
        let raw = "SELECT ?t WHERE { ?t a mobilite:Trajet }\nORDER BY ?t\nThat's all.\nLIMIT 5";
        let q = sanitize(raw);
        assert!(q.as_str().ends_with("ORDER BY ?t\nLIMIT 5"));
    }

    #[test]
    fn empty_prefix_normalized_and_shorthand_qualified() {
        let raw = "PREFIX : <http://example.org/>\nSELECT ?r WHERE { ?r a :Route . }";
        let q = sanitize(raw);
        assert_eq!(q.as_str().matches("PREFIX").count(), 1);
        assert!(q.as_str().contains(MOBILITE_NS));
        assert!(q.as_str().contains("?r a mobilite:Route ."));
        assert!(!q.as_str().contains("example.org"));
    }

    #[test]
    fn wrong_namespace_rebound() {
        let raw = "PREFIX mobilite: <http://example.org/mobilite#> SELECT ?v WHERE { ?v a mobilite:Velo }";
        let q = sanitize(raw);
        assert!(q.as_str().starts_with(&canonical()));
        assert!(!q.as_str().contains("example.org"));
        assert!(q.as_str().lines().nth(1).unwrap().starts_with("SELECT"));
    }

    #[test]
    fn duplicate_prefixes_collapse() {
        let raw = format!("{c}\n{c}\nSELECT ?b WHERE {{ ?b a mobilite:Bus }}", c = canonical());
        let q = sanitize(&raw);
        assert_eq!(q.as_str().matches("PREFIX mobilite:").count(), 1);
    }

    #[test]
    fn w3c_prefixes_added_when_used() {
        let raw = "SELECT ?x ?t WHERE { ?x rdf:type ?t . ?t rdfs:subClassOf* mobilite:Personne }";
        let q = sanitize(raw);
        assert!(q.as_str().contains(&format!("PREFIX rdfs: <{RDFS_NS}>")));
        assert!(q.as_str().contains(&format!("PREFIX rdf: <{RDF_NS}>")));
    }

    #[test]
    fn other_prefixes_preserved() {
        let raw = "PREFIX xsd: <http://www.w3.org/2001/XMLSchema#>\nSELECT ?a WHERE { ?a mobilite:age ?n FILTER(?n > \"18\"^^xsd:integer) }";
        let q = sanitize(raw);
        assert!(q.as_str().contains("PREFIX xsd: <http://www.w3.org/2001/XMLSchema#>"));
    }

    #[test]
    fn whitespace_collapsed() {
        let q = sanitize("SELECT   ?a\t\tWHERE {\n\n\n   ?a a mobilite:Avis   }\n\n");
        assert!(!q.as_str().contains("  "));
        assert!(!q.as_str().contains("\n\n"));
        assert!(!q.as_str().contains('\t'));
    }

    #[test]
    fn idempotent_on_varied_inputs() {
        let inputs = [
            "Voici la requête: ```SELECT ?var1 WHERE { ?var1 a mobilite:Avis }```",
            "```sparql\nPREFIX : <http://x/>\nSELECT * WHERE { ?s a :Bus }\n```",
            "Some text\nselect ?x where { ?x rdf:type mobilite:Route }\nLIMIT 3\nbye",
            "no query at all",
            "",
            "PREFIX mobilite: <http://www.semanticweb.org/smartcity/ontologies/mobilite#> SELECT ?route WHERE { ?route a mobilite:Route . } # done",
            "ASK { ?x a mobilite:Metro }\\nNote: checks metros",
        ];
        for input in inputs {
            let once = sanitize(input);
            let twice = sanitize(once.as_str());
            assert_eq!(once, twice, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn first_line_after_prefixes_is_a_verb() {
        let inputs = [
            "blah blah SELECT ?x WHERE { ?x a mobilite:Bus }",
            "Réponse:\n\nCONSTRUCT { ?s ?p ?o } WHERE { ?s ?p ?o }",
            "```\nDESCRIBE mobilite:Wala\n```",
            "Voici: ASK { mobilite:Wala a mobilite:Personne }",
        ];
        for input in inputs {
            let q = sanitize(input);
            assert!(starts_with_query_form(q.as_str()), "{input:?} → {q}");
        }
    }

    #[test]
    fn total_on_garbage() {
        let q = sanitize("I'm sorry, I cannot help with that.");
        assert!(q.as_str().starts_with(&canonical()));
        assert!(!starts_with_query_form(q.as_str()));
    }
}
