//! Structural gate in front of query execution.
//!
//! Deliberately shallow: a keyword check, a brace check and a known
//! degenerate pattern. The triple store remains the real parser.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Variables that, projected together, mark a catch-all query.
const CATCH_ALL_VARIABLES: &[&str] = &[
    "personne",
    "conducteur",
    "trajet",
    "avis",
    "infrastructure",
    "vehicule",
];

/// Read forms, as keywords rather than variable names (`?select`).
static RE_READ_FORM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^?$\w])(SELECT|ASK|CONSTRUCT|DESCRIBE)\b").unwrap());

/// Update forms at the start of a line.
static RE_UPDATE_FORM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(INSERT|DELETE|LOAD|CLEAR|CREATE|DROP|COPY|MOVE|ADD)\b").unwrap()
});

static RE_PROJECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\bSELECT\s+(?:DISTINCT\s+|REDUCED\s+)?(.*?)(?:\bWHERE\b|\{)").unwrap()
});

static RE_VARIABLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[?$](\w+)").unwrap());

/// SPARQL read forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QueryForm {
    Select,
    Ask,
    Construct,
    Describe,
}

/// Why a query was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidReason {
    Empty,
    NoQueryForm,
    MissingBraces,
    TooGeneric,
    UpdateForm,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::Empty => "query is empty",
            Self::NoQueryForm => "no SELECT, ASK, CONSTRUCT or DESCRIBE keyword",
            Self::MissingBraces => "missing '{' or '}'",
            Self::TooGeneric => "query projects the catch-all variable set",
            Self::UpdateForm => "update operations are not allowed here",
        };
        f.write_str(msg)
    }
}

/// Outcome of [`validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationVerdict {
    Valid,
    Invalid(InvalidReason),
}

impl ValidationVerdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn reason(&self) -> Option<InvalidReason> {
        match self {
            Self::Valid => None,
            Self::Invalid(reason) => Some(*reason),
        }
    }
}

/// Check a query before execution.
pub fn validate(query: &str) -> ValidationVerdict {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return ValidationVerdict::Invalid(InvalidReason::Empty);
    }
    let upper = trimmed.to_uppercase();
    if RE_UPDATE_FORM.is_match(&upper) {
        return ValidationVerdict::Invalid(InvalidReason::UpdateForm);
    }
    if query_form(trimmed).is_none() {
        return ValidationVerdict::Invalid(InvalidReason::NoQueryForm);
    }
    if !trimmed.contains('{') || !trimmed.contains('}') {
        return ValidationVerdict::Invalid(InvalidReason::MissingBraces);
    }
    if is_catch_all(trimmed) {
        return ValidationVerdict::Invalid(InvalidReason::TooGeneric);
    }
    ValidationVerdict::Valid
}

/// The first read form keyword in the query, any case.
pub fn query_form(query: &str) -> Option<QueryForm> {
    let upper = query.to_uppercase();
    let caps = RE_READ_FORM.captures(&upper)?;
    match caps.get(1)?.as_str() {
        "SELECT" => Some(QueryForm::Select),
        "ASK" => Some(QueryForm::Ask),
        "CONSTRUCT" => Some(QueryForm::Construct),
        "DESCRIBE" => Some(QueryForm::Describe),
        _ => None,
    }
}

fn is_catch_all(query: &str) -> bool {
    let Some(projection) = RE_PROJECTION.captures(query).and_then(|c| c.get(1)) else {
        return false;
    };
    let projected: Vec<&str> = RE_VARIABLE
        .captures_iter(projection.as_str())
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();
    CATCH_ALL_VARIABLES.iter().all(|v| projected.contains(v))
}
