//! Pattern catalog: named SPARQL templates, the keyword rule table and the
//! allow-list of known users.
//!
//! Everything here is immutable static data, safe to share across threads.

pub mod rules;
pub mod templates;

pub use rules::{KEYWORD_RULES, KeywordRule};
pub use templates::TEMPLATES;

/// Placeholder replaced by the entity local name in entity-scoped templates.
pub const PLACEHOLDER: &str = "${user}";

/// Known users, checked in this order.
pub const KNOWN_USERS: &[&str] = &["Wala", "Oumaima"];

/// Example questions offered to the frontend.
pub const SUGGESTED_QUESTIONS: &[&str] = &[
    "Quel est le trajet de Wala?",
    "Qui est Oumaima?",
    "Liste les tickets étudiants",
    "Quels sont les avis de Wala?",
    "Affiche tous les trajets",
    "Donne les détails des infrastructures",
    "Montre les statistiques d'accidents",
    "Liste les incidents de trafic",
    "Affiche les stations de recharge",
];

/// Whether a template needs an entity substituted before execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateScope {
    /// Body contains [`PLACEHOLDER`].
    EntityScoped,
    /// Body runs as-is.
    Global,
}

/// A named, pre-validated SPARQL query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTemplate {
    pub key: &'static str,
    pub scope: TemplateScope,
    pub body: &'static str,
}

impl QueryTemplate {
    pub fn requires_entity(&self) -> bool {
        self.scope == TemplateScope::EntityScoped
    }
}

/// Look up a template by key.
pub fn lookup(key: &str) -> Option<&'static QueryTemplate> {
    TEMPLATES.iter().find(|t| t.key == key)
}

/// All template keys, in catalog order.
pub fn keys() -> impl Iterator<Item = &'static str> {
    TEMPLATES.iter().map(|t| t.key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_rule_resolves() {
        for rule in KEYWORD_RULES {
            assert!(
                lookup(rule.template_key).is_some(),
                "rule \"{}\" points at missing template {}",
                rule.keyword,
                rule.template_key
            );
        }
    }

    #[test]
    fn keys_are_unique() {
        let mut keys: Vec<_> = keys().collect();
        let before = keys.len();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), before);
    }

    #[test]
    fn placeholder_iff_entity_scoped() {
        for template in TEMPLATES {
            assert_eq!(
                template.body.contains(PLACEHOLDER),
                template.requires_entity(),
                "{}",
                template.key
            );
        }
    }

    #[test]
    fn templates_declare_canonical_prefix() {
        let decl = crate::ontology::prefix_declaration();
        for template in TEMPLATES {
            assert!(template.body.starts_with(&decl), "{}", template.key);
        }
    }

    #[test]
    fn known_templates_present() {
        assert!(lookup("user_travel").is_some_and(QueryTemplate::requires_entity));
        assert!(lookup("student_tickets_list").is_some_and(|t| !t.requires_entity()));
        assert!(lookup("nope").is_none());
    }
}
