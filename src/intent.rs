//! Intent classification for free-text questions.
//!
//! Keyword based and LLM-free: finds an optional known user and a template
//! key. Matching is case-insensitive substring containment.

use crate::catalog::{self, KNOWN_USERS, QueryTemplate};

/// Outcome of [`classify`]. Either field may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IntentMatch {
    /// Known user named in the question, in its canonical spelling.
    pub entity: Option<String>,
    /// Catalog key of the matched template.
    pub template_key: Option<&'static str>,
}

impl IntentMatch {
    /// The matched catalog entry, if any.
    pub fn template(&self) -> Option<&'static QueryTemplate> {
        self.template_key.and_then(catalog::lookup)
    }

    /// Whether the question can be answered from a template: a template
    /// matched, and it is global or an entity was found.
    pub fn is_predefined(&self) -> bool {
        match self.template() {
            Some(template) => !template.requires_entity() || self.entity.is_some(),
            None => false,
        }
    }
}

/// Classify a question against the catalog.
pub fn classify(question: &str) -> IntentMatch {
    let lower = question.to_lowercase();
    IntentMatch {
        entity: extract_entity(&lower),
        template_key: extract_template_key(&lower),
    }
}

/// First known user whose name appears in the question.
fn extract_entity(lower: &str) -> Option<String> {
    KNOWN_USERS
        .iter()
        .find(|user| lower.contains(&user.to_lowercase()))
        .map(|user| user.to_string())
}

/// Template key of the highest-priority keyword found in the question.
fn extract_template_key(lower: &str) -> Option<&'static str> {
    catalog::rules::ordered_rules()
        .iter()
        .find(|rule| lower.contains(rule.keyword))
        .map(|rule| rule.template_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_user_travel() {
        let m = classify("Quel est le trajet de Wala?");
        assert_eq!(m.entity.as_deref(), Some("Wala"));
        assert_eq!(m.template_key, Some("user_travel"));
        assert!(m.is_predefined());
    }

    #[test]
    fn classify_student_tickets_is_global() {
        let m = classify("Liste les tickets étudiants disponibles");
        assert_eq!(m.entity, None);
        assert_eq!(m.template_key, Some("student_tickets_list"));
        assert!(m.is_predefined());
    }

    #[test]
    fn entity_scoped_without_entity_is_not_predefined() {
        let m = classify("avis positifs");
        assert_eq!(m.template_key, Some("user_reviews"));
        assert!(m.entity.is_none());
        assert!(!m.is_predefined());
    }

    #[test]
    fn specific_phrase_wins_over_single_word() {
        assert_eq!(classify("Montre tous les avis").template_key, Some("all_avis"));
        assert_eq!(
            classify("Affiche tous les avis utilisateurs").template_key,
            Some("avis_utilisateurs")
        );
        assert_eq!(classify("Affiche tous les trajets").template_key, Some("all_trajets"));
        assert_eq!(
            classify("Liste les véhicules et conducteurs").template_key,
            Some("vehicules_conducteurs")
        );
    }

    #[test]
    fn entity_matching_is_case_insensitive() {
        let m = classify("QUI EST OUMAIMA ?");
        assert_eq!(m.entity.as_deref(), Some("Oumaima"));
        assert_eq!(m.template_key, Some("user_profile"));
    }

    #[test]
    fn first_known_user_wins() {
        let m = classify("Trajet de Oumaima et Wala");
        assert_eq!(m.entity.as_deref(), Some("Wala"));
    }

    #[test]
    fn no_match() {
        let m = classify("Bonjour");
        assert_eq!(m, IntentMatch::default());
        assert!(!m.is_predefined());
    }

    #[test]
    fn every_known_user_and_keyword_resolves() {
        for user in KNOWN_USERS {
            for rule in catalog::KEYWORD_RULES {
                let m = classify(&format!("{} {}", rule.keyword, user));
                assert_eq!(m.entity.as_deref(), Some(*user));
                let key = m.template_key.expect("keyword must match");
                assert!(catalog::lookup(key).is_some());
                assert!(m.is_predefined());
            }
        }
    }
}
