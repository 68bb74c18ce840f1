//! Template instantiation.
//!
//! Substitution targets only the `${user}` sentinel, so SPARQL's own `{ }`
//! blocks are never touched.

use crate::catalog::{self, PLACEHOLDER};
use crate::error::CatalogError;

/// Produce executable SPARQL for a catalog entry.
///
/// Entity-scoped templates need `entity` to be a plain local name; global
/// templates are returned verbatim and ignore it.
pub fn instantiate(key: &str, entity: Option<&str>) -> Result<String, CatalogError> {
    let template = catalog::lookup(key).ok_or_else(|| CatalogError::TemplateNotFound {
        key: key.to_string(),
    })?;

    if !template.requires_entity() {
        return Ok(template.body.to_string());
    }

    let entity = entity.ok_or_else(|| CatalogError::MissingEntity {
        key: key.to_string(),
    })?;
    if !is_local_name(entity) {
        return Err(CatalogError::InvalidEntity {
            key: key.to_string(),
            entity: entity.to_string(),
        });
    }
    Ok(template.body.replace(PLACEHOLDER, entity))
}

/// `[A-Za-z0-9_]+`
pub fn is_local_name(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TEMPLATES;

    #[test]
    fn entity_scoped_substitutes_every_placeholder() {
        let q = instantiate("user_profile", Some("Wala")).unwrap();
        assert!(q.contains("mobilite:Wala mobilite:prenom ?prenom"));
        assert!(!q.contains(PLACEHOLDER));
        assert!(q.contains("WHERE {"));
    }

    #[test]
    fn all_entity_scoped_templates_instantiate() {
        for template in TEMPLATES.iter().filter(|t| t.requires_entity()) {
            let q = instantiate(template.key, Some("Oumaima")).unwrap();
            assert!(q.contains("mobilite:Oumaima"), "{}", template.key);
            assert!(!q.contains(PLACEHOLDER), "{}", template.key);
            // SPARQL blocks survive; only the sentinel's own brace goes away.
            let sentinels = template.body.matches(PLACEHOLDER).count();
            assert_eq!(
                q.matches('{').count(),
                template.body.matches('{').count() - sentinels
            );
            assert_eq!(q.matches('}').count(), template.body.matches('}').count() - sentinels);
        }
    }

    #[test]
    fn global_template_is_verbatim() {
        let q = instantiate("student_tickets_list", None).unwrap();
        assert_eq!(q, catalog::lookup("student_tickets_list").unwrap().body);
        let with_entity = instantiate("student_tickets_list", Some("Wala")).unwrap();
        assert_eq!(q, with_entity);
    }

    #[test]
    fn unknown_key() {
        let err = instantiate("nope", None).unwrap_err();
        assert!(matches!(err, CatalogError::TemplateNotFound { .. }));
    }

    #[test]
    fn missing_entity() {
        let err = instantiate("user_travel", None).unwrap_err();
        assert!(matches!(err, CatalogError::MissingEntity { .. }));
    }

    #[test]
    fn injection_attempt_rejected() {
        let err = instantiate("user_travel", Some("Wala . } DROP ALL #")).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidEntity { .. }));
    }
}
