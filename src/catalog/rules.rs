//! Keyword → template rule table.
//!
//! Rules are checked in descending priority, table order breaking ties.
//! A phrase that contains a shorter keyword ("tous les avis" ⊃ "avis") must
//! carry a strictly higher priority so it is tried first.

use std::sync::LazyLock;

/// One keyword rule: lowercase keyword, target template, precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordRule {
    pub keyword: &'static str,
    pub template_key: &'static str,
    pub priority: u8,
}

const fn rule(keyword: &'static str, template_key: &'static str, priority: u8) -> KeywordRule {
    KeywordRule {
        keyword,
        template_key,
        priority,
    }
}

/// Phrases that refine another phrase.
const REFINED: u8 = 40;
/// Multi-word phrases.
const PHRASE: u8 = 30;
/// Two-word qualifiers such as "mes tickets".
const QUALIFIED: u8 = 20;
/// Single words.
const WORD: u8 = 10;

pub static KEYWORD_RULES: &[KeywordRule] = &[
    rule("tous les avis utilisateurs", "avis_utilisateurs", REFINED),
    rule("réseaux transport utilisés", "reseaux_transport", REFINED),
    rule("détails trajet wala", "details_trajet_wala", REFINED),
    // Specific listings.
    rule("tous les avis", "all_avis", PHRASE),
    rule("tous les trajets", "all_trajets", PHRASE),
    rule("tous les tickets", "tickets_utilisateurs", PHRASE),
    rule("trajets oumaima", "trajets_oumaima", PHRASE),
    rule("trajets avec points", "trajets_points", PHRASE),
    rule("trajets optimaux", "trajets_optimaux", PHRASE),
    rule("véhicules et conducteurs", "vehicules_conducteurs", PHRASE),
    rule("transports préférés", "transports_preferes", PHRASE),
    rule("bâtiments équipements", "batiments_equipements", PHRASE),
    rule("zones fréquentées", "zones_frequentees", PHRASE),
    // Tickets
    rule("ticket étudiant", "student_tickets_list", QUALIFIED),
    rule("tickets étudiant", "student_tickets_list", QUALIFIED),
    rule("billet étudiant", "student_tickets_list", QUALIFIED),
    rule("étudiants tickets", "student_tickets_list", QUALIFIED),
    rule("mes tickets", "user_tickets", QUALIFIED),
    rule("mes billets", "user_tickets", QUALIFIED),
    rule("liste trajets", "all_trajets", QUALIFIED),
    rule("qui est", "user_profile", QUALIFIED),
    // People
    rule("trajet", "user_travel", WORD),
    rule("parcours", "user_travel", WORD),
    rule("déplacement", "user_travel", WORD),
    rule("itinéraire", "user_travel", WORD),
    rule("informations", "user_profile", WORD),
    rule("profil", "user_profile", WORD),
    rule("personne", "user_profile", WORD),
    // Reviews
    rule("avis", "user_reviews", WORD),
    rule("commentaire", "user_reviews", WORD),
    rule("review", "user_reviews", WORD),
    rule("évaluation", "user_reviews", WORD),
    // Transport
    rule("transports", "transports_details", WORD),
    rule("véhicules", "transports_details", WORD),
    // Infrastructure
    rule("infrastructures", "infrastructure_details", WORD),
    rule("bâtiments", "infrastructure_details", WORD),
    rule("stations", "stations_recharge", WORD),
    rule("recharge", "stations_recharge", WORD),
    // Traffic
    rule("incidents", "incidents_trafic", WORD),
    rule("trafic", "incidents_trafic", WORD),
    rule("embouteillages", "incidents_trafic", WORD),
    rule("accidents", "incidents_trafic", WORD),
    // Statistics
    rule("statistiques", "statistiques_accidents", WORD),
    rule("stats", "statistiques_accidents", WORD),
    rule("radars", "radars_details", WORD),
];

/// Rules sorted by descending priority; the sort is stable so table order
/// breaks ties.
static ORDERED_RULES: LazyLock<Vec<&'static KeywordRule>> = LazyLock::new(|| {
    let mut rules: Vec<_> = KEYWORD_RULES.iter().collect();
    rules.sort_by(|a, b| b.priority.cmp(&a.priority));
    rules
});

/// [`KEYWORD_RULES`] in evaluation order.
pub fn ordered_rules() -> &'static [&'static KeywordRule] {
    &ORDERED_RULES
}
