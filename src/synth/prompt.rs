//! Prompt construction for SPARQL synthesis.
//!
//! The prompt is French, like the questions it translates, and grounds the
//! model in the ontology schema before asking for a single bare query.

use std::fmt::Write;

use crate::ontology::{OntologySchema, SchemaEntry, SchemaSource};

/// Worked examples: question and the expected query shape.
const EXAMPLES: &[(&str, &str)] = &[
    (
        "Montre les routes",
        "SELECT ?route WHERE { ?route a mobilite:Route . }",
    ),
    (
        "Liste les conducteurs",
        "SELECT ?conducteur WHERE { ?conducteur a mobilite:Conducteur . }",
    ),
    (
        "Avis avec notes",
        "SELECT ?avis ?note WHERE { ?avis a mobilite:Avis . OPTIONAL { ?avis mobilite:note ?note . } }",
    ),
    (
        "Personnes avec leurs trajets",
        "SELECT ?personne ?trajet WHERE { ?personne mobilite:effectueTrajet ?trajet . }",
    ),
];

const RULES: &str = "\
1. POUR \"montrer les X\" → SELECT ?x WHERE { ?x a mobilite:X . }
2. POUR \"lister les Y\" → SELECT ?y WHERE { ?y a mobilite:Y . }
3. POUR \"afficher les Z\" → SELECT ?z WHERE { ?z a mobilite:Z . }
4. POUR les sous-classes : utiliser ?x a/rdfs:subClassOf* mobilite:ClasseMere
5. POUR les propriétés : utiliser OPTIONAL { ?x mobilite:propriete ?valeur . }
6. TOUJOURS inclure PREFIX mobilite: et PREFIX rdfs: si nécessaire
7. Utiliser des noms de variables explicites (?personne, ?trajet, ?avis), jamais ?x ou ?var1";

/// Build the synthesis prompt for one question.
pub fn build_prompt(question: &str, schema: &OntologySchema) -> String {
    let source = match schema.source {
        SchemaSource::Discovered => "ONTOLOGIE RÉELLE - DÉCOUVERTE AUTOMATIQUE",
        SchemaSource::Curated => "ONTOLOGIE DE RÉFÉRENCE",
    };
    let prefix = format!("PREFIX mobilite: <{}>", schema.namespace);

    let mut prompt = String::with_capacity(3072);
    prompt.push_str(
        "TU ES UN EXPERT SPARQL. Ta mission est de convertir des questions en français \
         en requêtes SPARQL VALIDES.\n\n",
    );
    let _ = writeln!(prompt, "# {source}");
    let _ = writeln!(prompt, "Namespace: {prefix}\n");

    prompt.push_str("## CLASSES DISPONIBLES (utiliser avec ?x a mobilite:Classe) :\n");
    push_entries(&mut prompt, &schema.classes, "instances");
    prompt.push_str("\n## PROPRIÉTÉS DISPONIBLES (utiliser avec ?x mobilite:propriete ?valeur) :\n");
    push_entries(&mut prompt, &schema.data_properties, "usages");
    prompt.push_str("\n## PROPRIÉTÉS OBJET (utiliser avec ?x mobilite:propriete ?y) :\n");
    push_entries(&mut prompt, &schema.object_properties, "usages");

    prompt.push_str("\n## RÈGLES ABSOLUES DE GÉNÉRATION :\n");
    prompt.push_str(RULES);
    prompt.push_str("\n\n## EXEMPLES CORRECTS :\n");
    for (q, shape) in EXAMPLES {
        let _ = writeln!(prompt, "Question: \"{q}\" → {prefix} {shape}");
    }

    let _ = writeln!(prompt, "\n## QUESTION À TRADUIRE : \"{}\"\n", question.trim());
    prompt.push_str(
        "GÉNÈRE UNIQUEMENT LA REQUÊTE SPARQL SANS AUCUN TEXTE NI BLOC MARKDOWN. \
         COMMENCE DIRECTEMENT PAR \"PREFIX\" ou \"SELECT\".\n",
    );
    prompt
}

fn push_entries(prompt: &mut String, entries: &[SchemaEntry], unit: &str) {
    if entries.iter().all(|e| e.count.is_none()) {
        // Uncounted: six names per line.
        for chunk in entries.chunks(6) {
            let names: Vec<&str> = chunk.iter().map(|e| e.name.as_str()).collect();
            let _ = writeln!(prompt, "- {}", names.join(", "));
        }
        return;
    }
    for entry in entries {
        match entry.count {
            Some(count) => {
                let _ = writeln!(prompt, "- {} ({count} {unit})", entry.name);
            }
            None => {
                let _ = writeln!(prompt, "- {}", entry.name);
            }
        }
    }
}
