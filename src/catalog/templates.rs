//! Static SPARQL query templates.
//!
//! Entity-scoped bodies reference the subject through the `${user}` sentinel;
//! global bodies are executed verbatim.

use super::{QueryTemplate, TemplateScope};

pub static TEMPLATES: &[QueryTemplate] = &[
    QueryTemplate {
        key: "user_travel",
        scope: TemplateScope::EntityScoped,
        body: r#"PREFIX mobilite: <http://www.semanticweb.org/smartcity/ontologies/mobilite#>
PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
SELECT ?trajet ?typeTrajet ?depart ?arrivee ?transport ?duree ?distance
       ?heureDepart ?heureArrivee ?conditionsMeteo ?scoreConfort ?scoreSecurite
       ?consommationEnergie ?emissionsCO2 ?vitesseMoyenne
WHERE {
  mobilite:${user} mobilite:effectueTrajet ?trajet .
  ?trajet rdf:type ?typeTrajet .
  ?trajet mobilite:commenceA ?depart .
  ?trajet mobilite:termineA ?arrivee .
  OPTIONAL { ?trajet mobilite:utiliseMoyenTransport ?transport . }
  OPTIONAL { ?trajet mobilite:duree ?duree . }
  OPTIONAL { ?trajet mobilite:distance ?distance . }
  OPTIONAL { ?trajet mobilite:heureDepart ?heureDepart . }
  OPTIONAL { ?trajet mobilite:heureArrivee ?heureArrivee . }
  OPTIONAL { ?trajet mobilite:conditionsMeteo ?conditionsMeteo . }
  OPTIONAL { ?trajet mobilite:scoreConfort ?scoreConfort . }
  OPTIONAL { ?trajet mobilite:scoreSecurite ?scoreSecurite . }
  OPTIONAL { ?trajet mobilite:consommationEnergie ?consommationEnergie . }
  OPTIONAL { ?trajet mobilite:emissionsCO2 ?emissionsCO2 . }
  OPTIONAL { ?trajet mobilite:vitesseMoyenne ?vitesseMoyenne . }
}
ORDER BY ?heureDepart
"#,
    },
    QueryTemplate {
        key: "user_profile",
        scope: TemplateScope::EntityScoped,
        body: r#"PREFIX mobilite: <http://www.semanticweb.org/smartcity/ontologies/mobilite#>
PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
SELECT ?prenom ?nom ?age ?habitation ?travail ?transportPrefere ?typePersonne
       ?email ?telephone ?nationalite ?genre ?dateNaissance ?dateInscription
       ?niveauAbonnement ?scoreFidelite ?statutCompte ?languePreferee
       ?preferencesAccessibilite
WHERE {
  mobilite:${user} mobilite:prenom ?prenom .
  mobilite:${user} mobilite:nom ?nom .
  OPTIONAL { mobilite:${user} mobilite:age ?age . }
  OPTIONAL { mobilite:${user} mobilite:habiteA ?habitation . }
  OPTIONAL { mobilite:${user} mobilite:travailleA ?travail . }
  OPTIONAL { mobilite:${user} mobilite:prefereMoyenTransport ?transportPrefere . }
  OPTIONAL { mobilite:${user} mobilite:email ?email . }
  OPTIONAL { mobilite:${user} mobilite:telephone ?telephone . }
  OPTIONAL { mobilite:${user} mobilite:nationalite ?nationalite . }
  OPTIONAL { mobilite:${user} mobilite:genre ?genre . }
  OPTIONAL { mobilite:${user} mobilite:dateNaissance ?dateNaissance . }
  OPTIONAL { mobilite:${user} mobilite:dateInscription ?dateInscription . }
  OPTIONAL { mobilite:${user} mobilite:niveauAbonnement ?niveauAbonnement . }
  OPTIONAL { mobilite:${user} mobilite:scoreFidelite ?scoreFidelite . }
  OPTIONAL { mobilite:${user} mobilite:statutCompte ?statutCompte . }
  OPTIONAL { mobilite:${user} mobilite:languePreferee ?languePreferee . }
  OPTIONAL { mobilite:${user} mobilite:preferencesAccessibilite ?preferencesAccessibilite . }
  OPTIONAL {
    mobilite:${user} rdf:type ?typePersonne .
    FILTER(?typePersonne != mobilite:Personne)
  }
}
"#,
    },
    QueryTemplate {
        key: "user_tickets",
        scope: TemplateScope::EntityScoped,
        body: r#"PREFIX mobilite: <http://www.semanticweb.org/smartcity/ontologies/mobilite#>
SELECT ?ticket ?typeTicket ?prix ?statut ?dateExpiration ?numeroTicket
       ?zoneValidite ?classeTicket ?dateAchat ?methodePaiement ?acheteA
       ?valablePour ?donneAccesA ?nombreValidations
WHERE {
  mobilite:${user} mobilite:possedeTicket ?ticket .
  ?ticket mobilite:typeTicket ?typeTicket .
  OPTIONAL { ?ticket mobilite:prix ?prix . }
  OPTIONAL { ?ticket mobilite:statutTicket ?statut . }
  OPTIONAL { ?ticket mobilite:dateExpiration ?dateExpiration . }
  OPTIONAL { ?ticket mobilite:numeroTicket ?numeroTicket . }
  OPTIONAL { ?ticket mobilite:zoneValidite ?zoneValidite . }
  OPTIONAL { ?ticket mobilite:classeTicket ?classeTicket . }
  OPTIONAL { ?ticket mobilite:dateAchat ?dateAchat . }
  OPTIONAL { ?ticket mobilite:methodePaiement ?methodePaiement . }
  OPTIONAL { ?ticket mobilite:acheteA ?acheteA . }
  OPTIONAL { ?ticket mobilite:valablePour ?valablePour . }
  OPTIONAL { ?ticket mobilite:donneAccesA ?donneAccesA . }
  OPTIONAL { ?ticket mobilite:nombreValidations ?nombreValidations . }
}
ORDER BY DESC(?dateAchat)
"#,
    },
    QueryTemplate {
        key: "user_reviews",
        scope: TemplateScope::EntityScoped,
        body: r#"PREFIX mobilite: <http://www.semanticweb.org/smartcity/ontologies/mobilite#>
SELECT ?avis ?note ?commentaire ?dateAvis ?categorie ?scoreUtilite ?langueAvis
       ?verifie ?nombreSignalements ?concerneTransport ?concerneInfrastructure
WHERE {
  mobilite:${user} mobilite:donneAvis ?avis .
  ?avis mobilite:note ?note .
  ?avis mobilite:commentaire ?commentaire .
  ?avis mobilite:dateAvis ?dateAvis .
  OPTIONAL { ?avis mobilite:categorieAvis ?categorie . }
  OPTIONAL { ?avis mobilite:scoreUtilite ?scoreUtilite . }
  OPTIONAL { ?avis mobilite:langueAvis ?langueAvis . }
  OPTIONAL { ?avis mobilite:verifie ?verifie . }
  OPTIONAL { ?avis mobilite:nombreSignalements ?nombreSignalements . }
  OPTIONAL { ?avis mobilite:concerneTransport ?concerneTransport . }
  OPTIONAL { ?avis mobilite:concerneInfrastructure ?concerneInfrastructure . }
}
ORDER BY DESC(?dateAvis)
"#,
    },
    QueryTemplate {
        key: "student_tickets_list",
        scope: TemplateScope::Global,
        body: r#"PREFIX mobilite: <http://www.semanticweb.org/smartcity/ontologies/mobilite#>
SELECT ?personne ?prenom ?nom ?ticket ?typeTicket ?prix ?numeroTicket ?dateAchat
       ?dateExpiration ?statutTicket ?zoneValidite ?classeTicket
WHERE {
  ?personne mobilite:possedeTicket ?ticket .
  ?personne mobilite:prenom ?prenom .
  ?personne mobilite:nom ?nom .
  ?ticket mobilite:typeTicket "Étudiant" .
  OPTIONAL { ?ticket mobilite:prix ?prix . }
  OPTIONAL { ?ticket mobilite:numeroTicket ?numeroTicket . }
  OPTIONAL { ?ticket mobilite:dateAchat ?dateAchat . }
  OPTIONAL { ?ticket mobilite:dateExpiration ?dateExpiration . }
  OPTIONAL { ?ticket mobilite:statutTicket ?statutTicket . }
  OPTIONAL { ?ticket mobilite:zoneValidite ?zoneValidite . }
  OPTIONAL { ?ticket mobilite:classeTicket ?classeTicket . }
}
ORDER BY ?prenom
"#,
    },
    QueryTemplate {
        key: "all_trajets",
        scope: TemplateScope::Global,
        body: r#"PREFIX mobilite: <http://www.semanticweb.org/smartcity/ontologies/mobilite#>
PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
SELECT ?trajet ?typeTrajet ?personne ?prenom ?depart ?arrivee ?duree ?distance
       ?heureDepart ?heureArrivee ?transport
WHERE {
  ?personne mobilite:effectueTrajet ?trajet .
  ?personne mobilite:prenom ?prenom .
  ?trajet rdf:type ?typeTrajet .
  ?trajet mobilite:commenceA ?depart .
  ?trajet mobilite:termineA ?arrivee .
  OPTIONAL { ?trajet mobilite:duree ?duree . }
  OPTIONAL { ?trajet mobilite:distance ?distance . }
  OPTIONAL { ?trajet mobilite:heureDepart ?heureDepart . }
  OPTIONAL { ?trajet mobilite:heureArrivee ?heureArrivee . }
  OPTIONAL { ?trajet mobilite:utiliseMoyenTransport ?transport . }
}
ORDER BY ?prenom
"#,
    },
    QueryTemplate {
        key: "infrastructure_details",
        scope: TemplateScope::Global,
        body: r#"PREFIX mobilite: <http://www.semanticweb.org/smartcity/ontologies/mobilite#>
PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
SELECT ?infrastructure ?typeInfrastructure ?adresse ?coordonneesGPS
       ?capaciteAccueil ?superficie ?etatMaintenance ?horairesOuverture
       ?dateConstruction ?niveauAccessibilite
WHERE {
  ?infrastructure rdf:type mobilite:Infrastructure .
  ?infrastructure rdf:type ?typeInfrastructure .
  FILTER(?typeInfrastructure != mobilite:Infrastructure)
  OPTIONAL { ?infrastructure mobilite:adresse ?adresse . }
  OPTIONAL { ?infrastructure mobilite:coordonneesGPS ?coordonneesGPS . }
  OPTIONAL { ?infrastructure mobilite:capaciteAccueil ?capaciteAccueil . }
  OPTIONAL { ?infrastructure mobilite:superficie ?superficie . }
  OPTIONAL { ?infrastructure mobilite:etatMaintenance ?etatMaintenance . }
  OPTIONAL { ?infrastructure mobilite:horairesOuverture ?horairesOuverture . }
  OPTIONAL { ?infrastructure mobilite:dateConstruction ?dateConstruction . }
  OPTIONAL { ?infrastructure mobilite:niveauAccessibilite ?niveauAccessibilite . }
}
ORDER BY ?typeInfrastructure
"#,
    },
    QueryTemplate {
        key: "stations_recharge",
        scope: TemplateScope::Global,
        body: r#"PREFIX mobilite: <http://www.semanticweb.org/smartcity/ontologies/mobilite#>
PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
SELECT ?station ?adresse ?puissanceMax ?prixKwh ?disponible
WHERE {
  ?station rdf:type mobilite:RechargeElectrique ;
           mobilite:adresse ?adresse ;
           mobilite:puissanceMax ?puissanceMax ;
           mobilite:prixKwh ?prixKwh ;
           mobilite:disponible ?disponible .
}
"#,
    },
    QueryTemplate {
        key: "transports_details",
        scope: TemplateScope::Global,
        body: r#"PREFIX mobilite: <http://www.semanticweb.org/smartcity/ontologies/mobilite#>
PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
SELECT ?transport ?typeTransport ?marque ?modele ?immatriculation ?couleur
       ?anneeFabrication ?kilometrage ?consommationMoyenne ?niveauCarburant
       ?conduitPar ?appartientA ?circuleSur ?utiliseStationRecharge
WHERE {
  ?transport rdf:type mobilite:ReseauTransport .
  ?transport rdf:type ?typeTransport .
  FILTER(?typeTransport != mobilite:ReseauTransport)
  OPTIONAL { ?transport mobilite:marque ?marque . }
  OPTIONAL { ?transport mobilite:modele ?modele . }
  OPTIONAL { ?transport mobilite:immatriculation ?immatriculation . }
  OPTIONAL { ?transport mobilite:couleur ?couleur . }
  OPTIONAL { ?transport mobilite:anneeFabrication ?anneeFabrication . }
  OPTIONAL { ?transport mobilite:kilometrage ?kilometrage . }
  OPTIONAL { ?transport mobilite:consommationMoyenne ?consommationMoyenne . }
  OPTIONAL { ?transport mobilite:niveauCarburant ?niveauCarburant . }
  OPTIONAL { ?transport mobilite:conduitPar ?conduitPar . }
  OPTIONAL { ?transport mobilite:appartientA ?appartientA . }
  OPTIONAL { ?transport mobilite:circuleSur ?circuleSur . }
  OPTIONAL { ?transport mobilite:utiliseStationRecharge ?utiliseStationRecharge . }
}
ORDER BY ?typeTransport
"#,
    },
    QueryTemplate {
        key: "statistiques_accidents",
        scope: TemplateScope::Global,
        body: r#"PREFIX mobilite: <http://www.semanticweb.org/smartcity/ontologies/mobilite#>
SELECT ?valeur ?unite ?periodeMesure ?tendance ?niveauConfiance
WHERE {
  mobilite:StatsAccidentsA1 mobilite:valeur ?valeur ;
                        mobilite:unite ?unite ;
                        mobilite:periodeMesure ?periodeMesure ;
                        mobilite:tendance ?tendance ;
                        mobilite:niveauConfiance ?niveauConfiance .
}
"#,
    },
    QueryTemplate {
        key: "incidents_trafic",
        scope: TemplateScope::Global,
        body: r#"PREFIX mobilite: <http://www.semanticweb.org/smartcity/ontologies/mobilite#>
PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
SELECT ?incident ?typeIncident ?cause ?gravite ?dureeIncident ?vitesseMoyenneTrafic
WHERE {
  ?incident rdf:type ?type ;
            mobilite:causeIncident ?cause ;
            mobilite:gravite ?gravite ;
            mobilite:dureeIncident ?dureeIncident ;
            mobilite:vitesseMoyenneTrafic ?vitesseMoyenneTrafic .
  FILTER(?type IN (mobilite:Embouteillage, mobilite:Accident))
}
"#,
    },
    QueryTemplate {
        key: "radars_details",
        scope: TemplateScope::Global,
        body: r#"PREFIX mobilite: <http://www.semanticweb.org/smartcity/ontologies/mobilite#>
PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
SELECT ?radar ?typeRadar ?vitesseMaximale ?nombreInfractions ?etatFonctionnement
WHERE {
  ?radar rdf:type mobilite:Radar ;
         mobilite:typeRadar ?typeRadar ;
         mobilite:vitesseMaximale ?vitesseMaximale ;
         mobilite:nombreInfractions ?nombreInfractions ;
         mobilite:etatFonctionnement ?etatFonctionnement .
}
"#,
    },
    QueryTemplate {
        key: "all_avis",
        scope: TemplateScope::Global,
        body: r#"PREFIX mobilite: <http://www.semanticweb.org/smartcity/ontologies/mobilite#>
PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
SELECT ?avis ?typeAvis ?note ?commentaire ?dateAvis ?categorieAvis ?scoreUtilite
       ?langueAvis ?verifie ?nombreSignalements ?personne ?prenom
       ?concerneTransport ?concerneInfrastructure
WHERE {
  ?avis rdf:type mobilite:Avis .
  ?avis rdf:type ?typeAvis .
  FILTER(?typeAvis != mobilite:Avis)
  ?avis mobilite:note ?note .
  ?avis mobilite:commentaire ?commentaire .
  ?avis mobilite:dateAvis ?dateAvis .
  ?personne mobilite:donneAvis ?avis .
  ?personne mobilite:prenom ?prenom .
  OPTIONAL { ?avis mobilite:categorieAvis ?categorieAvis . }
  OPTIONAL { ?avis mobilite:scoreUtilite ?scoreUtilite . }
  OPTIONAL { ?avis mobilite:langueAvis ?langueAvis . }
  OPTIONAL { ?avis mobilite:verifie ?verifie . }
  OPTIONAL { ?avis mobilite:nombreSignalements ?nombreSignalements . }
  OPTIONAL { ?avis mobilite:concerneTransport ?concerneTransport . }
  OPTIONAL { ?avis mobilite:concerneInfrastructure ?concerneInfrastructure . }
}
ORDER BY DESC(?dateAvis)
"#,
    },
    QueryTemplate {
        key: "trajets_oumaima",
        scope: TemplateScope::Global,
        body: r#"PREFIX mobilite: <http://www.semanticweb.org/smartcity/ontologies/mobilite#>
PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
SELECT ?trajet ?typeTrajet ?heureDepart ?heureArrivee
WHERE {
  mobilite:Oumaima mobilite:effectueTrajet ?trajet .
  ?trajet rdf:type ?typeTrajet .
  ?trajet mobilite:heureDepart ?heureDepart .
  ?trajet mobilite:heureArrivee ?heureArrivee .
}
"#,
    },
    QueryTemplate {
        key: "details_trajet_wala",
        scope: TemplateScope::Global,
        body: r#"PREFIX mobilite: <http://www.semanticweb.org/smartcity/ontologies/mobilite#>
SELECT ?distance ?duree ?vitesseMoyenne ?emissionsCO2
WHERE {
  mobilite:TrajetDomicileTravailWala mobilite:distance ?distance ;
                                      mobilite:duree ?duree ;
                                      mobilite:vitesseMoyenne ?vitesseMoyenne ;
                                      mobilite:emissionsCO2 ?emissionsCO2 .
}
"#,
    },
    QueryTemplate {
        key: "tickets_utilisateurs",
        scope: TemplateScope::Global,
        body: r#"PREFIX mobilite: <http://www.semanticweb.org/smartcity/ontologies/mobilite#>
SELECT ?personne ?nom ?ticket ?typeTicket ?prix
WHERE {
  ?personne mobilite:possedeTicket ?ticket ;
            mobilite:nom ?nom ;
            mobilite:prenom ?prenom .
  ?ticket mobilite:typeTicket ?typeTicket ;
          mobilite:prix ?prix .
}
"#,
    },
    QueryTemplate {
        key: "avis_utilisateurs",
        scope: TemplateScope::Global,
        body: r#"PREFIX mobilite: <http://www.semanticweb.org/smartcity/ontologies/mobilite#>
SELECT ?personne ?avis ?note ?commentaire ?dateAvis
WHERE {
  ?personne mobilite:donneAvis ?avis .
  ?avis mobilite:note ?note ;
        mobilite:commentaire ?commentaire ;
        mobilite:dateAvis ?dateAvis .
}
"#,
    },
    QueryTemplate {
        key: "vehicules_conducteurs",
        scope: TemplateScope::Global,
        body: r#"PREFIX mobilite: <http://www.semanticweb.org/smartcity/ontologies/mobilite#>
SELECT ?vehicule ?marque ?modele ?conducteur ?prenom ?nom
WHERE {
  ?vehicule mobilite:conduitPar ?conducteur ;
            mobilite:marque ?marque ;
            mobilite:modele ?modele .
  ?conducteur mobilite:prenom ?prenom ;
              mobilite:nom ?nom .
}
"#,
    },
    QueryTemplate {
        key: "trajets_points",
        scope: TemplateScope::Global,
        body: r#"PREFIX mobilite: <http://www.semanticweb.org/smartcity/ontologies/mobilite#>
PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
SELECT ?trajet ?typeTrajet ?depart ?arrivee ?distance ?duree
WHERE {
  ?trajet mobilite:commenceA ?depart ;
          mobilite:termineA ?arrivee ;
          mobilite:distance ?distance ;
          mobilite:duree ?duree .
  ?trajet rdf:type ?typeTrajet .
}
"#,
    },
    QueryTemplate {
        key: "transports_preferes",
        scope: TemplateScope::Global,
        body: r#"PREFIX mobilite: <http://www.semanticweb.org/smartcity/ontologies/mobilite#>
PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
SELECT ?personne ?prenom ?nom ?moyenTransport ?typeTransport
WHERE {
  ?personne mobilite:prefereMoyenTransport ?moyenTransport ;
            mobilite:prenom ?prenom ;
            mobilite:nom ?nom .
  ?moyenTransport rdf:type ?typeTransport .
}
"#,
    },
    QueryTemplate {
        key: "reseaux_transport",
        scope: TemplateScope::Global,
        body: r#"PREFIX mobilite: <http://www.semanticweb.org/smartcity/ontologies/mobilite#>
PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
SELECT ?personne ?prenom ?nom ?reseauTransport ?typeReseau
WHERE {
  ?personne mobilite:utiliseReseauTransport ?reseauTransport ;
            mobilite:prenom ?prenom ;
            mobilite:nom ?nom .
  ?reseauTransport rdf:type ?typeReseau .
}
"#,
    },
    QueryTemplate {
        key: "batiments_equipements",
        scope: TemplateScope::Global,
        body: r#"PREFIX mobilite: <http://www.semanticweb.org/smartcity/ontologies/mobilite#>
PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
SELECT ?batiment ?adresse ?equipement ?typeEquipement
WHERE {
  ?batiment rdf:type mobilite:Batiment ;
            mobilite:adresse ?adresse ;
            mobilite:disposeDe ?equipement .
  ?equipement rdf:type ?typeEquipement .
}
"#,
    },
    QueryTemplate {
        key: "trajets_optimaux",
        scope: TemplateScope::Global,
        body: r#"PREFIX mobilite: <http://www.semanticweb.org/smartcity/ontologies/mobilite#>
PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
SELECT ?trajet ?scoreOptimisation ?scoreConfort ?scoreSecurite ?consommationEnergie
WHERE {
  ?trajet rdf:type mobilite:TrajetOptimal ;
          mobilite:scoreOptimisation ?scoreOptimisation ;
          mobilite:scoreConfort ?scoreConfort ;
          mobilite:scoreSecurite ?scoreSecurite ;
          mobilite:consommationEnergie ?consommationEnergie .
}
"#,
    },
    QueryTemplate {
        key: "zones_frequentees",
        scope: TemplateScope::Global,
        body: r#"PREFIX mobilite: <http://www.semanticweb.org/smartcity/ontologies/mobilite#>
PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
SELECT ?personne ?prenom ?nom ?zone ?typeZone ?adresse
WHERE {
  ?personne mobilite:frequenteZone ?zone ;
            mobilite:prenom ?prenom ;
            mobilite:nom ?nom .
  ?zone mobilite:adresse ?adresse ;
        rdf:type ?typeZone .
}
"#,
    },
];
