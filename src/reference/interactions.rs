use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::InteractionSeverity::{self, Contraindicated, Major, Moderate};
use crate::models::MedicationKey;

use super::groups::{
    AINE, ANTICOAGULANTES, ANTIPLAQUETARIOS, BETABLOQUEANTES, CALCIOANTAGONISTAS,
    CORTICOSTEROIDES, DIURETICOS, IECA_ARA_II, IMAO, ISRS,
};

/// One directed interaction fact, stored under its subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionFact {
    pub object: MedicationKey,
    pub description: String,
    #[serde(default = "default_severity")]
    pub severity: InteractionSeverity,
}

fn default_severity() -> InteractionSeverity {
    InteractionSeverity::Moderate
}

/// Directed lookup: subject key -> facts about other medications.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairwiseInteractionIndex {
    by_subject: HashMap<MedicationKey, Vec<InteractionFact>>,
}

impl PairwiseInteractionIndex {
    /// Facts registered for `subject` (empty for unknown medications).
    pub fn facts_for(&self, subject: &MedicationKey) -> &[InteractionFact] {
        self.by_subject
            .get(subject)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Facts of `subject` whose object is `object`, in registration order.
    pub fn facts_between<'a>(
        &'a self,
        subject: &MedicationKey,
        object: &'a MedicationKey,
    ) -> impl Iterator<Item = &'a InteractionFact> + 'a {
        self.facts_for(subject)
            .iter()
            .filter(move |f| &f.object == object)
    }

    /// Register the same fact list under every alias in `subjects`.
    pub fn register(&mut self, subjects: &[MedicationKey], facts: &[InteractionFact]) {
        for subject in subjects {
            self.by_subject
                .entry(subject.clone())
                .or_default()
                .extend(facts.iter().cloned());
        }
    }

    pub fn subject_count(&self) -> usize {
        self.by_subject.len()
    }

    pub(crate) fn into_entries(self) -> HashMap<MedicationKey, Vec<InteractionFact>> {
        self.by_subject
    }

    pub(crate) fn from_entries(by_subject: HashMap<MedicationKey, Vec<InteractionFact>>) -> Self {
        Self { by_subject }
    }
}

/// Class-level rule: fires when the patient has at least one medication in
/// every listed group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupInteractionRule {
    pub groups: Vec<String>,
    pub description: String,
    #[serde(default = "default_severity")]
    pub severity: InteractionSeverity,
}

// ---------------------------------------------------------------------------
// Built-in tables
// ---------------------------------------------------------------------------

fn keys(names: &[&str]) -> Vec<MedicationKey> {
    names
        .iter()
        .map(|n| MedicationKey::from_canonical(*n))
        .collect()
}

fn facts(entries: &[(&str, &str, InteractionSeverity)]) -> Vec<InteractionFact> {
    entries
        .iter()
        .map(|(object, description, severity)| InteractionFact {
            object: MedicationKey::from_canonical(*object),
            description: description.to_string(),
            severity: *severity,
        })
        .collect()
}

/// Same description and severity against several objects.
fn against(objects: &[&str], description: &str, severity: InteractionSeverity) -> Vec<InteractionFact> {
    objects
        .iter()
        .map(|object| InteractionFact {
            object: MedicationKey::from_canonical(*object),
            description: description.to_string(),
            severity,
        })
        .collect()
}

const SANGRADO_ASPIRINA: &str =
    "Aumenta el riesgo de sangrado. Evitar la combinación salvo indicación expresa.";
const SANGRADO_AINE: &str = "Aumenta el riesgo de sangrado gastrointestinal.";
const SANGRADO_CLOPIDOGREL: &str = "Riesgo de sangrado aumentado por efecto antiagregante sumado.";
const DOBLE_ANTIAGREGACION: &str = "Doble antiagregación: riesgo hemorrágico aumentado.";
const METOTREXATO: &str = "Reduce la eliminación de metotrexato; riesgo de toxicidad.";
const LITIO: &str = "Aumenta los niveles de litio; riesgo de toxicidad.";
const SEROTONINERGICO: &str = "Riesgo de síndrome serotoninérgico y de convulsiones.";
const HIPERPOTASEMIA: &str = "Riesgo de hiperpotasemia. Vigilar potasio sérico.";
const MIOPATIA: &str = "Aumenta los niveles de estatina; riesgo de miopatía y rabdomiólisis.";
const NITRATOS: &str = "Hipotensión grave. Combinación contraindicada.";
const CLOPIDOGREL_IBP: &str =
    "Reduce la activación del clopidogrel y su efecto antiagregante.";
const IECA_AINE: &str =
    "Reduce el efecto antihipertensivo y puede deteriorar la función renal.";

pub(crate) fn builtin_index() -> PairwiseInteractionIndex {
    let mut index = PairwiseInteractionIndex::default();

    index.register(
        &keys(&["warfarina", "acenocumarol"]),
        &[
            facts(&[
                ("aspirina", SANGRADO_ASPIRINA, Major),
                ("clopidogrel", SANGRADO_CLOPIDOGREL, Major),
                ("amiodarona", "Potencia el efecto anticoagulante; vigilar INR.", Major),
                (
                    "fluconazol",
                    "Inhibe el metabolismo del anticoagulante; riesgo de INR elevado.",
                    Major,
                ),
                ("metronidazol", "Potencia el efecto anticoagulante; vigilar INR.", Major),
                (
                    "acetaminofen",
                    "Dosis altas y prolongadas pueden elevar el INR.",
                    Moderate,
                ),
                ("simvastatina", "Puede aumentar el efecto anticoagulante.", Moderate),
            ]),
            against(&["ibuprofeno", "naproxeno", "diclofenaco"], SANGRADO_AINE, Major),
        ]
        .concat(),
    );

    index.register(
        &keys(&["aspirina"]),
        &[
            against(&["warfarina", "acenocumarol"], SANGRADO_ASPIRINA, Major),
            facts(&[
                (
                    "ibuprofeno",
                    "El ibuprofeno puede interferir con el efecto antiagregante de la aspirina.",
                    Moderate,
                ),
                ("metotrexato", METOTREXATO, Major),
                ("clopidogrel", DOBLE_ANTIAGREGACION, Moderate),
            ]),
        ]
        .concat(),
    );

    index.register(
        &keys(&["ibuprofeno", "naproxeno", "diclofenaco"]),
        &[
            against(&["warfarina", "acenocumarol"], SANGRADO_AINE, Major),
            facts(&[
                ("metotrexato", METOTREXATO, Major),
                ("litio", LITIO, Major),
                (
                    "prednisona",
                    "Riesgo aumentado de úlcera y hemorragia digestiva.",
                    Moderate,
                ),
            ]),
            against(&["enalapril", "losartan"], IECA_AINE, Moderate),
        ]
        .concat(),
    );

    index.register(
        &keys(&["clopidogrel"]),
        &[
            against(&["omeprazol", "esomeprazol"], CLOPIDOGREL_IBP, Major),
            facts(&[
                ("warfarina", SANGRADO_CLOPIDOGREL, Major),
                ("aspirina", DOBLE_ANTIAGREGACION, Moderate),
            ]),
        ]
        .concat(),
    );

    index.register(
        &keys(&["omeprazol", "esomeprazol"]),
        &facts(&[("clopidogrel", CLOPIDOGREL_IBP, Major)]),
    );

    let isrs = ["sertralina", "fluoxetina", "paroxetina", "citalopram", "escitalopram"];
    index.register(
        &keys(&isrs),
        &facts(&[
            ("tramadol", SEROTONINERGICO, Major),
            ("linezolid", "Riesgo de síndrome serotoninérgico.", Major),
            ("sumatriptan", "Riesgo de síndrome serotoninérgico.", Moderate),
        ]),
    );
    index.register(&keys(&["tramadol"]), &against(&isrs, SEROTONINERGICO, Major));

    let ieca_ara = ["enalapril", "lisinopril", "captopril", "ramipril", "losartan", "valsartan"];
    index.register(
        &keys(&ieca_ara),
        &[
            against(&["espironolactona", "eplerenona", "amilorida"], HIPERPOTASEMIA, Major),
            facts(&[
                ("cloruro de potasio", "Riesgo de hiperpotasemia.", Major),
                ("litio", LITIO, Major),
            ]),
        ]
        .concat(),
    );
    index.register(
        &keys(&["espironolactona", "eplerenona"]),
        &against(&ieca_ara, HIPERPOTASEMIA, Major),
    );

    index.register(
        &keys(&["simvastatina", "atorvastatina", "lovastatina"]),
        &[
            against(
                &["claritromicina", "eritromicina", "itraconazol", "ketoconazol"],
                MIOPATIA,
                Major,
            ),
            facts(&[
                ("gemfibrozilo", "Riesgo aumentado de miopatía.", Major),
                (
                    "amiodarona",
                    "Riesgo aumentado de miopatía con dosis altas de estatina.",
                    Moderate,
                ),
            ]),
        ]
        .concat(),
    );

    index.register(
        &keys(&["digoxina"]),
        &[
            facts(&[
                (
                    "amiodarona",
                    "Aumenta los niveles de digoxina; riesgo de toxicidad digitálica.",
                    Major,
                ),
                (
                    "verapamilo",
                    "Aumenta los niveles de digoxina y el riesgo de bradicardia.",
                    Major,
                ),
            ]),
            against(
                &["furosemida", "hidroclorotiazida"],
                "La hipopotasemia por diurético aumenta la toxicidad digitálica.",
                Moderate,
            ),
        ]
        .concat(),
    );

    index.register(
        &keys(&["metotrexato"]),
        &[
            facts(&[(
                "trimetoprima sulfametoxazol",
                "Riesgo de toxicidad medular grave.",
                Major,
            )]),
            against(&["ibuprofeno", "naproxeno", "aspirina"], METOTREXATO, Major),
        ]
        .concat(),
    );

    index.register(
        &keys(&["litio"]),
        &[
            against(&["ibuprofeno", "naproxeno", "diclofenaco", "enalapril", "losartan"], LITIO, Major),
            facts(&[(
                "hidroclorotiazida",
                "Las tiazidas reducen la eliminación de litio; riesgo de toxicidad.",
                Major,
            )]),
        ]
        .concat(),
    );

    index.register(
        &keys(&["metoprolol", "atenolol", "propranolol", "bisoprolol"]),
        &against(
            &["verapamilo", "diltiazem"],
            "Riesgo de bradicardia grave y bloqueo auriculoventricular.",
            Major,
        ),
    );

    let nitratos = ["nitroglicerina", "dinitrato de isosorbida", "mononitrato de isosorbida"];
    index.register(
        &keys(&["sildenafilo", "tadalafilo"]),
        &against(&nitratos, NITRATOS, Contraindicated),
    );
    index.register(
        &keys(&nitratos),
        &against(&["sildenafilo", "tadalafilo"], NITRATOS, Contraindicated),
    );

    index.register(
        &keys(&["levotiroxina"]),
        &[
            against(
                &["carbonato de calcio", "sulfato ferroso"],
                "Reduce la absorción de levotiroxina; separar las tomas al menos 4 horas.",
                Moderate,
            ),
            facts(&[(
                "omeprazol",
                "Puede reducir la absorción de levotiroxina.",
                Moderate,
            )]),
        ]
        .concat(),
    );

    index
}

fn rule(groups: &[&str], description: &str, severity: InteractionSeverity) -> GroupInteractionRule {
    GroupInteractionRule {
        groups: groups.iter().map(|g| g.to_string()).collect(),
        description: description.to_string(),
        severity,
    }
}

/// Ordered: pairwise class rules first, the three-way rule last.
pub(crate) fn builtin_group_rules() -> Vec<GroupInteractionRule> {
    vec![
        rule(
            &[AINE, ANTICOAGULANTES],
            "AINE + Anticoagulante: riesgo aumentado de hemorragia gastrointestinal. \
             Considere un analgésico alternativo o gastroprotección.",
            Major,
        ),
        rule(
            &[ANTICOAGULANTES, ANTIPLAQUETARIOS],
            "Anticoagulante + Antiplaquetario: efecto antitrombótico aditivo con mayor \
             riesgo hemorrágico. Vigilar signos de hemorragia.",
            Major,
        ),
        rule(
            &[AINE, CORTICOSTEROIDES],
            "AINE + Corticosteroide: riesgo aumentado de úlcera péptica y hemorragia \
             digestiva. Considere gastroprotección.",
            Moderate,
        ),
        rule(
            &[ISRS, IMAO],
            "ISRS + IMAO: riesgo de síndrome serotoninérgico potencialmente mortal. \
             Combinación contraindicada.",
            Contraindicated,
        ),
        rule(
            &[ISRS, AINE],
            "ISRS + AINE: riesgo aumentado de hemorragia digestiva alta.",
            Moderate,
        ),
        rule(
            &[ISRS, ANTICOAGULANTES],
            "ISRS + Anticoagulante: potenciación del efecto anticoagulante. \
             Vigilar INR y signos de hemorragia.",
            Moderate,
        ),
        rule(
            &[AINE, IECA_ARA_II],
            "AINE + IECA/ARA-II: reducción del efecto antihipertensivo y riesgo de \
             deterioro de la función renal.",
            Moderate,
        ),
        rule(
            &[AINE, DIURETICOS],
            "AINE + Diurético: reducción del efecto diurético y antihipertensivo.",
            Moderate,
        ),
        rule(
            &[BETABLOQUEANTES, CALCIOANTAGONISTAS],
            "Betabloqueante + Calcioantagonista: riesgo de bradicardia, hipotensión y \
             bloqueo auriculoventricular, especialmente con verapamilo o diltiazem.",
            Moderate,
        ),
        rule(
            &[IECA_ARA_II, DIURETICOS],
            "IECA/ARA-II + Diurético: riesgo de hipotensión de primera dosis y \
             alteraciones electrolíticas.",
            Moderate,
        ),
        rule(
            &[IECA_ARA_II, DIURETICOS, AINE],
            "Triple whammy (IECA/ARA-II + Diurético + AINE): alto riesgo de \
             insuficiencia renal aguda. Evitar la combinación.",
            Major,
        ),
    ]
}
