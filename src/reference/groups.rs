use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::models::MedicationKey;

pub const AINE: &str = "AINE";
pub const CORTICOSTEROIDES: &str = "Corticosteroides";
pub const ANTICOAGULANTES: &str = "Anticoagulantes";
pub const ANTIPLAQUETARIOS: &str = "Antiplaquetarios";
pub const ISRS: &str = "ISRS";
pub const IMAO: &str = "IMAO";
pub const DIURETICOS: &str = "Diureticos";
pub const BETABLOQUEANTES: &str = "Betabloqueantes";
pub const CALCIOANTAGONISTAS: &str = "Calcioantagonistas";
pub const IECA_ARA_II: &str = "IECA/ARA-II";

/// Named set of canonical medication keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugGroup {
    pub name: String,
    pub members: BTreeSet<MedicationKey>,
}

/// Static drug-class registry used for class-level reasoning.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DrugGroupRegistry {
    groups: Vec<DrugGroup>,
}

impl DrugGroupRegistry {
    pub fn new(groups: Vec<DrugGroup>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[DrugGroup] {
        &self.groups
    }

    pub fn members_of(&self, group: &str) -> Option<&BTreeSet<MedicationKey>> {
        self.groups
            .iter()
            .find(|g| g.name == group)
            .map(|g| &g.members)
    }

    /// Names of every group that lists `key` as a member.
    pub fn groups_containing(&self, key: &MedicationKey) -> BTreeSet<&str> {
        self.groups
            .iter()
            .filter(|g| g.members.contains(key))
            .map(|g| g.name.as_str())
            .collect()
    }

    /// Whether any of the patient's keys is a member of `group`
    /// (exact key equality, no substring matching).
    pub fn patient_has_group(&self, keys: &[MedicationKey], group: &str) -> bool {
        self.members_of(group)
            .is_some_and(|members| keys.iter().any(|k| members.contains(k)))
    }

    /// Every group the patient's medication list intersects, computed once.
    pub fn present_groups(&self, keys: &[MedicationKey]) -> HashSet<&str> {
        self.groups
            .iter()
            .filter(|g| keys.iter().any(|k| g.members.contains(k)))
            .map(|g| g.name.as_str())
            .collect()
    }

    pub(crate) fn groups_mut(&mut self) -> &mut Vec<DrugGroup> {
        &mut self.groups
    }
}

fn group(name: &str, members: &[&str]) -> DrugGroup {
    DrugGroup {
        name: name.to_string(),
        members: members
            .iter()
            .map(|m| MedicationKey::from_canonical(*m))
            .collect(),
    }
}

pub(crate) fn builtin() -> DrugGroupRegistry {
    DrugGroupRegistry::new(vec![
        group(
            AINE,
            &[
                "ibuprofeno",
                "naproxeno",
                "diclofenaco",
                "aspirina",
                "ketorolaco",
                "celecoxib",
                "etoricoxib",
                "meloxicam",
                "piroxicam",
                "indometacina",
                "ketoprofeno",
                "dexketoprofeno",
            ],
        ),
        group(
            CORTICOSTEROIDES,
            &[
                "prednisona",
                "prednisolona",
                "metilprednisolona",
                "dexametasona",
                "hidrocortisona",
                "betametasona",
                "deflazacort",
            ],
        ),
        group(
            ANTICOAGULANTES,
            &[
                "warfarina",
                "acenocumarol",
                "heparina",
                "enoxaparina",
                "rivaroxaban",
                "apixaban",
                "dabigatran",
                "edoxaban",
            ],
        ),
        group(
            ANTIPLAQUETARIOS,
            &["aspirina", "clopidogrel", "prasugrel", "ticagrelor", "ticlopidina"],
        ),
        group(
            ISRS,
            &[
                "sertralina",
                "fluoxetina",
                "paroxetina",
                "citalopram",
                "escitalopram",
                "fluvoxamina",
            ],
        ),
        group(
            IMAO,
            &[
                "fenelzina",
                "tranilcipromina",
                "isocarboxazida",
                "selegilina",
                "rasagilina",
                "moclobemida",
            ],
        ),
        group(
            DIURETICOS,
            &[
                "hidroclorotiazida",
                "clortalidona",
                "indapamida",
                "furosemida",
                "torasemida",
                "bumetanida",
                "espironolactona",
                "eplerenona",
                "amilorida",
            ],
        ),
        group(
            BETABLOQUEANTES,
            &[
                "metoprolol",
                "atenolol",
                "propranolol",
                "bisoprolol",
                "carvedilol",
                "nebivolol",
                "labetalol",
            ],
        ),
        group(
            CALCIOANTAGONISTAS,
            &["amlodipino", "nifedipino", "felodipino", "diltiazem", "verapamilo"],
        ),
        group(
            IECA_ARA_II,
            &[
                "enalapril",
                "lisinopril",
                "captopril",
                "ramipril",
                "perindopril",
                "losartan",
                "valsartan",
                "irbesartan",
                "candesartan",
                "telmisartan",
                "olmesartan",
            ],
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(names: &[&str]) -> Vec<MedicationKey> {
        names
            .iter()
            .map(|n| MedicationKey::from_canonical(*n))
            .collect()
    }

    #[test]
    fn ten_groups_registered() {
        assert_eq!(builtin().groups().len(), 10);
    }

    #[test]
    fn members_of_known_and_unknown_group() {
        let registry = builtin();
        let nsaids = registry.members_of(AINE).unwrap();
        assert!(nsaids.contains("ibuprofeno"));
        assert!(registry.members_of("Antibioticos").is_none());
    }

    #[test]
    fn aspirin_belongs_to_two_groups() {
        let registry = builtin();
        let groups = registry.groups_containing(&MedicationKey::from_canonical("aspirina"));
        assert_eq!(
            groups.into_iter().collect::<Vec<_>>(),
            vec![AINE, ANTIPLAQUETARIOS]
        );
    }

    #[test]
    fn patient_group_membership_is_exact() {
        let registry = builtin();
        assert!(registry.patient_has_group(&keys(&["enalapril"]), IECA_ARA_II));
        // "enalapril 10" is a different key; no substring matching.
        assert!(!registry.patient_has_group(&keys(&["enalapril 10"]), IECA_ARA_II));
    }

    #[test]
    fn present_groups_collects_every_intersection() {
        let registry = builtin();
        let present = registry.present_groups(&keys(&["ibuprofeno", "enalapril", "omeprazol"]));
        assert_eq!(present.len(), 2);
        assert!(present.contains(AINE));
        assert!(present.contains(IECA_ARA_II));
    }
}
