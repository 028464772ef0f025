use serde::{Deserialize, Serialize};

/// Fragments of controlled-substance names (opioids, benzodiazepines,
/// stimulants, barbiturates). Membership is substring containment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControlledSubstanceSet(Vec<String>);

impl ControlledSubstanceSet {
    pub fn new<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            fragments
                .into_iter()
                .map(|f| f.into().trim().to_lowercase())
                .filter(|f| !f.is_empty())
                .collect(),
        )
    }

    /// True iff any fragment occurs in the lower-cased name.
    pub fn is_controlled(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.0.iter().any(|fragment| lower.contains(fragment.as_str()))
    }

    /// The fragment that classified `name`, if any.
    pub fn matching_fragment(&self, name: &str) -> Option<&str> {
        let lower = name.to_lowercase();
        self.0
            .iter()
            .find(|fragment| lower.contains(fragment.as_str()))
            .map(String::as_str)
    }

    pub fn fragments(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub(crate) fn builtin() -> ControlledSubstanceSet {
    ControlledSubstanceSet::new([
        // Opioids
        "morfina",
        "morphine",
        "oxicodona",
        "oxycodone",
        "hidrocodona",
        "hydrocodone",
        "hidromorfona",
        "hydromorphone",
        "fentanilo",
        "fentanyl",
        "metadona",
        "methadone",
        "codeina",
        "codeína",
        "codeine",
        "tramadol",
        "tapentadol",
        "buprenorfina",
        "buprenorphine",
        "petidina",
        "meperidine",
        // Benzodiazepines and hypnotics
        "alprazolam",
        "clonazepam",
        "diazepam",
        "lorazepam",
        "midazolam",
        "bromazepam",
        "triazolam",
        "zolpidem",
        // Stimulants
        "metilfenidato",
        "methylphenidate",
        "anfetamina",
        "amphetamine",
        "modafinilo",
        // Barbiturates and anesthetics
        "fenobarbital",
        "phenobarbital",
        "ketamina",
        "ketamine",
    ])
}
