use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Exact-match synonym table applied as the last normalization step.
/// Keys are cleaned names; values are canonical keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SynonymTable(BTreeMap<String, String>);

impl SynonymTable {
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self(entries)
    }

    /// Canonical replacement for an already-cleaned name.
    pub fn canonical(&self, cleaned: &str) -> Option<&str> {
        self.0.get(cleaned).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// First synonym whose target is itself a key (would break idempotency).
    pub(crate) fn find_chained(&self) -> Option<(&str, &str)> {
        self.iter().find(|(_, target)| self.0.contains_key(*target))
    }
}

/// Spanish generic names are canonical; spellings, English names, common
/// brands and one known misspelling map onto them.
pub(crate) fn builtin() -> SynonymTable {
    let pairs: &[(&str, &str)] = &[
        // Analgesics / antipyretics
        ("acido acetilsalicilico", "aspirina"),
        ("ácido acetilsalicílico", "aspirina"),
        ("aas", "aspirina"),
        ("aspirin", "aspirina"),
        ("paracetamol", "acetaminofen"),
        ("acetaminofeno", "acetaminofen"),
        ("acetaminophen", "acetaminofen"),
        ("tylenol", "acetaminofen"),
        ("ibuprofen", "ibuprofeno"),
        ("advil", "ibuprofeno"),
        ("motrin", "ibuprofeno"),
        ("naproxen", "naproxeno"),
        ("diclofenac", "diclofenaco"),
        ("voltaren", "diclofenaco"),
        // Anticoagulants / antiplatelets
        ("warfarin", "warfarina"),
        ("coumadin", "warfarina"),
        ("sintrom", "acenocumarol"),
        ("heparin", "heparina"),
        ("xarelto", "rivaroxaban"),
        ("eliquis", "apixaban"),
        ("pradaxa", "dabigatran"),
        ("plavix", "clopidogrel"),
        // Cardiovascular
        ("metroprolol", "metoprolol"),
        ("amlodipina", "amlodipino"),
        ("nifedipina", "nifedipino"),
        ("hctz", "hidroclorotiazida"),
        ("furosemide", "furosemida"),
        ("lasix", "furosemida"),
        ("enalapril maleato", "enalapril"),
        ("losartán", "losartan"),
        ("losartan potasico", "losartan"),
        ("losartán potásico", "losartan"),
        ("digoxin", "digoxina"),
        ("simvastatin", "simvastatina"),
        ("atorvastatin", "atorvastatina"),
        // CNS
        ("sertraline", "sertralina"),
        ("zoloft", "sertralina"),
        ("fluoxetine", "fluoxetina"),
        ("prozac", "fluoxetina"),
        // Other
        ("eutirox", "levotiroxina"),
        ("levotiroxina sodica", "levotiroxina"),
        ("levotiroxina sódica", "levotiroxina"),
        ("bactrim", "trimetoprima sulfametoxazol"),
    ];

    SynonymTable(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}
