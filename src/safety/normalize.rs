//! Medication name normalization.
//!
//! Turns a raw, display-form name ("Aspirina (Bayer)", "ÁCIDO acetilsalicílico",
//! "Metroprolol") into a `MedicationKey` that interaction lookups compare on.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::MedicationKey;
use crate::reference::{ReferenceData, SynonymTable};

/// Brand-name annotations: "(Bayer)", "(500 mg)".
static RE_PARENTHESIZED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)").unwrap());

/// Steps 1-4: lower-case, drop parenthesized text, blank out every
/// non-alphanumeric character, collapse whitespace.
pub(crate) fn clean(raw: &str) -> String {
    let lower = raw.to_lowercase();
    let stripped = RE_PARENTHESIZED.replace_all(&lower, "");
    let spaced: String = stripped
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    collapse_whitespace(&spaced)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize against an explicit synonym table.
///
/// Total: blank input gives the empty key, anything else gives a non-empty key.
/// When cleaning erases everything ("(Bayer)", "!!!") the lower-cased input
/// is kept as the key so distinct garbage stays distinct.
pub fn normalize_with(raw: &str, synonyms: &SynonymTable) -> MedicationKey {
    let cleaned = clean(raw);
    if cleaned.is_empty() {
        return MedicationKey::from_canonical(collapse_whitespace(&raw.to_lowercase()));
    }
    match synonyms.canonical(&cleaned) {
        Some(canonical) => MedicationKey::from_canonical(canonical),
        None => MedicationKey::from_canonical(cleaned),
    }
}

/// Normalize against the compiled-in reference tables.
pub fn normalize(raw: &str) -> MedicationKey {
    normalize_with(raw, &ReferenceData::builtin().synonyms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_brand_annotation() {
        assert_eq!(normalize("Aspirina (Bayer)").as_str(), "aspirina");
        assert_eq!(clean("Aspirina (Bayer)"), "aspirina");
    }

    #[test]
    fn punctuation_becomes_single_space() {
        assert_eq!(
            normalize("Trimetoprima/Sulfametoxazol").as_str(),
            "trimetoprima sulfametoxazol"
        );
        assert_eq!(normalize("  Losartan   -  50  ").as_str(), "losartan 50");
    }

    #[test]
    fn keeps_accents_and_enye() {
        assert_eq!(clean("Ácido Fólico"), "ácido fólico");
        assert_eq!(clean("Piña-Colada"), "piña colada");
    }

    #[test]
    fn applies_synonyms() {
        assert_eq!(normalize("Ácido acetilsalicílico").as_str(), "aspirina");
        assert_eq!(normalize("acido acetilsalicilico").as_str(), "aspirina");
        assert_eq!(normalize("Paracetamol").as_str(), "acetaminofen");
        assert_eq!(normalize("Metroprolol").as_str(), "metoprolol");
    }

    #[test]
    fn paracetamol_and_acetaminofeno_are_same_key() {
        assert_eq!(normalize("Paracetamol"), normalize("acetaminofeno"));
    }

    #[test]
    fn synonym_requires_exact_match() {
        // "paracetamol 500" is not a synonym key and passes through unchanged.
        assert_eq!(normalize("Paracetamol 500").as_str(), "paracetamol 500");
    }

    #[test]
    fn empty_input_gives_empty_key() {
        assert!(normalize("").is_empty());
        assert!(normalize("   ").is_empty());
    }

    #[test]
    fn non_blank_input_never_gives_empty_key() {
        assert_eq!(normalize("(Bayer)").as_str(), "(bayer)");
        assert_eq!(normalize("!!!").as_str(), "!!!");
        assert!(!normalize("()").is_empty());
    }

    #[test]
    fn normalization_is_idempotent() {
        let samples = [
            "",
            "   ",
            "Aspirina (Bayer)",
            "ÁCIDO ACETILSALICÍLICO",
            "Paracetamol",
            "acetaminofeno",
            "Metroprolol 50mg",
            "Trimetoprima/Sulfametoxazol",
            "(Bayer)",
            "!!!",
            "a (b (c) d) e",
            "Ibuprofeno (Advil",
            "Losartán potásico",
            "İbuprofen",
        ];
        for raw in samples {
            let once = normalize(raw);
            let twice = normalize(once.as_str());
            assert_eq!(once, twice, "not idempotent for {raw:?}");
        }
    }
}
