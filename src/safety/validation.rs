//! Blocking content rules for a prescription, checked before anything is
//! stored. The first failing rule wins; non-blocking findings become warnings.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::ValidationError;
use crate::models::{ItemRequest, RecordEntryType};
use crate::reference::ReferenceData;

use super::messages::MessageTemplates;

/// Accepted frequency vocabulary (substring, case-insensitive).
const FREQUENCY_TOKENS: &[&str] = &[
    "daily",
    "twice",
    "three times",
    "four times",
    "every",
    "as needed",
    "bid",
    "tid",
    "qid",
    "prn",
];

const DOSAGE_UNITS: &[&str] = &["mg", "ml", "g", "mcg", "unit", "tablet"];

/// Creation-time hard block: any of these with any NSAID token below.
const BLOOD_THINNER_TOKENS: &[&str] = &["warfarin", "heparin", "rivaroxaban", "apixaban", "dabigatran"];
const NSAID_TOKENS: &[&str] = &["ibuprofen", "aspirin", "naproxen", "diclofenac", "celecoxib"];

/// Drug class recognized by the allergy cross-check.
struct AllergyClass {
    /// Name fragments that put a medication in the class.
    members: &'static [&'static str],
    /// Allergy wording that names the class.
    allergy_terms: &'static [&'static str],
}

const ALLERGY_CLASSES: &[AllergyClass] = &[
    AllergyClass {
        members: &["penicillin", "amoxicillin", "penicilin", "amoxicilin", "ampicilin"],
        allergy_terms: &["penicillin", "penicilina"],
    },
    AllergyClass {
        members: &["sulfa"],
        allergy_terms: &["sulfa"],
    },
];

/// Non-blocking findings of a successful validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub warnings: Vec<String>,
}

pub struct PrescriptionContentValidator {
    reference: Arc<ReferenceData>,
    config: EngineConfig,
}

impl PrescriptionContentValidator {
    pub fn new(reference: Arc<ReferenceData>, config: EngineConfig) -> Self {
        Self { reference, config }
    }

    /// Validate a prescription's items and diagnosis against the patient's
    /// recorded allergies.
    pub fn validate(
        &self,
        items: &[ItemRequest],
        diagnosis: &str,
        allergies: &[String],
    ) -> Result<ValidationReport, ValidationError> {
        let mut warnings = Vec::new();

        // 1. Item count
        if items.is_empty() || items.len() > self.config.max_items {
            return Err(ValidationError::ItemCount {
                count: items.len(),
                max: self.config.max_items,
            });
        }

        // 2. Per-item format
        for (index, item) in items.iter().enumerate() {
            check_item(index, item, &mut warnings)?;
        }

        // 3. Duplicates
        check_duplicates(items)?;

        // 4. Diagnosis
        self.check_diagnosis(diagnosis)?;

        // 5. Controlled substances
        self.check_controlled(items, &mut warnings)?;

        // 6. Blood thinner + NSAID
        check_blocked_combination(items)?;

        // 7. Allergies
        check_allergies(items, allergies)?;

        if !warnings.is_empty() {
            tracing::warn!(
                item_count = items.len(),
                warning_count = warnings.len(),
                "Prescription validation warnings"
            );
        }

        Ok(ValidationReport { warnings })
    }

    fn check_diagnosis(&self, diagnosis: &str) -> Result<(), ValidationError> {
        let trimmed = diagnosis.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::MissingDiagnosis);
        }
        let len = trimmed.chars().count();
        if len < self.config.min_diagnosis_len {
            return Err(ValidationError::DiagnosisTooShort {
                len,
                min: self.config.min_diagnosis_len,
            });
        }
        Ok(())
    }

    fn check_controlled(
        &self,
        items: &[ItemRequest],
        warnings: &mut Vec<String>,
    ) -> Result<(), ValidationError> {
        for item in items {
            let Some(substance) = self.reference.controlled.matching_fragment(&item.medication_name)
            else {
                continue;
            };
            let medication = item.medication_name.trim();
            if let Some(requested) = item.refills_allowed {
                if requested > self.config.controlled_max_refills {
                    return Err(ValidationError::ControlledRefillLimit {
                        medication: medication.to_string(),
                        requested,
                        max: self.config.controlled_max_refills,
                    });
                }
            }
            if item.quantity > i64::from(self.config.controlled_quantity_warning) {
                warnings.push(MessageTemplates::controlled_quantity(
                    medication,
                    substance,
                    item.quantity,
                    self.config.controlled_quantity_warning,
                ));
            }
        }
        Ok(())
    }
}

fn check_item(index: usize, item: &ItemRequest, warnings: &mut Vec<String>) -> Result<(), ValidationError> {
    let medication = item.medication_name.trim();
    if medication.is_empty() {
        return Err(ValidationError::MissingMedicationName { index });
    }

    let dosage = item.dosage.trim();
    if dosage.is_empty() {
        return Err(ValidationError::MissingDosage {
            index,
            medication: medication.to_string(),
        });
    }
    if !dosage.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::MalformedDosage {
            index,
            medication: medication.to_string(),
            dosage: dosage.to_string(),
        });
    }
    let dosage_lower = dosage.to_lowercase();
    if !DOSAGE_UNITS.iter().any(|unit| dosage_lower.contains(unit)) {
        warnings.push(MessageTemplates::dosage_without_unit(medication, dosage));
    }

    let frequency = item.frequency.trim();
    if frequency.is_empty() {
        return Err(ValidationError::MissingFrequency {
            index,
            medication: medication.to_string(),
        });
    }
    let frequency_lower = frequency.to_lowercase();
    if !FREQUENCY_TOKENS.iter().any(|t| frequency_lower.contains(t)) {
        return Err(ValidationError::UnrecognizedFrequency {
            index,
            medication: medication.to_string(),
            frequency: frequency.to_string(),
        });
    }

    if item.quantity <= 0 || item.quantity > i64::from(u32::MAX) {
        return Err(ValidationError::InvalidQuantity {
            index,
            medication: medication.to_string(),
            quantity: item.quantity,
        });
    }

    Ok(())
}

fn check_duplicates(items: &[ItemRequest]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for item in items {
        let name = item.medication_name.trim().to_lowercase();
        if !seen.insert(name) {
            return Err(ValidationError::DuplicateMedication(
                item.medication_name.trim().to_string(),
            ));
        }
    }
    Ok(())
}

fn contains_any(haystack: &str, tokens: &[&str]) -> bool {
    tokens.iter().any(|t| haystack.contains(t))
}

fn check_blocked_combination(items: &[ItemRequest]) -> Result<(), ValidationError> {
    let lowered: Vec<(String, &str)> = items
        .iter()
        .map(|i| (i.medication_name.to_lowercase(), i.medication_name.trim()))
        .collect();

    let blood_thinner = lowered
        .iter()
        .find(|(lower, _)| contains_any(lower, BLOOD_THINNER_TOKENS));
    let nsaid = lowered
        .iter()
        .find(|(lower, _)| contains_any(lower, NSAID_TOKENS));

    match (blood_thinner, nsaid) {
        (Some((_, blood_thinner)), Some((_, nsaid))) => Err(ValidationError::BlockedInteraction {
            blood_thinner: blood_thinner.to_string(),
            nsaid: nsaid.to_string(),
        }),
        _ => Ok(()),
    }
}

fn check_allergies(items: &[ItemRequest], allergies: &[String]) -> Result<(), ValidationError> {
    let recorded: Vec<(String, &str)> = allergies
        .iter()
        .map(|a| (a.to_lowercase(), a.trim()))
        .filter(|(lower, _)| !lower.trim().is_empty())
        .collect();
    if recorded.is_empty() {
        return Ok(());
    }

    for item in items {
        let medication = item.medication_name.trim();
        let name = medication.to_lowercase();

        // Direct: the allergy text names this medication.
        if let Some((_, allergy)) = recorded.iter().find(|(lower, _)| lower.contains(&name)) {
            return Err(ValidationError::AllergyConflict {
                medication: medication.to_string(),
                allergy: allergy.to_string(),
            });
        }

        // Class: the medication belongs to a class the patient is allergic to.
        for class in ALLERGY_CLASSES {
            if !contains_any(&name, class.members) {
                continue;
            }
            if let Some((_, allergy)) = recorded
                .iter()
                .find(|(lower, _)| contains_any(lower, class.allergy_terms))
            {
                return Err(ValidationError::AllergyConflict {
                    medication: medication.to_string(),
                    allergy: allergy.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Minimum-length check for a medical-record entry. Unrelated to prescriptions.
pub fn validate_record_entry(entry_type: RecordEntryType, text: &str) -> Result<(), ValidationError> {
    let len = text.trim().chars().count();
    let min = entry_type.min_length();
    if len < min {
        return Err(ValidationError::RecordEntryTooShort { entry_type, len, min });
    }
    Ok(())
}
