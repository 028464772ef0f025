use uuid::Uuid;

use crate::models::MedicationKey;

/// Message template builder for warnings and notes written by the engine.
/// Interaction text stays in the reference data's language; only the framing
/// lives here.
pub struct MessageTemplates;

impl MessageTemplates {
    /// Pairwise interaction: "Warfarina + Aspirina: {description}".
    pub fn pairwise(subject: &MedicationKey, object: &MedicationKey, description: &str) -> String {
        format!("{}: {}", Self::pair_prefix(subject, object), description)
    }

    /// Leading "{Subject} + {Object}" of a pairwise message.
    pub fn pair_prefix(subject: &MedicationKey, object: &MedicationKey) -> String {
        format!("{} + {}", subject.capitalized(), object.capitalized())
    }

    /// Note line appended on cancellation.
    pub fn canceled_marker(reason: &str) -> String {
        format!("[CANCELED: {}]", reason.trim())
    }

    /// Note on a renewed prescription pointing back to its source.
    pub fn renewal_note(source_id: Uuid) -> String {
        format!("Renewed from prescription {}", source_id)
    }

    /// Dosage has an amount but no recognizable unit.
    pub fn dosage_without_unit(medication: &str, dosage: &str) -> String {
        format!(
            "{}: dosage '{}' has no recognizable unit (mg, ml, g, mcg, unit, tablet).",
            medication, dosage,
        )
    }

    /// Controlled substance dispensed in a large quantity. `substance` is the
    /// controlled-list entry that matched.
    pub fn controlled_quantity(medication: &str, substance: &str, quantity: i64, threshold: u32) -> String {
        format!(
            "{} is a controlled substance ({}); quantity {} exceeds {}. Verify the amount.",
            medication, substance, quantity, threshold,
        )
    }
}
