use thiserror::Error;
use uuid::Uuid;

use crate::models::enums::{PrescriptionStatus, RecordEntryType};

// ---------------------------------------------------------------------------
// ValidationError
// ---------------------------------------------------------------------------

/// A prescription (or record entry) violates a content rule.
/// Always recoverable by correcting the input; never retried automatically.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("A prescription must contain between 1 and {max} items (got {count})")]
    ItemCount { count: usize, max: usize },

    #[error("Item {index}: medication name is required")]
    MissingMedicationName { index: usize },

    #[error("Item {index} ({medication}): dosage is required")]
    MissingDosage { index: usize, medication: String },

    #[error("Item {index} ({medication}): dosage '{dosage}' must contain a numeric amount")]
    MalformedDosage {
        index: usize,
        medication: String,
        dosage: String,
    },

    #[error("Item {index} ({medication}): frequency is required")]
    MissingFrequency { index: usize, medication: String },

    #[error("Item {index} ({medication}): frequency '{frequency}' is not recognized")]
    UnrecognizedFrequency {
        index: usize,
        medication: String,
        frequency: String,
    },

    #[error("Item {index} ({medication}): quantity must be a positive integer no larger than 4294967295 (got {quantity})")]
    InvalidQuantity {
        index: usize,
        medication: String,
        quantity: i64,
    },

    #[error("Medication '{0}' appears more than once in the prescription")]
    DuplicateMedication(String),

    #[error("Diagnosis is required")]
    MissingDiagnosis,

    #[error("Diagnosis must be at least {min} characters long (got {len})")]
    DiagnosisTooShort { len: usize, min: usize },

    #[error("Controlled substance '{medication}' allows at most {max} refills (requested {requested})")]
    ControlledRefillLimit {
        medication: String,
        requested: u32,
        max: u32,
    },

    #[error("Blocked interaction: {blood_thinner} cannot be prescribed together with {nsaid}")]
    BlockedInteraction {
        blood_thinner: String,
        nsaid: String,
    },

    #[error("Patient is allergic to {allergy}; cannot prescribe {medication}")]
    AllergyConflict { medication: String, allergy: String },

    #[error("{medication}: refill allowance {allowed} is below the {used} refills already dispensed")]
    RefillAllowanceBelowUsed {
        medication: String,
        allowed: u32,
        used: u32,
    },

    #[error("{} entry must be at least {min} characters long (got {len})", .entry_type.as_str())]
    RecordEntryTooShort {
        entry_type: RecordEntryType,
        len: usize,
        min: usize,
    },
}

// ---------------------------------------------------------------------------
// RefillError
// ---------------------------------------------------------------------------

/// A refill request violates the ledger invariant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RefillError {
    #[error("{0} is not refillable")]
    NotRefillable(String),

    #[error("Refill count must be at least 1")]
    InvalidCount,

    #[error("{medication}: requested {requested} refills but only {remaining} remain")]
    InsufficientRefills {
        medication: String,
        requested: u32,
        remaining: u32,
    },

    #[error("{medication} is a controlled substance: only one refill per request (requested {requested})")]
    ControlledMultiRefill { medication: String, requested: u32 },

    #[error("Prescription item {index} does not exist")]
    UnknownItem { index: usize },
}

// ---------------------------------------------------------------------------
// LifecycleError
// ---------------------------------------------------------------------------

/// An illegal transition was requested on a prescription.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Prescription {id} is {} and cannot be {action}", .status.as_str())]
    InvalidTransition {
        id: Uuid,
        status: PrescriptionStatus,
        action: &'static str,
    },

    #[error("A cancellation reason is required")]
    MissingCancelReason,
}

// ---------------------------------------------------------------------------
// SafetyError
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum SafetyError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Refill(#[from] RefillError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("Reference data load failed ({0}): {1}")]
    ReferenceDataLoad(String, String),

    #[error("Reference data parse failed ({0}): {1}")]
    ReferenceDataParse(String, String),

    #[error("Config load failed ({0}): {1}")]
    ConfigLoad(String, String),

    #[error("Config parse failed ({0}): {1}")]
    ConfigParse(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_carry_reason() {
        let err = ValidationError::MalformedDosage {
            index: 0,
            medication: "Ibuprofeno".into(),
            dosage: "once a day".into(),
        };
        assert_eq!(
            err.to_string(),
            "Item 0 (Ibuprofeno): dosage 'once a day' must contain a numeric amount"
        );
    }

    #[test]
    fn lifecycle_message_names_status() {
        let id = Uuid::nil();
        let err = LifecycleError::InvalidTransition {
            id,
            status: PrescriptionStatus::Completed,
            action: "canceled",
        };
        assert!(err.to_string().contains("COMPLETED"));
        assert!(err.to_string().contains("canceled"));
    }

    #[test]
    fn safety_error_is_transparent() {
        let err: SafetyError = RefillError::InvalidCount.into();
        assert_eq!(err.to_string(), "Refill count must be at least 1");
    }
}
