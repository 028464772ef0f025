use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::PrescriptionStatus;

/// One medication line of a prescription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrescriptionItem {
    /// Raw display form, as written by the prescriber.
    pub medication_name: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: Option<String>,
    pub instructions: Option<String>,
    pub route: Option<String>,
    pub quantity: u32,
    pub refillable: bool,
    pub refills_allowed: u32,
    /// Never exceeds `refills_allowed`; only advanced by the refill ledger.
    pub refills_used: u32,
}

impl PrescriptionItem {
    pub fn refills_remaining(&self) -> u32 {
        self.refills_allowed.saturating_sub(self.refills_used)
    }
}

/// Item as submitted by the caller, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRequest {
    pub medication_name: String,
    pub dosage: String,
    pub frequency: String,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub route: Option<String>,
    /// Signed so that zero/negative input is rejected by validation rather than
    /// being unrepresentable.
    pub quantity: i64,
    #[serde(default)]
    pub refillable: bool,
    #[serde(default)]
    pub refills_allowed: Option<u32>,
}

impl ItemRequest {
    /// Build the stored item. Callers validate first, so `quantity` is already
    /// known to fit a positive `u32`.
    pub fn into_item(self) -> PrescriptionItem {
        let refills_allowed = if self.refillable {
            self.refills_allowed.unwrap_or(0)
        } else {
            0
        };
        PrescriptionItem {
            medication_name: self.medication_name,
            dosage: self.dosage,
            frequency: self.frequency,
            duration: self.duration,
            instructions: self.instructions,
            route: self.route,
            quantity: u32::try_from(self.quantity).unwrap_or(0),
            refillable: self.refillable,
            refills_allowed,
            refills_used: 0,
        }
    }
}

/// Prescription aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prescription {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub issue_date: NaiveDate,
    pub diagnosis: String,
    pub notes: Option<String>,
    pub status: PrescriptionStatus,
    pub printed: bool,
    pub print_date: Option<NaiveDateTime>,
    pub items: Vec<PrescriptionItem>,
}

impl Prescription {
    /// A fresh ACTIVE prescription. Item invariants are the validator's job.
    pub fn new(
        doctor_id: Uuid,
        patient_id: Uuid,
        issue_date: NaiveDate,
        diagnosis: impl Into<String>,
        items: Vec<PrescriptionItem>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            doctor_id,
            patient_id,
            issue_date,
            diagnosis: diagnosis.into(),
            notes: None,
            status: PrescriptionStatus::Active,
            printed: false,
            print_date: None,
            items,
        }
    }

    /// Append a line to the free-text notes.
    pub fn append_note(&mut self, note: &str) {
        match self.notes.as_mut() {
            Some(existing) if !existing.trim().is_empty() => {
                existing.push('\n');
                existing.push_str(note);
            }
            _ => self.notes = Some(note.to_string()),
        }
    }
}

/// Request to create a prescription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescriptionRequest {
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub issue_date: NaiveDate,
    pub diagnosis: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub items: Vec<ItemRequest>,
}
