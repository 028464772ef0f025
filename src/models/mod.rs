pub mod enums;
pub mod medication_key;
pub mod patient;
pub mod prescription;

pub use enums::*;
pub use medication_key::MedicationKey;
pub use patient::PatientContext;
pub use prescription::{ItemRequest, Prescription, PrescriptionItem, PrescriptionRequest};
