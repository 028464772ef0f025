use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Already-resolved patient data handed in by the caller.
/// The engine never looks patients up itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientContext {
    pub patient_id: Uuid,
    /// Recorded allergies, free text ("Penicilina", "sulfa drugs", ...).
    #[serde(default)]
    pub allergies: Vec<String>,
    /// Raw names of the patient's currently active medications.
    #[serde(default)]
    pub current_medications: Vec<String>,
}
