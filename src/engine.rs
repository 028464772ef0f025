use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{RefillError, SafetyError, ValidationError};
use crate::models::{ItemRequest, PatientContext, Prescription, PrescriptionItem, PrescriptionRequest};
use crate::prescriptions::{lifecycle, RefillLedger};
use crate::reference::ReferenceData;
use crate::safety::{InteractionDetector, PrescriptionContentValidator};

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// A newly created prescription plus everything worth telling the prescriber.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedPrescription {
    pub prescription: Prescription,
    pub validation_warnings: Vec<String>,
    pub interaction_warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateOutcome {
    pub validation_warnings: Vec<String>,
    pub interaction_warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefillOutcome {
    pub item_index: usize,
    pub refills_used: u32,
    pub refills_remaining: u32,
    pub interaction_warnings: Vec<String>,
}

/// Safety engine: every mutating request runs content validation first, then
/// advisory interaction detection, then the ledger or state machine. A stage
/// that rejects stops the request before anything is modified.
pub trait SafetyEngine {
    /// Advisory interaction warnings for a medication list plus an optional
    /// candidate.
    fn check_interactions(&self, current: &[String], candidate: Option<&str>) -> Vec<String>;

    fn create_prescription(
        &self,
        request: PrescriptionRequest,
        patient: &PatientContext,
    ) -> Result<CreatedPrescription, SafetyError>;

    /// Replace the items of an ACTIVE prescription. Items matched by name keep
    /// their dispensed refill count.
    fn update_items(
        &self,
        rx: &mut Prescription,
        items: Vec<ItemRequest>,
        patient: &PatientContext,
    ) -> Result<UpdateOutcome, SafetyError>;

    fn refill(
        &self,
        rx: &mut Prescription,
        item_index: usize,
        count: u32,
        patient: &PatientContext,
    ) -> Result<RefillOutcome, SafetyError>;

    fn cancel(&self, rx: &mut Prescription, reason: &str) -> Result<(), SafetyError>;

    fn complete(&self, rx: &mut Prescription) -> Result<(), SafetyError>;

    /// New ACTIVE copy of `rx` with refill counters reset; `rx` is untouched.
    fn renew(&self, rx: &Prescription, today: NaiveDate) -> Prescription;
}

// ---------------------------------------------------------------------------
// Default implementation
// ---------------------------------------------------------------------------

pub struct DefaultSafetyEngine {
    config: EngineConfig,
    validator: PrescriptionContentValidator,
    detector: InteractionDetector,
    ledger: RefillLedger,
}

impl DefaultSafetyEngine {
    pub fn new(config: EngineConfig, reference: Arc<ReferenceData>) -> Self {
        Self {
            validator: PrescriptionContentValidator::new(Arc::clone(&reference), config.clone()),
            detector: InteractionDetector::new(Arc::clone(&reference), config.dedup_strategy),
            ledger: RefillLedger::new(reference),
            config,
        }
    }

    /// Default limits over the compiled-in reference tables.
    pub fn with_builtin() -> Self {
        Self::new(EngineConfig::default(), ReferenceData::builtin())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Patient's current medications followed by the prescription's items.
    fn interaction_warnings<'a>(
        &self,
        patient: &'a PatientContext,
        item_names: impl Iterator<Item = &'a str>,
    ) -> Vec<String> {
        let names: Vec<&str> = patient
            .current_medications
            .iter()
            .map(String::as_str)
            .chain(item_names)
            .collect();
        self.detector.detect(&names, None)
    }
}

/// Carry `refills_used` over from the old item of the same name; an allowance
/// below what was already dispensed is rejected.
fn merge_items(
    existing: &[PrescriptionItem],
    requested: Vec<ItemRequest>,
) -> Result<Vec<PrescriptionItem>, ValidationError> {
    let same_name = |a: &str, b: &str| a.trim().to_lowercase() == b.trim().to_lowercase();

    requested
        .into_iter()
        .map(|req| {
            let mut item = req.into_item();
            if let Some(old) = existing
                .iter()
                .find(|old| same_name(&old.medication_name, &item.medication_name))
            {
                if item.refills_allowed < old.refills_used {
                    return Err(ValidationError::RefillAllowanceBelowUsed {
                        medication: item.medication_name.trim().to_string(),
                        allowed: item.refills_allowed,
                        used: old.refills_used,
                    });
                }
                item.refills_used = old.refills_used;
            }
            Ok(item)
        })
        .collect()
}

impl SafetyEngine for DefaultSafetyEngine {
    fn check_interactions(&self, current: &[String], candidate: Option<&str>) -> Vec<String> {
        self.detector.detect(current, candidate)
    }

    fn create_prescription(
        &self,
        request: PrescriptionRequest,
        patient: &PatientContext,
    ) -> Result<CreatedPrescription, SafetyError> {
        let report = self
            .validator
            .validate(&request.items, &request.diagnosis, &patient.allergies)?;

        let interaction_warnings = self.interaction_warnings(
            patient,
            request.items.iter().map(|i| i.medication_name.as_str()),
        );

        let items = request.items.into_iter().map(ItemRequest::into_item).collect();
        let mut prescription = Prescription::new(
            request.doctor_id,
            request.patient_id,
            request.issue_date,
            request.diagnosis.trim(),
            items,
        );
        if let Some(notes) = request.notes.filter(|n| !n.trim().is_empty()) {
            prescription.append_note(&notes);
        }

        tracing::info!(
            prescription_id = %prescription.id,
            patient_id = %prescription.patient_id,
            items = prescription.items.len(),
            validation_warnings = report.warnings.len(),
            interaction_warnings = interaction_warnings.len(),
            "Prescription created"
        );

        Ok(CreatedPrescription {
            prescription,
            validation_warnings: report.warnings,
            interaction_warnings,
        })
    }

    fn update_items(
        &self,
        rx: &mut Prescription,
        items: Vec<ItemRequest>,
        patient: &PatientContext,
    ) -> Result<UpdateOutcome, SafetyError> {
        lifecycle::ensure_active(rx, "edited")?;
        let report = self
            .validator
            .validate(&items, &rx.diagnosis, &patient.allergies)?;
        let merged = merge_items(&rx.items, items)?;

        let interaction_warnings = self.interaction_warnings(
            patient,
            merged.iter().map(|i| i.medication_name.as_str()),
        );

        lifecycle::replace_items(rx, merged)?;

        tracing::info!(
            prescription_id = %rx.id,
            items = rx.items.len(),
            interaction_warnings = interaction_warnings.len(),
            "Prescription items updated"
        );

        Ok(UpdateOutcome {
            validation_warnings: report.warnings,
            interaction_warnings,
        })
    }

    fn refill(
        &self,
        rx: &mut Prescription,
        item_index: usize,
        count: u32,
        patient: &PatientContext,
    ) -> Result<RefillOutcome, SafetyError> {
        lifecycle::ensure_active(rx, "refilled")?;
        let prescription_id = rx.id;
        let item = rx
            .items
            .get_mut(item_index)
            .ok_or(RefillError::UnknownItem { index: item_index })?;

        let interaction_warnings = self
            .detector
            .detect(&patient.current_medications, Some(item.medication_name.as_str()));
        let refills_used = self.ledger.request_refill(item, count)?;

        tracing::info!(
            prescription_id = %prescription_id,
            item_index,
            refills_used,
            interaction_warnings = interaction_warnings.len(),
            "Prescription refilled"
        );

        Ok(RefillOutcome {
            item_index,
            refills_used,
            refills_remaining: item.refills_remaining(),
            interaction_warnings,
        })
    }

    fn cancel(&self, rx: &mut Prescription, reason: &str) -> Result<(), SafetyError> {
        Ok(lifecycle::cancel(rx, reason)?)
    }

    fn complete(&self, rx: &mut Prescription) -> Result<(), SafetyError> {
        Ok(lifecycle::complete(rx)?)
    }

    fn renew(&self, rx: &Prescription, today: NaiveDate) -> Prescription {
        lifecycle::renew(rx, today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LifecycleError;
    use crate::models::PrescriptionStatus;
    use crate::safety::DedupStrategy;
    use uuid::Uuid;

    fn item(name: &str, refills: Option<u32>) -> ItemRequest {
        ItemRequest {
            medication_name: name.into(),
            dosage: "10mg".into(),
            frequency: "once daily".into(),
            duration: None,
            instructions: None,
            route: Some("oral".into()),
            quantity: 30,
            refillable: refills.is_some(),
            refills_allowed: refills,
        }
    }

    fn request(items: Vec<ItemRequest>) -> PrescriptionRequest {
        PrescriptionRequest {
            doctor_id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            issue_date: NaiveDate::from_ymd_opt(2026, 5, 4).unwrap(),
            diagnosis: "Hipertensión arterial esencial".into(),
            notes: None,
            items,
        }
    }

    fn patient(current: &[&str], allergies: &[&str]) -> PatientContext {
        PatientContext {
            patient_id: Uuid::new_v4(),
            allergies: allergies.iter().map(|s| s.to_string()).collect(),
            current_medications: current.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn create_reports_interactions_with_current_medications() {
        let engine = DefaultSafetyEngine::with_builtin();
        let created = engine
            .create_prescription(request(vec![item("Enalapril", Some(3))]), &patient(&["Ibuprofeno"], &[]))
            .unwrap();

        assert_eq!(created.prescription.status, PrescriptionStatus::Active);
        assert_eq!(created.prescription.items[0].refills_allowed, 3);
        assert!(created.validation_warnings.is_empty());
        assert_eq!(created.interaction_warnings.len(), 2);
        assert!(created.interaction_warnings[0].starts_with("Ibuprofeno + Enalapril: "));
    }

    #[test]
    fn create_rejected_by_validator_before_detection() {
        let engine = DefaultSafetyEngine::with_builtin();
        let err = engine
            .create_prescription(
                request(vec![item("Warfarina", None), item("Aspirina", None)]),
                &patient(&[], &[]),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            SafetyError::Validation(ValidationError::BlockedInteraction { .. })
        ));
    }

    #[test]
    fn create_rejects_quantity_beyond_u32() {
        let engine = DefaultSafetyEngine::with_builtin();
        let mut ibuprofeno = item("Ibuprofeno", None);
        ibuprofeno.quantity = 5_000_000_000;

        let err = engine
            .create_prescription(request(vec![ibuprofeno]), &patient(&[], &[]))
            .unwrap_err();
        assert!(matches!(
            err,
            SafetyError::Validation(ValidationError::InvalidQuantity {
                quantity: 5_000_000_000,
                ..
            })
        ));
    }

    #[test]
    fn update_rejects_quantity_beyond_u32() {
        let engine = DefaultSafetyEngine::with_builtin();
        let ctx = patient(&[], &[]);
        let mut rx = engine
            .create_prescription(request(vec![item("Enalapril", None)]), &ctx)
            .unwrap()
            .prescription;
        let mut enalapril = item("Enalapril", None);
        enalapril.quantity = i64::from(u32::MAX) + 1;

        assert!(engine.update_items(&mut rx, vec![enalapril], &ctx).is_err());
        assert_eq!(rx.items[0].quantity, 30);
    }

    #[test]
    fn create_keeps_non_blank_notes() {
        let engine = DefaultSafetyEngine::with_builtin();
        let mut req = request(vec![item("Losartan", None)]);
        req.notes = Some("Tomar por la mañana".into());
        let created = engine.create_prescription(req, &patient(&[], &[])).unwrap();
        assert_eq!(created.prescription.notes.as_deref(), Some("Tomar por la mañana"));

        let mut req = request(vec![item("Losartan", None)]);
        req.notes = Some("   ".into());
        let created = engine.create_prescription(req, &patient(&[], &[])).unwrap();
        assert!(created.prescription.notes.is_none());
    }

    #[test]
    fn update_preserves_dispensed_refills() {
        let engine = DefaultSafetyEngine::with_builtin();
        let ctx = patient(&[], &[]);
        let mut rx = engine
            .create_prescription(request(vec![item("Enalapril", Some(3))]), &ctx)
            .unwrap()
            .prescription;
        engine.refill(&mut rx, 0, 2, &ctx).unwrap();

        engine
            .update_items(
                &mut rx,
                vec![item("enalapril ", Some(4)), item("Amlodipino", None)],
                &ctx,
            )
            .unwrap();
        assert_eq!(rx.items.len(), 2);
        assert_eq!(rx.items[0].refills_used, 2);
        assert_eq!(rx.items[0].refills_allowed, 4);
        assert_eq!(rx.items[1].refills_used, 0);
    }

    #[test]
    fn update_rejects_allowance_below_dispensed() {
        let engine = DefaultSafetyEngine::with_builtin();
        let ctx = patient(&[], &[]);
        let mut rx = engine
            .create_prescription(request(vec![item("Enalapril", Some(3))]), &ctx)
            .unwrap()
            .prescription;
        engine.refill(&mut rx, 0, 2, &ctx).unwrap();

        let err = engine
            .update_items(&mut rx, vec![item("Enalapril", Some(1))], &ctx)
            .unwrap_err();
        assert!(matches!(
            err,
            SafetyError::Validation(ValidationError::RefillAllowanceBelowUsed { used: 2, .. })
        ));
        assert_eq!(rx.items[0].refills_allowed, 3);
    }

    #[test]
    fn update_of_completed_prescription_rejected() {
        let engine = DefaultSafetyEngine::with_builtin();
        let ctx = patient(&[], &[]);
        let mut rx = engine
            .create_prescription(request(vec![item("Enalapril", None)]), &ctx)
            .unwrap()
            .prescription;
        engine.complete(&mut rx).unwrap();

        let err = engine
            .update_items(&mut rx, vec![item("Losartan", None)], &ctx)
            .unwrap_err();
        assert!(matches!(
            err,
            SafetyError::Lifecycle(LifecycleError::InvalidTransition { .. })
        ));
        assert_eq!(rx.items[0].medication_name, "Enalapril");
    }

    #[test]
    fn refill_of_canceled_prescription_rejected() {
        let engine = DefaultSafetyEngine::with_builtin();
        let ctx = patient(&[], &[]);
        let mut rx = engine
            .create_prescription(request(vec![item("Enalapril", Some(3))]), &ctx)
            .unwrap()
            .prescription;
        engine.cancel(&mut rx, "allergy discovered").unwrap();

        let err = engine.refill(&mut rx, 0, 1, &ctx).unwrap_err();
        assert!(matches!(err, SafetyError::Lifecycle(_)));
        assert_eq!(rx.items[0].refills_used, 0);
    }

    #[test]
    fn refill_unknown_item_rejected() {
        let engine = DefaultSafetyEngine::with_builtin();
        let ctx = patient(&[], &[]);
        let mut rx = engine
            .create_prescription(request(vec![item("Enalapril", Some(3))]), &ctx)
            .unwrap()
            .prescription;
        let err = engine.refill(&mut rx, 4, 1, &ctx).unwrap_err();
        assert!(matches!(
            err,
            SafetyError::Refill(RefillError::UnknownItem { index: 4 })
        ));
    }

    #[test]
    fn refill_reports_interactions_with_current_medications() {
        let engine = DefaultSafetyEngine::with_builtin();
        let ctx = patient(&["Espironolactona"], &[]);
        let mut rx = engine
            .create_prescription(request(vec![item("Enalapril", Some(3))]), &patient(&[], &[]))
            .unwrap()
            .prescription;

        let outcome = engine.refill(&mut rx, 0, 1, &ctx).unwrap();
        assert_eq!(outcome.refills_used, 1);
        assert_eq!(outcome.refills_remaining, 2);
        assert!(outcome
            .interaction_warnings
            .iter()
            .any(|w| w.contains("hiperpotasemia")));
    }

    #[test]
    fn renew_through_engine() {
        let engine = DefaultSafetyEngine::with_builtin();
        let ctx = patient(&[], &[]);
        let mut rx = engine
            .create_prescription(request(vec![item("Enalapril", Some(3))]), &ctx)
            .unwrap()
            .prescription;
        engine.refill(&mut rx, 0, 3, &ctx).unwrap();
        engine.complete(&mut rx).unwrap();

        let renewed = engine.renew(&rx, NaiveDate::from_ymd_opt(2026, 8, 4).unwrap());
        assert_eq!(renewed.items[0].refills_used, 0);
        assert_eq!(rx.status, PrescriptionStatus::Completed);
    }

    #[test]
    fn configured_dedup_strategy_reaches_detector() {
        let config = EngineConfig {
            dedup_strategy: DedupStrategy::TextPrefix,
            ..EngineConfig::default()
        };
        let engine = DefaultSafetyEngine::new(config, ReferenceData::builtin());
        let current = vec!["Warfarina".to_string(), "Aspirina".to_string()];
        let warnings = engine.check_interactions(&current, None);
        assert_eq!(
            warnings.iter().filter(|w| w.contains("sangrado")).count(),
            1
        );
        assert_eq!(engine.config().dedup_strategy, DedupStrategy::TextPrefix);
    }
}
