//! Prescription state machine: ACTIVE -> COMPLETED | CANCELED, both terminal.
//! Renewal is not a transition: it creates a new prescription from a source in
//! any status and never touches the source.

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::LifecycleError;
use crate::models::{Prescription, PrescriptionItem, PrescriptionStatus};
use crate::safety::messages::MessageTemplates;

/// Reject any action on a prescription that is no longer ACTIVE.
pub fn ensure_active(rx: &Prescription, action: &'static str) -> Result<(), LifecycleError> {
    if rx.status.is_terminal() {
        return Err(LifecycleError::InvalidTransition {
            id: rx.id,
            status: rx.status,
            action,
        });
    }
    Ok(())
}

/// Cancel an ACTIVE prescription, recording the reason in its notes.
pub fn cancel(rx: &mut Prescription, reason: &str) -> Result<(), LifecycleError> {
    ensure_active(rx, "canceled")?;
    if reason.trim().is_empty() {
        return Err(LifecycleError::MissingCancelReason);
    }

    rx.append_note(&MessageTemplates::canceled_marker(reason));
    rx.status = PrescriptionStatus::Canceled;

    tracing::info!(prescription_id = %rx.id, "Prescription canceled");
    Ok(())
}

pub fn complete(rx: &mut Prescription) -> Result<(), LifecycleError> {
    ensure_active(rx, "completed")?;
    rx.status = PrescriptionStatus::Completed;

    tracing::info!(prescription_id = %rx.id, "Prescription completed");
    Ok(())
}

/// New ACTIVE prescription with the same prescriber, patient, diagnosis and
/// items, every refill counter reset.
pub fn renew(rx: &Prescription, today: NaiveDate) -> Prescription {
    let items = rx
        .items
        .iter()
        .map(|item| PrescriptionItem {
            refills_used: 0,
            ..item.clone()
        })
        .collect();
    let mut renewed = Prescription::new(rx.doctor_id, rx.patient_id, today, rx.diagnosis.clone(), items);
    renewed.append_note(&MessageTemplates::renewal_note(rx.id));

    tracing::info!(
        source_id = %rx.id,
        source_status = rx.status.as_str(),
        prescription_id = %renewed.id,
        "Prescription renewed"
    );
    renewed
}

pub fn mark_printed(rx: &mut Prescription, at: NaiveDateTime) {
    rx.printed = true;
    rx.print_date = Some(at);
}

/// Swap the item list of an ACTIVE prescription. Content validation is the
/// caller's job and must already have passed.
pub fn replace_items(rx: &mut Prescription, items: Vec<PrescriptionItem>) -> Result<(), LifecycleError> {
    ensure_active(rx, "edited")?;
    rx.items = items;
    Ok(())
}
