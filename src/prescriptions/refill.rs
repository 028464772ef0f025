use std::sync::Arc;

use crate::error::RefillError;
use crate::models::PrescriptionItem;
use crate::reference::ReferenceData;

/// Guards and advances the per-item refill counter.
///
/// Every check runs before the counter moves, so a rejected request leaves
/// the item untouched; `refills_used` only grows and never passes
/// `refills_allowed`.
pub struct RefillLedger {
    reference: Arc<ReferenceData>,
}

impl RefillLedger {
    pub fn new(reference: Arc<ReferenceData>) -> Self {
        Self { reference }
    }

    /// Dispense `requested` refills of `item`; returns the new `refills_used`.
    pub fn request_refill(&self, item: &mut PrescriptionItem, requested: u32) -> Result<u32, RefillError> {
        if !item.refillable {
            return Err(RefillError::NotRefillable(item.medication_name.trim().to_string()));
        }
        if requested < 1 {
            return Err(RefillError::InvalidCount);
        }
        let remaining = item.refills_remaining();
        if requested > remaining {
            return Err(RefillError::InsufficientRefills {
                medication: item.medication_name.trim().to_string(),
                requested,
                remaining,
            });
        }
        if requested != 1 && self.reference.is_controlled(&item.medication_name) {
            return Err(RefillError::ControlledMultiRefill {
                medication: item.medication_name.trim().to_string(),
                requested,
            });
        }

        item.refills_used += requested;

        tracing::info!(
            requested,
            refills_used = item.refills_used,
            refills_allowed = item.refills_allowed,
            "Refill recorded"
        );

        Ok(item.refills_used)
    }
}
