pub mod detection;
pub mod messages;
pub mod normalize;
pub mod validation;

pub use detection::{DedupStrategy, InteractionDetector, InteractionFinding};
pub use messages::MessageTemplates;
pub use normalize::{normalize, normalize_with};
pub use validation::{validate_record_entry, PrescriptionContentValidator, ValidationReport};
