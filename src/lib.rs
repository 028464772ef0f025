pub mod config;
pub mod engine; // Orchestration: validate -> detect -> ledger/lifecycle
pub mod error;
pub mod models;
pub mod prescriptions; // Refill ledger + prescription state machine
pub mod reference; // Static synonym, group and interaction tables
pub mod safety; // Normalization, interaction detection, content validation

pub use config::EngineConfig;
pub use engine::{CreatedPrescription, DefaultSafetyEngine, RefillOutcome, SafetyEngine, UpdateOutcome};
pub use error::{LifecycleError, RefillError, SafetyError, ValidationError};
pub use reference::ReferenceData;

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber. Honors `RUST_LOG`, otherwise
/// falls back to [`config::default_log_filter`]. Logs go to stderr so stdout
/// stays free for command output. A second call is a no-op.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();
}
