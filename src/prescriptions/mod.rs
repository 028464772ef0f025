pub mod lifecycle;
pub mod refill;

pub use refill::RefillLedger;
