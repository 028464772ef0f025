use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {field} value: {value}")]
pub struct InvalidEnum {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidEnum;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(PrescriptionStatus {
    Active => "ACTIVE",
    Completed => "COMPLETED",
    Canceled => "CANCELED",
});

str_enum!(RecordEntryType {
    Diagnosis => "diagnosis",
    LabResult => "lab_result",
    Surgery => "surgery",
    General => "general",
});

str_enum!(FindingKind {
    Pairwise => "pairwise",
    Group => "group",
});

str_enum!(InteractionSeverity {
    Moderate => "moderate",
    Major => "major",
    Contraindicated => "contraindicated",
});

impl PrescriptionStatus {
    /// COMPLETED and CANCELED admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }
}

impl RecordEntryType {
    /// Minimum content length for a medical-record entry of this type.
    pub fn min_length(&self) -> usize {
        match self {
            Self::Diagnosis => 20,
            Self::LabResult => 15,
            Self::Surgery => 50,
            Self::General => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            PrescriptionStatus::Active,
            PrescriptionStatus::Completed,
            PrescriptionStatus::Canceled,
        ] {
            assert_eq!(status.as_str().parse::<PrescriptionStatus>(), Ok(status));
        }
    }

    #[test]
    fn unknown_status_rejected() {
        let err = "RENEWED".parse::<PrescriptionStatus>().unwrap_err();
        assert_eq!(err.field, "PrescriptionStatus");
        assert_eq!(err.value, "RENEWED");
    }

    #[test]
    fn only_active_is_non_terminal() {
        assert!(!PrescriptionStatus::Active.is_terminal());
        assert!(PrescriptionStatus::Completed.is_terminal());
        assert!(PrescriptionStatus::Canceled.is_terminal());
    }

    #[test]
    fn status_serializes_as_upper_case() {
        let json = serde_json::to_string(&PrescriptionStatus::Canceled).unwrap();
        assert_eq!(json, "\"CANCELED\"");
    }

    #[test]
    fn record_entry_minimums() {
        assert_eq!(RecordEntryType::Diagnosis.min_length(), 20);
        assert_eq!(RecordEntryType::LabResult.min_length(), 15);
        assert_eq!(RecordEntryType::Surgery.min_length(), 50);
        assert_eq!(RecordEntryType::General.min_length(), 10);
    }
}
