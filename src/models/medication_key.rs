use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical (normalized) identity of a medication.
///
/// Only the name normalizer produces keys from raw input; two raw names with
/// the same key are treated as the same substance.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MedicationKey(String);

impl MedicationKey {
    /// Wrap a string that is already in canonical form.
    pub(crate) fn from_canonical(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Display form: first character upper-cased, the rest untouched.
    pub fn capitalized(&self) -> String {
        capitalize(&self.0)
    }
}

impl fmt::Display for MedicationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MedicationKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for MedicationKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Upper-case only the first character of `s`.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalize_first_char_only() {
        assert_eq!(capitalize("warfarina"), "Warfarina");
        assert_eq!(capitalize("ácido fólico"), "Ácido fólico");
        assert_eq!(capitalize("iECA"), "IECA");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn capitalized_leaves_key_untouched() {
        let key = MedicationKey::from_canonical("hidroclorotiazida");
        assert_eq!(key.capitalized(), "Hidroclorotiazida");
        assert_eq!(key.as_str(), "hidroclorotiazida");
    }

    #[test]
    fn key_borrows_as_str() {
        let mut set = std::collections::HashSet::new();
        set.insert(MedicationKey::from_canonical("aspirina"));
        assert!(set.contains("aspirina"));
    }

    #[test]
    fn key_serializes_as_plain_string() {
        let key = MedicationKey::from_canonical("enalapril");
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"enalapril\"");
    }
}
