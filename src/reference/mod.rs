//! Static reference data: synonyms, controlled substances, drug groups,
//! pairwise interaction facts and class-level rules.
//!
//! Built once at startup and shared read-only (`Arc<ReferenceData>`); nothing
//! mutates it afterwards, so concurrent readers need no locking.

pub mod controlled;
pub mod groups;
pub mod interactions;
pub mod synonyms;

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use serde::{Deserialize, Serialize};

use crate::error::SafetyError;
use crate::models::MedicationKey;
use crate::safety::normalize::{clean, normalize_with};

pub use controlled::ControlledSubstanceSet;
pub use groups::{DrugGroup, DrugGroupRegistry};
pub use interactions::{GroupInteractionRule, InteractionFact, PairwiseInteractionIndex};
pub use synonyms::SynonymTable;

static BUILTIN: LazyLock<Arc<ReferenceData>> = LazyLock::new(|| {
    Arc::new(ReferenceData {
        synonyms: synonyms::builtin(),
        controlled: controlled::builtin(),
        groups: groups::builtin(),
        interactions: interactions::builtin_index(),
        group_rules: interactions::builtin_group_rules(),
    })
});

/// All reference tables the engine reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceData {
    pub synonyms: SynonymTable,
    pub controlled: ControlledSubstanceSet,
    pub groups: DrugGroupRegistry,
    pub interactions: PairwiseInteractionIndex,
    pub group_rules: Vec<GroupInteractionRule>,
}

impl ReferenceData {
    /// Compiled-in tables, shared.
    pub fn builtin() -> Arc<Self> {
        Arc::clone(&BUILTIN)
    }

    /// Load tables from a JSON file with the same shape as `ReferenceData`.
    /// Names in the file are canonicalized with the file's own synonym table.
    pub fn load(path: &Path) -> Result<Self, SafetyError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            SafetyError::ReferenceDataLoad(path.display().to_string(), e.to_string())
        })?;
        let raw: ReferenceData = serde_json::from_str(&json).map_err(|e| {
            SafetyError::ReferenceDataParse(path.display().to_string(), e.to_string())
        })?;
        let data = raw.canonicalized(&path.display().to_string())?;

        tracing::info!(
            path = %path.display(),
            synonyms = data.synonyms.len(),
            controlled = data.controlled.len(),
            groups = data.groups.groups().len(),
            interaction_subjects = data.interactions.subject_count(),
            group_rules = data.group_rules.len(),
            "Reference data loaded"
        );

        Ok(data)
    }

    /// Normalize a raw medication name with these tables.
    pub fn normalize(&self, raw: &str) -> MedicationKey {
        normalize_with(raw, &self.synonyms)
    }

    pub fn is_controlled(&self, name: &str) -> bool {
        self.controlled.is_controlled(name)
    }

    /// Bring hand-written names into canonical form and reject synonym chains,
    /// which would make normalization non-idempotent.
    fn canonicalized(self, source: &str) -> Result<Self, SafetyError> {
        let synonyms = SynonymTable::new(
            self.synonyms
                .iter()
                .map(|(k, v)| (clean(k), clean(v)))
                .filter(|(k, v)| !k.is_empty() && !v.is_empty())
                .collect(),
        );
        if let Some((key, target)) = synonyms.find_chained() {
            return Err(SafetyError::ReferenceDataParse(
                source.to_string(),
                format!("synonym '{key}' maps to '{target}', which is itself a synonym"),
            ));
        }

        let mut groups = self.groups;
        for group in groups.groups_mut() {
            group.members = group
                .members
                .iter()
                .map(|m| normalize_with(m.as_str(), &synonyms))
                .collect();
        }

        let mut by_subject: HashMap<MedicationKey, Vec<InteractionFact>> = HashMap::new();
        for (subject, facts) in self.interactions.into_entries() {
            let subject = normalize_with(subject.as_str(), &synonyms);
            let facts = facts.into_iter().map(|f| InteractionFact {
                object: normalize_with(f.object.as_str(), &synonyms),
                ..f
            });
            by_subject.entry(subject).or_default().extend(facts);
        }

        Ok(Self {
            synonyms,
            controlled: ControlledSubstanceSet::new(self.controlled.fragments()),
            groups,
            interactions: PairwiseInteractionIndex::from_entries(by_subject),
            group_rules: self.group_rules,
        })
    }
}
