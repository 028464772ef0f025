//! Advisory interaction detection over a patient's medication list.
//!
//! Three passes, in output order: forward pairwise facts, reverse pairwise
//! facts not already reported, then class-level group rules. Never errors;
//! unknown medications simply match nothing.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::models::{FindingKind, InteractionSeverity, MedicationKey};
use crate::reference::{InteractionFact, ReferenceData};

use super::messages::MessageTemplates;

/// How the reverse pass decides a pair was already reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupStrategy {
    /// Unordered pair of keys of every emitted pairwise message.
    #[default]
    PairKey,
    /// Legacy: any emitted message starting with "{Earlier} + {Later}".
    TextPrefix,
}

/// One detected interaction, before rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionFinding {
    pub kind: FindingKind,
    /// Pairwise: `[subject, object]` in message order. Group: every patient
    /// medication belonging to one of the rule's groups.
    pub medications: Vec<MedicationKey>,
    /// Group names of the firing rule (empty for pairwise findings).
    pub groups: Vec<String>,
    pub description: String,
    pub severity: InteractionSeverity,
}

impl InteractionFinding {
    /// Human-readable warning line.
    pub fn message(&self) -> String {
        match (self.kind, self.medications.as_slice()) {
            (FindingKind::Pairwise, [subject, object]) => {
                MessageTemplates::pairwise(subject, object, &self.description)
            }
            _ => self.description.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Detector
// ---------------------------------------------------------------------------

pub struct InteractionDetector {
    reference: Arc<ReferenceData>,
    dedup: DedupStrategy,
}

impl InteractionDetector {
    pub fn new(reference: Arc<ReferenceData>, dedup: DedupStrategy) -> Self {
        Self { reference, dedup }
    }

    /// Warnings for `current` plus an optional candidate medication.
    pub fn detect<S: AsRef<str>>(&self, current: &[S], candidate: Option<&str>) -> Vec<String> {
        self.detect_findings(current, candidate)
            .iter()
            .map(InteractionFinding::message)
            .collect()
    }

    /// Structured findings, in the same order `detect` renders them.
    pub fn detect_findings<S: AsRef<str>>(
        &self,
        current: &[S],
        candidate: Option<&str>,
    ) -> Vec<InteractionFinding> {
        let keys = self.collect_keys(current, candidate);
        if keys.len() < 2 {
            return Vec::new();
        }

        let mut state = PassState::default();
        self.forward_pass(&keys, &mut state);
        self.reverse_pass(&keys, &mut state);
        self.group_pass(&keys, &mut state);

        tracing::debug!(
            medications = keys.len(),
            findings = state.findings.len(),
            "Interaction check complete"
        );

        state.findings
    }

    /// Repeats are kept: the same medication twice yields its warnings twice.
    fn collect_keys<S: AsRef<str>>(&self, current: &[S], candidate: Option<&str>) -> Vec<MedicationKey> {
        let mut keys: Vec<MedicationKey> = current
            .iter()
            .map(|name| self.reference.normalize(name.as_ref()))
            .collect();
        if let Some(candidate) = candidate.filter(|c| !c.trim().is_empty()) {
            keys.push(self.reference.normalize(candidate));
        }
        keys
    }

    fn forward_pass(&self, keys: &[MedicationKey], state: &mut PassState) {
        let index = &self.reference.interactions;
        for (i, earlier) in keys.iter().enumerate() {
            for later in &keys[i + 1..] {
                for fact in index.facts_between(earlier, later) {
                    state.record_pairwise(earlier, later, fact);
                }
            }
        }
    }

    fn reverse_pass(&self, keys: &[MedicationKey], state: &mut PassState) {
        let index = &self.reference.interactions;
        for (i, earlier) in keys.iter().enumerate() {
            for later in &keys[i + 1..] {
                let mut facts = index.facts_between(later, earlier).peekable();
                if facts.peek().is_none() {
                    continue;
                }
                if state.already_reported(self.dedup, earlier, later) {
                    tracing::debug!(
                        subject = %later,
                        object = %earlier,
                        "Skipping reverse interaction already reported"
                    );
                    continue;
                }
                for fact in facts {
                    state.record_pairwise(later, earlier, fact);
                }
            }
        }
    }

    fn group_pass(&self, keys: &[MedicationKey], state: &mut PassState) {
        let registry = &self.reference.groups;
        let present = registry.present_groups(keys);

        for rule in &self.reference.group_rules {
            if !rule.groups.iter().all(|g| present.contains(g.as_str())) {
                continue;
            }
            let mut involved: Vec<MedicationKey> = Vec::new();
            for key in keys {
                let in_rule = rule
                    .groups
                    .iter()
                    .any(|g| registry.members_of(g).is_some_and(|m| m.contains(key)));
                if in_rule && !involved.contains(key) {
                    involved.push(key.clone());
                }
            }
            state.findings.push(InteractionFinding {
                kind: FindingKind::Group,
                medications: involved,
                groups: rule.groups.clone(),
                description: rule.description.clone(),
                severity: rule.severity,
            });
        }
    }
}

/// Accumulated output plus what the reverse pass needs for dedup.
#[derive(Default)]
struct PassState {
    findings: Vec<InteractionFinding>,
    rendered: Vec<String>,
    pairs: HashSet<(MedicationKey, MedicationKey)>,
}

impl PassState {
    fn record_pairwise(&mut self, subject: &MedicationKey, object: &MedicationKey, fact: &InteractionFact) {
        let finding = InteractionFinding {
            kind: FindingKind::Pairwise,
            medications: vec![subject.clone(), object.clone()],
            groups: Vec::new(),
            description: fact.description.clone(),
            severity: fact.severity,
        };
        self.rendered.push(finding.message());
        self.pairs.insert(unordered(subject, object));
        self.findings.push(finding);
    }

    fn already_reported(&self, strategy: DedupStrategy, earlier: &MedicationKey, later: &MedicationKey) -> bool {
        match strategy {
            DedupStrategy::PairKey => self.pairs.contains(&unordered(earlier, later)),
            DedupStrategy::TextPrefix => {
                let prefix = MessageTemplates::pair_prefix(earlier, later);
                self.rendered.iter().any(|m| m.starts_with(&prefix))
            }
        }
    }
}

fn unordered(a: &MedicationKey, b: &MedicationKey) -> (MedicationKey, MedicationKey) {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> InteractionDetector {
        InteractionDetector::new(ReferenceData::builtin(), DedupStrategy::PairKey)
    }

    fn legacy_detector() -> InteractionDetector {
        InteractionDetector::new(ReferenceData::builtin(), DedupStrategy::TextPrefix)
    }

    fn count_containing(messages: &[String], needle: &str) -> usize {
        messages.iter().filter(|m| m.contains(needle)).count()
    }

    #[test]
    fn fewer_than_two_medications_is_empty() {
        let none: [&str; 0] = [];
        assert!(detector().detect(&none, None).is_empty());
        assert!(detector().detect(&none, Some("Aspirina")).is_empty());
        assert!(detector().detect(&["Warfarina"], None).is_empty());
    }

    #[test]
    fn warfarin_aspirin_reports_bleeding_once() {
        let messages = detector().detect(&["Warfarina", "Aspirina"], None);
        assert_eq!(count_containing(&messages, "sangrado"), 1);
        assert!(messages[0].starts_with("Warfarina + Aspirina: "));
    }

    #[test]
    fn candidate_joins_the_list() {
        let with_candidate = detector().detect(&["Warfarina"], Some("Aspirina (Bayer)"));
        let listed = detector().detect(&["Warfarina", "Aspirina"], None);
        assert_eq!(with_candidate, listed);
    }

    #[test]
    fn blank_candidate_ignored() {
        assert!(detector().detect(&["Warfarina"], Some("   ")).is_empty());
    }

    #[test]
    fn synonyms_resolve_before_lookup() {
        let messages = detector().detect(&["Coumadin", "AAS"], None);
        assert!(messages[0].starts_with("Warfarina + Aspirina: "));
    }

    #[test]
    fn nsaid_with_ace_inhibitor_fires_group_rule() {
        let messages = detector().detect(&["Ibuprofeno", "Enalapril"], None);
        assert_eq!(messages.len(), 2);
        assert!(messages[0].starts_with("Ibuprofeno + Enalapril: "));
        assert!(messages[1].starts_with("AINE + IECA/ARA-II"));
    }

    #[test]
    fn adding_diuretic_fires_triple_whammy() {
        let messages = detector().detect(&["Ibuprofeno", "Enalapril", "Hidroclorotiazida"], None);
        assert_eq!(messages.len(), 5);
        assert!(messages.iter().any(|m| m.starts_with("AINE + IECA/ARA-II")));
        assert!(messages.iter().any(|m| m.starts_with("AINE + Diurético")));
        assert!(messages.last().unwrap().starts_with("Triple whammy"));
    }

    #[test]
    fn reverse_pass_reports_one_way_fact() {
        // Only aspirina -> ibuprofeno is registered.
        let messages = detector().detect(&["Ibuprofeno", "Aspirina"], None);
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("Aspirina + Ibuprofeno: "));
    }

    #[test]
    fn repeated_medication_is_not_deduplicated() {
        let messages = detector().detect(&["Warfarina", "Aspirina", "Aspirina"], None);
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0], messages[1]);
        assert_eq!(count_containing(&messages, "sangrado"), 2);
    }

    #[test]
    fn unknown_medications_match_nothing() {
        assert!(detector().detect(&["Agua", "Sal de frutas"], None).is_empty());
    }

    #[test]
    fn strategies_agree_on_distinct_lists() {
        let lists: &[&[&str]] = &[
            &["Warfarina", "Aspirina"],
            &["Aspirina", "Warfarina"],
            &["Ibuprofeno", "Aspirina"],
            &["Clopidogrel", "Aspirina", "Omeprazol"],
            &["Enalapril", "Espironolactona", "Ibuprofeno", "Hidroclorotiazida"],
            &["Sertralina", "Tramadol", "Warfarina"],
            &["Sildenafilo", "Nitroglicerina"],
            &["Litio", "Losartan", "Naproxeno"],
            &["Metoprolol", "Verapamilo", "Digoxina"],
        ];
        for &list in lists {
            assert_eq!(
                detector().detect(list, None),
                legacy_detector().detect(list, None),
                "strategies differ for {list:?}"
            );
        }
    }

    #[test]
    fn strategies_diverge_only_on_repeats() {
        let list = ["Aspirina", "Ibuprofeno", "Aspirina"];
        assert_eq!(detector().detect(&list, None).len(), 1);
        assert_eq!(legacy_detector().detect(&list, None).len(), 2);
    }

    #[test]
    fn findings_carry_structure() {
        let findings = detector().detect_findings(&["Warfarina", "Aspirina"], None);
        let pairwise = &findings[0];
        assert_eq!(pairwise.kind, FindingKind::Pairwise);
        assert_eq!(pairwise.medications[0].as_str(), "warfarina");
        assert_eq!(pairwise.medications[1].as_str(), "aspirina");
        assert_eq!(pairwise.severity, InteractionSeverity::Major);

        let group = findings
            .iter()
            .find(|f| f.kind == FindingKind::Group)
            .unwrap();
        assert_eq!(group.groups, vec!["AINE", "Anticoagulantes"]);
        assert_eq!(group.medications.len(), 2);
    }

    #[test]
    fn detect_renders_findings_in_order() {
        let meds = ["Sertralina", "Tramadol", "Ibuprofeno"];
        let rendered: Vec<String> = detector()
            .detect_findings(&meds, None)
            .iter()
            .map(InteractionFinding::message)
            .collect();
        assert_eq!(rendered, detector().detect(&meds, None));
    }
}
