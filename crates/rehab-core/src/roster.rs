use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Clinic-side identifier typed in when the patient was added.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    /// Stored as `"<name> (<sets>×<reps>)"` strings; replaced wholesale on save.
    #[serde(default)]
    pub assigned_plan: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PlanState {
    NoPlan,
    HasPlan,
}

impl Patient {
    fn sample(id: &str, name: &str, email: &str, plan: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            external_id: None,
            assigned_plan: plan.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn plan_state(&self) -> PlanState {
        if self.assigned_plan.is_empty() {
            PlanState::NoPlan
        } else {
            PlanState::HasPlan
        }
    }

    /// Up to two upper-cased initials from the first two words of the name.
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .take(2)
            .filter_map(|w| w.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }

    /// Badge text for the roster row, e.g. "1 exercise" / "3 exercises".
    pub fn exercise_badge(&self) -> String {
        let n = self.assigned_plan.len();
        format!("{} exercise{}", n, if n == 1 { "" } else { "s" })
    }

    /// Label of the roster row's plan button.
    pub fn plan_action_label(&self) -> &'static str {
        match self.plan_state() {
            PlanState::NoPlan => "Create Plan",
            PlanState::HasPlan => "Edit Plan",
        }
    }
}

/// In-memory patient list, most recently added first.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    patients: Vec<Patient>,
    last_issued: i64,
}

impl Roster {
    pub fn new(patients: Vec<Patient>) -> Self {
        Self {
            patients,
            last_issued: 0,
        }
    }

    pub fn sample() -> Self {
        Self::new(vec![
            Patient::sample("1", "John Smith", "smithjohn@gmail.com", &[
                "Shoulder Flexion (3×10)",
                "Knee Extension (2×15)",
            ]),
            Patient::sample("2", "Micheal Scott", "theoffice@email.com", &["Hip Abduction (3×12)"]),
            Patient::sample("3", "Taylor Johnson", "taylor@email.com", &[]),
        ])
    }

    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Patient> {
        self.patients.iter().find(|p| p.id == id)
    }

    pub fn plan_state(&self, id: &str) -> Option<PlanState> {
        self.get(id).map(Patient::plan_state)
    }

    /// Number of patients with a non-empty plan.
    pub fn active_plan_count(&self) -> usize {
        self.patients
            .iter()
            .filter(|p| p.plan_state() == PlanState::HasPlan)
            .count()
    }

    /// Patients whose name or email contains `query`, case-insensitively.
    pub fn search(&self, query: &str) -> Vec<&Patient> {
        let q = query.to_lowercase();
        self.patients
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&q) || p.email.to_lowercase().contains(&q))
            .collect()
    }

    /// Add a patient to the front of the roster. Every field must be
    /// non-blank; a rejected add leaves the roster untouched.
    pub fn add(&mut self, name: &str, email: &str, external_id: &str) -> Result<&Patient> {
        let name = name.trim();
        let email = email.trim();
        let external_id = external_id.trim();
        for (label, value) in [("name", name), ("email", email), ("patient id", external_id)] {
            if value.is_empty() {
                tracing::debug!(field = label, "rejected new patient");
                return Err(Error::EmptyField(label));
            }
        }

        let id = self.next_id(chrono::Utc::now().timestamp_millis());
        self.patients.insert(
            0,
            Patient {
                id,
                name: name.to_string(),
                email: email.to_string(),
                external_id: Some(external_id.to_string()),
                assigned_plan: Vec::new(),
            },
        );
        tracing::info!(id = %self.patients[0].id, "added patient");
        Ok(&self.patients[0])
    }

    /// Replace a patient's plan. An unknown id leaves every patient as it was.
    pub fn apply_plan(&mut self, id: &str, plan: Vec<String>) -> Result<()> {
        let patient = self
            .patients
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::PatientNotFound(id.to_string()))?;
        tracing::info!(id, exercises = plan.len(), "assigned plan");
        patient.assigned_plan = plan;
        Ok(())
    }

    /// Millisecond-clock id, bumped past anything already issued or present.
    fn next_id(&mut self, now_ms: i64) -> String {
        let mut candidate = now_ms.max(self.last_issued + 1);
        while self.get(&candidate.to_string()).is_some() {
            candidate += 1;
        }
        self.last_issued = candidate;
        candidate.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_by_name_or_email() {
        let roster = Roster::sample();
        let hits: Vec<&str> = roster.search("JOHN").iter().map(|p| p.name.as_str()).collect();
        assert_eq!(hits, vec!["John Smith", "Taylor Johnson"]);
        let hits: Vec<&str> = roster.search("theoffice").iter().map(|p| p.id.as_str()).collect();
        assert_eq!(hits, vec!["2"]);
        assert_eq!(roster.search("").len(), 3);
        assert!(roster.search("nobody").is_empty());
    }

    #[test]
    fn test_add_rejects_blank_fields() {
        let mut roster = Roster::sample();
        assert_eq!(roster.add("", "e@x.com", "P1"), Err(Error::EmptyField("name")));
        assert_eq!(roster.add("Ann", "   ", "P1"), Err(Error::EmptyField("email")));
        assert_eq!(roster.add("Ann", "e@x.com", "\t"), Err(Error::EmptyField("patient id")));
        assert_eq!(roster.len(), 3);
    }

    #[test]
    fn test_add_prepends_trimmed_patient_without_plan() {
        let mut roster = Roster::sample();
        let added = roster.add("  Ann Lee ", " ann@x.com", "P-9 ").unwrap().clone();
        assert_eq!(roster.len(), 4);
        assert_eq!(roster.patients()[0], added);
        assert_eq!(added.name, "Ann Lee");
        assert_eq!(added.email, "ann@x.com");
        assert_eq!(added.external_id.as_deref(), Some("P-9"));
        assert_eq!(added.plan_state(), PlanState::NoPlan);
    }

    #[test]
    fn test_rapid_adds_get_distinct_ids() {
        let mut roster = Roster::default();
        let a = roster.add("A", "a@x", "1").unwrap().id.clone();
        let b = roster.add("B", "b@x", "2").unwrap().id.clone();
        assert_ne!(a, b);
    }

    #[test]
    fn test_next_id_skips_existing() {
        let mut roster = Roster::sample();
        assert_eq!(roster.next_id(1), "4");
        assert_eq!(roster.next_id(1), "5");
    }

    #[test]
    fn test_apply_plan_transitions_state() {
        let mut roster = Roster::sample();
        assert_eq!(roster.plan_state("3"), Some(PlanState::NoPlan));
        roster.apply_plan("3", vec!["Ankle Circles (2×10)".to_string()]).unwrap();
        assert_eq!(roster.plan_state("3"), Some(PlanState::HasPlan));
        roster.apply_plan("3", vec!["Hip Abduction (3×12)".to_string()]).unwrap();
        assert_eq!(roster.get("3").unwrap().assigned_plan, vec!["Hip Abduction (3×12)"]);
    }

    #[test]
    fn test_apply_plan_unknown_id_leaves_roster_unchanged() {
        let mut roster = Roster::sample();
        let before = roster.patients().to_vec();
        let err = roster.apply_plan("missing", vec!["X (1×1)".to_string()]);
        assert_eq!(err, Err(Error::PatientNotFound("missing".to_string())));
        assert_eq!(roster.patients(), before.as_slice());
    }

    #[test]
    fn test_active_plan_count() {
        let roster = Roster::sample();
        assert_eq!(roster.active_plan_count(), 2);
    }

    #[test]
    fn test_display_helpers() {
        let roster = Roster::sample();
        let john = roster.get("1").unwrap();
        assert_eq!(john.initials(), "JS");
        assert_eq!(john.exercise_badge(), "2 exercises");
        assert_eq!(john.plan_action_label(), "Edit Plan");
        let michael = roster.get("2").unwrap();
        assert_eq!(michael.exercise_badge(), "1 exercise");
        let taylor = roster.get("3").unwrap();
        assert_eq!(taylor.plan_action_label(), "Create Plan");
    }
}
