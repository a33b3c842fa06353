//! Clinician portal state: tabs, the add-patient form and the plan modal.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::plan::PlanBuilder;
use crate::roster::{Patient, Roster};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DoctorTab {
    #[default]
    Home,
    #[serde(rename = "My Patients")]
    MyPatients,
    Profile,
}

impl DoctorTab {
    pub const ALL: [DoctorTab; 3] = [DoctorTab::Home, DoctorTab::MyPatients, DoctorTab::Profile];

    pub fn label(self) -> &'static str {
        match self {
            DoctorTab::Home => "Home",
            DoctorTab::MyPatients => "My Patients",
            DoctorTab::Profile => "Profile",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Email,
    PatientId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPatientForm {
    pub name: String,
    pub email: String,
    pub patient_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_patients: usize,
    pub active_plans: usize,
}

/// The plan builder bound to the patient it was opened for.
#[derive(Debug, Clone)]
pub struct PlanModal {
    pub patient_id: String,
    pub builder: PlanBuilder,
}

/// Single owner of the clinician screens' state. Every method is a
/// synchronous reducer over that state.
#[derive(Debug, Clone)]
pub struct ClinicianDashboard {
    catalog: Arc<Catalog>,
    roster: Roster,
    tab: DoctorTab,
    add_form: Option<NewPatientForm>,
    plan_modal: Option<PlanModal>,
}

impl ClinicianDashboard {
    pub fn new(catalog: Arc<Catalog>, roster: Roster) -> Self {
        Self {
            catalog,
            roster,
            tab: DoctorTab::default(),
            add_form: None,
            plan_modal: None,
        }
    }

    pub fn sample() -> Self {
        Self::new(Arc::new(Catalog::sample()), Roster::sample())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn tab(&self) -> DoctorTab {
        self.tab
    }

    pub fn select_tab(&mut self, tab: DoctorTab) {
        self.tab = tab;
    }

    pub fn stats(&self) -> DashboardStats {
        DashboardStats {
            total_patients: self.roster.len(),
            active_plans: self.roster.active_plan_count(),
        }
    }

    // --- Add patient ---

    pub fn add_form(&self) -> Option<&NewPatientForm> {
        self.add_form.as_ref()
    }

    /// Show the add-patient form with every field cleared.
    pub fn open_add_patient(&mut self) {
        self.add_form = Some(NewPatientForm::default());
    }

    pub fn close_add_patient(&mut self) {
        self.add_form = None;
    }

    /// Edit one form field. Ignored while the form is closed.
    pub fn update_form(&mut self, field: FormField, value: &str) {
        if let Some(form) = self.add_form.as_mut() {
            let slot = match field {
                FormField::Name => &mut form.name,
                FormField::Email => &mut form.email,
                FormField::PatientId => &mut form.patient_id,
            };
            *slot = value.to_string();
        }
    }

    /// Submit the form. On success the form closes; on rejection it stays
    /// open with its contents intact.
    pub fn submit_add_patient(&mut self) -> Result<Patient> {
        let form = self.add_form.clone().unwrap_or_default();
        let patient = self
            .roster
            .add(&form.name, &form.email, &form.patient_id)?
            .clone();
        self.add_form = None;
        Ok(patient)
    }

    // --- Plan modal ---

    pub fn plan_modal(&self) -> Option<&PlanModal> {
        self.plan_modal.as_ref()
    }

    pub fn plan_builder_mut(&mut self) -> Option<&mut PlanBuilder> {
        self.plan_modal.as_mut().map(|m| &mut m.builder)
    }

    /// Open an empty plan builder for `patient_id`, replacing any session
    /// already open.
    pub fn open_plan(&mut self, patient_id: &str) -> Result<&mut PlanBuilder> {
        if self.roster.get(patient_id).is_none() {
            return Err(Error::PatientNotFound(patient_id.to_string()));
        }
        let modal = self.plan_modal.insert(PlanModal {
            patient_id: patient_id.to_string(),
            builder: PlanBuilder::new(Arc::clone(&self.catalog)),
        });
        Ok(&mut modal.builder)
    }

    /// Close the modal and discard its working set.
    pub fn close_plan(&mut self) {
        self.plan_modal = None;
    }

    /// Store the builder's output on the bound patient and close the modal.
    /// Returns the plan strings that were assigned.
    pub fn save_plan(&mut self) -> Result<Vec<String>> {
        let mut modal = self.plan_modal.take().ok_or(Error::NoPatientSelected)?;
        let plan = modal.builder.save();
        if let Err(e) = self.roster.apply_plan(&modal.patient_id, plan.clone()) {
            tracing::warn!(patient = %modal.patient_id, "plan saved for a patient no longer on the roster");
            return Err(e);
        }
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::PlanField;
    use crate::roster::PlanState;

    #[test]
    fn test_stats_follow_roster() {
        let mut dash = ClinicianDashboard::sample();
        assert_eq!(dash.stats(), DashboardStats { total_patients: 3, active_plans: 2 });

        dash.open_plan("3").unwrap().toggle("e6").unwrap();
        dash.save_plan().unwrap();
        assert_eq!(dash.stats().active_plans, 3);
    }

    #[test]
    fn test_tab_selection() {
        let mut dash = ClinicianDashboard::sample();
        assert_eq!(dash.tab(), DoctorTab::Home);
        dash.select_tab(DoctorTab::MyPatients);
        assert_eq!(dash.tab().label(), "My Patients");
    }

    #[test]
    fn test_add_patient_flow() {
        let mut dash = ClinicianDashboard::sample();
        dash.open_add_patient();
        dash.update_form(FormField::Name, "Ann Lee");
        dash.update_form(FormField::Email, "ann@x.com");
        assert_eq!(dash.submit_add_patient(), Err(Error::EmptyField("patient id")));
        assert!(dash.add_form().is_some());
        assert_eq!(dash.roster().len(), 3);

        dash.update_form(FormField::PatientId, "P-1");
        let added = dash.submit_add_patient().unwrap();
        assert_eq!(added.name, "Ann Lee");
        assert!(dash.add_form().is_none());
        assert_eq!(dash.roster().patients()[0].id, added.id);
    }

    #[test]
    fn test_reopening_add_form_clears_it() {
        let mut dash = ClinicianDashboard::sample();
        dash.open_add_patient();
        dash.update_form(FormField::Name, "Draft");
        dash.close_add_patient();
        dash.update_form(FormField::Name, "ignored");
        dash.open_add_patient();
        assert_eq!(dash.add_form(), Some(&NewPatientForm::default()));
    }

    #[test]
    fn test_open_plan_for_unknown_patient() {
        let mut dash = ClinicianDashboard::sample();
        assert!(matches!(dash.open_plan("nope"), Err(Error::PatientNotFound(_))));
        assert!(dash.plan_modal().is_none());
    }

    #[test]
    fn test_save_plan_replaces_patient_plan() {
        let mut dash = ClinicianDashboard::sample();
        let builder = dash.open_plan("1").unwrap();
        builder.toggle("e5").unwrap();
        builder.set_field("e5", PlanField::Reps, "8");
        let plan = dash.save_plan().unwrap();
        assert_eq!(plan, vec!["Hip Abduction (3×8)"]);
        assert_eq!(dash.roster().get("1").unwrap().assigned_plan, plan);
        assert!(dash.plan_modal().is_none());
    }

    #[test]
    fn test_save_without_open_plan() {
        let mut dash = ClinicianDashboard::sample();
        assert_eq!(dash.save_plan(), Err(Error::NoPatientSelected));
    }

    #[test]
    fn test_close_plan_discards_working_set() {
        let mut dash = ClinicianDashboard::sample();
        dash.open_plan("3").unwrap().toggle("e1").unwrap();
        dash.close_plan();
        assert!(dash.open_plan("3").unwrap().is_empty());
        assert_eq!(dash.roster().plan_state("3"), Some(PlanState::NoPlan));
    }
}
