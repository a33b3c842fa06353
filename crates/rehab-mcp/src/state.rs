//! Session state shared by the tool handlers, and the JSON views they return.

use rehab_assist::ChatSession;
use rehab_core::{
    ClinicianDashboard, Error, ExerciseSession, ExerciseTemplate, Patient, PatientHome,
    PatientProgress, PlanBuilder, PlanField, RepEvent, Result,
};
use serde_json::{json, Value};

pub struct CoachState {
    pub dashboard: ClinicianDashboard,
    pub chat: ChatSession,
    pub home: PatientHome,
    /// Exercise screen currently open, with the plan row it came from.
    pub exercise: Option<(u32, ExerciseSession)>,
}

/// What the patient can do on the open exercise screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseAction {
    /// Start or pause counting
    Toggle,
    /// Count one repetition
    Rep,
    /// Back to set 1, rep 0, paused
    Reset,
}

fn patient_view(p: &Patient) -> Value {
    json!({
        "id": p.id,
        "name": p.name,
        "email": p.email,
        "externalId": p.external_id,
        "initials": p.initials(),
        "badge": p.exercise_badge(),
        "planAction": p.plan_action_label(),
        "plan": p.assigned_plan,
    })
}

fn template_view(t: &ExerciseTemplate, selected: bool) -> Value {
    json!({
        "id": t.id,
        "name": t.name,
        "description": t.description,
        "category": t.category,
        "sets": t.default_sets,
        "reps": t.default_reps,
        "selected": selected,
    })
}

impl CoachState {
    pub fn new(dashboard: ClinicianDashboard) -> Self {
        Self {
            dashboard,
            chat: ChatSession::default(),
            home: PatientHome::sample(),
            exercise: None,
        }
    }

    fn builder(&mut self) -> Result<&mut PlanBuilder> {
        self.dashboard
            .plan_builder_mut()
            .ok_or(Error::NoPatientSelected)
    }

    /// Current plan modal: bound patient, library view and working set.
    fn plan_view(&self) -> Result<Value> {
        let modal = self.dashboard.plan_modal().ok_or(Error::NoPatientSelected)?;
        let patient = self
            .dashboard
            .roster()
            .get(&modal.patient_id)
            .ok_or_else(|| Error::PatientNotFound(modal.patient_id.clone()))?;
        let b = &modal.builder;
        let library: Vec<Value> = b
            .visible()
            .into_iter()
            .map(|t| template_view(t, b.is_selected(&t.id)))
            .collect();
        Ok(json!({
            "patient": { "id": patient.id, "name": patient.name },
            "search": b.search(),
            "category": b.category(),
            "library": library,
            "selected": b.selected(),
            "count": b.len(),
        }))
    }

    pub fn list_exercises(&self) -> Value {
        let catalog = self.dashboard.catalog();
        json!({
            "categories": catalog.categories(),
            "exercises": catalog.templates(),
        })
    }

    /// Filter the library. With a plan open, the filter also becomes that
    /// builder's current view and each hit reports whether it is selected.
    pub fn filter_exercises(&mut self, search: &str, category: &str) -> Value {
        if let Some(b) = self.dashboard.plan_builder_mut() {
            b.set_search(search);
            b.set_category(category);
        }
        let modal = self.dashboard.plan_modal();
        let hits: Vec<Value> = self
            .dashboard
            .catalog()
            .filter(search, category)
            .map(|t| template_view(t, modal.is_some_and(|m| m.builder.is_selected(&t.id))))
            .collect();
        json!(hits)
    }

    pub fn list_patients(&self, query: &str) -> Value {
        let rows: Vec<Value> = self
            .dashboard
            .roster()
            .search(query)
            .into_iter()
            .map(patient_view)
            .collect();
        json!(rows)
    }

    pub fn add_patient(&mut self, name: &str, email: &str, patient_id: &str) -> Result<Value> {
        self.dashboard.open_add_patient();
        self.dashboard.update_form(rehab_core::FormField::Name, name);
        self.dashboard.update_form(rehab_core::FormField::Email, email);
        self.dashboard.update_form(rehab_core::FormField::PatientId, patient_id);
        let result = self.dashboard.submit_add_patient();
        self.dashboard.close_add_patient();
        Ok(patient_view(&result?))
    }

    pub fn open_plan(&mut self, patient_id: &str) -> Result<Value> {
        self.dashboard.open_plan(patient_id)?;
        self.plan_view()
    }

    pub fn toggle_exercise(&mut self, exercise_id: &str) -> Result<Value> {
        let outcome = self.builder()?.toggle(exercise_id)?;
        let mut view = self.plan_view()?;
        view["toggled"] = json!(outcome);
        Ok(view)
    }

    pub fn remove_exercise(&mut self, exercise_id: &str) -> Result<Value> {
        let removed = self.builder()?.remove(exercise_id);
        let mut view = self.plan_view()?;
        view["removed"] = json!(removed);
        Ok(view)
    }

    pub fn set_exercise_field(&mut self, exercise_id: &str, field: PlanField, value: &str) -> Result<Value> {
        let update = self.builder()?.set_field(exercise_id, field, value);
        let mut view = self.plan_view()?;
        view["update"] = json!(update);
        Ok(view)
    }

    pub fn save_plan(&mut self) -> Result<Value> {
        let patient_id = self
            .dashboard
            .plan_modal()
            .map(|m| m.patient_id.clone())
            .ok_or(Error::NoPatientSelected)?;
        self.dashboard.save_plan()?;
        let patient = self
            .dashboard
            .roster()
            .get(&patient_id)
            .ok_or(Error::PatientNotFound(patient_id))?;
        Ok(patient_view(patient))
    }

    pub fn close_plan(&mut self) -> Value {
        let was_open = self.dashboard.plan_modal().is_some();
        self.dashboard.close_plan();
        json!({ "closed": was_open })
    }

    pub fn dashboard_stats(&self) -> Value {
        json!(self.dashboard.stats())
    }

    pub fn chat_history(&self) -> Value {
        json!({
            "messages": self.chat.messages(),
            "loading": self.chat.is_loading(),
        })
    }

    pub fn patient_home(&self) -> Value {
        let plan: Vec<Value> = self
            .home
            .plan
            .iter()
            .map(|p| json!({
                "number": p.number,
                "title": p.title,
                "subtitle": p.subtitle,
                "meta": p.meta(),
                "tag": p.tag,
                "completed": p.completed,
            }))
            .collect();
        json!({
            "patient": self.home.patient_name,
            "prescribedBy": self.home.prescribed_by,
            "plan": plan,
            "completed": self.home.completed_count(),
            "todayProgress": self.home.today_progress(),
            "streakDays": self.home.streak_days,
            "overallCompletion": self.home.overall_completion,
            "cards": self.home.cards(),
        })
    }

    fn exercise_view(&self) -> Option<Value> {
        let (number, session) = self.exercise.as_ref()?;
        let detail = session.detail();
        Some(json!({
            "planItem": number,
            "title": detail.title,
            "category": detail.category,
            "prescription": detail.prescription(),
            "instructions": detail.instructions,
            "started": session.is_started(),
            "currentSet": session.current_set(),
            "currentRep": session.current_rep(),
            "repsDone": session.reps_done(),
            "repsGoal": session.reps_goal(),
            "progressPercent": session.progress_percent(),
            "finished": session.is_finished(),
        }))
    }

    /// Open the exercise screen for a row of today's plan, replacing any
    /// screen already open. `None` for an unknown row.
    pub fn start_exercise(&mut self, number: u32) -> Option<Value> {
        let session = self.home.start(number)?;
        self.exercise = Some((number, session));
        self.exercise_view()
    }

    /// Drive the open exercise screen. Finishing the last rep marks the plan
    /// row completed. `None` when no exercise is open.
    pub fn exercise_action(&mut self, action: ExerciseAction) -> Option<Value> {
        let (number, session) = self.exercise.as_mut()?;
        let number = *number;
        let event = match action {
            ExerciseAction::Toggle => {
                session.toggle_started();
                None
            }
            ExerciseAction::Rep => Some(session.record_rep()),
            ExerciseAction::Reset => {
                session.reset();
                None
            }
        };
        if event == Some(RepEvent::Finished) {
            self.home.mark_completed(number);
        }
        let mut view = self.exercise_view()?;
        if let Some(event) = event {
            view["event"] = json!(event);
        }
        Some(view)
    }

    pub fn patient_progress(&self, patient_id: &str) -> Result<Value> {
        let patient = self
            .dashboard
            .roster()
            .get(patient_id)
            .ok_or_else(|| Error::PatientNotFound(patient_id.to_string()))?;
        let progress = PatientProgress::sample(&patient.name);
        let week: Vec<Value> = progress
            .week
            .iter()
            .map(|d| json!({ "day": d.day, "completed": d.completed, "total": d.total, "percent": d.percent() }))
            .collect();
        let history: Vec<Value> = progress
            .history
            .iter()
            .map(|s| json!({
                "name": s.name,
                "date": s.date,
                "sets": s.sets,
                "reps": s.reps,
                "formAccuracy": s.form_accuracy,
                "duration": s.duration_label(),
            }))
            .collect();
        Ok(json!({
            "patient": progress.patient_name,
            "summary": progress.summary(),
            "week": week,
            "history": history,
            "achievements": progress.achievements,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> CoachState {
        CoachState::new(ClinicianDashboard::sample())
    }

    #[test]
    fn test_full_assignment_flow() {
        let mut s = state();
        let view = s.open_plan("3").unwrap();
        assert_eq!(view["patient"]["name"], "Taylor Johnson");
        assert_eq!(view["count"], 0);

        s.toggle_exercise("e1").unwrap();
        s.toggle_exercise("e4").unwrap();
        let view = s.set_exercise_field("e4", PlanField::Sets, "4").unwrap();
        assert_eq!(view["update"]["applied"], true);
        assert_eq!(view["count"], 2);

        let patient = s.save_plan().unwrap();
        assert_eq!(patient["plan"], json!(["Shoulder Flexion (3×10)", "Knee Extension (4×15)"]));
        assert_eq!(patient["planAction"], "Edit Plan");
        assert!(matches!(s.toggle_exercise("e1"), Err(Error::NoPatientSelected)));
    }

    #[test]
    fn test_filter_updates_open_builder_view() {
        let mut s = state();
        s.open_plan("1").unwrap();
        s.toggle_exercise("e4").unwrap();
        let hits = s.filter_exercises("knee", "All");
        assert_eq!(hits.as_array().unwrap().len(), 1);
        assert_eq!(hits[0]["selected"], true);

        let view = s.plan_view().unwrap();
        assert_eq!(view["search"], "knee");
        assert_eq!(view["library"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_add_patient_rejection_keeps_roster() {
        let mut s = state();
        assert_eq!(s.add_patient("", "e@x.com", "P1"), Err(Error::EmptyField("name")));
        assert_eq!(s.list_patients("").as_array().unwrap().len(), 3);
        assert!(s.dashboard.add_form().is_none());

        let added = s.add_patient("Ann Lee", "ann@x.com", "P1").unwrap();
        assert_eq!(added["initials"], "AL");
        assert_eq!(s.list_patients("")[0]["name"], "Ann Lee");
        assert_eq!(s.dashboard_stats()["totalPatients"], 4);
    }

    #[test]
    fn test_close_plan_reports_state() {
        let mut s = state();
        assert_eq!(s.close_plan()["closed"], false);
        s.open_plan("2").unwrap();
        assert_eq!(s.close_plan()["closed"], true);
    }

    #[test]
    fn test_patient_progress_view() {
        let s = state();
        let view = s.patient_progress("1").unwrap();
        assert_eq!(view["patient"], "John Smith");
        assert_eq!(view["summary"]["avgFormScore"], 91);
        assert_eq!(view["history"][0]["duration"], "8m 45s");
        assert!(matches!(s.patient_progress("404"), Err(Error::PatientNotFound(_))));
    }

    #[test]
    fn test_finishing_exercise_completes_plan_row() {
        let mut s = state();
        assert_eq!(s.patient_home()["completed"], 1);
        assert!(s.exercise_action(ExerciseAction::Rep).is_none());
        assert!(s.start_exercise(9).is_none());

        let view = s.start_exercise(3).unwrap();
        assert_eq!(view["title"], "Wall Push-ups");
        assert_eq!(view["repsGoal"], 24);

        let view = s.exercise_action(ExerciseAction::Rep).unwrap();
        assert_eq!(view["event"], "ignored");
        s.exercise_action(ExerciseAction::Toggle);
        let mut last = Value::Null;
        for _ in 0..24 {
            last = s.exercise_action(ExerciseAction::Rep).unwrap();
        }
        assert_eq!(last["event"], "finished");
        assert_eq!(last["progressPercent"], 100);

        let home = s.patient_home();
        assert_eq!(home["completed"], 2);
        assert_eq!(home["plan"][2]["completed"], true);
        assert_eq!(home["plan"][2]["meta"], "2 sets × 12 reps");
    }

    #[test]
    fn test_reset_exercise_keeps_row_open() {
        let mut s = state();
        s.start_exercise(2).unwrap();
        s.exercise_action(ExerciseAction::Toggle);
        s.exercise_action(ExerciseAction::Rep);
        let view = s.exercise_action(ExerciseAction::Reset).unwrap();
        assert_eq!(view["repsDone"], 0);
        assert_eq!(view["started"], false);
        assert_eq!(view["planItem"], 2);
    }

    #[test]
    fn test_greeting_suggestion_lookup() {
        let s = state();
        let id = s.chat.messages()[0].id.clone();
        assert_eq!(s.chat.suggestion(&id, 0), Some("Shoulder pain"));
        assert_eq!(s.chat.suggestion(&id, 3), None);
        let history = s.chat_history();
        assert_eq!(history["loading"], false);
        assert_eq!(history["messages"][0]["suggestions"][2], "Recovery");
    }

    #[test]
    fn test_list_exercises_includes_categories() {
        let s = state();
        let view = s.list_exercises();
        assert_eq!(view["categories"][0], "All");
        assert_eq!(view["exercises"].as_array().unwrap().len(), 6);
        assert_eq!(view["exercises"][0]["defaultSets"], 3);
    }
}
