pub mod catalog;
pub mod dashboard;
pub mod error;
pub mod home;
pub mod plan;
pub mod progress;
pub mod roster;
pub mod session;
pub mod settings;

pub use catalog::{Catalog, ExerciseTemplate, ALL_CATEGORIES};
pub use dashboard::{ClinicianDashboard, DashboardStats, DoctorTab, FormField, NewPatientForm};
pub use error::{Error, Result};
pub use home::{ActionCard, CardAction, PatientHome, PlanItem};
pub use plan::{format_plan, FieldUpdate, PlanBuilder, PlanField, SelectedExercise, Toggle};
pub use progress::{Achievement, DailyActivity, PatientProgress, ProgressSummary, SessionRecord};
pub use roster::{Patient, PlanState, Roster};
pub use session::{ExerciseDetail, ExerciseSession, RepEvent};
pub use settings::{assist_configured, AssistSettings};
