mod state;

use std::sync::{Arc, Mutex, MutexGuard};

use rehab_assist::{AzureChatClient, CompletionClient};
use rehab_core::{assist_configured, AssistSettings, ClinicianDashboard, PlanField};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use state::{CoachState, ExerciseAction};

// --- Request types ---

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct FilterExercisesRequest {
    /// Case-insensitive text matched against name, description and category. Empty matches everything.
    #[serde(default)]
    search: String,
    /// Category name, or "All" for every category.
    #[serde(default = "all_categories")]
    category: String,
}

fn all_categories() -> String {
    rehab_core::ALL_CATEGORIES.to_string()
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct ListPatientsRequest {
    /// Case-insensitive substring of the patient's name or email. Empty lists everyone.
    #[serde(default)]
    query: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct AddPatientRequest {
    /// Full name, e.g. "Jane Doe"
    name: String,
    email: String,
    /// Clinic-issued patient identifier. Kept alongside the generated roster id.
    patient_id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct PatientRequest {
    /// Roster id of the patient (see list_patients)
    patient_id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct ExerciseRequest {
    /// Library exercise id, e.g. "e1"
    exercise_id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct SetExerciseFieldRequest {
    exercise_id: String,
    /// "sets" or "reps"
    field: PlanField,
    /// Raw text as typed. The leading integer is used; anything unparsable becomes 0.
    value: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct AskAssistantRequest {
    /// The patient's question
    message: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct TapSuggestionRequest {
    /// Id of the transcript message carrying the suggestion (see chat_history)
    message_id: String,
    /// Zero-based position in that message's suggestions
    index: usize,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct StartExerciseRequest {
    /// Row number in today's plan (see patient_home), starting at 1
    number: u32,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct ExerciseActionRequest {
    /// "toggle" to start or pause, "rep" to count a repetition, "reset" to start over
    action: ExerciseAction,
}

// --- Server ---

#[derive(Clone)]
pub struct CoachServer {
    tool_router: ToolRouter<Self>,
    state: Arc<Mutex<CoachState>>,
    client: Arc<dyn CompletionClient>,
}

fn respond(result: rehab_core::Result<serde_json::Value>) -> Result<CallToolResult, McpError> {
    match result {
        Ok(val) => Ok(json_result(&val)),
        Err(e) => Ok(CallToolResult::error(vec![Content::text(e.to_string())])),
    }
}

fn json_result(val: &serde_json::Value) -> CallToolResult {
    match serde_json::to_string_pretty(val) {
        Ok(text) => CallToolResult::success(vec![Content::text(text)]),
        Err(e) => CallToolResult::error(vec![Content::text(format!("Failed to serialize: {}", e))]),
    }
}

#[tool_router]
impl CoachServer {
    pub fn new(dashboard: ClinicianDashboard, client: Arc<dyn CompletionClient>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            state: Arc::new(Mutex::new(CoachState::new(dashboard))),
            client,
        }
    }

    fn state(&self) -> MutexGuard<'_, CoachState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record the user turn, call the model with the lock released, then
    /// append the reply or its fallback.
    async fn converse(&self, content: &str) -> CallToolResult {
        let request = self.state().chat.begin(content);
        let Some(request) = request else {
            return CallToolResult::error(vec![Content::text("Message is empty")]);
        };
        let outcome = self.client.complete(&request).await;
        let mut state = self.state();
        let reply = state.chat.finish(outcome);
        CallToolResult::success(vec![Content::text(reply.content.clone())])
    }

    #[tool(description = "List the exercise library and its categories. Each exercise has {id, name, description?, defaultSets, defaultReps, category}.")]
    fn list_exercises(&self) -> Result<CallToolResult, McpError> {
        Ok(json_result(&self.state().list_exercises()))
    }

    #[tool(
        description = "Filter the exercise library by search text and category. When a plan is open, this also sets the plan builder's filter and each result reports whether it is selected."
    )]
    fn filter_exercises(
        &self,
        Parameters(req): Parameters<FilterExercisesRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(json_result(&self.state().filter_exercises(&req.search, &req.category)))
    }

    #[tool(description = "List patients on the roster, newest first, optionally filtered by name or email.")]
    fn list_patients(
        &self,
        Parameters(req): Parameters<ListPatientsRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(json_result(&self.state().list_patients(&req.query)))
    }

    #[tool(description = "Add a patient to the top of the roster. Name, email and patient id are all required.")]
    fn add_patient(
        &self,
        Parameters(req): Parameters<AddPatientRequest>,
    ) -> Result<CallToolResult, McpError> {
        let result = self.state().add_patient(&req.name, &req.email, &req.patient_id);
        if let Ok(p) = &result {
            tracing::info!(id = %p["id"], "patient added");
        }
        respond(result)
    }

    #[tool(
        description = "Open the plan builder for a patient with an empty selection. Only one plan can be open; opening another discards the current working set."
    )]
    fn open_plan(
        &self,
        Parameters(req): Parameters<PatientRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.state().open_plan(&req.patient_id))
    }

    #[tool(description = "Add a library exercise to the open plan with its default sets and reps, or remove it if already selected.")]
    fn toggle_exercise(
        &self,
        Parameters(req): Parameters<ExerciseRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.state().toggle_exercise(&req.exercise_id))
    }

    #[tool(description = "Remove an exercise from the open plan. Removing an exercise that is not selected is a no-op.")]
    fn remove_exercise(
        &self,
        Parameters(req): Parameters<ExerciseRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.state().remove_exercise(&req.exercise_id))
    }

    #[tool(description = "Set sets or reps for a selected exercise in the open plan.")]
    fn set_exercise_field(
        &self,
        Parameters(req): Parameters<SetExerciseFieldRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            self.state()
                .set_exercise_field(&req.exercise_id, req.field, &req.value),
        )
    }

    #[tool(
        description = "Save the open plan to its patient as \"Name (SETS×REPS)\" lines, replacing any previous plan, and close the builder. Saving an empty selection clears the patient's plan."
    )]
    fn save_plan(&self) -> Result<CallToolResult, McpError> {
        let result = self.state().save_plan();
        if let Ok(p) = &result {
            tracing::info!(patient = %p["id"], exercises = p["plan"].as_array().map_or(0, Vec::len), "plan saved");
        }
        respond(result)
    }

    #[tool(description = "Close the plan builder without saving.")]
    fn close_plan(&self) -> Result<CallToolResult, McpError> {
        Ok(json_result(&self.state().close_plan()))
    }

    #[tool(description = "Roster totals: {totalPatients, activePlans}.")]
    fn dashboard_stats(&self) -> Result<CallToolResult, McpError> {
        Ok(json_result(&self.state().dashboard_stats()))
    }

    #[tool(description = "Weekly activity, session history, achievements and summary for a patient.")]
    fn patient_progress(
        &self,
        Parameters(req): Parameters<PatientRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.state().patient_progress(&req.patient_id))
    }

    #[tool(
        description = "Ask the physio assistant a question. The full conversation so far is sent along; questions asked while another is still waiting do not see its reply. If the completion service fails, a short fallback message is returned instead."
    )]
    async fn ask_assistant(
        &self,
        Parameters(req): Parameters<AskAssistantRequest>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.converse(&req.message).await)
    }

    #[tool(description = "Send one of the quick-reply suggestions attached to a transcript message, as if the patient had typed it.")]
    async fn tap_suggestion(
        &self,
        Parameters(req): Parameters<TapSuggestionRequest>,
    ) -> Result<CallToolResult, McpError> {
        let content = self
            .state()
            .chat
            .suggestion(&req.message_id, req.index)
            .map(str::to_string);
        match content {
            Some(content) => Ok(self.converse(&content).await),
            None => Ok(CallToolResult::error(vec![Content::text(format!(
                "No suggestion {} on message '{}'",
                req.index, req.message_id
            ))])),
        }
    }

    #[tool(description = "The assistant transcript: [{id, role, content, timestamp, suggestions?}] and whether a reply is still pending.")]
    fn chat_history(&self) -> Result<CallToolResult, McpError> {
        Ok(json_result(&self.state().chat_history()))
    }

    #[tool(description = "The patient's home screen: today's plan with completion, today's progress, streak and action cards.")]
    fn patient_home(&self) -> Result<CallToolResult, McpError> {
        Ok(json_result(&self.state().patient_home()))
    }

    #[tool(description = "Open the exercise screen for a row of today's plan. Counting starts paused.")]
    fn start_exercise(
        &self,
        Parameters(req): Parameters<StartExerciseRequest>,
    ) -> Result<CallToolResult, McpError> {
        match self.state().start_exercise(req.number) {
            Some(view) => Ok(json_result(&view)),
            None => Ok(CallToolResult::error(vec![Content::text(format!(
                "No plan row {} today",
                req.number
            ))])),
        }
    }

    #[tool(
        description = "Start/pause, count a rep, or reset the open exercise. Completing the final rep marks the plan row done."
    )]
    fn exercise_action(
        &self,
        Parameters(req): Parameters<ExerciseActionRequest>,
    ) -> Result<CallToolResult, McpError> {
        match self.state().exercise_action(req.action) {
            Some(view) => Ok(json_result(&view)),
            None => Ok(CallToolResult::error(vec![Content::text(
                "No exercise is open. Use start_exercise first.",
            )])),
        }
    }
}

const INSTRUCTIONS: &str = r#"Physio coach: a clinician's dashboard for a physical-therapy practice, plus a patient-facing assistant.

## Workflow
1. `list_patients` to find the patient's roster id, or `add_patient` to create one.
2. `open_plan` for that patient. The builder starts empty, even if the patient already has a plan.
3. `filter_exercises` / `list_exercises` to browse, `toggle_exercise` to select, `set_exercise_field` to adjust sets or reps.
4. `save_plan` replaces the patient's plan with the current selection. `close_plan` discards it.

## Patient
`patient_home` shows today's plan. `start_exercise` opens a row, then `exercise_action` counts reps; finishing marks the row done. `patient_progress` has weekly history for a roster patient.

## Assistant
`ask_assistant` keeps a single running conversation. `chat_history` shows it, including quick-reply suggestions that `tap_suggestion` sends. Answers come from the configured Azure OpenAI deployment."#;

#[tool_handler]
impl ServerHandler for CoachServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout carries the protocol
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let settings = AssistSettings::from_env();
    if !assist_configured(&settings) {
        tracing::warn!("Azure OpenAI settings are missing; assistant replies will fall back");
    }
    let client: Arc<dyn CompletionClient> = Arc::new(AzureChatClient::new(settings));

    let service = CoachServer::new(ClinicianDashboard::sample(), client)
        .serve(rmcp::transport::io::stdio())
        .await
        .inspect_err(|e| tracing::error!("MCP server error: {}", e))?;
    service.waiting().await?;
    Ok(())
}
