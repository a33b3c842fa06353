use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, ExerciseTemplate, ALL_CATEGORIES};
use crate::error::{Error, Result};

/// Which prescription number a clinician is editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PlanField {
    Sets,
    Reps,
}

/// A template copied into the working set. `sets`/`reps` start at the
/// template defaults and are edited independently afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedExercise {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: String,
    pub sets: i64,
    pub reps: i64,
}

impl SelectedExercise {
    pub fn from_template(t: &ExerciseTemplate) -> Self {
        Self {
            id: t.id.clone(),
            name: t.name.clone(),
            description: t.description.clone(),
            category: t.category.clone(),
            sets: i64::from(t.default_sets),
            reps: i64::from(t.default_reps),
        }
    }

    /// `"<name> (<sets>×<reps>)"`, the form plans are stored in.
    pub fn display(&self) -> String {
        format!("{} ({}×{})", self.name, self.sets, self.reps)
    }
}

/// Project a working set onto the stored plan strings, preserving order.
pub fn format_plan(exercises: &[SelectedExercise]) -> Vec<String> {
    exercises.iter().map(SelectedExercise::display).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Toggle {
    Added,
    Removed,
}

/// Outcome of a sets/reps edit. `coerced` is set when the raw text was not
/// a number and the field fell back to zero; `applied` is false when the id
/// was not in the working set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldUpdate {
    pub value: i64,
    pub coerced: bool,
    pub applied: bool,
}

/// Leading base-10 integer of `raw`: optional whitespace, optional sign,
/// then digits. Trailing garbage is ignored (`"12x"` is 12).
fn parse_count(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// One clinician's in-progress plan for one patient: the library view
/// (search text and category) plus the working set of selected exercises.
///
/// The working set is keyed by template id and kept in insertion order.
#[derive(Debug, Clone)]
pub struct PlanBuilder {
    catalog: Arc<Catalog>,
    search: String,
    category: String,
    selected: Vec<SelectedExercise>,
}

impl PlanBuilder {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            search: String::new(),
            category: ALL_CATEGORIES.to_string(),
            selected: Vec::new(),
        }
    }

    pub fn set_search(&mut self, search: &str) {
        self.search = search.to_string();
    }

    pub fn set_category(&mut self, category: &str) {
        self.category = category.to_string();
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Library entries matching an explicit search and category.
    pub fn filter(&self, search: &str, category: &str) -> Vec<&ExerciseTemplate> {
        self.catalog.filter(search, category).collect()
    }

    /// Library entries matching the builder's current search and category.
    pub fn visible(&self) -> Vec<&ExerciseTemplate> {
        self.filter(&self.search, &self.category)
    }

    pub fn selected(&self) -> &[SelectedExercise] {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.iter().any(|s| s.id == id)
    }

    /// Remove `id` if it is selected, otherwise append a fresh copy of the
    /// template with its default prescription.
    pub fn toggle(&mut self, id: &str) -> Result<Toggle> {
        if self.remove(id) {
            return Ok(Toggle::Removed);
        }
        let template = self
            .catalog
            .get(id)
            .ok_or_else(|| Error::UnknownExercise(id.to_string()))?;
        self.selected.push(SelectedExercise::from_template(template));
        Ok(Toggle::Added)
    }

    /// Drop `id` from the working set. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.selected.len();
        self.selected.retain(|s| s.id != id);
        self.selected.len() != before
    }

    /// Overwrite sets or reps from free text. Unparseable text becomes 0;
    /// no bounds are enforced.
    pub fn set_field(&mut self, id: &str, field: PlanField, raw: &str) -> FieldUpdate {
        let parsed = parse_count(raw);
        let value = parsed.unwrap_or(0);
        let mut applied = false;
        if let Some(ex) = self.selected.iter_mut().find(|s| s.id == id) {
            match field {
                PlanField::Sets => ex.sets = value,
                PlanField::Reps => ex.reps = value,
            }
            applied = true;
        }
        FieldUpdate {
            value,
            coerced: parsed.is_none(),
            applied,
        }
    }

    /// Hand back the working set as records and clear it.
    pub fn save_structured(&mut self) -> Vec<SelectedExercise> {
        std::mem::take(&mut self.selected)
    }

    /// Hand back the working set as display strings and clear it.
    pub fn save(&mut self) -> Vec<String> {
        format_plan(&self.save_structured())
    }
}
