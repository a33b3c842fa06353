use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Category filter value that matches every template.
pub const ALL_CATEGORIES: &str = "All";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseTemplate {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub default_sets: u32,
    pub default_reps: u32,
    pub category: String,
}

impl ExerciseTemplate {
    pub fn new(
        id: &str,
        name: &str,
        description: Option<&str>,
        default_sets: u32,
        default_reps: u32,
        category: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.map(str::to_string),
            default_sets,
            default_reps,
            category: category.to_string(),
        }
    }

    /// Lowercased text the search box matches against: name, description, category.
    fn haystack(&self) -> String {
        format!(
            "{} {} {}",
            self.name,
            self.description.as_deref().unwrap_or(""),
            self.category
        )
        .to_lowercase()
    }

    /// Category and substring predicates used by the plan builder's library view.
    pub fn matches(&self, search: &str, category: &str) -> bool {
        let in_category = category == ALL_CATEGORIES || self.category == category;
        in_category && self.haystack().contains(&search.to_lowercase())
    }
}

/// Read-only exercise library. Template ids are unique; order is the
/// order the library was declared in.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    templates: Vec<ExerciseTemplate>,
}

impl Catalog {
    pub fn new(templates: Vec<ExerciseTemplate>) -> Self {
        let mut seen = HashSet::new();
        let templates = templates
            .into_iter()
            .filter(|t| {
                let fresh = seen.insert(t.id.clone());
                if !fresh {
                    tracing::warn!(id = %t.id, "dropping duplicate exercise template");
                }
                fresh
            })
            .collect();
        Self { templates }
    }

    /// The clinic's built-in exercise library.
    pub fn sample() -> Self {
        Self::new(vec![
            ExerciseTemplate::new("e1", "Shoulder Flexion", Some("Raise arm forward"), 3, 10, "Shoulder"),
            ExerciseTemplate::new("e2", "Shoulder Abduction", Some("Raise arm sideways"), 3, 10, "Shoulder"),
            ExerciseTemplate::new("e3", "Shoulder External Rotation", Some("Rotate shoulder outward"), 2, 12, "Shoulder"),
            ExerciseTemplate::new("e4", "Knee Extension", Some("Straighten knee"), 2, 15, "Knee"),
            ExerciseTemplate::new("e5", "Hip Abduction", Some("Move leg outward"), 3, 12, "Hip"),
            ExerciseTemplate::new("e6", "Ankle Circles", Some("Rotate ankle"), 2, 10, "Ankle"),
        ])
    }

    pub fn templates(&self) -> &[ExerciseTemplate] {
        &self.templates
    }

    pub fn get(&self, id: &str) -> Option<&ExerciseTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// `"All"` followed by each distinct category in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut out = vec![ALL_CATEGORIES];
        for t in &self.templates {
            if !out.contains(&t.category.as_str()) {
                out.push(&t.category);
            }
        }
        out
    }

    /// Templates in `category` (or any, for `"All"`) whose name, description
    /// or category contains `search`, case-insensitively. Empty search
    /// matches everything.
    pub fn filter<'a>(
        &'a self,
        search: &str,
        category: &str,
    ) -> impl Iterator<Item = &'a ExerciseTemplate> + 'a {
        let search = search.to_lowercase();
        let category = category.to_string();
        self.templates
            .iter()
            .filter(move |t| t.matches(&search, &category))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names<'a>(it: impl Iterator<Item = &'a ExerciseTemplate>) -> Vec<&'a str> {
        it.map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn test_filter_search_across_all_categories() {
        let catalog = Catalog::sample();
        assert_eq!(names(catalog.filter("knee", "All")), vec!["Knee Extension"]);
    }

    #[test]
    fn test_filter_by_category_with_empty_search() {
        let catalog = Catalog::sample();
        assert_eq!(
            names(catalog.filter("", "Shoulder")),
            vec!["Shoulder Flexion", "Shoulder Abduction", "Shoulder External Rotation"]
        );
    }

    #[test]
    fn test_filter_matches_description_and_category_text() {
        let catalog = Catalog::sample();
        assert_eq!(names(catalog.filter("OUTWARD", "All")), vec![
            "Shoulder External Rotation",
            "Hip Abduction"
        ]);
        assert_eq!(names(catalog.filter("ankle", "Knee")).len(), 0);
    }

    #[test]
    fn test_filter_results_satisfy_predicates() {
        let catalog = Catalog::sample();
        for category in catalog.categories() {
            for search in ["", "a", "raise", "zzz", "Sh"] {
                for t in catalog.filter(search, category) {
                    assert!(catalog.get(&t.id).is_some());
                    assert!(category == ALL_CATEGORIES || t.category == category);
                    assert!(t.haystack().contains(&search.to_lowercase()));
                }
            }
        }
    }

    #[test]
    fn test_categories_are_distinct_and_ordered() {
        let catalog = Catalog::sample();
        assert_eq!(
            catalog.categories(),
            vec!["All", "Shoulder", "Knee", "Hip", "Ankle"]
        );
    }

    #[test]
    fn test_template_without_description_still_searchable() {
        let catalog = Catalog::new(vec![ExerciseTemplate::new("x", "Calf Raise", None, 2, 10, "Ankle")]);
        assert_eq!(names(catalog.filter("calf", "All")), vec!["Calf Raise"]);
        assert_eq!(names(catalog.filter("ankle", "Ankle")), vec!["Calf Raise"]);
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let catalog = Catalog::new(vec![
            ExerciseTemplate::new("x", "First", None, 1, 1, "A"),
            ExerciseTemplate::new("x", "Second", None, 1, 1, "A"),
        ]);
        assert_eq!(catalog.templates().len(), 1);
        assert_eq!(catalog.get("x").map(|t| t.name.as_str()), Some("First"));
    }
}
