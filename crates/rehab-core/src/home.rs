//! Patient home dashboard: today's plan and the action cards.

use serde::Serialize;

use crate::session::ExerciseSession;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanItem {
    pub number: u32,
    pub title: String,
    pub subtitle: String,
    pub sets: u32,
    pub reps: u32,
    pub tag: String,
    pub completed: bool,
    /// Key of the exercise screen this row opens.
    pub detail_key: String,
}

impl PlanItem {
    /// e.g. `"3 sets × 10 reps"`.
    pub fn meta(&self) -> String {
        format!("{} sets × {} reps", self.sets, self.reps)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CardAction {
    OpenAssistant,
    ViewProgress,
}

/// A tappable summary card. Cards without an action render as static.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionCard {
    pub icon: &'static str,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub icon_background: &'static str,
    pub icon_color: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<CardAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientHome {
    pub patient_name: String,
    pub prescribed_by: String,
    pub plan: Vec<PlanItem>,
    pub streak_days: u32,
    /// Fraction 0.0-1.0 across the whole programme.
    pub overall_completion: f64,
}

impl PatientHome {
    pub fn sample() -> Self {
        let plan = [
            ("Shoulder Flexion", "Raise arm forward", 3, 10, "Shoulder", true, "shoulder"),
            ("Knee Extension", "Straighten knee while seated", 2, 15, "Knee", false, "knee"),
            ("Wall Push-ups", "Modified push-up", 2, 12, "Upper Body", false, "wall"),
        ]
        .into_iter()
        .zip(1..)
        .map(|((title, subtitle, sets, reps, tag, completed, key), number)| PlanItem {
            number,
            title: title.to_string(),
            subtitle: subtitle.to_string(),
            sets,
            reps,
            tag: tag.to_string(),
            completed,
            detail_key: key.to_string(),
        })
        .collect();

        Self {
            patient_name: "Sarah Johnson".to_string(),
            prescribed_by: "Dr. Smith".to_string(),
            plan,
            streak_days: 5,
            overall_completion: 0.78,
        }
    }

    pub fn completed_count(&self) -> usize {
        self.plan.iter().filter(|p| p.completed).count()
    }

    /// Fraction of today's plan that is done; 0.0 for an empty plan.
    pub fn today_progress(&self) -> f64 {
        if self.plan.is_empty() {
            return 0.0;
        }
        self.completed_count() as f64 / self.plan.len() as f64
    }

    /// Mark the numbered plan row done. Returns false for an unknown row.
    pub fn mark_completed(&mut self, number: u32) -> bool {
        match self.plan.iter_mut().find(|p| p.number == number) {
            Some(item) => {
                item.completed = true;
                true
            }
            None => false,
        }
    }

    /// Open the exercise screen for a plan row.
    pub fn start(&self, number: u32) -> Option<ExerciseSession> {
        self.plan
            .iter()
            .find(|p| p.number == number)
            .map(|p| ExerciseSession::for_key(&p.detail_key))
    }

    pub fn cards(&self) -> Vec<ActionCard> {
        vec![
            ActionCard {
                icon: "message.fill",
                title: "Ask AI Assistant",
                subtitle: "Get help with exercises or recovery",
                icon_background: "#e3f2fd",
                icon_color: "#2196f3",
                action: Some(CardAction::OpenAssistant),
            },
            ActionCard {
                icon: "chart.line.uptrend.xyaxis",
                title: "View Progress",
                subtitle: "Track your exercise history",
                icon_background: "#f3e5f5",
                icon_color: "#9c27b0",
                action: Some(CardAction::ViewProgress),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_today_progress() {
        let mut home = PatientHome::sample();
        assert_eq!(home.completed_count(), 1);
        assert!((home.today_progress() - 1.0 / 3.0).abs() < 1e-9);
        assert!(home.mark_completed(2));
        assert!(!home.mark_completed(9));
        assert_eq!(home.completed_count(), 2);
    }

    #[test]
    fn test_plan_rows_are_numbered_with_meta() {
        let home = PatientHome::sample();
        let numbers: Vec<u32> = home.plan.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(home.plan[1].meta(), "2 sets × 15 reps");
    }

    #[test]
    fn test_start_opens_matching_exercise() {
        let home = PatientHome::sample();
        let session = home.start(3).unwrap();
        assert_eq!(session.detail().title, "Wall Push-ups");
        assert!(home.start(4).is_none());
    }

    #[test]
    fn test_cards_carry_actions() {
        let home = PatientHome::sample();
        let actions: Vec<_> = home.cards().iter().map(|c| c.action).collect();
        assert_eq!(actions, vec![Some(CardAction::OpenAssistant), Some(CardAction::ViewProgress)]);
    }
}
