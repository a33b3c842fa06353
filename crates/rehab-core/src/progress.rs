//! Per-patient progress analytics shown to the clinician.

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyActivity {
    pub day: String,
    pub completed: u32,
    pub total: u32,
}

/// Minimum bar height so an empty day still renders.
const MIN_BAR_PERCENT: f64 = 5.0;

impl DailyActivity {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        f64::from(self.completed) / f64::from(self.total) * 100.0
    }

    pub fn bar_height(&self) -> f64 {
        self.percent().max(MIN_BAR_PERCENT)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub name: String,
    pub date: NaiveDate,
    pub sets: u32,
    pub reps: u32,
    /// Percent, 0-100.
    pub form_accuracy: u32,
    pub duration_secs: u32,
}

impl SessionRecord {
    /// e.g. `"8m 45s"`.
    pub fn duration_label(&self) -> String {
        format!("{}m {}s", self.duration_secs / 60, self.duration_secs % 60)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub title: String,
    pub description: String,
    pub icon: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub total_sessions: usize,
    pub avg_form_score: u32,
    pub achievements: usize,
    pub streak_days: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientProgress {
    pub patient_name: String,
    pub week: Vec<DailyActivity>,
    pub history: Vec<SessionRecord>,
    pub achievements: Vec<Achievement>,
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

impl PatientProgress {
    pub fn sample(patient_name: &str) -> Self {
        let week = [("Mon", 3), ("Tue", 2), ("Wed", 3), ("Thu", 3), ("Fri", 1), ("Sat", 0), ("Sun", 0)]
            .into_iter()
            .map(|(day, completed)| DailyActivity {
                day: day.to_string(),
                completed,
                total: 3,
            })
            .collect();

        let history = [
            ("Shoulder Flexion", date(2025, 11, 8), 3, 10, 94, 525),
            ("Knee Extension", date(2025, 11, 8), 2, 15, 89, 380),
            ("Wall Push-ups", date(2025, 11, 7), 2, 12, 92, 435),
            ("Shoulder Flexion", date(2025, 11, 7), 3, 10, 91, 550),
            ("Knee Extension", date(2025, 11, 6), 2, 15, 88, 405),
        ]
        .into_iter()
        .map(|(name, date, sets, reps, form_accuracy, duration_secs)| SessionRecord {
            name: name.to_string(),
            date,
            sets,
            reps,
            form_accuracy,
            duration_secs,
        })
        .collect();

        let achievements = [
            ("5 Day Streak", "Completed exercises 5 days in a row", "🔥", date(2025, 11, 8)),
            ("Form Master", "Maintained 90%+ form accuracy", "🎯", date(2025, 11, 7)),
            ("Early Bird", "Completed morning exercises", "🌅", date(2025, 11, 6)),
            ("Consistency King", "30 days of regular practice", "👑", date(2025, 11, 1)),
        ]
        .into_iter()
        .map(|(title, description, icon, date)| Achievement {
            title: title.to_string(),
            description: description.to_string(),
            icon: icon.to_string(),
            date,
        })
        .collect();

        Self {
            patient_name: patient_name.to_string(),
            week,
            history,
            achievements,
        }
    }

    /// Rounded mean form accuracy over recorded sessions; 0 with no history.
    pub fn avg_form_score(&self) -> u32 {
        if self.history.is_empty() {
            return 0;
        }
        let sum: u32 = self.history.iter().map(|s| s.form_accuracy).sum();
        (f64::from(sum) / self.history.len() as f64).round() as u32
    }

    /// Consecutive days with any completed exercise, counted back from the
    /// most recent active day of the week.
    pub fn streak_days(&self) -> usize {
        self.week
            .iter()
            .rev()
            .skip_while(|d| d.completed == 0)
            .take_while(|d| d.completed > 0)
            .count()
    }

    pub fn summary(&self) -> ProgressSummary {
        ProgressSummary {
            total_sessions: self.history.len(),
            avg_form_score: self.avg_form_score(),
            achievements: self.achievements.len(),
            streak_days: self.streak_days(),
        }
    }
}
