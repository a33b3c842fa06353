//! Patient exercise screen: prescription details and the set/rep counter.

use serde::Serialize;

/// Detail key used when a requested exercise is unknown.
pub const FALLBACK_DETAIL: &str = "shoulder";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseDetail {
    pub key: &'static str,
    pub title: &'static str,
    pub category: &'static str,
    pub sets: u32,
    pub reps: u32,
    pub instructions: &'static str,
}

pub const EXERCISE_DETAILS: &[ExerciseDetail] = &[
    ExerciseDetail {
        key: "shoulder",
        title: "Shoulder Flexion",
        category: "Shoulder",
        sets: 3,
        reps: 10,
        instructions: "Stand upright with feet shoulder-width apart. Slowly raise your arm forward to \
shoulder height, keeping your elbow straight. Hold for 2 seconds, then lower slowly. Keep your core \
engaged throughout.",
    },
    ExerciseDetail {
        key: "knee",
        title: "Knee Extension",
        category: "Knee",
        sets: 2,
        reps: 15,
        instructions: "Sit in a chair with your back straight. Slowly extend your knee to a straight \
position. Hold for 3 seconds at the top, then lower your foot back down slowly. Keep your thigh on \
the chair.",
    },
    ExerciseDetail {
        key: "wall",
        title: "Wall Push-ups",
        category: "Upper Body",
        sets: 2,
        reps: 12,
        instructions: "Stand arm's length from a wall. Place your hands flat on the wall at shoulder \
height. Bend your elbows to bring your chest toward the wall, then push back to start. Keep your \
body straight.",
    },
];

impl ExerciseDetail {
    /// Look up a detail by key, falling back to the shoulder exercise.
    pub fn lookup(key: &str) -> &'static ExerciseDetail {
        EXERCISE_DETAILS
            .iter()
            .find(|d| d.key == key)
            .or_else(|| EXERCISE_DETAILS.iter().find(|d| d.key == FALLBACK_DETAIL))
            .unwrap_or(&EXERCISE_DETAILS[0])
    }

    /// e.g. `"3 sets × 10 reps"`.
    pub fn prescription(&self) -> String {
        format!("{} sets × {} reps", self.sets, self.reps)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RepEvent {
    /// Counting is paused or the exercise is already finished.
    Ignored,
    Rep,
    /// The rep closed out a set and the counter moved to the next one.
    SetComplete,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseSession {
    detail: &'static ExerciseDetail,
    started: bool,
    current_set: u32,
    current_rep: u32,
}

impl ExerciseSession {
    pub fn new(detail: &'static ExerciseDetail) -> Self {
        Self {
            detail,
            started: false,
            current_set: 1,
            current_rep: 0,
        }
    }

    pub fn for_key(key: &str) -> Self {
        Self::new(ExerciseDetail::lookup(key))
    }

    pub fn detail(&self) -> &'static ExerciseDetail {
        self.detail
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn current_set(&self) -> u32 {
        self.current_set
    }

    pub fn current_rep(&self) -> u32 {
        self.current_rep
    }

    pub fn toggle_started(&mut self) -> bool {
        self.started = !self.started;
        self.started
    }

    pub fn reset(&mut self) {
        self.started = false;
        self.current_set = 1;
        self.current_rep = 0;
    }

    pub fn reps_done(&self) -> u32 {
        (self.current_set - 1) * self.detail.reps + self.current_rep
    }

    pub fn reps_goal(&self) -> u32 {
        self.detail.sets * self.detail.reps
    }

    pub fn is_finished(&self) -> bool {
        self.reps_done() >= self.reps_goal()
    }

    /// Whole-number percentage of the goal, capped at 100.
    pub fn progress_percent(&self) -> u32 {
        let goal = self.reps_goal();
        if goal == 0 {
            return 0;
        }
        let pct = (f64::from(self.reps_done()) / f64::from(goal) * 100.0).round() as u32;
        pct.min(100)
    }

    /// Count one repetition while the session is running.
    pub fn record_rep(&mut self) -> RepEvent {
        if !self.started || self.is_finished() {
            return RepEvent::Ignored;
        }
        self.current_rep += 1;
        if self.current_rep < self.detail.reps {
            return RepEvent::Rep;
        }
        if self.current_set < self.detail.sets {
            self.current_set += 1;
            self.current_rep = 0;
            RepEvent::SetComplete
        } else {
            self.started = false;
            RepEvent::Finished
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_falls_back_to_shoulder() {
        assert_eq!(ExerciseDetail::lookup("knee").title, "Knee Extension");
        assert_eq!(ExerciseDetail::lookup("elbow").key, "shoulder");
        assert_eq!(ExerciseDetail::lookup("wall").prescription(), "2 sets × 12 reps");
    }

    #[test]
    fn test_reps_ignored_until_started() {
        let mut s = ExerciseSession::for_key("knee");
        assert_eq!(s.record_rep(), RepEvent::Ignored);
        assert_eq!(s.progress_percent(), 0);
        assert!(s.toggle_started());
        assert_eq!(s.record_rep(), RepEvent::Rep);
        assert_eq!(s.current_rep(), 1);
    }

    #[test]
    fn test_full_session_progress() {
        let mut s = ExerciseSession::for_key("shoulder");
        s.toggle_started();
        for _ in 0..9 {
            assert_eq!(s.record_rep(), RepEvent::Rep);
        }
        assert_eq!(s.record_rep(), RepEvent::SetComplete);
        assert_eq!((s.current_set(), s.current_rep()), (2, 0));
        assert_eq!(s.progress_percent(), 33);

        for _ in 0..19 {
            s.record_rep();
        }
        assert_eq!(s.record_rep(), RepEvent::Finished);
        assert!(s.is_finished());
        assert!(!s.is_started());
        assert_eq!(s.progress_percent(), 100);
        s.toggle_started();
        assert_eq!(s.record_rep(), RepEvent::Ignored);
    }

    #[test]
    fn test_reset_restores_initial_counters() {
        let mut s = ExerciseSession::for_key("wall");
        s.toggle_started();
        s.record_rep();
        s.reset();
        assert_eq!(s, ExerciseSession::for_key("wall"));
    }

    #[test]
    fn test_progress_rounds() {
        let mut s = ExerciseSession::for_key("knee");
        s.toggle_started();
        s.record_rep();
        // 1 of 30
        assert_eq!(s.progress_percent(), 3);
    }
}
