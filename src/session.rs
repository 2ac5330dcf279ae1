use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{CompletedSet, Exercise, ProgramProgress, Workout, WorkoutSummary};
use crate::schedule;
use crate::utils::format_elapsed;

#[derive(Debug, Error)]
pub enum StartError {
    #[error("workout has no exercises to perform")]
    Empty,

    #[error("day {day} is locked, complete the {missing} earlier workout(s) first")]
    Locked { day: u32, missing: u32 },
}

/// Where the session currently sits. Exercise and set indices are 1-based in
/// user-facing output but 0-based here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "lowercase")]
pub enum SessionState {
    Active { exercise: usize, set: u32 },
    Resting { exercise: usize, set: u32, remaining: u32 },
    Completed,
}

/// What a logged set leads to next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutcome {
    Rest { seconds: u32 },
    NextSet,
    NextExercise,
    Completed,
}

/// The whole live session, serialized to the database between invocations.
/// All transitions are pure; the CLI drives `tick` once a second while a rest
/// timer runs and calls `catch_up` after loading a persisted session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMachine {
    pub workout: Workout,
    pub program_id: Option<String>,
    pub quick: bool,
    pub state: SessionState,
    pub completed_sets: Vec<CompletedSet>,
    pub elapsed_secs: u64,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionMachine {
    pub fn start(
        workout: Workout,
        program_id: Option<String>,
        quick: bool,
        progress: Option<&ProgramProgress>,
        day_number: u32,
        now: DateTime<Utc>,
    ) -> Result<Self, StartError> {
        if workout.exercises.is_empty() {
            return Err(StartError::Empty);
        }
        if !schedule::can_start(progress, day_number, quick) {
            let completed = progress.map(|p| p.completed_workouts).unwrap_or(0);
            return Err(StartError::Locked {
                day: day_number,
                missing: day_number.saturating_sub(1).saturating_sub(completed),
            });
        }

        Ok(Self {
            workout,
            program_id,
            quick,
            state: SessionState::Active { exercise: 0, set: 0 },
            completed_sets: Vec::new(),
            elapsed_secs: 0,
            started_at: now,
            updated_at: now,
        })
    }

    pub fn is_completed(&self) -> bool {
        self.state == SessionState::Completed
    }

    pub fn current_exercise(&self) -> Option<&Exercise> {
        let idx = match self.state {
            SessionState::Active { exercise, .. } => exercise,
            SessionState::Resting { exercise, .. } => exercise,
            SessionState::Completed => return None,
        };
        self.workout.exercises.get(idx)
    }

    /// Logs the set being performed. Rest starts when the exercise has more
    /// sets and prescribes a pause; a zero-rest exercise rolls straight into
    /// the next set.
    pub fn log_set(&mut self, reps: u32, weight: f64, now: DateTime<Utc>) -> Option<LogOutcome> {
        let SessionState::Active { exercise, set } = self.state else {
            return None;
        };
        let ex = self.workout.exercises.get(exercise)?;

        self.completed_sets.push(CompletedSet {
            exercise_id: ex.exercise_id.clone(),
            set: set + 1,
            reps,
            weight,
            timestamp: now,
        });
        self.updated_at = now;

        let done = set + 1;
        if done < ex.sets {
            if ex.rest_sec > 0 {
                self.state = SessionState::Resting {
                    exercise,
                    set: done,
                    remaining: ex.rest_sec,
                };
                return Some(LogOutcome::Rest { seconds: ex.rest_sec });
            }
            self.state = SessionState::Active { exercise, set: done };
            return Some(LogOutcome::NextSet);
        }

        Some(self.advance_exercise(exercise))
    }

    fn advance_exercise(&mut self, exercise: usize) -> LogOutcome {
        if exercise + 1 < self.workout.exercises.len() {
            self.state = SessionState::Active { exercise: exercise + 1, set: 0 };
            LogOutcome::NextExercise
        } else {
            self.state = SessionState::Completed;
            LogOutcome::Completed
        }
    }

    /// One second of wall time. The rest timer resumes the set on its own
    /// when it runs out.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if self.is_completed() {
            return;
        }
        self.elapsed_secs += 1;
        self.updated_at = now;

        if let SessionState::Resting { exercise, set, remaining } = self.state {
            if remaining <= 1 {
                self.state = SessionState::Active { exercise, set };
            } else {
                self.state = SessionState::Resting { exercise, set, remaining: remaining - 1 };
            }
        }
    }

    /// Applies the wall time that passed while no process was running the
    /// session. Equivalent to ticking once per elapsed second.
    pub fn catch_up(&mut self, now: DateTime<Utc>) {
        if self.is_completed() {
            return;
        }
        let delta = (now - self.updated_at).num_seconds().max(0) as u64;
        if delta == 0 {
            return;
        }
        self.elapsed_secs += delta;
        self.updated_at = now;

        if let SessionState::Resting { exercise, set, remaining } = self.state {
            let left = remaining.saturating_sub(delta.min(u32::MAX as u64) as u32);
            if left == 0 {
                self.state = SessionState::Active { exercise, set };
            } else {
                self.state = SessionState::Resting { exercise, set, remaining: left };
            }
        }
    }

    pub fn skip_rest(&mut self, now: DateTime<Utc>) -> bool {
        if let SessionState::Resting { exercise, set, .. } = self.state {
            self.state = SessionState::Active { exercise, set };
            self.updated_at = now;
            true
        } else {
            false
        }
    }

    /// Moves past the current exercise without logging its remaining sets.
    pub fn skip_exercise(&mut self, now: DateTime<Utc>) -> Option<LogOutcome> {
        let exercise = match self.state {
            SessionState::Active { exercise, .. } => exercise,
            SessionState::Resting { exercise, .. } => exercise,
            SessionState::Completed => return None,
        };
        self.updated_at = now;
        Some(self.advance_exercise(exercise))
    }

    /// Ends the session early, keeping every set logged so far.
    pub fn finish(&mut self, now: DateTime<Utc>) {
        self.state = SessionState::Completed;
        self.updated_at = now;
    }

    /// True when every prescribed set was logged.
    pub fn fully_completed(&self) -> bool {
        self.completed_sets.len() as u32 >= self.workout.total_sets()
    }

    /// Local summary, independent of any remote call.
    pub fn summary(&self, achievements: Vec<crate::models::Achievement>) -> WorkoutSummary {
        WorkoutSummary {
            duration: format_elapsed(self.elapsed_secs),
            sets_completed: self.completed_sets.len(),
            calories: calories(self.completed_sets.len(), self.elapsed_secs),
            achievements,
        }
    }
}

/// Rough burn estimate: 5 kcal per set plus 4 kcal per elapsed minute.
pub fn calories(sets: usize, elapsed_secs: u64) -> u32 {
    5 * sets as u32 + 4 * (elapsed_secs / 60) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkoutType;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 10, 7, 0, 0).unwrap()
    }

    fn exercise(id: &str, sets: u32, rest: u32) -> Exercise {
        Exercise {
            exercise_id: id.to_string(),
            name: id.to_string(),
            muscle_group: "Mixed".to_string(),
            sets,
            reps: "10".to_string(),
            rest_sec: rest,
            equipment: "bodyweight".to_string(),
            intensity: "Moderate".to_string(),
            instructions: Vec::new(),
        }
    }

    fn workout(exercises: Vec<Exercise>) -> Workout {
        Workout {
            workout_id: "w1".to_string(),
            name: "Push Day".to_string(),
            focus: None,
            workout_type: WorkoutType::Strength,
            estimated_duration: 45,
            intensity: None,
            is_rest_day: false,
            exercises,
            scheduled_date: None,
            distance_km: None,
            pace_target: None,
        }
    }

    fn start(exercises: Vec<Exercise>) -> SessionMachine {
        SessionMachine::start(workout(exercises), None, true, None, 1, t0()).unwrap()
    }

    #[test]
    fn empty_workout_cannot_start() {
        let err = SessionMachine::start(workout(vec![]), None, true, None, 1, t0());
        assert!(matches!(err, Err(StartError::Empty)));
    }

    #[test]
    fn locked_day_cannot_start() {
        let err = SessionMachine::start(workout(vec![exercise("a", 1, 0)]), None, false, None, 3, t0());
        match err {
            Err(StartError::Locked { day: 3, missing: 2 }) => {}
            other => panic!("expected locked, got {:?}", other.map(|m| m.state)),
        }
    }

    #[test]
    fn full_session_walks_every_set() {
        let mut m = start(vec![exercise("a", 2, 60), exercise("b", 1, 0)]);

        assert_eq!(m.log_set(10, 0.0, t0()), Some(LogOutcome::Rest { seconds: 60 }));
        m.skip_rest(t0());
        assert_eq!(m.log_set(10, 0.0, t0()), Some(LogOutcome::NextExercise));
        assert_eq!(m.log_set(8, 0.0, t0()), Some(LogOutcome::Completed));

        assert!(m.is_completed());
        assert!(m.fully_completed());
        assert_eq!(m.completed_sets.len(), 3);
    }

    #[test]
    fn three_by_three_completes_on_the_ninth_set() {
        let mut m = start(vec![
            exercise("a", 3, 0),
            exercise("b", 3, 0),
            exercise("c", 3, 0),
        ]);

        for _ in 0..8 {
            let outcome = m.log_set(10, 0.0, t0()).unwrap();
            assert_ne!(outcome, LogOutcome::Completed);
        }
        assert_eq!(m.log_set(10, 0.0, t0()), Some(LogOutcome::Completed));
        assert!(m.fully_completed());
        assert_eq!(m.completed_sets.len(), 9);
    }

    #[test]
    fn zero_rest_rolls_into_next_set() {
        let mut m = start(vec![exercise("a", 3, 0)]);
        assert_eq!(m.log_set(10, 0.0, t0()), Some(LogOutcome::NextSet));
        assert_eq!(m.state, SessionState::Active { exercise: 0, set: 1 });
    }

    #[test]
    fn rest_timer_counts_down_and_resumes() {
        let mut m = start(vec![exercise("a", 2, 3)]);
        m.log_set(10, 0.0, t0());

        m.tick(t0());
        assert_eq!(m.state, SessionState::Resting { exercise: 0, set: 1, remaining: 2 });
        m.tick(t0());
        m.tick(t0());
        assert_eq!(m.state, SessionState::Active { exercise: 0, set: 1 });
        assert_eq!(m.elapsed_secs, 3);
    }

    #[test]
    fn catch_up_applies_gap_once() {
        let mut m = start(vec![exercise("a", 2, 90)]);
        m.log_set(10, 0.0, t0());

        // The process comes back two minutes later. Rest is over, elapsed
        // time includes the full gap.
        let later = t0() + Duration::seconds(120);
        m.catch_up(later);

        assert_eq!(m.state, SessionState::Active { exercise: 0, set: 1 });
        assert_eq!(m.elapsed_secs, 120);

        // A second catch-up at the same instant is a no-op.
        m.catch_up(later);
        assert_eq!(m.elapsed_secs, 120);
    }

    #[test]
    fn catch_up_keeps_partial_rest() {
        let mut m = start(vec![exercise("a", 2, 90)]);
        m.log_set(10, 0.0, t0());

        m.catch_up(t0() + Duration::seconds(30));
        assert_eq!(m.state, SessionState::Resting { exercise: 0, set: 1, remaining: 60 });
    }

    #[test]
    fn skip_exercise_abandons_remaining_sets() {
        let mut m = start(vec![exercise("a", 3, 60), exercise("b", 1, 0)]);
        m.log_set(10, 0.0, t0());

        assert_eq!(m.skip_exercise(t0()), Some(LogOutcome::NextExercise));
        assert_eq!(m.state, SessionState::Active { exercise: 1, set: 0 });

        assert_eq!(m.skip_exercise(t0()), Some(LogOutcome::Completed));
        assert!(!m.fully_completed());
    }

    #[test]
    fn early_finish_keeps_logged_sets() {
        let mut m = start(vec![exercise("a", 3, 0)]);
        m.log_set(10, 0.0, t0());
        m.finish(t0());

        assert!(m.is_completed());
        assert_eq!(m.completed_sets.len(), 1);
        assert!(m.log_set(10, 0.0, t0()).is_none());
    }

    #[test]
    fn calories_count_sets_and_minutes() {
        assert_eq!(calories(12, 30 * 60), 12 * 5 + 30 * 4);
        assert_eq!(calories(0, 59), 0);
    }

    #[test]
    fn summary_reflects_session() {
        let mut m = start(vec![exercise("a", 2, 0)]);
        m.log_set(10, 0.0, t0());
        m.log_set(10, 0.0, t0());
        m.elapsed_secs = 125;

        let s = m.summary(Vec::new());
        assert_eq!(s.duration, "02:05");
        assert_eq!(s.sets_completed, 2);
        assert_eq!(s.calories, 5 * 2 + 4 * 2);
    }
}
