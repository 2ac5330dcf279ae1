use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Canonical workout shape every API response is normalized into.
/// Interval and steady-run workouts arrive in their own wire formats and are
/// flattened into exercise rows at the API boundary, so nothing past that
/// boundary branches on response shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workout {
    pub workout_id: String,
    pub name: String,
    pub focus: Option<String>,
    pub workout_type: WorkoutType,
    /// Estimated duration in minutes.
    pub estimated_duration: u32,
    pub intensity: Option<String>,
    pub is_rest_day: bool,
    pub exercises: Vec<Exercise>,
    pub scheduled_date: Option<NaiveDate>,
    pub distance_km: Option<f64>,
    pub pace_target: Option<String>,
}

impl Workout {
    /// Sum of prescribed sets across all exercises.
    pub fn total_sets(&self) -> u32 {
        self.exercises.iter().map(|e| e.sets).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutType {
    Strength,
    Intervals,
    Run,
    Rest,
}

impl Display for WorkoutType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Strength => "strength",
            Self::Intervals => "intervals",
            Self::Run => "run",
            Self::Rest => "rest",
        };
        write!(f, "{}", s)
    }
}

/// One prescribed exercise row within a workout.
/// `reps` stays a string because the service prescribes ranges ("10-12").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub exercise_id: String,
    pub name: String,
    pub muscle_group: String,
    pub sets: u32,
    pub reps: String,
    pub rest_sec: u32,
    pub equipment: String,
    pub intensity: String,
    pub instructions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub program_id: String,
    pub name: String,
    pub description: Option<String>,
    /// 0 for single-session quick workouts.
    pub total_weeks: u32,
    pub days_per_week: u32,
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// A (date, workout, program) tuple produced by the calendar scheduler.
/// Multiple entries may share a date only when they come from different
/// programs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledWorkout {
    pub date: NaiveDate,
    pub workout: Workout,
    pub program_id: String,
    pub program_name: String,
}

/// A set logged during the active session. Append-only while the session
/// runs, discarded when it ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedSet {
    pub exercise_id: String,
    pub set: u32,
    pub reps: u32,
    pub weight: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramProgress {
    pub program_id: String,
    pub program_name: String,
    pub current_week: u32,
    pub current_day: u32,
    pub total_weeks: u32,
    pub days_per_week: u32,
    pub completed_workouts: u32,
    pub total_workouts: u32,
    pub completion_percentage: u32,
    pub streak_days: u32,
    pub next_workout_date: Option<NaiveDate>,
    pub is_rest_day: bool,
    #[serde(default)]
    pub progressive_overload: Vec<ProgressiveOverload>,
    pub progression_note: Option<String>,
}

/// Recommended weight increase for one exercise, echoed by the completion
/// endpoint when the service detects headroom.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressiveOverload {
    pub exercise_id: String,
    pub previous_weight: f64,
    pub recommended_weight: f64,
    pub increase_percentage: f64,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub icon: String,
    pub title: String,
    pub description: String,
}

impl Achievement {
    pub fn new(icon: &str, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            icon: icon.to_string(),
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Local completion summary shown when a session reaches `Completed`.
/// Computed before any remote call so it survives remote failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutSummary {
    pub duration: String,
    pub sets_completed: usize,
    pub calories: u32,
    pub achievements: Vec<Achievement>,
}
