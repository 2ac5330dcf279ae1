use chrono::{DateTime, NaiveDate, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{
    Achievement, CompletedSet, Exercise, Program, ProgramProgress, Workout, WorkoutType,
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service returned {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("generation failed: {0}")]
    Generation(String),

    #[error("unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Thin client for the fitness service. Every response is normalized into
/// the crate's own types here so callers never see wire shapes.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    user_id: String,
}

/// Inputs for one generation call, assembled from the goal selection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub user_id: String,
    pub fitness_goal: String,
    pub program_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub race_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sport: Option<String>,
    pub fitness_level: String,
    pub days_per_week: u32,
    pub duration_weeks: u32,
    pub session_duration_minutes: u32,
    pub equipment: Vec<String>,
    pub target_areas: Vec<String>,
    pub quick: bool,
}

/// A normalized generation result: the program plus its full workout list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedProgram {
    pub program_id: String,
    pub program: Program,
    pub workouts: Vec<Workout>,
}

impl ApiClient {
    pub fn new(base_url: String, token: Option<String>, user_id: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            user_id,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.http.request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(ApiError::Status { status, message })
    }

    /// Generates a program (or a single quick workout) and normalizes
    /// whichever response shape the service chose to answer with.
    pub async fn generate(&self, req: &GenerationRequest) -> Result<GeneratedProgram, ApiError> {
        let path = if req.quick {
            "/api/fitness/quick-workout"
        } else {
            "/api/fitness/programs/create"
        };

        let response = self.request(reqwest::Method::POST, path).json(req).send().await?;
        let result: GenerationResult = Self::check(response).await?.json().await?;
        let generated = result.normalize(req)?;
        if generated.workouts.is_empty() {
            return Err(ApiError::Generation("response carried no workouts".to_string()));
        }
        Ok(generated)
    }

    /// Active programs, newest first.
    pub async fn list_active_programs(&self) -> Result<Vec<Program>, ApiError> {
        let path = format!("/api/fitness/programs?userId={}", self.user_id);
        let response = self.request(reqwest::Method::GET, &path).send().await?;
        let body: ProgramsResponse = Self::check(response).await?.json().await?;

        let mut programs: Vec<Program> = body
            .programs
            .into_iter()
            .map(ProgramWire::into_program)
            .filter(|p| p.status.eq_ignore_ascii_case("active"))
            .collect();

        programs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(programs)
    }

    pub async fn program_workouts(&self, program_id: &str) -> Result<Vec<Workout>, ApiError> {
        let path = format!("/api/fitness/programs/{}/workouts", program_id);
        let response = self.request(reqwest::Method::GET, &path).send().await?;
        let body: WorkoutsResponse = Self::check(response).await?.json().await?;
        Ok(body.workouts.into_iter().map(WorkoutWire::into_workout).collect())
    }

    pub async fn workout_details(
        &self,
        program_id: &str,
        workout_id: &str,
    ) -> Result<Workout, ApiError> {
        let path = format!("/api/fitness/programs/{}/workouts/{}", program_id, workout_id);
        let response = self.request(reqwest::Method::GET, &path).send().await?;
        let body: WorkoutDetailsResponse = Self::check(response).await?.json().await?;
        Ok(body.workout.into_workout())
    }

    /// Reports a completed program workout. The service may answer with
    /// refreshed progress (authoritative when present) and extra
    /// achievements of its own.
    pub async fn complete_workout(
        &self,
        program_id: &str,
        workout_id: &str,
        completion: &CompletionReport,
    ) -> Result<CompletionAck, ApiError> {
        let path = format!(
            "/api/fitness/programs/{}/workouts/{}/complete",
            program_id, workout_id
        );
        let response = self
            .request(reqwest::Method::POST, &path)
            .json(completion)
            .send()
            .await?;
        let body: CompletionResponse = Self::check(response).await?.json().await?;
        Ok(CompletionAck {
            progress: body.progress,
            achievements: body.achievements,
        })
    }

    /// Legacy session-completion endpoint, used for quick workouts that have
    /// no owning program.
    pub async fn complete_session(
        &self,
        workout_id: &str,
        completion: &CompletionReport,
    ) -> Result<(), ApiError> {
        let path = format!("/api/fitness/sessions/{}/complete", workout_id);
        let response = self
            .request(reqwest::Method::POST, &path)
            .json(completion)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    pub async fn delete_program(&self, program_id: &str) -> Result<(), ApiError> {
        let path = format!("/api/fitness/programs/{}", program_id);
        let response = self.request(reqwest::Method::DELETE, &path).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionReport {
    pub user_id: String,
    pub completed_sets: Vec<CompletedSet>,
    pub duration_seconds: u64,
    pub calories: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy_level: Option<u8>,
}

//
// Wire shapes. The generation endpoint answers in one of four layouts, tried
// in order from most to least specific.
//

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GenerationResult {
    Quick {
        workout: QuickWorkoutWire,
    },
    Nested {
        program: NestedProgramWire,
    },
    Flat {
        #[serde(default, alias = "programId", alias = "id")]
        program_id: Option<String>,
        #[serde(default)]
        name: Option<String>,
        workouts: Vec<WorkoutWire>,
    },
    Failure {
        #[serde(default)]
        error: Option<String>,
        #[serde(default)]
        message: Option<String>,
    },
}

impl GenerationResult {
    fn normalize(self, req: &GenerationRequest) -> Result<GeneratedProgram, ApiError> {
        match self {
            Self::Quick { workout } => {
                let workout = workout.into_workout();
                let program_id = format!("quick-{}", workout.workout_id);
                Ok(GeneratedProgram {
                    program: Program {
                        program_id: program_id.clone(),
                        name: workout.name.clone(),
                        description: Some(req.fitness_goal.clone()),
                        total_weeks: 0,
                        days_per_week: 1,
                        status: "ACTIVE".to_string(),
                        created_at: Some(Utc::now()),
                    },
                    workouts: vec![workout],
                    program_id,
                })
            }
            Self::Nested { program } => {
                let program_id = program
                    .program_id
                    .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
                Ok(GeneratedProgram {
                    program: Program {
                        program_id: program_id.clone(),
                        name: program.name.unwrap_or_else(|| "Training Program".to_string()),
                        description: Some(req.fitness_goal.clone()),
                        total_weeks: program.duration_weeks.unwrap_or(req.duration_weeks),
                        days_per_week: program.days_per_week.unwrap_or(req.days_per_week),
                        status: "ACTIVE".to_string(),
                        created_at: Some(Utc::now()),
                    },
                    workouts: program
                        .workouts
                        .into_iter()
                        .map(WorkoutWire::into_workout)
                        .collect(),
                    program_id,
                })
            }
            Self::Flat { program_id, name, workouts } => {
                let program_id = program_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
                Ok(GeneratedProgram {
                    program: Program {
                        program_id: program_id.clone(),
                        name: name.unwrap_or_else(|| "Training Program".to_string()),
                        description: Some(req.fitness_goal.clone()),
                        total_weeks: req.duration_weeks,
                        days_per_week: req.days_per_week,
                        status: "ACTIVE".to_string(),
                        created_at: Some(Utc::now()),
                    },
                    workouts: workouts.into_iter().map(WorkoutWire::into_workout).collect(),
                    program_id,
                })
            }
            Self::Failure { error, message } => Err(ApiError::Generation(
                error
                    .or(message)
                    .unwrap_or_else(|| "no program in response".to_string()),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct NestedProgramWire {
    #[serde(default, alias = "programId", alias = "id")]
    program_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, alias = "durationWeeks", alias = "total_weeks")]
    duration_weeks: Option<u32>,
    #[serde(default, alias = "daysPerWeek")]
    days_per_week: Option<u32>,
    #[serde(default)]
    workouts: Vec<WorkoutWire>,
}

#[derive(Debug, Deserialize)]
struct ProgramsResponse {
    #[serde(default)]
    programs: Vec<ProgramWire>,
}

#[derive(Debug, Deserialize)]
struct ProgramWire {
    #[serde(alias = "programId", alias = "id")]
    program_id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, alias = "durationWeeks", alias = "duration_weeks")]
    total_weeks: u32,
    #[serde(default, alias = "daysPerWeek")]
    days_per_week: u32,
    #[serde(default)]
    status: Option<String>,
    #[serde(default, alias = "createdAt")]
    created_at: Option<DateTime<Utc>>,
}

impl ProgramWire {
    fn into_program(self) -> Program {
        Program {
            program_id: self.program_id,
            name: self.name.unwrap_or_else(|| "Training Program".to_string()),
            description: self.description,
            total_weeks: self.total_weeks,
            days_per_week: self.days_per_week,
            status: self.status.unwrap_or_else(|| "ACTIVE".to_string()),
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WorkoutsResponse {
    #[serde(default)]
    workouts: Vec<WorkoutWire>,
}

#[derive(Debug, Deserialize)]
struct WorkoutDetailsResponse {
    workout: WorkoutWire,
}

/// What the completion endpoint answered with.
#[derive(Debug, Default)]
pub struct CompletionAck {
    pub progress: Option<ProgramProgress>,
    pub achievements: Vec<Achievement>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    progress: Option<ProgramProgress>,
    #[serde(default)]
    achievements: Vec<Achievement>,
}

#[derive(Debug, Deserialize)]
struct WorkoutWire {
    #[serde(default, alias = "workoutId", alias = "id")]
    workout_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    focus: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default, alias = "durationMinutes", alias = "duration_minutes")]
    estimated_duration: Option<u32>,
    #[serde(default)]
    intensity: Option<String>,
    #[serde(default, alias = "isRestDay", alias = "rest_day")]
    is_rest_day: bool,
    #[serde(default)]
    exercises: Vec<ExerciseWire>,
    #[serde(default)]
    intervals: Vec<IntervalWire>,
    #[serde(default, alias = "distanceKm")]
    distance_km: Option<f64>,
    #[serde(default, alias = "paceTarget", alias = "pace")]
    pace_target: Option<String>,
    #[serde(default, alias = "scheduledDate")]
    scheduled_date: Option<NaiveDate>,
}

impl WorkoutWire {
    fn workout_type(&self) -> WorkoutType {
        if self.is_rest_day {
            return WorkoutType::Rest;
        }
        if !self.intervals.is_empty() {
            return WorkoutType::Intervals;
        }
        if self.distance_km.is_some() {
            return WorkoutType::Run;
        }
        match self.kind.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some(k) if k.contains("interval") => WorkoutType::Intervals,
            Some(k) if k.contains("run") || k.contains("cardio") => WorkoutType::Run,
            Some("rest") => WorkoutType::Rest,
            _ => WorkoutType::Strength,
        }
    }

    fn into_workout(self) -> Workout {
        let workout_type = self.workout_type();

        let exercises = if !self.intervals.is_empty() {
            self.intervals.into_iter().map(IntervalWire::into_exercise).collect()
        } else if self.exercises.is_empty() && self.distance_km.is_some() {
            vec![run_exercise(self.distance_km, self.pace_target.as_deref())]
        } else {
            self.exercises.into_iter().map(ExerciseWire::into_exercise).collect()
        };

        Workout {
            workout_id: self
                .workout_id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            name: self.name.unwrap_or_else(|| "Workout".to_string()),
            focus: self.focus,
            workout_type,
            estimated_duration: self.estimated_duration.unwrap_or(45),
            intensity: self.intensity,
            is_rest_day: workout_type == WorkoutType::Rest,
            exercises,
            scheduled_date: self.scheduled_date,
            distance_km: self.distance_km,
            pace_target: self.pace_target,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExerciseWire {
    #[serde(default, alias = "exerciseId", alias = "id")]
    exercise_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, alias = "muscleGroup", alias = "target")]
    muscle_group: Option<String>,
    #[serde(default)]
    sets: Option<u32>,
    #[serde(default)]
    reps: Option<serde_json::Value>,
    #[serde(default, alias = "restSec", alias = "rest_seconds")]
    rest_sec: Option<u32>,
    #[serde(default)]
    equipment: Option<String>,
    #[serde(default)]
    intensity: Option<String>,
    #[serde(default)]
    instructions: Vec<String>,
}

impl ExerciseWire {
    fn into_exercise(self) -> Exercise {
        // Reps arrive as a number or a range string.
        let reps = match self.reps {
            Some(serde_json::Value::Number(n)) => n.to_string(),
            Some(serde_json::Value::String(s)) if !s.is_empty() => s,
            _ => "10-12".to_string(),
        };

        Exercise {
            exercise_id: self
                .exercise_id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            name: self.name.unwrap_or_else(|| "Exercise".to_string()),
            muscle_group: self.muscle_group.unwrap_or_else(|| "Mixed".to_string()),
            sets: self.sets.unwrap_or(3),
            reps,
            rest_sec: self.rest_sec.unwrap_or(60),
            equipment: self.equipment.unwrap_or_else(|| "bodyweight".to_string()),
            intensity: self.intensity.unwrap_or_else(|| "Moderate".to_string()),
            instructions: self.instructions,
        }
    }
}

#[derive(Debug, Deserialize)]
struct IntervalWire {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, alias = "durationMinutes")]
    duration_minutes: Option<u32>,
    #[serde(default, alias = "restMinutes")]
    rest_minutes: Option<u32>,
    #[serde(default)]
    repeat: Option<u32>,
    #[serde(default)]
    intensity: Option<String>,
}

impl IntervalWire {
    fn into_exercise(self) -> Exercise {
        Exercise {
            exercise_id: uuid::Uuid::new_v4().to_string(),
            name: self.name.unwrap_or_else(|| "Interval".to_string()),
            muscle_group: "Cardio".to_string(),
            sets: self.repeat.filter(|r| *r > 0).unwrap_or(1),
            reps: format!("{} min", self.duration_minutes.unwrap_or(1)),
            rest_sec: self.rest_minutes.unwrap_or(0) * 60,
            equipment: "bodyweight".to_string(),
            intensity: self.intensity.unwrap_or_else(|| "High".to_string()),
            instructions: Vec::new(),
        }
    }
}

fn run_exercise(distance_km: Option<f64>, pace_target: Option<&str>) -> Exercise {
    Exercise {
        exercise_id: uuid::Uuid::new_v4().to_string(),
        name: "Steady Run".to_string(),
        muscle_group: "Cardio".to_string(),
        sets: 1,
        reps: format!("{} km", distance_km.unwrap_or(0.0)),
        rest_sec: 0,
        equipment: "none".to_string(),
        intensity: pace_target.unwrap_or("Moderate").to_string(),
        instructions: Vec::new(),
    }
}

/// Quick workouts come back split into warmup, main, and cooldown segments.
/// They are flattened into one exercise list in that order.
#[derive(Debug, Deserialize)]
struct QuickWorkoutWire {
    #[serde(default, alias = "workoutId", alias = "id")]
    workout_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, alias = "durationMinutes", alias = "duration_minutes")]
    estimated_duration: Option<u32>,
    #[serde(default)]
    warmup: Vec<ExerciseWire>,
    #[serde(default, alias = "mainWorkout", alias = "main_workout")]
    main: Vec<ExerciseWire>,
    #[serde(default)]
    cooldown: Vec<ExerciseWire>,
}

impl QuickWorkoutWire {
    fn into_workout(self) -> Workout {
        let exercises = self
            .warmup
            .into_iter()
            .chain(self.main)
            .chain(self.cooldown)
            .map(ExerciseWire::into_exercise)
            .collect();

        Workout {
            workout_id: self
                .workout_id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            name: self.name.unwrap_or_else(|| "Quick Workout".to_string()),
            focus: None,
            workout_type: WorkoutType::Strength,
            estimated_duration: self.estimated_duration.unwrap_or(30),
            intensity: None,
            is_rest_day: false,
            exercises,
            scheduled_date: None,
            distance_km: None,
            pace_target: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> GenerationRequest {
        GenerationRequest {
            user_id: "u1".to_string(),
            fitness_goal: "Combined training program for: Build Muscle".to_string(),
            program_type: "strength".to_string(),
            race_type: None,
            sport: None,
            fitness_level: "intermediate".to_string(),
            days_per_week: 4,
            duration_weeks: 4,
            session_duration_minutes: 45,
            equipment: vec!["bodyweight".to_string()],
            target_areas: vec!["chest".to_string()],
            quick: false,
        }
    }

    #[test]
    fn nested_shape_is_normalized() {
        let raw = json!({
            "program": {
                "programId": "p1",
                "name": "Strength Block",
                "durationWeeks": 4,
                "daysPerWeek": 4,
                "workouts": [
                    { "id": "w1", "name": "Push Day", "exercises": [
                        { "name": "Bench Press", "sets": 4, "reps": "8-10" }
                    ]}
                ]
            }
        });

        let result: GenerationResult = serde_json::from_value(raw).unwrap();
        let generated = result.normalize(&request()).unwrap();
        assert_eq!(generated.program_id, "p1");
        assert_eq!(generated.program.total_weeks, 4);
        assert_eq!(generated.workouts.len(), 1);
        assert_eq!(generated.workouts[0].exercises[0].sets, 4);
    }

    #[test]
    fn flat_shape_falls_back_to_request_fields() {
        let raw = json!({
            "workouts": [ { "name": "Day 1" }, { "name": "Day 2" } ]
        });

        let result: GenerationResult = serde_json::from_value(raw).unwrap();
        let generated = result.normalize(&request()).unwrap();
        assert_eq!(generated.program.days_per_week, 4);
        assert_eq!(generated.workouts.len(), 2);
    }

    #[test]
    fn quick_segments_flatten_in_order() {
        let raw = json!({
            "workout": {
                "id": "q1",
                "name": "Leg Day",
                "warmup": [ { "name": "Jumping Jacks" } ],
                "mainWorkout": [ { "name": "Squats" }, { "name": "Lunges" } ],
                "cooldown": [ { "name": "Quad Stretch" } ]
            }
        });

        let result: GenerationResult = serde_json::from_value(raw).unwrap();
        let generated = result.normalize(&request()).unwrap();
        assert_eq!(generated.program.total_weeks, 0);
        let names: Vec<&str> = generated.workouts[0]
            .exercises
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, ["Jumping Jacks", "Squats", "Lunges", "Quad Stretch"]);
    }

    #[test]
    fn failure_shape_surfaces_service_message() {
        let raw = json!({ "error": "quota exceeded" });
        let result: GenerationResult = serde_json::from_value(raw).unwrap();
        match result.normalize(&request()) {
            Err(ApiError::Generation(msg)) => assert_eq!(msg, "quota exceeded"),
            other => panic!("expected generation error, got {:?}", other.map(|g| g.program_id)),
        }
    }

    #[test]
    fn exercise_defaults_fill_missing_fields() {
        let wire: ExerciseWire = serde_json::from_value(json!({ "name": "Plank" })).unwrap();
        let ex = wire.into_exercise();
        assert_eq!(ex.sets, 3);
        assert_eq!(ex.reps, "10-12");
        assert_eq!(ex.rest_sec, 60);
        assert_eq!(ex.equipment, "bodyweight");
        assert_eq!(ex.muscle_group, "Mixed");
    }

    #[test]
    fn numeric_reps_become_strings() {
        let wire: ExerciseWire =
            serde_json::from_value(json!({ "name": "Deadlift", "reps": 5 })).unwrap();
        assert_eq!(wire.into_exercise().reps, "5");
    }

    #[test]
    fn intervals_become_one_row_each() {
        let raw = json!({
            "id": "w2",
            "name": "Track Intervals",
            "type": "interval_cardio",
            "intervals": [
                { "name": "400m repeats", "durationMinutes": 2, "restMinutes": 1, "repeat": 6, "intensity": "High" },
                { "name": "Cooldown jog", "durationMinutes": 10 }
            ]
        });

        let wire: WorkoutWire = serde_json::from_value(raw).unwrap();
        let workout = wire.into_workout();
        assert_eq!(workout.workout_type, WorkoutType::Intervals);
        assert_eq!(workout.exercises.len(), 2);
        assert_eq!(workout.exercises[0].sets, 6);
        assert_eq!(workout.exercises[0].reps, "2 min");
        assert_eq!(workout.exercises[0].rest_sec, 60);
        assert_eq!(workout.exercises[1].sets, 1);
        assert_eq!(workout.exercises[1].rest_sec, 0);
    }

    #[test]
    fn steady_run_becomes_single_distance_row() {
        let raw = json!({
            "id": "w3",
            "name": "Long Run",
            "distanceKm": 12.0,
            "paceTarget": "5:30/km"
        });

        let wire: WorkoutWire = serde_json::from_value(raw).unwrap();
        let workout = wire.into_workout();
        assert_eq!(workout.workout_type, WorkoutType::Run);
        assert_eq!(workout.exercises.len(), 1);
        assert_eq!(workout.exercises[0].reps, "12 km");
        assert_eq!(workout.exercises[0].intensity, "5:30/km");
    }

    #[tokio::test]
    async fn list_filters_inactive_and_sorts_newest_first() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/fitness/programs?userId=u1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "programs": [
                        { "programId": "old", "name": "Old", "status": "ACTIVE",
                          "createdAt": "2026-01-01T00:00:00Z" },
                        { "programId": "done", "name": "Done", "status": "COMPLETED",
                          "createdAt": "2026-03-01T00:00:00Z" },
                        { "programId": "new", "name": "New", "status": "active",
                          "createdAt": "2026-02-01T00:00:00Z" }
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = ApiClient::new(server.url(), None, "u1".to_string());
        let programs = client.list_active_programs().await.unwrap();

        mock.assert_async().await;
        let ids: Vec<&str> = programs.iter().map(|p| p.program_id.as_str()).collect();
        assert_eq!(ids, ["new", "old"]);
    }

    #[tokio::test]
    async fn http_error_carries_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/api/fitness/programs/p9")
            .with_status(404)
            .with_body("not found")
            .create_async()
            .await;

        let client = ApiClient::new(server.url(), None, "u1".to_string());
        match client.delete_program("p9").await {
            Err(ApiError::Status { status, message }) => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(message, "not found");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn bearer_token_is_attached_when_configured() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/fitness/programs/p1/workouts")
            .match_header("authorization", "Bearer secret")
            .with_status(200)
            .with_body(json!({ "workouts": [] }).to_string())
            .create_async()
            .await;

        let client = ApiClient::new(server.url(), Some("secret".to_string()), "u1".to_string());
        let workouts = client.program_workouts("p1").await.unwrap();

        mock.assert_async().await;
        assert!(workouts.is_empty());
    }
}
