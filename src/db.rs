use std::collections::HashSet;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

use crate::api::GeneratedProgram;
use crate::goals::GoalSelection;
use crate::models::{ProgramProgress, ScheduledWorkout};
use crate::schedule;
use crate::session::SessionMachine;

pub type Db = SqlitePool;

pub async fn open(path: &str) -> Result<Db> {
    let opts = SqliteConnectOptions::from_str(path)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(opts)
        .await?;

    init(&pool).await?;
    Ok(pool)
}

/// Creates the local state tables. Everything that must survive between CLI
/// invocations lives here; the remote service stays the source of truth for
/// programs themselves.
pub async fn init(pool: &Db) -> Result<()> {
    sqlx::raw_sql(
        r#"
        CREATE TABLE IF NOT EXISTS goal_selection (
            id    INTEGER PRIMARY KEY CHECK (id = 1),
            state TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS generated_program (
            id          INTEGER PRIMARY KEY CHECK (id = 1),
            fingerprint TEXT NOT NULL,
            payload     TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS program_workout_cache (
            program_id TEXT PRIMARY KEY,
            workouts   TEXT NOT NULL,
            timestamp  INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS scheduled_workouts (
            id           TEXT PRIMARY KEY,
            program_id   TEXT NOT NULL,
            program_name TEXT NOT NULL,
            date         TEXT NOT NULL,
            workout      TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS active_session (
            id      INTEGER PRIMARY KEY CHECK (id = 1),
            machine TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS workout_completions (
            id               TEXT PRIMARY KEY,
            program_id       TEXT,
            workout_id       TEXT NOT NULL,
            completed_on     TEXT NOT NULL,
            sets_completed   INTEGER NOT NULL,
            duration_seconds INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS program_progress (
            program_id TEXT PRIMARY KEY,
            progress   TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

//
// Goal selection
//

pub async fn load_selection(pool: &Db) -> Result<GoalSelection> {
    let row: Option<String> = sqlx::query_scalar("SELECT state FROM goal_selection WHERE id = 1")
        .fetch_optional(pool)
        .await?;

    match row {
        Some(raw) => serde_json::from_str(&raw).context("corrupt goal selection state"),
        None => Ok(GoalSelection::default()),
    }
}

pub async fn save_selection(pool: &Db, selection: &GoalSelection) -> Result<()> {
    let raw = serde_json::to_string(selection)?;
    sqlx::query("INSERT OR REPLACE INTO goal_selection (id, state) VALUES (1, ?)")
        .bind(raw)
        .execute(pool)
        .await?;
    Ok(())
}

//
// Generated program + fingerprint of the inputs that produced it
//

pub async fn load_generated(pool: &Db) -> Result<Option<(String, GeneratedProgram)>> {
    let row: Option<(String, String)> =
        sqlx::query_as("SELECT fingerprint, payload FROM generated_program WHERE id = 1")
            .fetch_optional(pool)
            .await?;

    match row {
        Some((fp, raw)) => {
            let program = serde_json::from_str(&raw).context("corrupt generated program")?;
            Ok(Some((fp, program)))
        }
        None => Ok(None),
    }
}

pub async fn save_generated(pool: &Db, fingerprint: &str, program: &GeneratedProgram) -> Result<()> {
    let raw = serde_json::to_string(program)?;
    sqlx::query("INSERT OR REPLACE INTO generated_program (id, fingerprint, payload) VALUES (1, ?, ?)")
        .bind(fingerprint)
        .bind(raw)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn clear_generated(pool: &Db) -> Result<()> {
    sqlx::query("DELETE FROM generated_program").execute(pool).await?;
    Ok(())
}

//
// Scheduled workouts (the merged calendar view)
//

pub async fn replace_program_schedule(
    pool: &Db,
    program_id: &str,
    entries: &[ScheduledWorkout],
) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM scheduled_workouts WHERE program_id = ?")
        .bind(program_id)
        .execute(&mut *tx)
        .await?;

    for entry in entries {
        sqlx::query(
            "INSERT INTO scheduled_workouts (id, program_id, program_name, date, workout)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(&entry.program_id)
        .bind(&entry.program_name)
        .bind(entry.date.to_string())
        .bind(serde_json::to_string(&entry.workout)?)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// The merged calendar: per-program schedules combined into one date-ordered
/// list, same-day entries keeping program order.
pub async fn load_schedule(pool: &Db) -> Result<Vec<ScheduledWorkout>> {
    let rows: Vec<(String, String, String, String)> = sqlx::query_as(
        "SELECT program_id, program_name, date, workout FROM scheduled_workouts
         ORDER BY program_id, date",
    )
    .fetch_all(pool)
    .await?;

    let mut per_program: Vec<Vec<ScheduledWorkout>> = Vec::new();
    for (program_id, program_name, date, workout) in rows {
        let entry = ScheduledWorkout {
            program_id,
            program_name,
            date: NaiveDate::from_str(&date).context("corrupt scheduled date")?,
            workout: serde_json::from_str(&workout).context("corrupt scheduled workout")?,
        };
        match per_program.last_mut() {
            Some(group) if group[0].program_id == entry.program_id => group.push(entry),
            _ => per_program.push(vec![entry]),
        }
    }
    Ok(schedule::merge_schedules(per_program))
}

pub async fn remove_program_schedule(pool: &Db, program_id: &str) -> Result<()> {
    sqlx::query("DELETE FROM scheduled_workouts WHERE program_id = ?")
        .bind(program_id)
        .execute(pool)
        .await?;
    Ok(())
}

//
// Active session
//

pub async fn load_session(pool: &Db) -> Result<Option<SessionMachine>> {
    let row: Option<String> = sqlx::query_scalar("SELECT machine FROM active_session WHERE id = 1")
        .fetch_optional(pool)
        .await?;

    match row {
        Some(raw) => Ok(Some(serde_json::from_str(&raw).context("corrupt active session")?)),
        None => Ok(None),
    }
}

pub async fn save_session(pool: &Db, machine: &SessionMachine) -> Result<()> {
    let raw = serde_json::to_string(machine)?;
    sqlx::query("INSERT OR REPLACE INTO active_session (id, machine) VALUES (1, ?)")
        .bind(raw)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn clear_session(pool: &Db) -> Result<()> {
    sqlx::query("DELETE FROM active_session").execute(pool).await?;
    Ok(())
}

//
// Completion history (feeds the calendar completed/skipped classification)
//

pub async fn record_completion(
    pool: &Db,
    program_id: Option<&str>,
    workout_id: &str,
    completed_on: NaiveDate,
    sets_completed: u32,
    duration_seconds: u64,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO workout_completions
             (id, program_id, workout_id, completed_on, sets_completed, duration_seconds)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(program_id)
    .bind(workout_id)
    .bind(completed_on.to_string())
    .bind(sets_completed as i64)
    .bind(duration_seconds as i64)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn completion_count(pool: &Db) -> Result<u32> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workout_completions")
        .fetch_one(pool)
        .await?;
    Ok(count as u32)
}

pub async fn completed_dates(pool: &Db) -> Result<HashSet<NaiveDate>> {
    let rows: Vec<String> =
        sqlx::query_scalar("SELECT DISTINCT completed_on FROM workout_completions")
            .fetch_all(pool)
            .await?;

    rows.into_iter()
        .map(|d| NaiveDate::from_str(&d).context("corrupt completion date"))
        .collect()
}

//
// Program progress
//

pub async fn load_progress(pool: &Db, program_id: &str) -> Result<Option<ProgramProgress>> {
    let row: Option<String> =
        sqlx::query_scalar("SELECT progress FROM program_progress WHERE program_id = ?")
            .bind(program_id)
            .fetch_optional(pool)
            .await?;

    match row {
        Some(raw) => Ok(Some(serde_json::from_str(&raw).context("corrupt program progress")?)),
        None => Ok(None),
    }
}

pub async fn save_progress(pool: &Db, progress: &ProgramProgress) -> Result<()> {
    let raw = serde_json::to_string(progress)?;
    sqlx::query("INSERT OR REPLACE INTO program_progress (program_id, progress) VALUES (?, ?)")
        .bind(&progress.program_id)
        .bind(raw)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn all_progress(pool: &Db) -> Result<Vec<ProgramProgress>> {
    let rows: Vec<String> = sqlx::query_scalar("SELECT progress FROM program_progress")
        .fetch_all(pool)
        .await?;

    rows.into_iter()
        .map(|raw| serde_json::from_str(&raw).context("corrupt program progress"))
        .collect()
}

pub async fn remove_progress(pool: &Db, program_id: &str) -> Result<()> {
    sqlx::query("DELETE FROM program_progress WHERE program_id = ?")
        .bind(program_id)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Workout, WorkoutType};

    fn entry(program_id: &str, workout_id: &str, date: NaiveDate) -> ScheduledWorkout {
        ScheduledWorkout {
            date,
            program_id: program_id.to_string(),
            program_name: format!("Program {}", program_id),
            workout: Workout {
                workout_id: workout_id.to_string(),
                name: workout_id.to_string(),
                focus: None,
                workout_type: WorkoutType::Strength,
                estimated_duration: 45,
                intensity: None,
                is_rest_day: false,
                exercises: Vec::new(),
                scheduled_date: None,
                distance_km: None,
                pace_target: None,
            },
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, d).unwrap()
    }

    #[tokio::test]
    async fn load_schedule_merges_programs_by_date() {
        let pool = open("sqlite::memory:").await.unwrap();

        replace_program_schedule(
            &pool,
            "b",
            &[entry("b", "b1", day(11)), entry("b", "b2", day(12))],
        )
        .await
        .unwrap();
        replace_program_schedule(&pool, "a", &[entry("a", "a1", day(12))])
            .await
            .unwrap();

        let merged = load_schedule(&pool).await.unwrap();

        let order: Vec<(&str, NaiveDate)> = merged
            .iter()
            .map(|e| (e.program_id.as_str(), e.date))
            .collect();
        assert_eq!(order, [("b", day(11)), ("a", day(12)), ("b", day(12))]);
    }
}
