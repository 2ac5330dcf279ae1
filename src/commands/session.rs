use std::io::Write as _;

use anyhow::Result;
use chrono::{Local, Utc};
use colored::Colorize;

use crate::api::{ApiClient, CompletionAck, CompletionReport};
use crate::cli::SessionCmd;
use crate::commands::{client, load_config};
use crate::db::{self, Db};
use crate::models::{Program, ScheduledWorkout};
use crate::progress;
use crate::session::{LogOutcome, SessionMachine, SessionState, StartError};
use crate::types::Config;
use crate::utils::format_elapsed;

pub async fn handle(cmd: SessionCmd, pool: &Db) -> Result<()> {
    match cmd {
        SessionCmd::Start { workout } => start(workout, pool).await,
        SessionCmd::Log { reps, weight, no_wait } => log(reps, weight, no_wait, pool).await,
        SessionCmd::Show => show(pool).await,
        SessionCmd::SkipRest => skip_rest(pool).await,
        SessionCmd::Skip => skip(pool).await,
        SessionCmd::Finish { notes, energy } => finish(notes, energy, pool).await,
        SessionCmd::Cancel => cancel(pool).await,
    }
}

async fn start(workout: Option<String>, pool: &Db) -> Result<()> {
    if db::load_session(pool).await?.is_some() {
        println!(
            "{} a session is already running, `stride session show` or `cancel` it first",
            "warning:".yellow().bold()
        );
        return Ok(());
    }

    let today = Local::now().date_naive();
    let schedule = db::load_schedule(pool).await?;

    let entry = match resolve_target(&schedule, workout, today) {
        Ok(e) => e,
        Err(msg) => {
            println!("{} {}", "error:".red().bold(), msg);
            return Ok(());
        }
    };

    let day_number = day_number(&schedule, entry);
    let quick = entry.program_id.starts_with("quick-");
    let prog = db::load_progress(pool, &entry.program_id).await?;

    // Schedules built from list endpoints may carry workout summaries
    // without exercise rows; hydrate those on demand.
    let mut workout = entry.workout.clone();
    if workout.exercises.is_empty() && !workout.is_rest_day && !quick {
        let cfg = load_config()?;
        match client(&cfg).workout_details(&entry.program_id, &workout.workout_id).await {
            Ok(detail) if detail.workout_id == workout.workout_id => workout = detail,
            Ok(other) => {
                println!(
                    "{} service answered for workout `{}`, expected `{}`",
                    "warning:".yellow().bold(),
                    other.workout_id,
                    workout.workout_id
                );
            }
            Err(e) => {
                println!("{} could not load exercises: {}", "warning:".yellow().bold(), e);
            }
        }
    }

    let machine = match SessionMachine::start(
        workout,
        Some(entry.program_id.clone()),
        quick,
        prog.as_ref(),
        day_number,
        Utc::now(),
    ) {
        Ok(m) => m,
        Err(err @ StartError::Empty) => {
            println!("{} {}", "error:".red().bold(), err);
            return Ok(());
        }
        Err(err @ StartError::Locked { .. }) => {
            println!("{} {}", "error:".red().bold(), err);
            return Ok(());
        }
    };

    db::save_session(pool, &machine).await?;

    println!(
        "{} started `{}` ({} exercises, ~{} min)",
        "ok:".green().bold(),
        machine.workout.name.green().bold(),
        machine.workout.exercises.len(),
        machine.workout.estimated_duration
    );
    print_current(&machine);
    Ok(())
}

async fn log(reps: u32, weight: Option<f64>, no_wait: bool, pool: &Db) -> Result<()> {
    let Some(mut machine) = load_active(pool).await? else {
        return Ok(());
    };

    if matches!(machine.state, SessionState::Resting { .. }) {
        println!(
            "{} still resting, wait it out or `stride session skip-rest`",
            "warning:".yellow().bold()
        );
        db::save_session(pool, &machine).await?;
        return Ok(());
    }

    let Some(outcome) = machine.log_set(reps, weight.unwrap_or(0.0), Utc::now()) else {
        println!("{} no set to log right now", "warning:".yellow().bold());
        return Ok(());
    };

    db::save_session(pool, &machine).await?;

    match outcome {
        LogOutcome::Rest { seconds } => {
            println!("{} set logged, rest {}s", "ok:".green().bold(), seconds);
            if !no_wait {
                run_rest_countdown(&mut machine, pool).await?;
                print_current(&machine);
            }
        }
        LogOutcome::NextSet => {
            println!("{} set logged", "ok:".green().bold());
            print_current(&machine);
        }
        LogOutcome::NextExercise => {
            println!("{} exercise done", "ok:".green().bold());
            print_current(&machine);
        }
        LogOutcome::Completed => {
            complete(machine, pool, None, None).await?;
        }
    }

    Ok(())
}

/// Ticks the machine once a second until the rest timer runs out, drawing a
/// countdown in place. The session is persisted before and after, so a
/// killed process just resumes via catch-up.
async fn run_rest_countdown(machine: &mut SessionMachine, pool: &Db) -> Result<()> {
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(1));
    interval.tick().await;

    loop {
        interval.tick().await;
        machine.tick(Utc::now());

        match machine.state {
            SessionState::Resting { remaining, .. } => {
                print!("\r{} resting {} ", "info:".blue().bold(), format_elapsed(remaining as u64));
                std::io::stdout().flush()?;
            }
            _ => break,
        }
    }

    println!("\r{} rest over          ", "ok:".green().bold());
    db::save_session(pool, machine).await?;
    Ok(())
}

async fn show(pool: &Db) -> Result<()> {
    let Some(machine) = load_active(pool).await? else {
        return Ok(());
    };
    db::save_session(pool, &machine).await?;

    println!(
        "{} `{}`  elapsed {}  sets {}/{}",
        "Session:".cyan().bold(),
        machine.workout.name.green(),
        format_elapsed(machine.elapsed_secs),
        machine.completed_sets.len(),
        machine.workout.total_sets()
    );
    match machine.state {
        SessionState::Resting { remaining, .. } => {
            println!("  resting, {} left", format_elapsed(remaining as u64));
        }
        SessionState::Active { .. } => {}
        SessionState::Completed => {}
    }
    print_current(&machine);
    Ok(())
}

async fn skip_rest(pool: &Db) -> Result<()> {
    let Some(mut machine) = load_active(pool).await? else {
        return Ok(());
    };

    if machine.skip_rest(Utc::now()) {
        db::save_session(pool, &machine).await?;
        println!("{} rest skipped", "ok:".green().bold());
        print_current(&machine);
    } else {
        println!("{} not resting", "warning:".yellow().bold());
    }
    Ok(())
}

async fn skip(pool: &Db) -> Result<()> {
    let Some(mut machine) = load_active(pool).await? else {
        return Ok(());
    };

    match machine.skip_exercise(Utc::now()) {
        Some(LogOutcome::Completed) => complete(machine, pool, None, None).await?,
        Some(_) => {
            db::save_session(pool, &machine).await?;
            println!("{} exercise skipped", "ok:".green().bold());
            print_current(&machine);
        }
        None => println!("{} nothing to skip", "warning:".yellow().bold()),
    }
    Ok(())
}

async fn finish(notes: Option<String>, energy: Option<u8>, pool: &Db) -> Result<()> {
    let Some(mut machine) = load_active(pool).await? else {
        return Ok(());
    };

    machine.finish(Utc::now());
    complete(machine, pool, notes, energy).await
}

async fn cancel(pool: &Db) -> Result<()> {
    if db::load_session(pool).await?.is_none() {
        println!("{} no active session", "warning:".yellow().bold());
        return Ok(());
    }
    db::clear_session(pool).await?;
    println!("{} session abandoned, nothing recorded", "ok:".green().bold());
    Ok(())
}

/// Wraps up a completed session: local summary first, then the best-effort
/// remote report, then the local completion record and progress update.
async fn complete(
    machine: SessionMachine,
    pool: &Db,
    notes: Option<String>,
    energy: Option<u8>,
) -> Result<()> {
    // A broken config only costs the remote report, never the local wrap-up.
    let cfg = match load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            println!(
                "{} config unreadable, completing locally: {}",
                "warning:".yellow().bold(),
                e
            );
            Config::default()
        }
    };
    let api = client(&cfg);
    let today = Local::now().date_naive();

    let prior = match machine.program_id.as_deref() {
        Some(pid) => db::load_progress(pool, pid).await?,
        None => None,
    };
    let prior_streak = prior.as_ref().map(|p| p.streak_days).unwrap_or(0);
    let overall = db::completion_count(pool).await?;

    let achievements = progress::compute_achievements(
        prior_completed(machine.quick, prior.as_ref(), overall),
        machine.fully_completed(),
        prior_streak,
        machine.elapsed_secs,
    );
    let mut summary = machine.summary(achievements);

    let ack = report_remote(&api, &cfg.user_id(), &machine, &summary, notes, energy).await;
    // Service-side badges come on top of the local ones, duplicates and all.
    summary.achievements.extend(ack.achievements.clone());

    db::record_completion(
        pool,
        machine.program_id.as_deref(),
        &machine.workout.workout_id,
        today,
        machine.completed_sets.len() as u32,
        machine.elapsed_secs,
    )
    .await?;

    if let Some(pid) = machine.program_id.as_deref() {
        let meta = program_meta(pool, pid, prior.as_ref()).await?;
        let updated = progress::apply_completion(prior.as_ref(), ack.progress, &meta);
        db::save_progress(pool, &updated).await?;
    }

    db::clear_session(pool).await?;

    println!("{} workout complete", "ok:".green().bold());
    println!("  duration: {}", summary.duration);
    println!("  sets:     {}", summary.sets_completed);
    println!("  calories: ~{}", summary.calories);
    for a in &summary.achievements {
        println!("  {} {} - {}", a.icon, a.title.green().bold(), a.description);
    }

    Ok(())
}

/// Sends the completion upstream. Failures degrade to a warning; the local
/// record is kept either way.
async fn report_remote(
    api: &ApiClient,
    user_id: &str,
    machine: &SessionMachine,
    summary: &crate::models::WorkoutSummary,
    notes: Option<String>,
    energy: Option<u8>,
) -> CompletionAck {
    let report = CompletionReport {
        user_id: user_id.to_string(),
        completed_sets: machine.completed_sets.clone(),
        duration_seconds: machine.elapsed_secs,
        calories: summary.calories,
        notes,
        energy_level: energy,
    };

    if machine.quick {
        if let Err(e) = api.complete_session(&machine.workout.workout_id, &report).await {
            println!("{} could not report session: {}", "warning:".yellow().bold(), e);
        }
        return CompletionAck::default();
    }

    let Some(pid) = machine.program_id.as_deref() else {
        return CompletionAck::default();
    };
    match api.complete_workout(pid, &machine.workout.workout_id, &report).await {
        Ok(ack) => ack,
        Err(e) => {
            println!("{} could not report workout: {}", "warning:".yellow().bold(), e);
            CompletionAck::default()
        }
    }
}

/// Completed count before this session. Badges for program workouts key off
/// that program's own progress; quick sessions have none, so the overall
/// history stands in.
fn prior_completed(
    quick: bool,
    prior: Option<&crate::models::ProgramProgress>,
    overall: u32,
) -> u32 {
    if quick {
        overall
    } else {
        prior.map(|p| p.completed_workouts).unwrap_or(0)
    }
}

/// Program metadata for recomputing progress locally. Progress rows are
/// seeded at generate/sync time, so the fallback only fires for programs
/// trained before ever syncing.
async fn program_meta(
    pool: &Db,
    program_id: &str,
    prior: Option<&crate::models::ProgramProgress>,
) -> Result<Program> {
    if let Some((_, held)) = db::load_generated(pool).await? {
        if held.program_id == program_id {
            return Ok(held.program);
        }
    }

    Ok(Program {
        program_id: program_id.to_string(),
        name: prior
            .map(|p| p.program_name.clone())
            .unwrap_or_else(|| "Program".to_string()),
        description: None,
        total_weeks: prior.map(|p| p.total_weeks).unwrap_or(4),
        days_per_week: prior.map(|p| p.days_per_week).unwrap_or(4),
        status: "ACTIVE".to_string(),
        created_at: None,
    })
}

/// Loads the persisted session and applies the wall time that passed since
/// the last command touched it.
async fn load_active(pool: &Db) -> Result<Option<SessionMachine>> {
    match db::load_session(pool).await? {
        Some(mut machine) => {
            machine.catch_up(Utc::now());
            Ok(Some(machine))
        }
        None => {
            println!(
                "{} no active session, `stride session start` to begin",
                "warning:".yellow().bold()
            );
            Ok(None)
        }
    }
}

fn resolve_target<'a>(
    schedule: &'a [ScheduledWorkout],
    workout: Option<String>,
    today: chrono::NaiveDate,
) -> std::result::Result<&'a ScheduledWorkout, String> {
    if let Some(id) = workout {
        return schedule
            .iter()
            .find(|e| e.workout.workout_id == id)
            .ok_or_else(|| format!("no scheduled workout with id `{}`, try `stride sync`", id));
    }

    if schedule.is_empty() {
        return Err("nothing scheduled, generate a program or run `stride sync`".to_string());
    }

    if let Some(entry) = crate::schedule::workouts_for_date(schedule, today).into_iter().next() {
        return Ok(entry);
    }

    let next = schedule
        .iter()
        .find(|e| e.date > today && !e.workout.is_rest_day)
        .map(|e| format!("{} ({})", e.date, e.workout.name))
        .unwrap_or_else(|| "nothing upcoming".to_string());
    Err(format!("nothing scheduled today; next workout: {}", next))
}

/// 1-based position of the entry among its program's workout days. Rest
/// days do not count toward the gate.
fn day_number(schedule: &[ScheduledWorkout], entry: &ScheduledWorkout) -> u32 {
    schedule
        .iter()
        .filter(|e| {
            e.program_id == entry.program_id && e.date <= entry.date && !e.workout.is_rest_day
        })
        .count() as u32
}

fn print_current(machine: &SessionMachine) {
    let Some(ex) = machine.current_exercise() else {
        return;
    };

    let set = match machine.state {
        SessionState::Active { set, .. } => set + 1,
        SessionState::Resting { set, .. } => set + 1,
        SessionState::Completed => return,
    };

    println!(
        "{} {} ({}), set {}/{}, {} reps, rest {}s",
        "next:".cyan().bold(),
        ex.name.green(),
        ex.muscle_group.dimmed(),
        set,
        ex.sets,
        ex.reps,
        ex.rest_sec
    );
    for line in &ex.instructions {
        println!("  {}", line.dimmed());
    }
}
