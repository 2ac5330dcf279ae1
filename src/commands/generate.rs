use anyhow::Result;
use chrono::Local;
use colored::Colorize;

use crate::api::ApiError;
use crate::cache::WorkoutCache;
use crate::commands::{client, load_config};
use crate::db::{self, Db};
use crate::progress;
use crate::schedule;
use crate::types::FitnessLevel;

pub async fn handle(
    force: bool,
    start_in: i64,
    level: Option<FitnessLevel>,
    pool: &Db,
) -> Result<()> {
    let selection = db::load_selection(pool).await?;
    if selection.is_empty() {
        println!("{} nothing selected, add goals with `stride goals`", "error:".red().bold());
        return Ok(());
    }

    let cfg = load_config()?;
    let level = level.unwrap_or_else(|| cfg.fitness_level());
    let fingerprint = selection.fingerprint(level);

    // Identical inputs would produce an identical request, so hold on to the
    // program already generated for them.
    if !force {
        if let Some((held_fp, held)) = db::load_generated(pool).await? {
            if held_fp == fingerprint {
                println!(
                    "{} selection unchanged, keeping `{}` ({} workouts); use --force to regenerate",
                    "info:".blue().bold(),
                    held.program.name.green(),
                    held.workouts.len()
                );
                return Ok(());
            }
        }
    }

    let quick = selection.quick.is_some();
    let request = selection.build_request(cfg.user_id(), level);

    println!("{} generating `{}`...", "info:".blue().bold(), request.fitness_goal);

    let generated = match client(&cfg).generate(&request).await {
        Ok(g) => g,
        Err(ApiError::Generation(msg)) => {
            println!("{} service could not generate a program: {}", "error:".red().bold(), msg);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    db::save_generated(pool, &fingerprint, &generated).await?;
    WorkoutCache::new(pool)
        .put(&generated.program_id, &generated.workouts)
        .await?;

    // Quick workouts happen today; programs start after the offset.
    let offset = if quick { 0 } else { start_in };
    let today = Local::now().date_naive();
    let entries = schedule::schedule_program(&generated.program, &generated.workouts, offset, today);
    db::replace_program_schedule(pool, &generated.program_id, &entries).await?;

    if db::load_progress(pool, &generated.program_id).await?.is_none() {
        db::save_progress(pool, &progress::fresh_progress(&generated.program)).await?;
    }

    println!(
        "{} `{}` with {} workouts, starting {}",
        "ok:".green().bold(),
        generated.program.name.green().bold(),
        generated.workouts.len(),
        entries
            .first()
            .map(|e| e.date.to_string())
            .unwrap_or_else(|| "never".to_string())
    );

    for entry in entries.iter().take(7) {
        let kind = if entry.workout.is_rest_day {
            "rest".dimmed().to_string()
        } else {
            entry.workout.workout_type.to_string()
        };
        println!(
            "  {}  {:<24} {} ({} min)",
            entry.date,
            entry.workout.name,
            kind,
            entry.workout.estimated_duration
        );
    }
    if entries.len() > 7 {
        println!("  {} {} more...", "...".dimmed(), entries.len() - 7);
    }

    Ok(())
}
