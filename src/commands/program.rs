use anyhow::Result;
use colored::Colorize;

use crate::cache::WorkoutCache;
use crate::cli::ProgramCmd;
use crate::commands::{client, load_config};
use crate::db::{self, Db};
use crate::models::Workout;

pub async fn handle(cmd: ProgramCmd, pool: &Db) -> Result<()> {
    let cfg = load_config()?;
    let api = client(&cfg);

    match cmd {
        ProgramCmd::List => {
            let programs = api.list_active_programs().await?;
            if programs.is_empty() {
                println!("{}", "(no active programs)".dimmed());
                return Ok(());
            }

            let held = db::load_generated(pool).await?.map(|(_, g)| g.program_id);

            println!("{}", "Active programs:".cyan().bold());
            for p in programs {
                let marker = if held.as_deref() == Some(p.program_id.as_str()) {
                    " *".green().bold().to_string()
                } else {
                    String::new()
                };
                let created = p
                    .created_at
                    .map(|t| t.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                println!(
                    "  {}  {:<28} {}w x {}d  created {}{}",
                    p.program_id.dimmed(),
                    p.name.green(),
                    p.total_weeks,
                    p.days_per_week,
                    created,
                    marker
                );
            }
        }

        ProgramCmd::Show { program } => {
            let program_id = match program.or(db::load_generated(pool).await?.map(|(_, g)| g.program_id)) {
                Some(id) => id,
                None => {
                    println!("{} no program given and none generated yet", "error:".red().bold());
                    return Ok(());
                }
            };

            let workouts = fetch_workouts(pool, &api, &program_id, false).await?;
            print_workouts(&program_id, &workouts);
        }

        ProgramCmd::Refresh { program } => {
            let workouts = fetch_workouts(pool, &api, &program, true).await?;
            println!(
                "{} refetched {} workouts for `{}`",
                "ok:".green().bold(),
                workouts.len(),
                program
            );
        }

        ProgramCmd::Delete { program } => {
            api.delete_program(&program).await?;

            WorkoutCache::new(pool).invalidate(&program).await?;
            db::remove_program_schedule(pool, &program).await?;
            db::remove_progress(pool, &program).await?;
            if let Some((_, held)) = db::load_generated(pool).await? {
                if held.program_id == program {
                    db::clear_generated(pool).await?;
                }
            }

            println!("{} deleted program `{}`", "ok:".green().bold(), program);
        }
    }

    Ok(())
}

/// Cache-first workout lookup. `bypass` forces a refetch.
pub async fn fetch_workouts(
    pool: &Db,
    api: &crate::api::ApiClient,
    program_id: &str,
    bypass: bool,
) -> Result<Vec<Workout>> {
    let cache = WorkoutCache::new(pool);

    if !bypass {
        if let Some(workouts) = cache.get(program_id).await? {
            return Ok(workouts);
        }
    }

    let workouts = api.program_workouts(program_id).await?;
    cache.put(program_id, &workouts).await?;
    Ok(workouts)
}

fn print_workouts(program_id: &str, workouts: &[Workout]) {
    println!("{} {}", "Program".cyan().bold(), program_id);

    for (i, w) in workouts.iter().enumerate() {
        if w.is_rest_day {
            println!("  {:>2}. {}", i + 1, "rest day".dimmed());
            continue;
        }
        println!(
            "  {:>2}. {} ({}, {} min, {} sets)",
            i + 1,
            w.name.green(),
            w.workout_type,
            w.estimated_duration,
            w.total_sets()
        );
        for ex in &w.exercises {
            println!(
                "        {:<24} {}x{} rest {}s  {}",
                ex.name,
                ex.sets,
                ex.reps,
                ex.rest_sec,
                ex.muscle_group.dimmed()
            );
        }
    }
}
