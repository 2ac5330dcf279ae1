use anyhow::Result;
use chrono::Local;
use colored::Colorize;
use futures::future::join_all;

use crate::cache::WorkoutCache;
use crate::commands::{client, load_config};
use crate::db::{self, Db};
use crate::models::{Program, Workout};
use crate::progress;
use crate::schedule;

/// Refetches workouts for every active program and rebuilds the calendar.
/// Programs whose fetch fails are reported and skipped; the rest still sync.
pub async fn handle(pool: &Db) -> Result<()> {
    let cfg = load_config()?;
    let api = client(&cfg);

    let programs = api.list_active_programs().await?;
    if programs.is_empty() {
        println!("{}", "(no active programs to sync)".dimmed());
        return Ok(());
    }

    let cache = WorkoutCache::new(pool);

    // One fetch per program, all in flight at once.
    let fetches = programs.iter().map(|p| {
        let api = &api;
        let cache = &cache;
        async move {
            if let Some(workouts) = cache.get(&p.program_id).await? {
                return Ok::<(bool, Vec<Workout>), anyhow::Error>((true, workouts));
            }
            let workouts = api.program_workouts(&p.program_id).await?;
            cache.put(&p.program_id, &workouts).await?;
            Ok((false, workouts))
        }
    });

    let results = join_all(fetches).await;

    let today = Local::now().date_naive();
    let mut hits = 0usize;
    let mut misses = 0usize;
    let mut synced = 0usize;

    for (program, result) in programs.iter().zip(results) {
        let (from_cache, workouts) = match result {
            Ok(r) => r,
            Err(e) => {
                println!(
                    "{} skipping `{}`: {}",
                    "warning:".yellow().bold(),
                    program.name,
                    e
                );
                continue;
            }
        };
        if from_cache {
            hits += 1;
        } else {
            misses += 1;
        }

        sync_program(pool, program, &workouts, today).await?;
        synced += 1;
    }

    println!(
        "{} synced {} of {} programs ({} cached, {} fetched)",
        "ok:".green().bold(),
        synced,
        programs.len(),
        hits,
        misses
    );

    Ok(())
}

/// Rebuilds one program's schedule so that today lines up with its next
/// undone workout, and seeds progress for programs never trained against.
async fn sync_program(
    pool: &Db,
    program: &Program,
    workouts: &[Workout],
    today: chrono::NaiveDate,
) -> Result<()> {
    let existing = db::load_progress(pool, &program.program_id).await?;
    let completed = existing.as_ref().map(|p| p.completed_workouts).unwrap_or(0);

    if existing.is_none() {
        db::save_progress(pool, &progress::fresh_progress(program)).await?;
    }

    let offset = -(completed.min(workouts.len() as u32) as i64);
    let entries = schedule::schedule_program(program, workouts, offset, today);
    db::replace_program_schedule(pool, &program.program_id, &entries).await?;

    Ok(())
}
