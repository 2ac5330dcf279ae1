use anyhow::Result;
use chrono::Local;
use colored::Colorize;

use crate::db::{self, Db};

pub async fn handle(pool: &Db) -> Result<()> {
    let all = db::all_progress(pool).await?;
    if all.is_empty() {
        println!("{}", "(no programs yet, run `stride generate`)".dimmed());
        return Ok(());
    }

    let today = Local::now().date_naive();
    let schedule = db::load_schedule(pool).await?;

    println!("{}", "Programs:".cyan().bold());
    for p in all {
        let bar = bar(p.completion_percentage);
        println!(
            "  {:<28} week {}/{}  day {}  {} [{}] {}%",
            p.program_name.green().bold(),
            p.current_week,
            p.total_weeks.max(1),
            p.current_day,
            format!("{}/{}", p.completed_workouts, p.total_workouts).dimmed(),
            bar,
            p.completion_percentage
        );

        if p.streak_days > 0 {
            println!("    streak: {} day(s)", p.streak_days.to_string().yellow().bold());
        }

        let next = schedule
            .iter()
            .find(|e| e.program_id == p.program_id && e.date >= today && !e.workout.is_rest_day);
        match next {
            Some(e) if e.date == today => {
                println!("    today: {} ({} min)", e.workout.name, e.workout.estimated_duration)
            }
            Some(e) => println!("    next:  {} on {}", e.workout.name, e.date),
            None => println!("    {}", "no upcoming workouts, run `stride sync`".dimmed()),
        }

        for o in &p.progressive_overload {
            println!(
                "    overload: {} {} -> {} kg (+{:.1}%)",
                o.exercise_id,
                o.previous_weight,
                o.recommended_weight.to_string().green(),
                o.increase_percentage
            );
        }
        if let Some(note) = &p.progression_note {
            println!("    note: {}", note.dimmed());
        }
    }

    Ok(())
}

fn bar(pct: u32) -> String {
    let filled = (pct.min(100) / 10) as usize;
    format!("{}{}", "#".repeat(filled).green(), "-".repeat(10 - filled).dimmed())
}
