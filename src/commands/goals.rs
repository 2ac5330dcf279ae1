use anyhow::Result;
use colored::Colorize;

use crate::cli::GoalsCmd;
use crate::db::{self, Db};
use crate::goals::Toggle;
use crate::types::{self, BODY_AREAS, BODY_GOALS, PERFORMANCE_GOALS, QUICK_GOALS};

pub async fn handle(cmd: GoalsCmd, pool: &Db) -> Result<()> {
    let mut selection = db::load_selection(pool).await?;

    match cmd {
        GoalsCmd::List => {
            println!("{}", "Performance goals:".cyan().bold());
            for g in PERFORMANCE_GOALS {
                let mark = if selection.performance_goals.iter().any(|s| s == g.id) {
                    "x".green().bold().to_string()
                } else {
                    " ".to_string()
                };
                println!("  [{}] {:<16} {}", mark, g.id, g.label.dimmed());
            }

            println!("{}", "Body goals:".cyan().bold());
            for g in BODY_GOALS {
                let mark = if selection.body_goals.iter().any(|s| s == g.id) {
                    "x".green().bold().to_string()
                } else {
                    " ".to_string()
                };
                println!("  [{}] {:<20} {}", mark, g.id, g.label.dimmed());
            }

            println!("{}", "Quick presets:".cyan().bold());
            for q in QUICK_GOALS {
                let mark = if selection.quick.as_deref() == Some(q.id) {
                    "x".green().bold().to_string()
                } else {
                    " ".to_string()
                };
                println!("  [{}] {:<12} {} ({} min)", mark, q.id, q.label.dimmed(), q.duration_min);
            }

            println!();
            println!("areas:     {}", selection.derived_areas().join(", "));
            println!("equipment: {}", selection.effective_equipment().join(", "));
            println!("duration:  {} min", selection.effective_duration());
            println!("days/week: {}", selection.days_per_week());
            println!("goal text: {}", selection.describe());
        }

        GoalsCmd::Toggle { id } => {
            let result = selection
                .toggle_performance_goal(&id)
                .or_else(|| selection.toggle_body_goal(&id));

            match result {
                Some(Toggle::Added) => {
                    db::save_selection(pool, &selection).await?;
                    println!("{} added goal `{}`", "ok:".green().bold(), id.green());
                }
                Some(Toggle::Removed) => {
                    db::save_selection(pool, &selection).await?;
                    println!("{} removed goal `{}`", "ok:".green().bold(), id);
                }
                None => {
                    println!("{} unknown goal `{}`", "error:".red().bold(), id);
                    let ids = PERFORMANCE_GOALS
                        .iter()
                        .chain(BODY_GOALS.iter())
                        .map(|g| g.id);
                    if let Some(hint) = types::best_suggestion(&id, ids) {
                        println!("{} did you mean `{}`?", "info:".blue().bold(), hint.green());
                    }
                }
            }
        }

        GoalsCmd::Area { area } => match selection.toggle_area(&area) {
            Some(Toggle::Added) => {
                db::save_selection(pool, &selection).await?;
                println!("{} targeting `{}`", "ok:".green().bold(), area.to_lowercase().green());
            }
            Some(Toggle::Removed) => {
                db::save_selection(pool, &selection).await?;
                println!("{} no longer targeting `{}`", "ok:".green().bold(), area.to_lowercase());
            }
            None => {
                let mut allowed: Vec<&str> = BODY_AREAS.iter().copied().collect();
                allowed.sort_unstable();
                println!("{} unknown area `{}`", "error:".red().bold(), area);
                println!("{} areas: {}", "info:".blue().bold(), allowed.join(", "));
            }
        },

        GoalsCmd::Quick { id } => match selection.select_quick(&id) {
            Some(()) => {
                db::save_selection(pool, &selection).await?;
                println!("{} quick preset `{}` selected", "ok:".green().bold(), id.green());
            }
            None => {
                println!("{} unknown preset `{}`", "error:".red().bold(), id);
                let ids = QUICK_GOALS.iter().map(|q| q.id);
                if let Some(hint) = types::best_suggestion(&id, ids) {
                    println!("{} did you mean `{}`?", "info:".blue().bold(), hint.green());
                }
            }
        },

        GoalsCmd::Text { text } => {
            let joined = text.join(" ").trim().to_string();
            if joined.is_empty() {
                selection.goal_text = None;
                db::save_selection(pool, &selection).await?;
                println!("{} goal text cleared", "ok:".green().bold());
            } else {
                selection.goal_text = Some(joined.clone());
                db::save_selection(pool, &selection).await?;
                println!("{} goal text set to `{}`", "ok:".green().bold(), joined);
            }
        }

        GoalsCmd::Equipment { items } => {
            selection.equipment = items.iter().map(|i| i.to_lowercase()).collect();
            db::save_selection(pool, &selection).await?;
            println!(
                "{} equipment: {}",
                "ok:".green().bold(),
                selection.effective_equipment().join(", ")
            );
        }

        GoalsCmd::Duration { minutes } => {
            if !(10..=120).contains(&minutes) {
                println!("{} duration must be between 10 and 120 minutes", "error:".red().bold());
                return Ok(());
            }
            selection.duration_min = Some(minutes);
            db::save_selection(pool, &selection).await?;
            println!("{} session duration set to {} min", "ok:".green().bold(), minutes);
        }

        GoalsCmd::Clear => {
            selection.clear();
            db::save_selection(pool, &selection).await?;
            println!("{} selection cleared", "ok:".green().bold());
        }
    }

    Ok(())
}
