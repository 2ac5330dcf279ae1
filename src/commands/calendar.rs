use std::collections::HashMap;

use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate};
use colored::Colorize;

use crate::db::{self, Db};
use crate::schedule::{self, DayStatus};

pub async fn handle(pool: &Db, year: Option<i32>, month: Option<u32>) -> Result<()> {
    let now = chrono::Local::now();
    let today = now.date_naive();
    let year = year.unwrap_or(now.year());
    let month = month.unwrap_or(now.month());

    if !(1..=12).contains(&month) {
        println!("{} month must be between 1 and 12", "error:".red().bold());
        return Ok(());
    }

    let first_day = match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(d) => d,
        None => {
            println!("{} invalid year {}", "error:".red().bold(), year);
            return Ok(());
        }
    };
    let last_day = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .and_then(|d| d.pred_opt())
    .unwrap_or(first_day);

    let full_schedule = db::load_schedule(pool).await?;
    let completed = db::completed_dates(pool).await?;

    // The worst status per day decides the cell color.
    let mut by_day: HashMap<u32, Vec<DayStatus>> = HashMap::new();
    let mut in_month = Vec::new();
    for entry in &full_schedule {
        if entry.date < first_day || entry.date > last_day {
            continue;
        }
        let status = schedule::classify(entry, today, &completed);
        by_day.entry(entry.date.day()).or_default().push(status);
        in_month.push((entry, status));
    }

    let month_name = first_day.format("%B %Y").to_string();
    println!("\n{}", month_name.bold().cyan());
    println!("{}", "Su Mo Tu We Th Fr Sa".dimmed());

    let first_weekday = first_day.weekday().num_days_from_sunday() as usize;
    print!("{}", "   ".repeat(first_weekday));

    for day in 1..=last_day.day() {
        let cell = format!("{:2}", day);
        let date = first_day + Duration::days(day as i64 - 1);
        let painted = match dominant(by_day.get(&day)) {
            Some(DayStatus::Completed) => cell.green().bold().to_string(),
            Some(DayStatus::Missed) => cell.red().to_string(),
            Some(DayStatus::Today) => cell.cyan().bold().to_string(),
            Some(DayStatus::Upcoming) => cell.yellow().to_string(),
            Some(DayStatus::Rest) => cell.dimmed().to_string(),
            // With no schedule at all, highlight the default Mon/Wed/Fri
            // training days.
            None if schedule::is_workout_day(&full_schedule, date) => cell.yellow().to_string(),
            None => cell,
        };
        print!("{} ", painted);

        if (first_weekday + day as usize) % 7 == 0 {
            println!();
        }
    }
    println!("\n");

    if in_month.is_empty() {
        if full_schedule.is_empty() {
            println!(
                "{}",
                "(no schedule yet, default Mon/Wed/Fri days highlighted, run `stride sync`)"
                    .dimmed()
            );
        } else {
            println!("{}", "(nothing scheduled this month, run `stride sync`)".dimmed());
        }
        return Ok(());
    }

    println!("{}", "Workouts:".bold().cyan());
    for (entry, status) in in_month {
        let tag = match status {
            DayStatus::Completed => "done".green().bold().to_string(),
            DayStatus::Missed => "missed".red().to_string(),
            DayStatus::Today => "today".cyan().bold().to_string(),
            DayStatus::Upcoming => "upcoming".yellow().to_string(),
            DayStatus::Rest => "rest".dimmed().to_string(),
        };
        println!(
            "  {}  {:<24} {:<10} {}",
            entry.date,
            entry.workout.name,
            tag,
            entry.program_name.dimmed()
        );
    }

    Ok(())
}

/// Completed beats missed beats today beats upcoming beats rest.
fn dominant(statuses: Option<&Vec<DayStatus>>) -> Option<DayStatus> {
    let statuses = statuses?;
    let rank = |s: &DayStatus| match s {
        DayStatus::Completed => 0,
        DayStatus::Missed => 1,
        DayStatus::Today => 2,
        DayStatus::Upcoming => 3,
        DayStatus::Rest => 4,
    };
    statuses.iter().min_by_key(|s| rank(s)).copied()
}
