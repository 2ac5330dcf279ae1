use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::models::{Program, ProgramProgress, ScheduledWorkout, Workout};

/// Lays a program's workouts onto consecutive dates starting at
/// `today + offset_days`. Every workout gets exactly one date, rest days
/// included, so day N of the program is always `start + (N - 1)`.
pub fn schedule_program(
    program: &Program,
    workouts: &[Workout],
    offset_days: i64,
    today: NaiveDate,
) -> Vec<ScheduledWorkout> {
    let start = today + Duration::days(offset_days);

    workouts
        .iter()
        .enumerate()
        .map(|(i, workout)| ScheduledWorkout {
            date: start + Duration::days(i as i64),
            workout: workout.clone(),
            program_id: program.program_id.clone(),
            program_name: program.name.clone(),
        })
        .collect()
}

/// Merges per-program schedules into one calendar, ordered by date. The sort
/// is stable so same-day entries keep their program order.
pub fn merge_schedules(schedules: Vec<Vec<ScheduledWorkout>>) -> Vec<ScheduledWorkout> {
    let mut merged: Vec<ScheduledWorkout> = schedules.into_iter().flatten().collect();
    merged.sort_by_key(|s| s.date);
    merged
}

/// Entries on `date` that actually need doing. Rest days are not sessions.
pub fn workouts_for_date<'a>(
    schedule: &'a [ScheduledWorkout],
    date: NaiveDate,
) -> Vec<&'a ScheduledWorkout> {
    schedule
        .iter()
        .filter(|s| s.date == date && !s.workout.is_rest_day)
        .collect()
}

/// A date counts as a workout day when the schedule has a non-rest entry on
/// it. With no schedule at all, fall back to a Mon/Wed/Fri pattern.
pub fn is_workout_day(schedule: &[ScheduledWorkout], date: NaiveDate) -> bool {
    if schedule.is_empty() {
        return matches!(date.weekday(), Weekday::Mon | Weekday::Wed | Weekday::Fri);
    }
    !workouts_for_date(schedule, date).is_empty()
}

/// What a calendar cell shows for one scheduled entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayStatus {
    Rest,
    Completed,
    Missed,
    Today,
    Upcoming,
}

/// Classifies a scheduled entry against the completion history. Past workout
/// days with no recorded completion were missed.
pub fn classify(
    entry: &ScheduledWorkout,
    today: NaiveDate,
    completed: &HashSet<NaiveDate>,
) -> DayStatus {
    if entry.workout.is_rest_day {
        return DayStatus::Rest;
    }
    if completed.contains(&entry.date) {
        return DayStatus::Completed;
    }
    if entry.date < today {
        return DayStatus::Missed;
    }
    if entry.date == today {
        return DayStatus::Today;
    }
    DayStatus::Upcoming
}

/// Day `N` of a program unlocks only once the `N - 1` workouts before it are
/// done. Quick workouts are standalone and never locked.
pub fn can_start(progress: Option<&ProgramProgress>, day_number: u32, quick: bool) -> bool {
    if quick {
        return true;
    }
    match progress {
        Some(p) => p.completed_workouts + 1 >= day_number,
        // No progress yet, only day one is open.
        None => day_number <= 1,
    }
}
