use crate::models::{Achievement, Program, ProgramProgress};

/// 45 minutes of work earns the endurance badge.
const ENDURANCE_SECS: u64 = 45 * 60;

/// Badges earned by the session that just finished. `prior_completed` is the
/// workout count before this one.
pub fn compute_achievements(
    prior_completed: u32,
    fully_completed: bool,
    prior_streak: u32,
    elapsed_secs: u64,
) -> Vec<Achievement> {
    let mut achievements = Vec::new();

    if prior_completed == 0 {
        achievements.push(Achievement::new(
            "🏆",
            "First Workout",
            "You completed your first workout!",
        ));
    }

    if fully_completed {
        achievements.push(Achievement::new(
            "💯",
            "100% Complete",
            "Every prescribed set logged.",
        ));
    }

    let streak = prior_streak + 1;
    if streak % 7 == 0 {
        achievements.push(Achievement::new(
            "🔥",
            format!("{} Day Streak", streak),
            "A full week of consecutive training.",
        ));
    }

    if elapsed_secs > ENDURANCE_SECS {
        achievements.push(Achievement::new(
            "⏱",
            "Endurance Master",
            "Trained for over 45 minutes.",
        ));
    }

    achievements
}

/// Progress for a program nothing has been logged against yet.
pub fn fresh_progress(program: &Program) -> ProgramProgress {
    let total_workouts = program.total_weeks.max(1) * program.days_per_week.max(1);
    ProgramProgress {
        program_id: program.program_id.clone(),
        program_name: program.name.clone(),
        current_week: 1,
        current_day: 1,
        total_weeks: program.total_weeks,
        days_per_week: program.days_per_week,
        completed_workouts: 0,
        total_workouts,
        completion_percentage: 0,
        streak_days: 0,
        next_workout_date: None,
        is_rest_day: false,
        progressive_overload: Vec::new(),
        progression_note: None,
    }
}

/// Folds one finished workout into a program's progress. When the service
/// answered the completion call, its numbers win; the streak is still bumped
/// locally because the service counts it asynchronously. Without a remote
/// answer everything is recomputed from the prior local state.
pub fn apply_completion(
    prior: Option<&ProgramProgress>,
    remote: Option<ProgramProgress>,
    program: &Program,
) -> ProgramProgress {
    let prior_streak = prior.map(|p| p.streak_days).unwrap_or(0);

    if let Some(mut remote) = remote {
        remote.streak_days = remote.streak_days.max(prior_streak + 1);
        return remote;
    }

    let mut progress = prior.cloned().unwrap_or_else(|| fresh_progress(program));

    progress.completed_workouts += 1;
    progress.current_day += 1;
    if progress.days_per_week > 0 {
        progress.current_week = ((progress.current_day - 1) / progress.days_per_week) + 1;
        if progress.total_weeks > 0 {
            progress.current_week = progress.current_week.min(progress.total_weeks);
        }
    }
    progress.streak_days = prior_streak + 1;
    progress.completion_percentage = percentage(progress.completed_workouts, progress.total_workouts);

    progress
}

fn percentage(completed: u32, total: u32) -> u32 {
    if total == 0 {
        return 100;
    }
    ((completed.min(total) as u64 * 100 + total as u64 / 2) / total as u64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program() -> Program {
        Program {
            program_id: "p1".to_string(),
            name: "Strength Block".to_string(),
            description: None,
            total_weeks: 4,
            days_per_week: 4,
            status: "ACTIVE".to_string(),
            created_at: None,
        }
    }

    #[test]
    fn first_workout_badge_only_once() {
        let first = compute_achievements(0, false, 0, 60);
        assert!(first.iter().any(|a| a.title == "First Workout"));

        let second = compute_achievements(1, false, 1, 60);
        assert!(!second.iter().any(|a| a.title == "First Workout"));
    }

    #[test]
    fn full_completion_and_endurance_badges() {
        let a = compute_achievements(3, true, 1, 46 * 60);
        assert!(a.iter().any(|x| x.title == "100% Complete"));
        assert!(a.iter().any(|x| x.title == "Endurance Master"));

        // Exactly 45 minutes does not qualify.
        let b = compute_achievements(3, false, 1, 45 * 60);
        assert!(!b.iter().any(|x| x.title == "Endurance Master"));
    }

    #[test]
    fn streak_badge_on_multiples_of_seven() {
        let a = compute_achievements(10, false, 6, 60);
        assert!(a.iter().any(|x| x.title == "7 Day Streak"));

        let b = compute_achievements(10, false, 13, 60);
        assert!(b.iter().any(|x| x.title == "14 Day Streak"));

        let c = compute_achievements(10, false, 7, 60);
        assert!(!c.iter().any(|x| x.title.ends_with("Day Streak")));
    }

    #[test]
    fn local_completion_advances_day_and_week() {
        let p = program();
        let first = apply_completion(None, None, &p);
        assert_eq!(first.completed_workouts, 1);
        assert_eq!(first.current_day, 2);
        assert_eq!(first.current_week, 1);
        assert_eq!(first.streak_days, 1);
        assert_eq!(first.completion_percentage, 6);

        let mut prior = first;
        for _ in 0..4 {
            prior = apply_completion(Some(&prior), None, &p);
        }
        // Day 6 of a 4-day week sits in week 2.
        assert_eq!(prior.current_day, 6);
        assert_eq!(prior.current_week, 2);
        assert_eq!(prior.completed_workouts, 5);
        assert_eq!(prior.completion_percentage, 31);
    }

    #[test]
    fn remote_progress_wins_but_streak_is_local() {
        let p = program();
        let mut prior = fresh_progress(&p);
        prior.streak_days = 3;
        prior.completed_workouts = 3;

        let mut remote = fresh_progress(&p);
        remote.completed_workouts = 7;
        remote.completion_percentage = 44;
        remote.streak_days = 0;

        let merged = apply_completion(Some(&prior), Some(remote), &p);
        assert_eq!(merged.completed_workouts, 7);
        assert_eq!(merged.completion_percentage, 44);
        assert_eq!(merged.streak_days, 4);
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(1, 16), 6);
        assert_eq!(percentage(5, 16), 31);
        assert_eq!(percentage(16, 16), 100);
        assert_eq!(percentage(1, 0), 100);
    }
}
