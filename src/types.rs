use std::{
    collections::{BTreeMap, HashSet},
    fmt::Display,
    fs,
    path::Path,
};

use anyhow::{Context, Result};
use clap::ValueEnum;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use strsim::jaro_winkler;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitnessLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl Display for FitnessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        };
        write!(f, "{}", s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GoalCategory {
    Running,
    Sports,
    Body,
}

/// One selectable goal from the catalog. Performance goals carry a category
/// (running/sports) that shapes the generation request; body goals are all
/// `Body`.
pub struct GoalDef {
    pub id: &'static str,
    pub label: &'static str,
    pub category: GoalCategory,
    pub target_areas: &'static [&'static str],
}

pub static PERFORMANCE_GOALS: &[GoalDef] = &[
    GoalDef { id: "run_5k_starter", label: "5K Starter", category: GoalCategory::Running, target_areas: &["legs", "core", "calves"] },
    GoalDef { id: "run_5k", label: "5K Training", category: GoalCategory::Running, target_areas: &["legs", "core", "calves"] },
    GoalDef { id: "run_10k", label: "10K Training", category: GoalCategory::Running, target_areas: &["legs", "core", "calves", "glutes"] },
    GoalDef { id: "run_half", label: "Half Marathon", category: GoalCategory::Running, target_areas: &["legs", "core", "calves", "glutes"] },
    GoalDef { id: "run_marathon", label: "Marathon", category: GoalCategory::Running, target_areas: &["legs", "core", "calves", "glutes"] },
    GoalDef { id: "triathlon", label: "Triathlon", category: GoalCategory::Running, target_areas: &["legs", "core", "shoulders", "back", "arms"] },
    GoalDef { id: "cycling", label: "Cycling", category: GoalCategory::Sports, target_areas: &["legs", "core", "glutes", "calves"] },
    GoalDef { id: "soccer", label: "Soccer", category: GoalCategory::Sports, target_areas: &["legs", "core", "calves", "glutes"] },
    GoalDef { id: "basketball", label: "Basketball", category: GoalCategory::Sports, target_areas: &["legs", "core", "shoulders", "arms", "calves"] },
    GoalDef { id: "tennis", label: "Tennis", category: GoalCategory::Sports, target_areas: &["shoulders", "arms", "core", "legs"] },
    GoalDef { id: "swimming", label: "Swimming", category: GoalCategory::Sports, target_areas: &["shoulders", "back", "core", "arms", "legs"] },
];

pub static BODY_GOALS: &[GoalDef] = &[
    GoalDef { id: "build_muscle", label: "Build Muscle", category: GoalCategory::Body, target_areas: &["chest", "back", "legs", "shoulders", "arms"] },
    GoalDef { id: "lose_weight", label: "Lose Weight", category: GoalCategory::Body, target_areas: &[] },
    GoalDef { id: "get_toned", label: "Get Toned", category: GoalCategory::Body, target_areas: &["core", "arms", "legs"] },
    GoalDef { id: "improve_endurance", label: "Endurance", category: GoalCategory::Body, target_areas: &[] },
    GoalDef { id: "increase_flexibility", label: "Flexibility", category: GoalCategory::Body, target_areas: &[] },
    GoalDef { id: "general_fitness", label: "General Fitness", category: GoalCategory::Body, target_areas: &[] },
    GoalDef { id: "six_pack", label: "Six Pack Abs", category: GoalCategory::Body, target_areas: &["core"] },
    GoalDef { id: "stronger_legs", label: "Stronger Legs", category: GoalCategory::Body, target_areas: &["legs", "glutes", "calves"] },
    GoalDef { id: "upper_body", label: "Upper Body", category: GoalCategory::Body, target_areas: &["chest", "back", "shoulders", "arms"] },
];

/// Single-session presets. Selecting one clears the goal-driven mode
/// entirely.
pub struct QuickGoalDef {
    pub id: &'static str,
    pub label: &'static str,
    pub body_parts: &'static [&'static str],
    pub duration_min: u32,
}

pub static QUICK_GOALS: &[QuickGoalDef] = &[
    QuickGoalDef { id: "full_body", label: "Full Body", body_parts: &["chest", "back", "legs", "shoulders"], duration_min: 45 },
    QuickGoalDef { id: "leg_day", label: "Leg Day", body_parts: &["legs", "glutes", "calves"], duration_min: 40 },
    QuickGoalDef { id: "upper_body", label: "Upper Body", body_parts: &["chest", "back", "shoulders", "arms"], duration_min: 35 },
    QuickGoalDef { id: "core_blast", label: "Core Blast", body_parts: &["core"], duration_min: 20 },
    QuickGoalDef { id: "cardio", label: "Cardio", body_parts: &[], duration_min: 30 },
    QuickGoalDef { id: "hiit", label: "HIIT", body_parts: &[], duration_min: 25 },
];

pub static BODY_AREAS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "chest", "back", "shoulders", "arms", "legs", "core", "glutes", "calves",
    ])
});

pub fn performance_goal(id: &str) -> Option<&'static GoalDef> {
    PERFORMANCE_GOALS.iter().find(|g| g.id == id)
}

pub fn body_goal(id: &str) -> Option<&'static GoalDef> {
    BODY_GOALS.iter().find(|g| g.id == id)
}

pub fn quick_goal(id: &str) -> Option<&'static QuickGoalDef> {
    QUICK_GOALS.iter().find(|g| g.id == id)
}

/// Returns the canonical lowercase body area or `None` if not allowed.
pub fn canonical_area<S: AsRef<str>>(a: S) -> Option<String> {
    let a = a.as_ref().to_ascii_lowercase();
    if BODY_AREAS.contains(a.as_str()) {
        Some(a)
    } else {
        None
    }
}

/// Return the closest id from `candidates` for `input`
/// if similarity ≥ 0.80 *and* clearly better than the runner-up.
/// Otherwise return `None` (no suggestion shown).
pub fn best_suggestion<'a, I>(input: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let inp = input.to_ascii_lowercase();

    let mut scores: Vec<(&'a str, f64)> = candidates
        .into_iter()
        .map(|c| (c, jaro_winkler(&inp, c)))
        .collect();

    // Highest score first.
    scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let (best, best_score) = *scores.first()?;
    let second_score = scores.get(1).map(|(_, s)| *s).unwrap_or(0.0);

    const MIN_SCORE: f64 = 0.80;
    const GAP: f64 = 0.02;

    if best_score >= MIN_SCORE && best_score - second_score >= GAP {
        Some(best)
    } else {
        None
    }
}

/// Flat key/value config persisted as TOML in the user config dir.
/// Keys: `api_url`, `api_token`, `user_id`, `fitness_level`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub map: BTreeMap<String, String>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config `{}`", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config `{}`", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating config dir `{}`", parent.display()))?;
        }
        let raw = toml::to_string_pretty(self)?;
        fs::write(path, raw).with_context(|| format!("writing config `{}`", path.display()))
    }

    pub fn api_url(&self) -> String {
        self.map
            .get("api_url")
            .cloned()
            .unwrap_or_else(|| "https://api.wihy.ai".to_string())
    }

    pub fn api_token(&self) -> Option<String> {
        self.map.get("api_token").cloned()
    }

    pub fn user_id(&self) -> String {
        self.map
            .get("user_id")
            .cloned()
            .unwrap_or_else(|| "local".to_string())
    }

    pub fn fitness_level(&self) -> FitnessLevel {
        match self.map.get("fitness_level").map(String::as_str) {
            Some("beginner") => FitnessLevel::Beginner,
            Some("advanced") => FitnessLevel::Advanced,
            _ => FitnessLevel::Intermediate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goal_target_areas_are_canonical() {
        for g in PERFORMANCE_GOALS.iter().chain(BODY_GOALS.iter()) {
            for area in g.target_areas {
                assert!(BODY_AREAS.contains(area), "{} has unknown area {}", g.id, area);
            }
        }
    }

    #[test]
    fn suggestion_catches_close_typo() {
        let ids = PERFORMANCE_GOALS.iter().map(|g| g.id);
        assert_eq!(best_suggestion("run_maraton", ids), Some("run_marathon"));
    }

    #[test]
    fn suggestion_rejects_garbage() {
        let ids = BODY_GOALS.iter().map(|g| g.id);
        assert_eq!(best_suggestion("zzzzqq", ids), None);
    }

    #[test]
    fn corrupt_config_errors_and_defaults_cover_it() {
        let dir = std::env::temp_dir().join("stride-config-test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config");
        fs::write(&path, "not = [valid").unwrap();

        assert!(Config::load(&path).is_err());

        // The fallback config is still fully usable.
        let fallback = Config::default();
        assert_eq!(fallback.api_url(), "https://api.wihy.ai");
        assert_eq!(fallback.user_id(), "local");
        assert_eq!(fallback.api_token(), None);
    }
}
