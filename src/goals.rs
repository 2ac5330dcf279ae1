use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::GenerationRequest;
use crate::types::{self, FitnessLevel, GoalCategory, GoalDef};

/// Everything the user has picked so far. Persisted between invocations so
/// goals can be toggled across several commands before generating.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoalSelection {
    pub performance_goals: Vec<String>,
    pub body_goals: Vec<String>,
    /// Areas picked by hand; only authoritative while no goals are selected.
    pub target_areas: Vec<String>,
    pub equipment: Vec<String>,
    pub duration_min: Option<u32>,
    pub goal_text: Option<String>,
    /// Set when a single-session preset was chosen instead of goals.
    pub quick: Option<String>,
}

pub enum Toggle {
    Added,
    Removed,
}

impl GoalSelection {
    pub fn toggle_performance_goal(&mut self, id: &str) -> Option<Toggle> {
        types::performance_goal(id)?;
        self.quick = None;
        Some(toggle_in(&mut self.performance_goals, id))
    }

    pub fn toggle_body_goal(&mut self, id: &str) -> Option<Toggle> {
        types::body_goal(id)?;
        self.quick = None;
        Some(toggle_in(&mut self.body_goals, id))
    }

    pub fn toggle_area(&mut self, area: &str) -> Option<Toggle> {
        let canonical = types::canonical_area(area)?;
        Some(toggle_in(&mut self.target_areas, &canonical))
    }

    /// Quick mode replaces the whole goal-driven selection with the preset.
    pub fn select_quick(&mut self, id: &str) -> Option<()> {
        types::quick_goal(id)?;
        self.performance_goals.clear();
        self.body_goals.clear();
        self.target_areas.clear();
        self.goal_text = None;
        self.quick = Some(id.to_string());
        Some(())
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.performance_goals.is_empty()
            && self.body_goals.is_empty()
            && self.target_areas.is_empty()
            && self.goal_text.is_none()
            && self.quick.is_none()
    }

    pub fn selected_goals(&self) -> Vec<&'static GoalDef> {
        self.performance_goals
            .iter()
            .filter_map(|id| types::performance_goal(id))
            .chain(self.body_goals.iter().filter_map(|id| types::body_goal(id)))
            .collect()
    }

    /// The areas the selection implies, deduplicated and sorted. While goals
    /// are selected their target areas are the source of truth; manual area
    /// picks only count on their own. A quick preset brings its own parts.
    pub fn derived_areas(&self) -> Vec<String> {
        if let Some(q) = self.quick.as_deref().and_then(types::quick_goal) {
            return q.body_parts.iter().map(|a| a.to_string()).sorted().collect();
        }

        let goals = self.selected_goals();
        if !goals.is_empty() {
            return goals
                .iter()
                .flat_map(|g| g.target_areas.iter().map(|a| a.to_string()))
                .sorted()
                .dedup()
                .collect();
        }

        self.target_areas.iter().cloned().sorted().dedup().collect()
    }

    pub fn effective_equipment(&self) -> Vec<String> {
        if self.equipment.is_empty() {
            vec!["bodyweight".to_string()]
        } else {
            self.equipment.iter().cloned().sorted().dedup().collect()
        }
    }

    pub fn effective_duration(&self) -> u32 {
        if let Some(q) = self.quick.as_deref().and_then(types::quick_goal) {
            return q.duration_min;
        }
        self.duration_min.unwrap_or(30)
    }

    /// Training density scales with how many goals were picked, clamped to a
    /// sane weekly range. Quick workouts are a single session.
    pub fn days_per_week(&self) -> u32 {
        if self.quick.is_some() {
            return 1;
        }
        let total = (self.performance_goals.len() + self.body_goals.len()) as u32;
        (total + 2).clamp(3, 6)
    }

    pub fn duration_weeks(&self) -> u32 {
        if self.quick.is_some() {
            0
        } else {
            4
        }
    }

    /// Free text wins. Otherwise the quick preset label, the goal labels,
    /// the body areas, and finally a generic full-body prompt.
    pub fn describe(&self) -> String {
        if let Some(text) = self.goal_text.as_deref().filter(|t| !t.trim().is_empty()) {
            return text.trim().to_string();
        }

        if let Some(q) = self.quick.as_deref().and_then(types::quick_goal) {
            return format!("Quick workout: {}", q.label);
        }

        let goals = self.selected_goals();
        if !goals.is_empty() {
            let labels = goals.iter().map(|g| g.label).join(", ");
            return format!("Combined training program for: {}", labels);
        }

        let areas = self.derived_areas();
        if !areas.is_empty() {
            return format!("Workout targeting: {}", areas.join(", "));
        }

        "Give me a full body workout".to_string()
    }

    /// The service-side kind of program the first selected goal implies.
    pub fn program_type(&self) -> &'static str {
        if self.quick.is_some() {
            return "strength";
        }

        if let Some(goal) = self.selected_goals().first() {
            return match goal.category {
                GoalCategory::Running => "interval_cardio",
                GoalCategory::Sports => "sport",
                GoalCategory::Body => match goal.id {
                    "lose_weight" | "improve_endurance" => "interval_cardio",
                    "increase_flexibility" => "stretching",
                    "six_pack" => "core",
                    _ => "strength",
                },
            };
        }

        "strength"
    }

    /// The sport a sports goal trains for, absent otherwise.
    pub fn sport(&self) -> Option<&'static str> {
        self.selected_goals()
            .into_iter()
            .find(|g| g.category == GoalCategory::Sports)
            .map(|g| g.id)
    }

    /// Race plan identifier for running goals, absent otherwise.
    pub fn race_type(&self) -> Option<&'static str> {
        let first = self
            .performance_goals
            .iter()
            .find_map(|id| types::performance_goal(id))?;

        match first.id {
            "run_5k_starter" => Some("c25k"),
            "run_5k" => Some("5k"),
            "run_10k" => Some("10k"),
            "run_half" => Some("half_marathon"),
            "run_marathon" => Some("marathon"),
            "triathlon" => Some("ironman"),
            _ => None,
        }
    }

    /// Assembles the full generation request from the current selection.
    pub fn build_request(&self, user_id: String, level: FitnessLevel) -> GenerationRequest {
        GenerationRequest {
            user_id,
            fitness_goal: self.describe(),
            program_type: self.program_type().to_string(),
            race_type: self.race_type().map(str::to_string),
            sport: self.sport().map(str::to_string),
            fitness_level: level.to_string(),
            days_per_week: self.days_per_week(),
            duration_weeks: self.duration_weeks(),
            session_duration_minutes: self.effective_duration(),
            equipment: self.effective_equipment(),
            target_areas: self.derived_areas(),
            quick: self.quick.is_some(),
        }
    }

    /// Canonical digest of every input that shapes generation. Two selections
    /// with the same fingerprint would produce the same request, so the held
    /// program can be reused instead of regenerated.
    pub fn fingerprint(&self, level: FitnessLevel) -> String {
        let goals: Vec<&str> = self
            .performance_goals
            .iter()
            .chain(self.body_goals.iter())
            .map(String::as_str)
            .sorted()
            .collect();

        json!({
            "goals": goals,
            "areas": self.derived_areas(),
            "equipment": self.effective_equipment(),
            "duration": self.effective_duration(),
            "level": level.to_string(),
            "goal_text": self.goal_text.as_deref().unwrap_or(""),
            "quick": self.quick.as_deref().unwrap_or(""),
        })
        .to_string()
    }
}

fn toggle_in(list: &mut Vec<String>, value: &str) -> Toggle {
    if let Some(pos) = list.iter().position(|v| v == value) {
        list.remove(pos);
        Toggle::Removed
    } else {
        list.push(value.to_string());
        Toggle::Added
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_adds_then_removes() {
        let mut sel = GoalSelection::default();
        assert!(matches!(sel.toggle_body_goal("build_muscle"), Some(Toggle::Added)));
        assert!(matches!(sel.toggle_body_goal("build_muscle"), Some(Toggle::Removed)));
        assert!(sel.body_goals.is_empty());
    }

    #[test]
    fn unknown_goal_is_rejected() {
        let mut sel = GoalSelection::default();
        assert!(sel.toggle_body_goal("get_swole").is_none());
    }

    #[test]
    fn quick_selection_replaces_goals() {
        let mut sel = GoalSelection::default();
        sel.toggle_body_goal("six_pack");
        sel.toggle_area("chest");
        sel.select_quick("leg_day");

        assert_eq!(sel.quick.as_deref(), Some("leg_day"));
        assert!(sel.body_goals.is_empty());
        assert!(sel.target_areas.is_empty());
        assert_eq!(sel.days_per_week(), 1);
        assert_eq!(sel.duration_weeks(), 0);
        assert_eq!(sel.effective_duration(), 40);
        assert_eq!(sel.derived_areas(), vec!["calves", "glutes", "legs"]);
        assert_eq!(sel.describe(), "Quick workout: Leg Day");

        // Touching goals again drops the preset.
        sel.toggle_body_goal("six_pack");
        assert!(sel.quick.is_none());
    }

    #[test]
    fn days_per_week_scales_and_clamps() {
        let mut sel = GoalSelection::default();
        assert_eq!(sel.days_per_week(), 3);

        sel.toggle_body_goal("build_muscle");
        assert_eq!(sel.days_per_week(), 3);

        sel.toggle_body_goal("six_pack");
        assert_eq!(sel.days_per_week(), 4);

        sel.toggle_body_goal("stronger_legs");
        sel.toggle_body_goal("upper_body");
        sel.toggle_body_goal("get_toned");
        sel.toggle_body_goal("lose_weight");
        assert_eq!(sel.days_per_week(), 6);
    }

    #[test]
    fn goal_areas_override_manual_picks() {
        let mut sel = GoalSelection::default();
        sel.toggle_area("Chest");
        assert_eq!(sel.derived_areas(), vec!["chest"]);

        // With a goal selected its target areas take over.
        sel.toggle_body_goal("six_pack");
        assert_eq!(sel.derived_areas(), vec!["core"]);

        // Dropping the goal restores the manual pick.
        sel.toggle_body_goal("six_pack");
        assert_eq!(sel.derived_areas(), vec!["chest"]);
    }

    #[test]
    fn build_muscle_request_defaults() {
        let mut sel = GoalSelection::default();
        sel.toggle_body_goal("build_muscle");

        let req = sel.build_request("u1".to_string(), FitnessLevel::Intermediate);
        assert_eq!(req.program_type, "strength");
        assert_eq!(req.fitness_level, "intermediate");
        assert_eq!(req.days_per_week, 3);
        assert_eq!(req.duration_weeks, 4);
        assert_eq!(req.session_duration_minutes, 30);
        assert_eq!(req.equipment, vec!["bodyweight"]);
        assert_eq!(req.target_areas, vec!["arms", "back", "chest", "legs", "shoulders"]);
        assert_eq!(req.fitness_goal, "Combined training program for: Build Muscle");
        assert!(req.race_type.is_none());
        assert!(req.sport.is_none());
        assert!(!req.quick);
    }

    #[test]
    fn quick_preset_request() {
        let mut sel = GoalSelection::default();
        sel.select_quick("hiit");

        let req = sel.build_request("u1".to_string(), FitnessLevel::Beginner);
        assert!(req.quick);
        assert_eq!(req.days_per_week, 1);
        assert_eq!(req.duration_weeks, 0);
        assert_eq!(req.session_duration_minutes, 25);
        assert_eq!(req.fitness_goal, "Quick workout: HIIT");
    }

    #[test]
    fn sports_goal_carries_sport() {
        let mut sel = GoalSelection::default();
        sel.toggle_performance_goal("soccer");
        let req = sel.build_request("u1".to_string(), FitnessLevel::Intermediate);
        assert_eq!(req.program_type, "sport");
        assert_eq!(req.sport.as_deref(), Some("soccer"));
    }

    #[test]
    fn description_precedence() {
        let mut sel = GoalSelection::default();
        assert_eq!(sel.describe(), "Give me a full body workout");

        sel.toggle_area("legs");
        assert_eq!(sel.describe(), "Workout targeting: legs");

        sel.toggle_body_goal("build_muscle");
        sel.toggle_body_goal("six_pack");
        assert_eq!(
            sel.describe(),
            "Combined training program for: Build Muscle, Six Pack Abs"
        );

        sel.goal_text = Some("  train for rugby  ".to_string());
        assert_eq!(sel.describe(), "train for rugby");
    }

    #[test]
    fn fingerprint_ignores_selection_order() {
        let mut a = GoalSelection::default();
        a.toggle_body_goal("build_muscle");
        a.toggle_body_goal("six_pack");

        let mut b = GoalSelection::default();
        b.toggle_body_goal("six_pack");
        b.toggle_body_goal("build_muscle");

        assert_eq!(
            a.fingerprint(FitnessLevel::Intermediate),
            b.fingerprint(FitnessLevel::Intermediate)
        );
    }

    #[test]
    fn fingerprint_tracks_level_and_duration() {
        let mut sel = GoalSelection::default();
        sel.toggle_body_goal("build_muscle");

        let base = sel.fingerprint(FitnessLevel::Intermediate);
        assert_ne!(base, sel.fingerprint(FitnessLevel::Advanced));

        sel.duration_min = Some(60);
        assert_ne!(base, sel.fingerprint(FitnessLevel::Intermediate));
    }

    #[test]
    fn race_type_maps_running_goals() {
        let mut sel = GoalSelection::default();
        sel.toggle_performance_goal("run_half");
        assert_eq!(sel.race_type(), Some("half_marathon"));
        assert_eq!(sel.program_type(), "interval_cardio");

        let mut body = GoalSelection::default();
        body.toggle_body_goal("increase_flexibility");
        assert_eq!(body.race_type(), None);
        assert_eq!(body.program_type(), "stretching");
    }
}
