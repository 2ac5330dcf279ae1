use clap::{Parser, Subcommand};

use crate::types::FitnessLevel;

#[derive(Parser)]
#[command(name = "stride", version, about = "CLI workout program generator and tracker")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pick training goals, target areas and equipment
    #[command(subcommand, visible_alias = "g")]
    Goals(GoalsCmd),

    /// Generate a program from the current goal selection
    #[command(visible_alias = "gen")]
    Generate {
        /// Regenerate even if the selection has not changed
        #[arg(short, long)]
        force: bool,

        /// How many days from today the program starts (defaults to tomorrow)
        #[arg(long, default_value = "1")]
        start_in: i64,

        /// Override the configured fitness level for this generation
        #[arg(short, long)]
        level: Option<FitnessLevel>,
    },

    /// Program management
    #[command(subcommand, visible_alias = "p")]
    Program(ProgramCmd),

    /// Refetch workouts for every active program and rebuild the calendar
    Sync,

    /// Show scheduled and completed workouts in a calendar view
    #[command(visible_alias = "cal")]
    Calendar {
        /// Year to show (defaults to current year)
        #[arg(short, long)]
        year: Option<i32>,

        /// Month to show (1-12, defaults to current month)
        #[arg(short, long)]
        month: Option<u32>,
    },

    /// Session-scoped commands
    #[command(subcommand, visible_alias = "s")]
    Session(SessionCmd),

    /// Show progress across active programs
    Status,

    /// View or edit stride config
    #[command(subcommand)]
    Config(ConfigCmd),
}

#[derive(Subcommand)]
pub enum GoalsCmd {
    /// Show the goal catalog and the current selection
    #[command(visible_alias = "l")]
    List,

    /// Toggle a performance or body goal by id
    #[command(visible_alias = "t")]
    Toggle {
        /// Goal id, e.g. `build_muscle` or `run_10k`
        id: String,
    },

    /// Toggle an explicit target area
    Area {
        /// Body area, e.g. `chest` or `legs`
        area: String,
    },

    /// Select a single-session quick preset (clears goal mode)
    #[command(visible_alias = "q")]
    Quick {
        /// Preset id, e.g. `leg_day` or `hiit`
        id: String,
    },

    /// Set free-form goal text (overrides the synthesized description)
    Text {
        /// The goal in your own words; empty clears it
        text: Vec<String>,
    },

    /// Set available equipment
    Equipment {
        /// Equipment names; empty resets to bodyweight
        items: Vec<String>,
    },

    /// Set the preferred session duration in minutes
    Duration {
        minutes: u32,
    },

    /// Clear the whole selection
    Clear,
}

#[derive(Subcommand)]
pub enum ProgramCmd {
    /// List active programs, newest first
    #[command(visible_alias = "l")]
    List,

    /// Show a program's workouts
    #[command(visible_alias = "i")]
    Show {
        /// Program id (defaults to the most recently generated program)
        program: Option<String>,
    },

    /// Refetch a program's workouts, bypassing the cache
    Refresh {
        program: String,
    },

    /// Delete a program remotely and locally
    #[command(visible_alias = "d")]
    Delete {
        program: String,
    },
}

#[derive(Subcommand)]
pub enum SessionCmd {
    /// Start today's workout, or a specific one
    #[command(visible_alias = "s")]
    Start {
        /// Workout id (defaults to today's scheduled workout)
        workout: Option<String>,
    },

    /// Log the current set - Usage: session log REPS [WEIGHT]
    #[command(visible_alias = "l")]
    Log {
        /// Reps performed
        reps: u32,

        /// Weight in kg (omit for bodyweight)
        weight: Option<f64>,

        /// Do not sit through the rest countdown
        #[arg(long, short = 'n')]
        no_wait: bool,
    },

    /// Show current session details
    #[command(visible_alias = "i")]
    Show,

    /// Skip the running rest timer
    #[command(visible_alias = "sr")]
    SkipRest,

    /// Skip the current exercise
    #[command(visible_alias = "sk")]
    Skip,

    /// End the session now, keeping logged sets
    #[command(visible_alias = "f")]
    Finish {
        /// Free-form note to attach to the completion
        #[arg(long)]
        notes: Option<String>,

        /// How you felt, 1 (drained) to 5 (great)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        energy: Option<u8>,
    },

    /// Abandon the session without recording anything
    #[command(visible_alias = "c")]
    Cancel,
}

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// List all config values
    List,

    /// Get a config value
    Get { key: String },

    /// Set a config value
    Set { key: String, val: String },

    /// Remove a config value
    Unset { key: String },
}
