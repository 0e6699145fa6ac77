// src/cli.rs
use chrono::NaiveDate;
use clap::{Command, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(
    name = "smartlog",
    version,
    about = "Workout logging client with calendar history and charts"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the exercise catalog
    Exercises,
    /// List logged sessions, most recent first
    Sessions {
        /// Show at most this many sessions
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Render a month calendar with workout markers
    Calendar {
        /// Calendar year (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,
        /// Month 1-12 (defaults to the current month)
        #[arg(long)]
        month: Option<u32>,
    },
    /// Render the full-year contribution graph
    Graph {
        /// Calendar year (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,
    },
    /// Best metric-1 value per day for one exercise
    Chart {
        /// Exercise name
        #[arg(long)]
        exercise: String,
    },
    /// Log a workout interactively (setup -> logging -> summary)
    Log {
        /// Template or category name to pre-fill exercises from
        #[arg(long, conflicts_with = "custom")]
        template: Option<String>,
        /// Start from scratch and add exercises by hand
        #[arg(long)]
        custom: bool,
        /// Session date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Manage workout templates
    Template {
        #[command(subcommand)]
        command: TemplateCommands,
    },
    /// Choose which fields are visible for an exercise
    SetFields {
        #[arg(long)]
        exercise_id: i64,
        /// Comma-separated field names, e.g. metric1,metric2
        #[arg(long, value_delimiter = ',')]
        visible: Vec<String>,
    },
    /// Generate shell completion script
    GenerateCompletion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum TemplateCommands {
    /// List all templates
    List,
    /// Show one template with its exercises
    Show { id: i64 },
    /// Create a template, optionally seeded with exercise ids
    Create {
        name: String,
        #[arg(long, value_delimiter = ',')]
        exercises: Vec<i64>,
    },
    /// Rename a template
    Rename { id: i64, name: String },
    /// Replace a template's name and exercise list wholesale
    Set {
        id: i64,
        name: String,
        #[arg(long, value_delimiter = ',')]
        exercises: Vec<i64>,
    },
    /// Delete a template
    Delete { id: i64 },
    /// Append an exercise to a template
    AddExercise { id: i64, exercise_id: i64 },
    /// Remove an exercise from a template
    RemoveExercise { id: i64, exercise_id: i64 },
    /// Replace the exercise order (comma-separated exercise ids)
    Reorder {
        id: i64,
        #[arg(value_delimiter = ',')]
        exercise_ids: Vec<i64>,
    },
}

pub fn build_cli_command() -> Command {
    Cli::command()
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
