use clap::{Args, Parser, Subcommand};
use freelance_ledger::analytics::WeekStart;

#[derive(Parser)]
#[command(name = "freelance-ledger")]
#[command(about = "Track freelance time and report productivity and earnings", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start, stop or inspect the timer
    Timer {
        #[command(subcommand)]
        action: TimerAction,
    },

    /// Log a finished block of time
    Log {
        /// Project name or ID
        #[arg(short, long)]
        project: String,

        /// Duration: 1:30:00, 1h 30m, 90m or 2h
        #[arg(short, long)]
        duration: String,

        /// Start time (YYYY-MM-DD HH:MM, local), defaults to now minus the duration
        #[arg(short, long)]
        start: Option<String>,

        /// What was worked on
        #[arg(short = 'm', long)]
        description: Option<String>,

        /// Mark the entry as not billable
        #[arg(long)]
        non_billable: bool,

        /// Hourly rate for this entry only
        #[arg(long)]
        rate: Option<f64>,
    },

    /// List time entries
    Entries {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Generate productivity and earnings analytics
    Analytics {
        #[command(flatten)]
        filter: FilterArgs,

        /// Output format: md, csv, json (can specify multiple, comma-separated)
        #[arg(short, long)]
        format: Option<String>,

        /// Output file path (without extension if multiple formats)
        #[arg(short, long)]
        output: Option<String>,

        /// Include per-day time distribution for each project (markdown)
        #[arg(long)]
        distribution: bool,
    },

    /// Export filtered time entries as CSV
    Export {
        #[command(flatten)]
        filter: FilterArgs,

        /// Output file path, prints to stdout when omitted
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Manage projects
    Projects {
        #[command(subcommand)]
        action: ProjectsAction,
    },

    /// Manage clients
    Clients {
        #[command(subcommand)]
        action: ClientsAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Filter options shared by reporting commands
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Date range: week, month, quarter, year or custom
    #[arg(short, long, default_value = "month")]
    pub range: String,

    /// First day for a custom range (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// Last day for a custom range (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub to: Option<String>,

    /// Only these projects (name or ID, repeatable)
    #[arg(short = 'P', long = "project")]
    pub projects: Vec<String>,

    /// Only these clients (name or ID, repeatable)
    #[arg(short = 'C', long = "client")]
    pub clients: Vec<String>,

    /// Leave out non-billable entries
    #[arg(long)]
    pub billable_only: bool,

    /// First day of the week (sunday or monday), overrides the config
    #[arg(long)]
    pub week_start: Option<WeekStart>,
}

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start the timer, stopping any running one
    Start {
        /// Project name or ID
        project: String,

        /// What is being worked on
        #[arg(short = 'm', long)]
        description: Option<String>,
    },
    /// Stop the running timer
    Stop,
    /// Show the running timer
    Status,
}

#[derive(Subcommand)]
pub enum ProjectsAction {
    /// Add a project
    Add {
        /// Project name
        name: String,

        /// Client name or ID
        #[arg(short = 'C', long)]
        client: Option<String>,

        /// Hourly rate
        #[arg(long)]
        rate: Option<f64>,

        /// Budget in currency units
        #[arg(long)]
        budget: Option<f64>,

        /// Description
        #[arg(short = 'm', long)]
        description: Option<String>,
    },
    /// List all projects
    List,
    /// Set a project's status (active, completed, paused, archived)
    SetStatus {
        /// Project name or ID
        project: String,
        /// New status
        status: String,
    },
}

#[derive(Subcommand)]
pub enum ClientsAction {
    /// Add a client
    Add {
        /// Client name
        name: String,

        /// Contact email
        #[arg(short, long)]
        email: Option<String>,
    },
    /// List all clients
    List,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Initialize default configuration
    Init,
    /// Open configuration file in editor
    Edit,
    /// Show current configuration
    Show,
}
