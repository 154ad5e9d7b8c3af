mod cli;

use anyhow::{Context, Result};
use chrono::{Duration, Local, NaiveDateTime, TimeZone, Utc};
use clap::Parser;
use std::fs;
use tracing_subscriber::EnvFilter;

use cli::{Cli, ClientsAction, Commands, ConfigAction, FilterArgs, ProjectsAction, TimerAction};
use freelance_ledger::analytics::{
    self, range::start_of_day, AnalyticsFilter, AnalyticsOptions, Clock, DateRange, SystemClock,
};
use freelance_ledger::config::{self, EffectiveConfig};
use freelance_ledger::db::{Database, NewEntry, NewProject};
use freelance_ledger::error::ParseError;
use freelance_ledger::models::{Project, ProjectStatus};
use freelance_ledger::report::{self, Format};
use freelance_ledger::timer::{self, format_duration, format_duration_short};

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Timer { action } => match action {
            TimerAction::Start {
                project,
                description,
            } => cmd_timer_start(&project, description.as_deref()),
            TimerAction::Stop => cmd_timer_stop(),
            TimerAction::Status => cmd_timer_status(),
        },
        Commands::Log {
            project,
            duration,
            start,
            description,
            non_billable,
            rate,
        } => cmd_log(
            &project,
            &duration,
            start.as_deref(),
            description.as_deref(),
            non_billable,
            rate,
        ),
        Commands::Entries { filter } => cmd_entries(&filter),
        Commands::Analytics {
            filter,
            format,
            output,
            distribution,
        } => cmd_analytics(&filter, format, output, distribution),
        Commands::Export { filter, output } => cmd_export(&filter, output),
        Commands::Projects { action } => match action {
            ProjectsAction::Add {
                name,
                client,
                rate,
                budget,
                description,
            } => cmd_projects_add(&name, client.as_deref(), rate, budget, description.as_deref()),
            ProjectsAction::List => cmd_projects_list(),
            ProjectsAction::SetStatus { project, status } => cmd_projects_set_status(&project, &status),
        },
        Commands::Clients { action } => match action {
            ClientsAction::Add { name, email } => cmd_clients_add(&name, email.as_deref()),
            ClientsAction::List => cmd_clients_list(),
        },
        Commands::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Edit => cmd_config_edit(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();
}

fn load() -> Result<(EffectiveConfig, Database)> {
    let config = EffectiveConfig::load()?;
    let db = Database::open(&config.database_path)?;
    Ok((config, db))
}

fn require_project(db: &Database, key: &str) -> Result<Project> {
    db.find_project(key)?
        .with_context(|| format!("Project not found: {}", key))
}

/// Turn CLI filter flags into an analytics filter, resolving names to IDs
fn build_filter(db: &Database, args: &FilterArgs) -> Result<AnalyticsFilter> {
    let mut range: DateRange = args.range.parse()?;
    if args.from.is_some() || args.to.is_some() {
        range = DateRange::Custom;
    }

    let mut filter = AnalyticsFilter::with_range(range);
    filter.include_non_billable = !args.billable_only;

    if let Some(ref from) = args.from {
        filter.start_date = Some(start_of_day(report::parse_date(from)?));
    }
    if let Some(ref to) = args.to {
        let next_day = report::parse_date(to)?
            .succ_opt()
            .with_context(|| format!("Date out of range: {}", to))?;
        filter.end_date = Some(start_of_day(next_day) - Duration::nanoseconds(1));
    }

    for key in &args.projects {
        filter.project_ids.insert(require_project(db, key)?.id);
    }
    for key in &args.clients {
        let client = db
            .find_client(key)?
            .with_context(|| format!("Client not found: {}", key))?;
        filter.client_ids.insert(client.id);
    }

    Ok(filter)
}

/// Analytics options from the config, with per-command overrides applied
fn analytics_options(config: &EffectiveConfig, args: &FilterArgs) -> AnalyticsOptions {
    let mut options = config.analytics_options();
    if let Some(week_start) = args.week_start {
        options.week_starts_on = week_start;
    }
    options
}

fn parse_local_datetime(input: &str) -> Result<chrono::DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(input.trim(), "%Y-%m-%d %H:%M")
        .map_err(|_| ParseError::DateTime(input.to_string()))?;
    let local = Local
        .from_local_datetime(&naive)
        .earliest()
        .with_context(|| format!("{} does not exist in the local time zone", input))?;
    Ok(local.with_timezone(&Utc))
}

fn cmd_timer_start(project_key: &str, description: Option<&str>) -> Result<()> {
    let (_, db) = load()?;
    let project = require_project(&db, project_key)?;

    let (stopped, entry) = timer::start_timer(&db, &project, description, Utc::now())?;

    if let Some(prev) = stopped {
        eprintln!(
            "Stopped previous timer (entry {}, {})",
            prev.id,
            format_duration(prev.duration_seconds.unwrap_or(0.0) as i64)
        );
    }
    eprintln!("Started timer on {} (entry {})", project.name, entry.id);
    Ok(())
}

fn cmd_timer_stop() -> Result<()> {
    let (_, db) = load()?;

    match timer::stop_timer(&db, Utc::now())? {
        Some(entry) => {
            let name = entry
                .project
                .as_ref()
                .map(|p| p.name.as_str())
                .unwrap_or(analytics::rollup::UNKNOWN_PROJECT);
            eprintln!(
                "Stopped timer on {} ({})",
                name,
                format_duration(entry.duration_seconds.unwrap_or(0.0) as i64)
            );
        }
        None => eprintln!("No timer running"),
    }
    Ok(())
}

fn cmd_timer_status() -> Result<()> {
    let (_, db) = load()?;

    let entry = match db.active_entry()? {
        Some(entry) => entry,
        None => {
            println!("No timer running.");
            return Ok(());
        }
    };

    let name = entry
        .project
        .as_ref()
        .map(|p| p.name.as_str())
        .unwrap_or(analytics::rollup::UNKNOWN_PROJECT);
    println!("  Project: {}", name);
    if let Some(ref description) = entry.description {
        println!("  Task:    {}", description);
    }
    println!("  Started: {}", entry.start_time.with_timezone(&Local).format("%Y-%m-%d %H:%M"));
    println!(
        "  Elapsed: {}",
        format_duration(timer::elapsed_seconds(&entry, Utc::now()))
    );
    Ok(())
}

fn cmd_log(
    project_key: &str,
    duration: &str,
    start: Option<&str>,
    description: Option<&str>,
    non_billable: bool,
    rate: Option<f64>,
) -> Result<()> {
    let (_, db) = load()?;
    let project = require_project(&db, project_key)?;

    let seconds = timer::parse_duration(duration)?;
    let start = start.map(parse_local_datetime).transpose()?;
    let (start_time, end_time) = timer::logged_span(seconds, start, Utc::now())?;

    let entry = db.insert_entry(&NewEntry {
        project_id: project.id,
        description,
        start_time,
        end_time,
        is_billable: !non_billable,
        hourly_rate: rate,
    })?;

    eprintln!(
        "Logged {} on {} (entry {})",
        format_duration_short(seconds),
        project.name,
        entry.id
    );
    Ok(())
}

fn cmd_entries(args: &FilterArgs) -> Result<()> {
    let (config, db) = load()?;
    let filter = build_filter(&db, args)?;
    let entries = db.list_entries()?;

    let clock = SystemClock;
    let kept = analytics::filter_entries(&entries, &filter, &analytics_options(&config, args), &clock);

    if kept.is_empty() {
        println!("No time entries in this period.");
        return Ok(());
    }

    for entry in kept {
        let start = clock.to_local(entry.start_time);
        let name = entry
            .project
            .as_ref()
            .map(|p| p.name.as_str())
            .unwrap_or(analytics::rollup::UNKNOWN_PROJECT);
        let duration = if entry.is_running() {
            "running".to_string()
        } else {
            format_duration(entry.duration_seconds.unwrap_or(0.0) as i64)
        };

        println!(
            "{:>5}  {}  {:<24} {:>9}  {}{}",
            entry.id,
            start.format("%Y-%m-%d %H:%M"),
            name,
            duration,
            if entry.is_billable { "$" } else { " " },
            entry
                .description
                .as_deref()
                .map(|d| format!(" {}", d))
                .unwrap_or_default()
        );
    }
    Ok(())
}

fn cmd_analytics(
    args: &FilterArgs,
    format: Option<String>,
    output: Option<String>,
    distribution: bool,
) -> Result<()> {
    let (config, db) = load()?;
    let filter = build_filter(&db, args)?;
    let entries = db.list_entries()?;

    let options = analytics_options(&config, args);
    let report_data = analytics::compute_analytics(&entries, &filter, &options, &SystemClock);

    let format = format.unwrap_or_else(|| config.default_format.clone());
    let formats = format
        .split(',')
        .map(Format::parse)
        .collect::<Result<Vec<_>>>()?;
    let multiple_formats = formats.len() > 1;
    let include_distribution = distribution || config.include_time_distribution;

    for fmt in formats {
        let content = report::render(&report_data, fmt, include_distribution)?;

        if let Some(ref base_path) = output {
            let file_path = report::output_path(base_path, fmt, multiple_formats);
            fs::write(&file_path, &content)
                .with_context(|| format!("Failed to write report to {}", file_path))?;
            eprintln!("Report written to: {}", file_path);
        } else {
            println!("{}", content);
        }
    }

    Ok(())
}

fn cmd_export(args: &FilterArgs, output: Option<String>) -> Result<()> {
    let (config, db) = load()?;
    let filter = build_filter(&db, args)?;
    let entries = db.list_entries()?;

    let clock = SystemClock;
    let options = analytics_options(&config, args);
    let kept = analytics::filter_entries(&entries, &filter, &options, &clock);
    let content = report::csv::export_entries_string(&kept, options.default_hourly_rate, &clock)?;

    match output {
        Some(path) => {
            fs::write(&path, &content).with_context(|| format!("Failed to write export to {}", path))?;
            eprintln!("Exported {} entries to: {}", kept.len(), path);
        }
        None => print!("{}", content),
    }
    Ok(())
}

fn cmd_projects_add(
    name: &str,
    client: Option<&str>,
    rate: Option<f64>,
    budget: Option<f64>,
    description: Option<&str>,
) -> Result<()> {
    let (_, db) = load()?;

    let client_id = match client {
        Some(key) => Some(
            db.find_client(key)?
                .with_context(|| format!("Client not found: {}", key))?
                .id,
        ),
        None => None,
    };

    let project = db.add_project(&NewProject {
        name,
        client_id,
        description,
        hourly_rate: rate,
        budget,
    })?;

    println!("Added project {} (id {})", project.name, project.id);
    Ok(())
}

fn cmd_projects_list() -> Result<()> {
    let (_, db) = load()?;
    let projects = db.list_projects()?;

    if projects.is_empty() {
        println!("No projects yet.");
        return Ok(());
    }

    println!("Projects:\n");

    for project in projects {
        println!("  [{}] {} ({})", project.id, project.name, project.status);
        if let Some(client_id) = project.client_id {
            let client = db.get_client_by_id(client_id)?;
            println!("  Client: {}", client.name);
        }
        if let Some(rate) = project.hourly_rate {
            println!("  Rate:   {:.2}/h", rate);
        }
        if let Some(budget) = project.budget {
            println!("  Budget: {:.2}", budget);
        }
        println!();
    }

    Ok(())
}

fn cmd_projects_set_status(project_key: &str, status: &str) -> Result<()> {
    let (_, db) = load()?;
    let project = require_project(&db, project_key)?;
    let status: ProjectStatus = status.parse()?;

    let updated = db.set_project_status(project.id, status)?;
    println!("Set status of {} to: {}", updated.name, updated.status);
    Ok(())
}

fn cmd_clients_add(name: &str, email: Option<&str>) -> Result<()> {
    let (_, db) = load()?;
    let client = db.add_client(name, email)?;
    println!("Added client {} (id {})", client.name, client.id);
    Ok(())
}

fn cmd_clients_list() -> Result<()> {
    let (_, db) = load()?;
    let clients = db.list_clients()?;

    if clients.is_empty() {
        println!("No clients yet.");
        return Ok(());
    }

    for client in clients {
        match client.email {
            Some(ref email) => println!("  [{}] {} <{}>", client.id, client.name, email),
            None => println!("  [{}] {}", client.id, client.name),
        }
    }

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = config::init_global_config()?;
    println!("Configuration initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_edit() -> Result<()> {
    let path = config::global_config_path()?;

    if !path.exists() {
        config::init_global_config()?;
    }

    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());

    std::process::Command::new(&editor)
        .arg(&path)
        .status()
        .with_context(|| format!("Failed to open editor: {}", editor))?;

    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config = config::load_global_config()?;
    let toml = toml::to_string_pretty(&config)?;
    println!("{}", toml);
    Ok(())
}
