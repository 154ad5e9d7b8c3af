use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::models::{Client, ClientInfo, Project, ProjectInfo, ProjectStatus, TimeEntry};

/// Database wrapper
pub struct Database {
    conn: Connection,
}

/// Fields for a manually logged entry
#[derive(Debug, Clone)]
pub struct NewEntry<'a> {
    pub project_id: i64,
    pub description: Option<&'a str>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_billable: bool,
    pub hourly_rate: Option<f64>,
}

/// Fields for a new project
#[derive(Debug, Clone, Default)]
pub struct NewProject<'a> {
    pub name: &'a str,
    pub client_id: Option<i64>,
    pub description: Option<&'a str>,
    pub hourly_rate: Option<f64>,
    pub budget: Option<f64>,
}

const ENTRY_COLUMNS: &str = "e.id, e.project_id, e.description, e.start_time, e.end_time,
        e.duration_seconds, e.is_billable, e.hourly_rate,
        p.id, p.name, p.hourly_rate, p.budget, p.status, p.client_id, c.name
     FROM time_entries e
     LEFT JOIN projects p ON p.id = e.project_id
     LEFT JOIN clients c ON c.id = p.client_id";

const PROJECT_COLUMNS: &str =
    "id, client_id, name, description, hourly_rate, budget, status, created_at FROM projects";

impl Database {
    /// Open or create database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;

        let db = Self { conn };
        db.initialize()?;
        tracing::debug!(path = %path.display(), "database ready");
        Ok(db)
    }

    /// Initialize database schema
    fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS clients (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS projects (
                id INTEGER PRIMARY KEY,
                client_id INTEGER REFERENCES clients(id),
                name TEXT NOT NULL,
                description TEXT,
                hourly_rate REAL,
                budget REAL,
                status TEXT NOT NULL DEFAULT 'active',
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS time_entries (
                id INTEGER PRIMARY KEY,
                project_id INTEGER NOT NULL REFERENCES projects(id),
                description TEXT,
                start_time TEXT NOT NULL,
                end_time TEXT,
                duration_seconds INTEGER,
                is_billable INTEGER NOT NULL DEFAULT 1,
                hourly_rate REAL
            );

            CREATE INDEX IF NOT EXISTS idx_projects_client_id ON projects(client_id);
            CREATE INDEX IF NOT EXISTS idx_time_entries_project_id ON time_entries(project_id);
            CREATE INDEX IF NOT EXISTS idx_time_entries_start_time ON time_entries(start_time);
            "#,
        )
        .context("Failed to initialize database schema")?;

        Ok(())
    }

    // ==================== Clients ====================

    /// Create a client
    pub fn add_client(&self, name: &str, email: Option<&str>) -> Result<Client> {
        self.conn.execute(
            "INSERT INTO clients (name, email, created_at) VALUES (?, ?, ?)",
            params![name, email, format_datetime(Utc::now())],
        )?;

        let id = self.conn.last_insert_rowid();
        tracing::info!(client_id = id, name, "client created");
        self.get_client_by_id(id)
    }

    /// Get client by ID
    pub fn get_client_by_id(&self, id: i64) -> Result<Client> {
        self.conn
            .query_row(
                "SELECT id, name, email, created_at FROM clients WHERE id = ?",
                params![id],
                row_to_client,
            )
            .context("Client not found")
    }

    /// Find a client by numeric ID or case-insensitive name
    pub fn find_client(&self, key: &str) -> Result<Option<Client>> {
        self.conn
            .query_row(
                "SELECT id, name, email, created_at FROM clients
                 WHERE CAST(id AS TEXT) = ?1 OR lower(name) = lower(?1)
                 ORDER BY id LIMIT 1",
                params![key.trim()],
                row_to_client,
            )
            .optional()
            .context("Failed to query client")
    }

    /// List all clients
    pub fn list_clients(&self) -> Result<Vec<Client>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, email, created_at FROM clients ORDER BY name")?;

        let clients = stmt
            .query_map([], row_to_client)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(clients)
    }

    // ==================== Projects ====================

    /// Create a project
    pub fn add_project(&self, project: &NewProject<'_>) -> Result<Project> {
        self.conn.execute(
            "INSERT INTO projects (client_id, name, description, hourly_rate, budget, status, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                project.client_id,
                project.name,
                project.description,
                project.hourly_rate,
                project.budget,
                ProjectStatus::Active.as_str(),
                format_datetime(Utc::now())
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        tracing::info!(project_id = id, name = project.name, "project created");
        self.get_project_by_id(id)
    }

    /// Get project by ID
    pub fn get_project_by_id(&self, id: i64) -> Result<Project> {
        self.conn
            .query_row(
                &format!("SELECT {} WHERE id = ?", PROJECT_COLUMNS),
                params![id],
                row_to_project,
            )
            .context("Project not found")
    }

    /// Find a project by numeric ID or case-insensitive name
    pub fn find_project(&self, key: &str) -> Result<Option<Project>> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {} WHERE CAST(id AS TEXT) = ?1 OR lower(name) = lower(?1)
                     ORDER BY id LIMIT 1",
                    PROJECT_COLUMNS
                ),
                params![key.trim()],
                row_to_project,
            )
            .optional()
            .context("Failed to query project")
    }

    /// List all projects
    pub fn list_projects(&self) -> Result<Vec<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} ORDER BY name", PROJECT_COLUMNS))?;

        let projects = stmt
            .query_map([], row_to_project)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(projects)
    }

    /// Change a project's status
    pub fn set_project_status(&self, id: i64, status: ProjectStatus) -> Result<Project> {
        let updated = self.conn.execute(
            "UPDATE projects SET status = ? WHERE id = ?",
            params![status.as_str(), id],
        )?;
        if updated == 0 {
            anyhow::bail!("Project not found: {}", id);
        }
        self.get_project_by_id(id)
    }

    // ==================== Time entries ====================

    /// Insert a finished entry
    pub fn insert_entry(&self, entry: &NewEntry<'_>) -> Result<TimeEntry> {
        let duration = (entry.end_time - entry.start_time).num_seconds().max(0);
        self.conn.execute(
            "INSERT INTO time_entries
                (project_id, description, start_time, end_time, duration_seconds, is_billable, hourly_rate)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                entry.project_id,
                entry.description,
                format_datetime(entry.start_time),
                format_datetime(entry.end_time),
                duration,
                entry.is_billable,
                entry.hourly_rate
            ],
        )?;

        self.get_entry_by_id(self.conn.last_insert_rowid())
    }

    /// Insert an open (running) entry
    pub fn start_entry(
        &self,
        project_id: i64,
        description: Option<&str>,
        start_time: DateTime<Utc>,
    ) -> Result<TimeEntry> {
        self.conn.execute(
            "INSERT INTO time_entries (project_id, description, start_time, is_billable)
             VALUES (?, ?, ?, 1)",
            params![project_id, description, format_datetime(start_time)],
        )?;

        self.get_entry_by_id(self.conn.last_insert_rowid())
    }

    /// Close an open entry at `end_time`
    pub fn finish_entry(&self, id: i64, end_time: DateTime<Utc>) -> Result<TimeEntry> {
        let entry = self.get_entry_by_id(id)?;
        let duration = (end_time - entry.start_time).num_seconds().max(0);

        self.conn.execute(
            "UPDATE time_entries SET end_time = ?, duration_seconds = ? WHERE id = ?",
            params![format_datetime(end_time), duration, id],
        )?;

        self.get_entry_by_id(id)
    }

    /// Get entry by ID
    pub fn get_entry_by_id(&self, id: i64) -> Result<TimeEntry> {
        self.conn
            .query_row(
                &format!("SELECT {} WHERE e.id = ?", ENTRY_COLUMNS),
                params![id],
                row_to_entry,
            )
            .context("Time entry not found")
    }

    /// Most recent open entry, if any
    pub fn active_entry(&self) -> Result<Option<TimeEntry>> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {} WHERE e.end_time IS NULL ORDER BY e.start_time DESC LIMIT 1",
                    ENTRY_COLUMNS
                ),
                [],
                row_to_entry,
            )
            .optional()
            .context("Failed to query active entry")
    }

    /// All entries joined with project and client, newest first
    pub fn list_entries(&self) -> Result<Vec<TimeEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} ORDER BY e.start_time DESC, e.id DESC",
            ENTRY_COLUMNS
        ))?;

        let entries = stmt
            .query_map([], row_to_entry)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to query time entries")?;

        Ok(entries)
    }
}

fn row_to_client(row: &rusqlite::Row) -> rusqlite::Result<Client> {
    Ok(Client {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        created_at: parse_datetime(row.get::<_, String>(3)?),
    })
}

fn row_to_project(row: &rusqlite::Row) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        client_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        hourly_rate: row.get(4)?,
        budget: row.get(5)?,
        status: parse_status(&row.get::<_, String>(6)?),
        created_at: parse_datetime(row.get::<_, String>(7)?),
    })
}

fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<TimeEntry> {
    let project = match row.get::<_, Option<i64>>(8)? {
        Some(id) => {
            let client = row
                .get::<_, Option<i64>>(13)?
                .map(|client_id| -> rusqlite::Result<ClientInfo> {
                    Ok(ClientInfo {
                        id: client_id,
                        name: row.get::<_, Option<String>>(14)?.unwrap_or_default(),
                    })
                })
                .transpose()?;

            Some(ProjectInfo {
                id,
                name: row.get(9)?,
                hourly_rate: row.get(10)?,
                budget: row.get(11)?,
                status: parse_status(&row.get::<_, String>(12)?),
                client,
            })
        }
        None => None,
    };

    Ok(TimeEntry {
        id: row.get(0)?,
        project_id: row.get(1)?,
        project,
        description: row.get(2)?,
        start_time: parse_datetime(row.get::<_, String>(3)?),
        end_time: row.get::<_, Option<String>>(4)?.map(parse_datetime),
        duration_seconds: row.get::<_, Option<i64>>(5)?.map(|s| s as f64),
        is_billable: row.get(6)?,
        hourly_rate: row.get(7)?,
    })
}

fn parse_status(s: &str) -> ProjectStatus {
    s.parse().unwrap_or(ProjectStatus::Active)
}

fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
