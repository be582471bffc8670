//! SQLite-backed resource library.
//!
//! Every call opens its own connection, runs its statements and closes it
//! again. Mutations and their audit log entry share one transaction, so each
//! mutating call appends exactly one `user_logs` row.

use crate::error::StorageError;
use common::model::resource::{
    ActionLogEntry, Feedback, NewResource, Resource, ResourceKind, ResourceQuery, ResourceStats,
    ALL_FILTER, DEFAULT_QUALITY_SCORE,
};
use log::{info, warn};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::fs;
use std::path::{Path, PathBuf};

pub const ACTION_CREATE: &str = "CREATE";
pub const ACTION_DELETE: &str = "DELETE";
pub const ACTION_FEEDBACK: &str = "FEEDBACK";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS resources (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    type TEXT NOT NULL,
    category TEXT NOT NULL,
    content TEXT,
    file_path TEXT,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    tags TEXT,
    description TEXT,
    quality_score INTEGER DEFAULT 5
);
CREATE TABLE IF NOT EXISTS user_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    action TEXT NOT NULL,
    resource_id INTEGER,
    timestamp TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    details TEXT
);
CREATE TABLE IF NOT EXISTS user_feedback (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    resource_id INTEGER,
    rating INTEGER,
    comment TEXT,
    timestamp TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (resource_id) REFERENCES resources (id)
);
";

const RESOURCE_COLUMNS: &str = "id, title, type, category, content, file_path, created_at, \
                                tags, description, quality_score";

#[derive(Debug, Clone)]
pub struct ResourceStore {
    db_path: PathBuf,
}

impl ResourceStore {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn open(&self) -> Result<Connection, StorageError> {
        Ok(Connection::open(&self.db_path)?)
    }

    /// Create the tables if they do not exist yet.
    pub fn init(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        self.open()?.execute_batch(SCHEMA)?;
        info!("Resource database ready at {}", self.db_path.display());
        Ok(())
    }

    /// Insert a resource and return its id.
    pub fn save(&self, resource: &NewResource) -> Result<i64, StorageError> {
        let quality = validate(resource)?;
        let mut conn = self.open()?;
        let tx = conn.transaction()?;
        if let Some(file_path) = resource.file_path.as_deref().filter(|p| !p.trim().is_empty()) {
            let owner: Option<i64> = tx
                .query_row(
                    "SELECT id FROM resources WHERE file_path = ?1 LIMIT 1",
                    params![file_path],
                    |row| row.get(0),
                )
                .optional()?;
            if let Some(owner) = owner {
                return Err(StorageError::Validation(format!(
                    "{file_path} already belongs to resource {owner}"
                )));
            }
        }
        tx.execute(
            "INSERT INTO resources (title, type, category, content, file_path, tags, description, quality_score)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                resource.title.trim(),
                resource.resource_type.trim(),
                resource.category.trim(),
                resource.content,
                resource.file_path,
                resource.tags,
                resource.description,
                quality,
            ],
        )?;
        let id = tx.last_insert_rowid();
        insert_log(
            &tx,
            ACTION_CREATE,
            Some(id),
            &format!("Created {}: {}", resource.resource_type.trim(), resource.title.trim()),
        )?;
        tx.commit()?;
        info!("Saved resource {} '{}'", id, resource.title.trim());
        Ok(id)
    }

    /// Resources matching `query`, most recent first.
    ///
    /// The search term is matched as a literal substring of title, description
    /// or tags, ignoring case for any script. SQLite's `LIKE` and `lower()`
    /// only fold ASCII, so that part of the filter runs here.
    pub fn query(&self, query: &ResourceQuery) -> Result<Vec<Resource>, StorageError> {
        let mut sql = format!("SELECT {RESOURCE_COLUMNS} FROM resources WHERE 1=1");
        let mut values: Vec<String> = Vec::new();

        if let Some(category) = active_filter(query.category.as_deref()) {
            sql.push_str(" AND category = ?");
            values.push(category.to_string());
        }
        if let Some(resource_type) = active_filter(query.resource_type.as_deref()) {
            sql.push_str(" AND type = ?");
            values.push(resource_type.to_string());
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC");

        let conn = self.open()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), resource_from_row)?;
        let resources = rows.collect::<Result<Vec<_>, _>>()?;

        Ok(match active_filter(query.search.as_deref()) {
            Some(term) => {
                let term = term.to_lowercase();
                resources
                    .into_iter()
                    .filter(|r| matches_search(r, &term))
                    .collect()
            }
            None => resources,
        })
    }

    pub fn get(&self, id: i64) -> Result<Option<Resource>, StorageError> {
        let conn = self.open()?;
        let resource = conn
            .query_row(
                &format!("SELECT {RESOURCE_COLUMNS} FROM resources WHERE id = ?1"),
                params![id],
                resource_from_row,
            )
            .optional()?;
        Ok(resource)
    }

    /// Delete a resource, its feedback and its file on disk.
    ///
    /// The rows go first. A file that cannot be removed afterwards is only
    /// logged, so a failure never leaves a row pointing at a missing file.
    pub fn delete(&self, id: i64) -> Result<(), StorageError> {
        let resource = self.get(id)?.ok_or(StorageError::NotFound(id))?;

        let mut conn = self.open()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM user_feedback WHERE resource_id = ?1", params![id])?;
        tx.execute("DELETE FROM resources WHERE id = ?1", params![id])?;
        insert_log(
            &tx,
            ACTION_DELETE,
            Some(id),
            &format!("Deleted {}: {}", resource.resource_type, resource.title),
        )?;
        tx.commit()?;
        info!("Deleted resource {} '{}'", id, resource.title);

        if let Some(file_path) = resource.file_path.as_deref().filter(|p| !p.is_empty()) {
            let path = Path::new(file_path);
            if !path.exists() {
                warn!("File {} of resource {} is already gone", file_path, id);
            } else if let Err(e) = fs::remove_file(path) {
                warn!("Could not remove {} of resource {}: {}", file_path, id, e);
            }
        }
        Ok(())
    }

    /// Record a 1..=5 rating for an existing resource.
    pub fn add_feedback(
        &self,
        resource_id: i64,
        rating: u8,
        comment: &str,
    ) -> Result<i64, StorageError> {
        if !(1..=5).contains(&rating) {
            return Err(StorageError::Validation(
                "rating must be between 1 and 5".to_string(),
            ));
        }
        let mut conn = self.open()?;
        let tx = conn.transaction()?;
        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM resources WHERE id = ?1)",
            params![resource_id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(StorageError::NotFound(resource_id));
        }
        tx.execute(
            "INSERT INTO user_feedback (resource_id, rating, comment) VALUES (?1, ?2, ?3)",
            params![resource_id, rating, comment],
        )?;
        let id = tx.last_insert_rowid();
        insert_log(
            &tx,
            ACTION_FEEDBACK,
            Some(resource_id),
            &format!("Rated {rating}/5"),
        )?;
        tx.commit()?;
        Ok(id)
    }

    pub fn feedback(&self, resource_id: i64) -> Result<Vec<Feedback>, StorageError> {
        let conn = self.open()?;
        let mut stmt = conn.prepare(
            "SELECT id, resource_id, rating, comment, timestamp FROM user_feedback
             WHERE resource_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![resource_id], |row| {
            Ok(Feedback {
                id: row.get(0)?,
                resource_id: row.get(1)?,
                rating: row.get(2)?,
                comment: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                timestamp: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// The `limit` most recent log entries, newest first.
    pub fn recent_logs(&self, limit: usize) -> Result<Vec<ActionLogEntry>, StorageError> {
        let conn = self.open()?;
        let mut stmt = conn.prepare(
            "SELECT id, action, resource_id, timestamp, details FROM user_logs
             ORDER BY timestamp DESC, id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(ActionLogEntry {
                id: row.get(0)?,
                action: row.get(1)?,
                resource_id: row.get(2)?,
                timestamp: row.get(3)?,
                details: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn stats(&self) -> Result<ResourceStats, StorageError> {
        let conn = self.open()?;
        let total: i64 = conn.query_row("SELECT COUNT(*) FROM resources", [], |row| row.get(0))?;
        let average_quality: f64 = conn.query_row(
            "SELECT COALESCE(AVG(quality_score), 0.0) FROM resources",
            [],
            |row| row.get(0),
        )?;
        let by_type = grouped_counts(&conn, "type")?;
        let by_category = grouped_counts(&conn, "category")?;
        drop(conn);

        Ok(ResourceStats {
            total,
            by_type,
            by_category,
            average_quality,
            recent_logs: self.recent_logs(10)?,
        })
    }
}

fn validate(resource: &NewResource) -> Result<u8, StorageError> {
    for (field, value) in [
        ("title", &resource.title),
        ("type", &resource.resource_type),
        ("category", &resource.category),
    ] {
        if value.trim().is_empty() {
            return Err(StorageError::Validation(format!("{field} must not be empty")));
        }
    }

    let has = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.trim().is_empty());
    let problem = match ResourceKind::of(resource.resource_type.trim()) {
        ResourceKind::Text if !has(&resource.content) => Some("text resources need content"),
        ResourceKind::Text if has(&resource.file_path) => {
            Some("text resources cannot reference a file")
        }
        ResourceKind::Media if !has(&resource.file_path) => Some("media resources need a file path"),
        ResourceKind::Media if has(&resource.content) => {
            Some("media resources cannot carry inline content")
        }
        _ => None,
    };
    if let Some(problem) = problem {
        return Err(StorageError::Validation(problem.to_string()));
    }

    let quality = resource.quality_score.unwrap_or(DEFAULT_QUALITY_SCORE);
    if !(1..=5).contains(&quality) {
        return Err(StorageError::Validation(
            "quality score must be between 1 and 5".to_string(),
        ));
    }
    Ok(quality)
}

fn active_filter(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != ALL_FILTER)
}

/// `term` is already lowercased.
fn matches_search(resource: &Resource, term: &str) -> bool {
    [&resource.title, &resource.description, &resource.tags]
        .into_iter()
        .any(|field| field.to_lowercase().contains(term))
}

fn insert_log(
    conn: &Connection,
    action: &str,
    resource_id: Option<i64>,
    details: &str,
) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO user_logs (action, resource_id, details) VALUES (?1, ?2, ?3)",
        params![action, resource_id, details],
    )?;
    Ok(())
}

fn grouped_counts(conn: &Connection, column: &str) -> Result<Vec<(String, i64)>, StorageError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {column}, COUNT(*) FROM resources GROUP BY {column} ORDER BY {column}"
    ))?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

fn resource_from_row(row: &Row<'_>) -> rusqlite::Result<Resource> {
    Ok(Resource {
        id: row.get(0)?,
        title: row.get(1)?,
        resource_type: row.get(2)?,
        category: row.get(3)?,
        content: row.get(4)?,
        file_path: row.get(5)?,
        created_at: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
        tags: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
        description: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
        quality_score: row
            .get::<_, Option<u8>>(9)?
            .unwrap_or(DEFAULT_QUALITY_SCORE),
    })
}
