use std::path::Path;

use rusqlite::{params, Connection};

use crate::model::Domain;
use crate::search::normalize_for_search;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS entry (
    domain TEXT NOT NULL,
    path TEXT NOT NULL,
    name TEXT NOT NULL,
    PRIMARY KEY (domain, path)
)";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// One crawled application or file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub name: String,
    pub path: String,
    normalized_name: String,
}

impl IndexEntry {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        let name = name.into();
        let normalized_name = normalize_for_search(&name);
        Self {
            name,
            path: path.into(),
            normalized_name,
        }
    }

    pub fn normalized_name(&self) -> &str {
        &self.normalized_name
    }
}

fn domain_key(domain: Domain) -> &'static str {
    match domain {
        Domain::Applications => "applications",
        Domain::Files => "files",
        Domain::Assistant => "assistant",
    }
}

pub fn open_memory() -> Result<Connection, StoreError> {
    let conn = Connection::open_in_memory()?;
    conn.execute(SCHEMA, [])?;
    Ok(conn)
}

pub fn open_file(path: &Path) -> Result<Connection, StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(path)?;
    conn.execute(SCHEMA, [])?;
    Ok(conn)
}

/// Swaps a domain's rows for `entries` in one transaction.
pub fn replace_domain(
    db: &mut Connection,
    domain: Domain,
    entries: &[IndexEntry],
) -> Result<usize, StoreError> {
    let key = domain_key(domain);
    let tx = db.transaction()?;
    tx.execute("DELETE FROM entry WHERE domain = ?1", params![key])?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO entry (domain, path, name) VALUES (?1, ?2, ?3)
             ON CONFLICT(domain, path) DO UPDATE SET name=excluded.name",
        )?;
        for entry in entries {
            stmt.execute(params![key, entry.path, entry.name])?;
        }
    }
    tx.commit()?;
    count_domain(db, domain)
}

pub fn list_domain(db: &Connection, domain: Domain) -> Result<Vec<IndexEntry>, StoreError> {
    let mut stmt = db.prepare("SELECT name, path FROM entry WHERE domain = ?1 ORDER BY rowid")?;
    let rows = stmt.query_map(params![domain_key(domain)], |row| {
        Ok(IndexEntry::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut entries = Vec::new();
    for row in rows {
        entries.push(row?);
    }
    Ok(entries)
}

pub fn count_domain(db: &Connection, domain: Domain) -> Result<usize, StoreError> {
    let count: i64 = db.query_row(
        "SELECT COUNT(*) FROM entry WHERE domain = ?1",
        params![domain_key(domain)],
        |row| row.get(0),
    )?;
    Ok(usize::try_from(count).unwrap_or(0))
}
