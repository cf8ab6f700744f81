//! SQLite-backed key-value store for editor slots and preferences

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::path::Path;

/// Preference key holding the OpenAI API key
pub const OPEN_AI_API_KEY_NAME: &str = "openai_api_key";

/// Preference key holding the Perplexity API key
pub const PERPLEXITY_API_KEY_NAME: &str = "perplexity_api_key";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS slots (
    name TEXT PRIMARY KEY,
    content TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS prefs (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";

/// Stored slot metadata
#[derive(Debug, Clone)]
pub struct SlotInfo {
    pub name: String,
    pub bytes: usize,
    pub updated_at: Option<DateTime<Utc>>,
}

pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (and create if needed) the database at `path`
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory {:?}", parent))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database {:?}", path))?;
        Self::init(conn)
    }

    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)
            .context("Failed to initialize database schema")?;
        Ok(Self { conn })
    }

    /// Content of a slot, if it was ever written
    pub fn slot(&self, name: &str) -> Result<Option<String>> {
        self.conn
            .query_row("SELECT content FROM slots WHERE name = ?1", [name], |row| {
                row.get(0)
            })
            .optional()
            .with_context(|| format!("Failed to read slot '{}'", name))
    }

    pub fn set_slot(&self, name: &str, content: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO slots (name, content, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(name) DO UPDATE SET content = excluded.content, updated_at = excluded.updated_at",
                params![name, content, Utc::now().to_rfc3339()],
            )
            .with_context(|| format!("Failed to write slot '{}'", name))?;
        Ok(())
    }

    /// Remove a slot. Returns whether it existed.
    pub fn delete_slot(&self, name: &str) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM slots WHERE name = ?1", [name])
            .with_context(|| format!("Failed to delete slot '{}'", name))?;
        Ok(removed > 0)
    }

    pub fn slots(&self) -> Result<Vec<SlotInfo>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, length(CAST(content AS BLOB)), updated_at FROM slots ORDER BY name")?;

        let rows = stmt.query_map([], |row| {
            let name: String = row.get(0)?;
            let bytes: i64 = row.get(1)?;
            let updated: String = row.get(2)?;
            Ok((name, bytes, updated))
        })?;

        let mut slots = Vec::new();
        for row in rows {
            let (name, bytes, updated) = row.context("Failed to read slot row")?;
            slots.push(SlotInfo {
                name,
                bytes: bytes.max(0) as usize,
                updated_at: DateTime::parse_from_rfc3339(&updated)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc)),
            });
        }
        Ok(slots)
    }

    /// Typed accessor for one preference key
    pub fn pref<T>(&self, key: &'static str) -> Pref<'_, T> {
        Pref {
            store: self,
            key,
            _marker: PhantomData,
        }
    }

    fn raw_pref(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM prefs WHERE key = ?1", [key], |row| row.get(0))
            .optional()
            .with_context(|| format!("Failed to read preference '{}'", key))
    }

    fn set_raw_pref(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO prefs (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .with_context(|| format!("Failed to write preference '{}'", key))?;
        Ok(())
    }
}

/// A preference value stored as JSON under a fixed key
pub struct Pref<'a, T> {
    store: &'a Store,
    key: &'static str,
    _marker: PhantomData<T>,
}

impl<T: Serialize + DeserializeOwned> Pref<'_, T> {
    pub fn get(&self) -> Result<Option<T>> {
        match self.store.raw_pref(self.key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .with_context(|| format!("Preference '{}' holds invalid data", self.key)),
            None => Ok(None),
        }
    }

    pub fn set(&self, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)
            .with_context(|| format!("Failed to serialize preference '{}'", self.key))?;
        self.store.set_raw_pref(self.key, &raw)
    }
}
