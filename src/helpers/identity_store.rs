use std::collections::HashMap;
use std::path::{Path, PathBuf};
use log::{debug, error, info};
use thiserror::Error;

/// File name of the identity database inside the data directory
pub const IDENTITY_DB_FILE: &str = "identities.db";

/// Error types for the identity store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to create directory {0:?}: {1}")]
    Directory(PathBuf, std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Identity store is closed")]
    Closed,
}

/// Persistent mapping from chat nickname to Last.fm user name, stored in SQLite.
///
/// Writes are buffered and only reach the database on [`IdentityStore::flush`],
/// which the host calls periodically and on shutdown. Reads see buffered writes.
pub struct IdentityStore {
    /// Path to the database file
    db_path: PathBuf,
    /// SQLite database connection, `None` once closed
    db: Option<rusqlite::Connection>,
    /// Writes not yet flushed; `None` marks a removal
    pending: HashMap<String, Option<String>>,
}

impl IdentityStore {
    /// Open (or create) the identity database in the given directory
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StoreError> {
        let db_dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&db_dir).map_err(|e| StoreError::Directory(db_dir.clone(), e))?;

        let db_path = db_dir.join(IDENTITY_DB_FILE);
        let conn = rusqlite::Connection::open(&db_path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS identities (
                nick TEXT PRIMARY KEY,
                username TEXT NOT NULL
            )",
            [],
        )?;
        info!("Opened identity database at {:?}", db_path);

        Ok(IdentityStore {
            db_path,
            db: Some(conn),
            pending: HashMap::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    pub fn is_open(&self) -> bool {
        self.db.is_some()
    }

    /// Number of writes waiting for the next flush
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn connection(&self) -> Result<&rusqlite::Connection, StoreError> {
        self.db.as_ref().ok_or(StoreError::Closed)
    }

    /// Look up the Last.fm user name stored for a nickname
    pub fn get(&self, nick: &str) -> Result<Option<String>, StoreError> {
        let conn = self.connection()?;

        if let Some(buffered) = self.pending.get(nick) {
            return Ok(buffered.clone());
        }

        let mut stmt = conn.prepare_cached("SELECT username FROM identities WHERE nick = ?1")?;
        match stmt.query_row(rusqlite::params![nick], |row| row.get::<_, String>(0)) {
            Ok(username) => Ok(Some(username)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Store the Last.fm user name for a nickname. An empty name clears the mapping.
    pub fn set(&mut self, nick: &str, username: &str) -> Result<(), StoreError> {
        self.connection()?;

        let username = username.trim();
        if username.is_empty() {
            debug!("Empty Last.fm ID for {}, clearing mapping", nick);
            self.pending.insert(nick.to_string(), None);
        } else {
            debug!("Mapping {} to Last.fm ID {}", nick, username);
            self.pending.insert(nick.to_string(), Some(username.to_string()));
        }
        Ok(())
    }

    /// Remove the mapping for a nickname, returns whether one existed
    pub fn remove(&mut self, nick: &str) -> Result<bool, StoreError> {
        let existed = self.get(nick)?.is_some();
        self.pending.insert(nick.to_string(), None);
        Ok(existed)
    }

    /// Write all buffered changes to the database, returns how many were written.
    ///
    /// Safe to call at any time and any number of times.
    pub fn flush(&mut self) -> Result<usize, StoreError> {
        let conn = self.db.as_mut().ok_or(StoreError::Closed)?;
        if self.pending.is_empty() {
            return Ok(0);
        }

        let tx = conn.transaction()?;
        for (nick, username) in &self.pending {
            match username {
                Some(username) => {
                    tx.execute(
                        "INSERT OR REPLACE INTO identities (nick, username) VALUES (?1, ?2)",
                        rusqlite::params![nick, username],
                    )?;
                }
                None => {
                    tx.execute("DELETE FROM identities WHERE nick = ?1", rusqlite::params![nick])?;
                }
            }
        }
        tx.commit()?;

        let written = self.pending.len();
        self.pending.clear();
        debug!("Flushed {} identity changes to {:?}", written, self.db_path);
        Ok(written)
    }

    /// Flush and release the database. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<(), StoreError> {
        if self.db.is_none() {
            return Ok(());
        }
        self.flush()?;
        if let Some(conn) = self.db.take() {
            conn.close().map_err(|(_, e)| StoreError::Database(e))?;
        }
        info!("Closed identity database at {:?}", self.db_path);
        Ok(())
    }

    /// All stored mappings, including unflushed ones, sorted by nickname
    pub fn entries(&self) -> Result<Vec<(String, String)>, StoreError> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare("SELECT nick, username FROM identities")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        let mut merged: HashMap<String, String> = HashMap::new();
        for row in rows {
            let (nick, username) = row?;
            merged.insert(nick, username);
        }
        for (nick, username) in &self.pending {
            match username {
                Some(username) => {
                    merged.insert(nick.clone(), username.clone());
                }
                None => {
                    merged.remove(nick);
                }
            }
        }

        let mut entries: Vec<(String, String)> = merged.into_iter().collect();
        entries.sort();
        Ok(entries)
    }
}

impl Drop for IdentityStore {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            error!("Failed to close identity database at {:?}: {}", self.db_path, e);
        }
    }
}
