//! Durable cache backend on top of `redb`.

use crate::error::Result;
use crate::LocalCache;
use redb::{Database, ReadableTable, TableDefinition};
use std::path::{Path, PathBuf};
use tracing::debug;

const ENTRIES: TableDefinition<&str, &str> = TableDefinition::new("entries");

/// Single-file cache. Each call runs in its own transaction, so a
/// successful `set` is durable when it returns.
pub struct RedbCache {
    db: Database,
    path: PathBuf,
}

impl RedbCache {
    /// Open the cache at `path`, creating the file and parent directories
    /// if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db = Database::create(&path)?;

        // Create the table up front so read transactions never see it missing
        let txn = db.begin_write()?;
        txn.open_table(ENTRIES)?;
        txn.commit()?;

        debug!(path = %path.display(), "Opened local cache");

        Ok(Self { db, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LocalCache for RedbCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(ENTRIES)?;
        let value = table.get(key)?.map(|guard| guard.value().to_string());
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(ENTRIES)?;
            table.insert(key, value)?;
        }
        txn.commit()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(ENTRIES)?;
            table.remove(key)?;
        }
        txn.commit()?;
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(ENTRIES)?;

        let mut keys = Vec::new();
        for entry in table.iter()? {
            let (key, _) = entry?;
            keys.push(key.value().to_string());
        }
        Ok(keys)
    }
}
