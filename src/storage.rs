use anyhow::{bail, Context, Result};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

use crate::data::TableSpec;

/// Single-file SQLite store rebuilt wholesale by every ETL run.
pub struct SupplyStore {
    conn: Connection,
    path: PathBuf,
}

impl SupplyStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open store {}", path.display()))?;
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Opens an existing store without creating it.
    pub fn open_existing(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!(
                "store not found: {} (run `etl` first to build it)",
                path.display()
            );
        }
        Self::open(path)
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Drop-and-recreate `spec.name`, then insert every row in one transaction.
    pub fn replace_table(&mut self, spec: &TableSpec, rows: &[Vec<Value>]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS \"{}\"; {};",
            spec.name,
            spec.create_sql()
        ))
        .with_context(|| format!("failed to recreate table `{}`", spec.name))?;
        {
            let mut stmt = tx.prepare(&spec.insert_sql())?;
            for row in rows {
                stmt.execute(params_from_iter(row.iter()))
                    .with_context(|| format!("failed to insert into `{}`", spec.name))?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }

    pub fn table_exists(&self, name: &str) -> Result<bool> {
        let found: Option<String> = self
            .conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Missing tables mean the ETL stage has not run against this store.
    pub fn require_table(&self, name: &str) -> Result<()> {
        if !self.table_exists(name)? {
            bail!(
                "table `{}` not found in {} (run `etl` first)",
                name,
                self.path.display()
            );
        }
        Ok(())
    }

    pub fn row_count(&self, name: &str) -> Result<u64> {
        self.require_table(name)?;
        let n: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM \"{}\"", name), [], |row| {
                row.get(0)
            })?;
        Ok(n as u64)
    }

    /// `(column, declared type)` pairs in table order.
    pub fn columns(&self, name: &str) -> Result<Vec<(String, String)>> {
        self.require_table(name)?;
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info(\"{}\")", name))?;
        let cols = stmt
            .query_map([], |row| Ok((row.get::<_, String>(1)?, row.get::<_, String>(2)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(cols)
    }
}
