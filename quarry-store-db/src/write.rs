// SPDX-FileCopyrightText: 2026 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Write operations for the metadata index.
//!
//! Deploy events and background sweeps funnel through these; the search
//! engines themselves are read-only.

use std::time::SystemTime;

use rusqlite::params;
use tracing::debug;

use quarry_core::RepoPath;

use crate::connection::IndexDb;
use crate::error::{Error, Result};
use crate::types::{NodeKind, PropertyKey, system_time_to_unix};

impl IndexDb {
    /// Register a file node, creating missing parent folders.
    ///
    /// Re-registering an existing path updates its modification time and
    /// keeps the row id (and therefore its properties).
    pub fn put_file(
        &mut self,
        path: &RepoPath,
        modified: SystemTime,
    ) -> Result<i64> {
        let tx = self.conn.transaction()?;
        insert_parents(&tx, path)?;
        upsert_node(&tx, path, NodeKind::File, modified)?;
        let id = node_id(&tx, path)?;
        tx.commit()?;
        Ok(id)
    }

    /// Register a folder node, creating missing parent folders.
    pub fn put_folder(&mut self, path: &RepoPath, modified: SystemTime) -> Result<i64> {
        let tx = self.conn.transaction()?;
        insert_parents(&tx, path)?;
        upsert_node(&tx, path, NodeKind::Folder, modified)?;
        let id = node_id(&tx, path)?;
        tx.commit()?;
        Ok(id)
    }

    /// Delete a node and everything beneath it.
    ///
    /// Idempotent: deleting an absent path removes zero rows and is not an
    /// error, which lets concurrent cleanup passes race safely.
    pub fn delete_node(&self, path: &RepoPath) -> Result<usize> {
        let rows = if path.is_root() {
            self.conn.execute(
                "DELETE FROM Nodes WHERE repo = ?1",
                params![path.repo_key()],
            )?
        } else {
            let prefix = format!("{}/", path.path());
            self.conn.execute(
                r#"
                DELETE FROM Nodes
                WHERE repo = ?1 AND (path = ?2 OR substr(path, 1, ?3) = ?4)
                "#,
                params![path.repo_key(), path.path(), prefix.len() as i64, prefix],
            )?
        };
        if rows > 0 {
            debug!("deleted {rows} node(s) under {path}");
        }
        Ok(rows)
    }

    /// Replace all values of a property with a single value.
    pub fn set_property(&self, node_id: i64, key: PropertyKey, value: &str) -> Result<()> {
        self.conn.execute(
            "DELETE FROM NodeProps WHERE node = ?1 AND key = ?2",
            params![node_id, key.as_str()],
        )?;
        self.conn.execute(
            "INSERT INTO NodeProps (node, key, value) VALUES (?1, ?2, ?3)",
            params![node_id, key.as_str(), value],
        )?;
        Ok(())
    }

    /// Append one value to a multi-valued property, skipping duplicates.
    pub fn add_property_value(&self, node_id: i64, key: PropertyKey, value: &str) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO NodeProps (node, key, value)
            SELECT ?1, ?2, ?3
            WHERE NOT EXISTS (
                SELECT 1 FROM NodeProps WHERE node = ?1 AND key = ?2 AND value = ?3
            )
            "#,
            params![node_id, key.as_str(), value],
        )?;
        Ok(())
    }

    /// Drop all values of a property.
    pub fn remove_property(&self, node_id: i64, key: PropertyKey) -> Result<()> {
        self.conn.execute(
            "DELETE FROM NodeProps WHERE node = ?1 AND key = ?2",
            params![node_id, key.as_str()],
        )?;
        Ok(())
    }

    /// Seed a unique-id counter row.
    pub fn insert_counter(&self, id_type: &str, value: i64) -> Result<()> {
        self.conn.execute(
            "INSERT INTO UniqueIds (idType, currentId) VALUES (?1, ?2)",
            params![id_type, value],
        )?;
        Ok(())
    }

    /// Persist a new high-water mark with a single atomic UPDATE.
    pub fn update_counter(&self, id_type: &str, value: i64) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE UniqueIds SET currentId = ?2 WHERE idType = ?1",
            params![id_type, value],
        )?;
        if rows == 0 {
            return Err(Error::CorruptRow(format!(
                "missing unique-id counter row '{id_type}'"
            )));
        }
        Ok(())
    }

    /// Insert an archive entry row with an allocator-minted id.
    pub fn insert_archive_entry(&self, entry_id: i64, node_id: i64, name: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO ArchiveEntries (id, node, name) VALUES (?1, ?2, ?3)",
            params![entry_id, node_id, name],
        )?;
        Ok(())
    }

    /// Drop all archive entry rows of a node (before a re-index).
    pub fn clear_archive_entries(&self, node_id: i64) -> Result<()> {
        self.conn.execute(
            "DELETE FROM ArchiveEntries WHERE node = ?1",
            params![node_id],
        )?;
        Ok(())
    }
}

fn insert_parents(tx: &rusqlite::Transaction<'_>, path: &RepoPath) -> Result<()> {
    let mut ancestors = Vec::new();
    let mut cursor = path.parent();
    while let Some(folder) = cursor {
        if folder.is_root() {
            break;
        }
        cursor = folder.parent();
        ancestors.push(folder);
    }
    // Root-first so parents exist before children
    for folder in ancestors.iter().rev() {
        tx.execute(
            r#"
            INSERT OR IGNORE INTO Nodes (repo, parent, path, name, kind, modified)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                folder.repo_key(),
                folder.parent().map(|p| p.path().to_owned()).unwrap_or_default(),
                folder.path(),
                folder.name(),
                NodeKind::Folder.to_db(),
                system_time_to_unix(SystemTime::now()),
            ],
        )?;
    }
    Ok(())
}

fn upsert_node(
    tx: &rusqlite::Transaction<'_>,
    path: &RepoPath,
    kind: NodeKind,
    modified: SystemTime,
) -> Result<()> {
    tx.execute(
        r#"
        INSERT INTO Nodes (repo, parent, path, name, kind, modified)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT (repo, path) DO UPDATE SET modified = excluded.modified
        "#,
        params![
            path.repo_key(),
            path.parent().map(|p| p.path().to_owned()).unwrap_or_default(),
            path.path(),
            path.name(),
            kind.to_db(),
            system_time_to_unix(modified),
        ],
    )?;
    Ok(())
}

fn node_id(tx: &rusqlite::Transaction<'_>, path: &RepoPath) -> Result<i64> {
    let id = tx.query_row(
        "SELECT id FROM Nodes WHERE repo = ?1 AND path = ?2",
        params![path.repo_key(), path.path()],
        |row| row.get(0),
    )?;
    Ok(id)
}
