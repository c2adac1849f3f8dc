// SPDX-FileCopyrightText: 2026 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Read query operations for the metadata index.

use rusqlite::params;
use rusqlite::types::Value;

use quarry_core::RepoPath;

use crate::connection::IndexDb;
use crate::error::{Error, Result};
use crate::pattern::LikePattern;
use crate::types::{ArchiveEntryRecord, NodeKind, NodeRecord, PropertyKey, unix_to_system_time};

/// Result ordering of a structured query.
///
/// Both orderings appear in deployments: name-ascending for stable listing,
/// index order (insertion order) as the store's native "relevance". The
/// engine never re-sorts on top of this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultOrder {
    #[default]
    NameAscending,
    IndexOrder,
}

/// A structured query expression over the node index.
///
/// Built by search engines from user criteria; renders to a single
/// parameterized SQL statement. Free-form SQL never leaves this module.
#[derive(Debug, Clone)]
pub struct NodeQuery {
    repo: Option<String>,
    scope: Option<RepoPath>,
    kind: Option<NodeKind>,
    name_patterns: Vec<LikePattern>,
    path_pattern: Option<LikePattern>,
    property_any: Vec<(PropertyKey, String)>,
    order: ResultOrder,
    limit: Option<usize>,
}

impl NodeQuery {
    /// Query matching file nodes.
    pub fn files() -> Self {
        Self {
            repo: None,
            scope: None,
            kind: Some(NodeKind::File),
            name_patterns: Vec::new(),
            path_pattern: None,
            property_any: Vec::new(),
            order: ResultOrder::default(),
            limit: None,
        }
    }

    /// Query matching any node kind.
    pub fn any_kind() -> Self {
        Self {
            kind: None,
            ..Self::files()
        }
    }

    /// Restrict to one repository.
    pub fn in_repo(mut self, repo_key: &str) -> Self {
        self.repo = Some(repo_key.to_owned());
        self
    }

    /// Restrict to the subtree rooted at `scope` (inclusive).
    pub fn scoped_to(mut self, scope: RepoPath) -> Self {
        self.repo = Some(scope.repo_key().to_owned());
        self.scope = Some(scope);
        self
    }

    /// Add a conjunctive name pattern.
    pub fn name_like(mut self, pattern: LikePattern) -> Self {
        self.name_patterns.push(pattern);
        self
    }

    /// Match the repo-relative path against a pattern.
    pub fn path_like(mut self, pattern: LikePattern) -> Self {
        self.path_pattern = Some(pattern);
        self
    }

    /// Add a disjunctive exact property term.
    pub fn property_value(mut self, key: PropertyKey, value: &str) -> Self {
        self.property_any.push((key, value.to_owned()));
        self
    }

    pub fn order(mut self, order: ResultOrder) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn render(&self) -> (String, Vec<Value>) {
        let mut sql = String::from(
            "SELECT DISTINCT n.id, n.repo, n.path, n.name, n.kind, n.modified FROM Nodes n",
        );
        let mut params: Vec<Value> = Vec::new();

        if !self.property_any.is_empty() {
            sql.push_str(" JOIN NodeProps p ON p.node = n.id");
        }
        sql.push_str(" WHERE 1=1");

        if let Some(repo) = &self.repo {
            sql.push_str(" AND n.repo = ?");
            params.push(repo.clone().into());
        }
        if let Some(scope) = &self.scope
            && !scope.is_root()
        {
            sql.push_str(" AND (n.path = ? OR substr(n.path, 1, ?) = ?)");
            let prefix = format!("{}/", scope.path());
            params.push(scope.path().to_owned().into());
            params.push((prefix.len() as i64).into());
            params.push(prefix.into());
        }
        if let Some(kind) = self.kind {
            sql.push_str(" AND n.kind = ?");
            params.push(kind.to_db().into());
        }
        for pattern in &self.name_patterns {
            if pattern.matches_everything() {
                continue;
            }
            sql.push_str(" AND n.name LIKE ? ESCAPE '\\'");
            params.push(pattern.as_sql().to_owned().into());
        }
        if let Some(pattern) = &self.path_pattern
            && !pattern.matches_everything()
        {
            sql.push_str(" AND n.path LIKE ? ESCAPE '\\'");
            params.push(pattern.as_sql().to_owned().into());
        }
        if !self.property_any.is_empty() {
            let terms: Vec<&str> = self
                .property_any
                .iter()
                .map(|_| "(p.key = ? AND p.value = ?)")
                .collect();
            sql.push_str(&format!(" AND ({})", terms.join(" OR ")));
            for (key, value) in &self.property_any {
                params.push(key.as_str().to_owned().into());
                params.push(value.clone().into());
            }
        }

        match self.order {
            ResultOrder::NameAscending => sql.push_str(" ORDER BY n.name ASC, n.id ASC"),
            ResultOrder::IndexOrder => sql.push_str(" ORDER BY n.id ASC"),
        }
        if let Some(limit) = self.limit {
            sql.push_str(" LIMIT ?");
            params.push((limit as i64).into());
        }

        (sql, params)
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<(i64, String, String, String, i64, i64)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn record_from_raw(raw: (i64, String, String, String, i64, i64)) -> Result<NodeRecord> {
    let (id, repo, path, name, kind, modified) = raw;
    let repo_path = RepoPath::new(&repo, &path)
        .map_err(|e| Error::CorruptRow(format!("node {id}: {e}")))?;
    let kind = NodeKind::from_db(kind)
        .ok_or_else(|| Error::CorruptRow(format!("node {id}: unknown kind {kind}")))?;
    Ok(NodeRecord {
        id,
        repo_path,
        name,
        kind,
        modified: unix_to_system_time(modified),
    })
}

impl IndexDb {
    /// Look up a single node. `None` when the path has no row - absence is
    /// an expected outcome, not an error.
    pub fn get_node(&self, path: &RepoPath) -> Result<Option<NodeRecord>> {
        let mut stmt = self.conn.prepare_cached(
            r#"
            SELECT id, repo, path, name, kind, modified
            FROM Nodes
            WHERE repo = ?1 AND path = ?2
            "#,
        )?;
        let raw = stmt.query_row(params![path.repo_key(), path.path()], row_to_record);
        match raw {
            Ok(raw) => Ok(Some(record_from_raw(raw)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Direct children of a folder, name-ascending.
    pub fn list_children(&self, parent: &RepoPath) -> Result<Vec<NodeRecord>> {
        let mut stmt = self.conn.prepare_cached(
            r#"
            SELECT id, repo, path, name, kind, modified
            FROM Nodes
            WHERE repo = ?1 AND parent = ?2
            ORDER BY name ASC
            "#,
        )?;
        let mut rows = stmt.query(params![parent.repo_key(), parent.path()])?;
        let mut children = Vec::new();
        while let Some(row) = rows.next()? {
            children.push(record_from_raw(row_to_record(row)?)?);
        }
        Ok(children)
    }

    /// Whether any file exists strictly below `path`.
    pub fn has_descendant_files(&self, path: &RepoPath) -> Result<bool> {
        let mut stmt = self.conn.prepare_cached(
            r#"
            SELECT 1 FROM Nodes
            WHERE repo = ?1 AND kind = 1 AND substr(path, 1, ?2) = ?3
            LIMIT 1
            "#,
        )?;
        let prefix = if path.is_root() {
            String::new()
        } else {
            format!("{}/", path.path())
        };
        let exists = stmt
            .query_row(
                params![path.repo_key(), prefix.len() as i64, prefix],
                |_| Ok(()),
            )
            .is_ok();
        Ok(exists)
    }

    /// Execute a structured query, materializing every matching row.
    pub fn execute_query(&self, query: &NodeQuery) -> Result<Vec<NodeRecord>> {
        let mut records = Vec::new();
        self.execute_query_streamed(query, |record| {
            records.push(record);
            Ok::<_, Error>(true)
        })?;
        Ok(records)
    }

    /// Execute a structured query, streaming rows to `visit` one at a
    /// time. The scan stops when `visit` returns `false`; rows past that
    /// point are never read from the database.
    pub fn execute_query_streamed<E, F>(
        &self,
        query: &NodeQuery,
        mut visit: F,
    ) -> std::result::Result<(), E>
    where
        E: From<Error>,
        F: FnMut(NodeRecord) -> std::result::Result<bool, E>,
    {
        let (sql, values) = query.render();
        let mut stmt = self.conn.prepare(&sql).map_err(Error::from)?;
        let mut rows = stmt
            .query(rusqlite::params_from_iter(values))
            .map_err(Error::from)?;
        loop {
            let Some(row) = rows.next().map_err(Error::from)? else {
                break;
            };
            let record = record_from_raw(row_to_record(row).map_err(Error::from)?)?;
            if !visit(record)? {
                break;
            }
        }
        Ok(())
    }

    /// First value of a property, `None` when absent.
    pub fn get_property(&self, node_id: i64, key: PropertyKey) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT value FROM NodeProps WHERE node = ?1 AND key = ?2 ORDER BY rowid LIMIT 1",
        )?;
        let value = stmt
            .query_row(params![node_id, key.as_str()], |row| row.get(0))
            .map(Some);
        match value {
            Ok(v) => Ok(v),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All values of a multi-valued property, in insertion order.
    pub fn get_property_values(&self, node_id: i64, key: PropertyKey) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT value FROM NodeProps WHERE node = ?1 AND key = ?2 ORDER BY rowid",
        )?;
        let mut rows = stmt.query(params![node_id, key.as_str()])?;
        let mut values = Vec::new();
        while let Some(row) = rows.next()? {
            values.push(row.get(0)?);
        }
        Ok(values)
    }

    /// Read a persisted unique-id counter row.
    pub fn select_counter(&self, id_type: &str) -> Result<Option<i64>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT currentId FROM UniqueIds WHERE idType = ?1")?;
        let value = stmt.query_row(params![id_type], |row| row.get(0)).map(Some);
        match value {
            Ok(v) => Ok(v),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Archive entry rows of a node, in id order.
    pub fn list_archive_entries(&self, node_id: i64) -> Result<Vec<ArchiveEntryRecord>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, node, name FROM ArchiveEntries WHERE node = ?1 ORDER BY id",
        )?;
        let mut rows = stmt.query(params![node_id])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(ArchiveEntryRecord {
                id: row.get(0)?,
                node_id: row.get(1)?,
                name: row.get(2)?,
            });
        }
        Ok(entries)
    }
}
