// SPDX-FileCopyrightText: 2026 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Smoke tests for quarry-store-db.
//!
//! These tests verify the schema and basic operations work correctly
//! using an in-memory database.

use std::time::{Duration, UNIX_EPOCH};

use quarry_core::RepoPath;
use quarry_store_db::{Error, IndexDb, LikePattern, NodeKind, NodeQuery, PropertyKey, ResultOrder};

fn path(p: &str) -> RepoPath {
    RepoPath::new("libs-local", p).unwrap()
}

fn at(secs: u64) -> std::time::SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs)
}

/// Verify schema creation and empty queries work.
#[test]
fn test_schema_creation() {
    let db = IndexDb::open_memory().unwrap();
    assert!(db.has_schema().unwrap());
    assert!(db.get_node(&path("a/b")).unwrap().is_none());
    assert!(db.execute_query(&NodeQuery::files()).unwrap().is_empty());
}

/// Verify file registration creates parent folders and roundtrips.
#[test]
fn test_put_file_roundtrip() {
    let mut db = IndexDb::open_memory().unwrap();
    let file = path("org/example/lib/1.0/lib-1.0.jar");
    let id = db.put_file(&file, at(1_000)).unwrap();
    assert!(id > 0);

    let node = db.get_node(&file).unwrap().unwrap();
    assert_eq!(node.id, id);
    assert_eq!(node.kind, NodeKind::File);
    assert_eq!(node.name, "lib-1.0.jar");
    assert_eq!(node.modified, at(1_000));

    // Parent folders materialized
    let folder = db.get_node(&path("org/example/lib/1.0")).unwrap().unwrap();
    assert_eq!(folder.kind, NodeKind::Folder);

    // Re-registering keeps the id and bumps the timestamp
    let id2 = db.put_file(&file, at(2_000)).unwrap();
    assert_eq!(id, id2);
    assert_eq!(db.get_node(&file).unwrap().unwrap().modified, at(2_000));
}

/// Verify child listing is name-ascending.
#[test]
fn test_list_children_ordering() {
    let mut db = IndexDb::open_memory().unwrap();
    db.put_file(&path("dir/b.jar"), at(1)).unwrap();
    db.put_file(&path("dir/a.jar"), at(2)).unwrap();
    db.put_file(&path("dir/c.jar"), at(3)).unwrap();

    let names: Vec<String> = db
        .list_children(&path("dir"))
        .unwrap()
        .into_iter()
        .map(|n| n.name)
        .collect();
    assert_eq!(names, vec!["a.jar", "b.jar", "c.jar"]);
}

/// Verify structured queries: scope, kind, patterns, limit.
#[test]
fn test_execute_query() {
    let mut db = IndexDb::open_memory().unwrap();
    db.put_file(&path("org/example/lib/1.0/lib-1.0.jar"), at(1)).unwrap();
    db.put_file(&path("org/example/lib/1.1/lib-1.1.jar"), at(2)).unwrap();
    db.put_file(&path("org/other/tool/2.0/tool-2.0.jar"), at(3)).unwrap();

    let hits = db
        .execute_query(
            &NodeQuery::files()
                .scoped_to(path("org/example"))
                .name_like(LikePattern::contains("lib")),
        )
        .unwrap();
    assert_eq!(hits.len(), 2);

    let limited = db
        .execute_query(&NodeQuery::files().in_repo("libs-local").limit(2))
        .unwrap();
    assert_eq!(limited.len(), 2);

    // IndexOrder follows insertion, not name
    let ordered = db
        .execute_query(&NodeQuery::files().order(ResultOrder::IndexOrder))
        .unwrap();
    assert_eq!(ordered[0].name, "lib-1.0.jar");
    assert_eq!(ordered[2].name, "tool-2.0.jar");
}

/// A streamed query stops reading rows once the visitor declines more.
#[test]
fn test_execute_query_streamed_stops_early() {
    let mut db = IndexDb::open_memory().unwrap();
    for name in ["a.jar", "b.jar", "c.jar"] {
        db.put_file(&path(&format!("dir/{name}")), at(1)).unwrap();
    }

    let mut seen = Vec::new();
    db.execute_query_streamed::<Error, _>(&NodeQuery::files(), |record| {
        seen.push(record.name);
        Ok(seen.len() < 2)
    })
    .unwrap();
    assert_eq!(seen, vec!["a.jar", "b.jar"]);
}

/// A pattern built from literal text never acts as a wildcard.
#[test]
fn test_like_literal_is_not_a_wildcard() {
    let mut db = IndexDb::open_memory().unwrap();
    db.put_file(&path("a/x_y.jar"), at(1)).unwrap();
    db.put_file(&path("a/xzy.jar"), at(2)).unwrap();

    let hits = db
        .execute_query(&NodeQuery::files().name_like(LikePattern::literal("x_y.jar")))
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "x_y.jar");
}

/// Verify multi-valued properties and the disjunctive property query.
#[test]
fn test_properties_and_property_query() {
    let mut db = IndexDb::open_memory().unwrap();
    let id = db.put_file(&path("a/lib.jar"), at(1)).unwrap();

    assert_eq!(db.get_property(id, PropertyKey::LatestBuild).unwrap(), None);
    db.add_property_value(id, PropertyKey::BuildArtifactChecksums, "sha1:aa").unwrap();
    db.add_property_value(id, PropertyKey::BuildArtifactChecksums, "md5:bb").unwrap();
    // Duplicate append is a no-op
    db.add_property_value(id, PropertyKey::BuildArtifactChecksums, "sha1:aa").unwrap();
    assert_eq!(
        db.get_property_values(id, PropertyKey::BuildArtifactChecksums).unwrap(),
        vec!["sha1:aa", "md5:bb"]
    );

    let hits = db
        .execute_query(
            &NodeQuery::files()
                .property_value(PropertyKey::BuildArtifactChecksums, "sha1:missing")
                .property_value(PropertyKey::BuildArtifactChecksums, "md5:bb"),
        )
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, id);
}

/// Verify recursive, idempotent deletion and descendant-file checks.
#[test]
fn test_delete_and_descendants() {
    let mut db = IndexDb::open_memory().unwrap();
    db.put_file(&path("m/1.0/a.jar"), at(1)).unwrap();
    db.put_file(&path("m/1.0/deep/b.jar"), at(2)).unwrap();
    db.put_folder(&path("m/empty"), at(3)).unwrap();

    assert!(db.has_descendant_files(&path("m")).unwrap());
    assert!(!db.has_descendant_files(&path("m/empty")).unwrap());

    let removed = db.delete_node(&path("m/1.0")).unwrap();
    assert!(removed >= 3);
    assert!(db.get_node(&path("m/1.0/a.jar")).unwrap().is_none());
    assert!(!db.has_descendant_files(&path("m")).unwrap());

    // Deleting again is a no-op
    assert_eq!(db.delete_node(&path("m/1.0")).unwrap(), 0);
}

/// Verify counter row operations.
#[test]
fn test_counters() {
    let db = IndexDb::open_memory().unwrap();
    assert_eq!(db.select_counter("general").unwrap(), None);
    db.insert_counter("general", 1).unwrap();
    assert_eq!(db.select_counter("general").unwrap(), Some(1));
    db.update_counter("general", 101).unwrap();
    assert_eq!(db.select_counter("general").unwrap(), Some(101));
    assert!(db.update_counter("missing", 5).is_err());
}

/// Verify a file-backed database can be created and reopened.
#[test]
fn test_open_create_and_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("index.sqlite");

    {
        let mut db = IndexDb::open(&db_path, quarry_store_db::OpenMode::Create).unwrap();
        db.put_file(&path("a/lib.jar"), at(1)).unwrap();
    }

    let db = IndexDb::open(&db_path, quarry_store_db::OpenMode::ReadOnly).unwrap();
    assert!(db.get_node(&path("a/lib.jar")).unwrap().is_some());
}

/// Verify archive entry rows cascade with their node.
#[test]
fn test_archive_entries() {
    let mut db = IndexDb::open_memory().unwrap();
    let id = db.put_file(&path("a/lib.jar"), at(1)).unwrap();
    db.insert_archive_entry(10, id, "META-INF/MANIFEST.MF").unwrap();
    db.insert_archive_entry(11, id, "com/example/App.class").unwrap();

    let entries = db.list_archive_entries(id).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id, 10);

    db.delete_node(&path("a/lib.jar")).unwrap();
    assert!(db.list_archive_entries(id).unwrap().is_empty());
}
