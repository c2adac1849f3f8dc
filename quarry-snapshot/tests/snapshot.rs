// SPDX-FileCopyrightText: 2026 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Snapshot resolution and integration cleanup against an in-memory index.

use std::time::{Duration, UNIX_EPOCH};

use quarry_core::{
    CancellationFlag, RepoDescriptor, RepoKind, RepoPath, RepoRegistry, SnapshotPolicy,
};
use quarry_snapshot::{IntegrationCleaner, SnapshotVersionResolver};
use quarry_store_db::IndexDb;

fn registry(max_unique_snapshots: u32) -> RepoRegistry {
    RepoRegistry::new([
        RepoDescriptor {
            key: "libs-unique".into(),
            kind: RepoKind::Local,
            snapshot_policy: SnapshotPolicy::Unique,
            max_unique_snapshots,
        },
        RepoDescriptor {
            key: "libs-deployer".into(),
            kind: RepoKind::Local,
            snapshot_policy: SnapshotPolicy::Deployer,
            max_unique_snapshots,
        },
        RepoDescriptor {
            key: "libs-nonunique".into(),
            kind: RepoKind::Local,
            snapshot_policy: SnapshotPolicy::NonUnique,
            max_unique_snapshots,
        },
        RepoDescriptor {
            key: "remote-cache".into(),
            kind: RepoKind::Cache,
            snapshot_policy: SnapshotPolicy::Unique,
            max_unique_snapshots,
        },
    ])
}

fn deploy(db: &mut IndexDb, repo: &str, path: &str, secs: u64) -> RepoPath {
    let p = RepoPath::new(repo, path).unwrap();
    db.put_file(&p, UNIX_EPOCH + Duration::from_secs(secs)).unwrap();
    p
}

fn request(repo: &str, path: &str) -> RepoPath {
    RepoPath::new(repo, path).unwrap()
}

/// Version-ordering policy picks the greatest unique revision regardless
/// of timestamps or scan order.
#[test]
fn test_unique_policy_picks_greatest_revision() {
    let mut db = IndexDb::open_memory().unwrap();
    // The older build number carries the newer modified time
    deploy(
        &mut db,
        "libs-unique",
        "org/example/lib/1.0-SNAPSHOT/lib-1.0-20230101.010101-1.jar",
        900,
    );
    deploy(
        &mut db,
        "libs-unique",
        "org/example/lib/1.0-SNAPSHOT/lib-1.0-20230101.020202-2.jar",
        100,
    );

    let registry = registry(0);
    let resolver = SnapshotVersionResolver::new(&db, &registry);
    let resolved = resolver
        .resolve(&request(
            "libs-unique",
            "org/example/lib/1.0-SNAPSHOT/lib-1.0-SNAPSHOT.jar",
        ))
        .unwrap();
    assert_eq!(
        resolved.path(),
        "org/example/lib/1.0-SNAPSHOT/lib-1.0-20230101.020202-2.jar"
    );
}

/// DEPLOYER policy picks the greatest last-modified and is idempotent.
#[test]
fn test_deployer_policy_picks_latest_modified() {
    let mut db = IndexDb::open_memory().unwrap();
    deploy(
        &mut db,
        "libs-deployer",
        "org/example/lib/1.0-SNAPSHOT/lib-1.0-20230101.010101-1.jar",
        100,
    );
    deploy(
        &mut db,
        "libs-deployer",
        "org/example/lib/1.0-SNAPSHOT/lib-1.0-20230101.020202-2.jar",
        200,
    );
    deploy(
        &mut db,
        "libs-deployer",
        "org/example/lib/1.0-SNAPSHOT/lib-1.0-20230101.005959-3.jar",
        300,
    );

    let registry = registry(0);
    let resolver = SnapshotVersionResolver::new(&db, &registry);
    let req = request(
        "libs-deployer",
        "org/example/lib/1.0-SNAPSHOT/lib-1.0-SNAPSHOT.jar",
    );
    let expected = "org/example/lib/1.0-SNAPSHOT/lib-1.0-20230101.005959-3.jar";
    for _ in 0..3 {
        assert_eq!(resolver.resolve(&req).unwrap().path(), expected);
    }
}

#[test]
fn test_resolution_respects_module_identity() {
    let mut db = IndexDb::open_memory().unwrap();
    deploy(
        &mut db,
        "libs-unique",
        "org/example/lib/1.0-SNAPSHOT/lib-1.0-20230101.010101-1.jar",
        100,
    );
    // Different classifier and different extension never resolve a plain
    // jar request
    deploy(
        &mut db,
        "libs-unique",
        "org/example/lib/1.0-SNAPSHOT/lib-1.0-20230102.020202-2-sources.jar",
        200,
    );
    deploy(
        &mut db,
        "libs-unique",
        "org/example/lib/1.0-SNAPSHOT/lib-1.0-20230103.030303-3.pom",
        300,
    );

    let registry = registry(0);
    let resolver = SnapshotVersionResolver::new(&db, &registry);
    let resolved = resolver
        .resolve(&request(
            "libs-unique",
            "org/example/lib/1.0-SNAPSHOT/lib-1.0-SNAPSHOT.jar",
        ))
        .unwrap();
    assert_eq!(
        resolved.path(),
        "org/example/lib/1.0-SNAPSHOT/lib-1.0-20230101.010101-1.jar"
    );
}

#[test]
fn test_metadata_request_resolves_artifact_and_reapplies_suffix() {
    let mut db = IndexDb::open_memory().unwrap();
    deploy(
        &mut db,
        "libs-unique",
        "org/example/lib/1.0-SNAPSHOT/lib-1.0-20230101.010101-1.jar",
        100,
    );

    let registry = registry(0);
    let resolver = SnapshotVersionResolver::new(&db, &registry);
    let resolved = resolver
        .resolve(&request(
            "libs-unique",
            "org/example/lib/1.0-SNAPSHOT/lib-1.0-SNAPSHOT.jar.maven-metadata.xml",
        ))
        .unwrap();
    assert_eq!(
        resolved.path(),
        "org/example/lib/1.0-SNAPSHOT/lib-1.0-20230101.010101-1.jar.maven-metadata.xml"
    );
}

/// No resolution for non-local repositories, NONUNIQUE policy, or when
/// nothing matches: the original request comes back unchanged.
#[test]
fn test_no_resolution_returns_original() {
    let mut db = IndexDb::open_memory().unwrap();
    for repo in ["libs-nonunique", "remote-cache"] {
        deploy(
            &mut db,
            repo,
            "org/example/lib/1.0-SNAPSHOT/lib-1.0-20230101.010101-1.jar",
            100,
        );
    }

    let registry = registry(0);
    let resolver = SnapshotVersionResolver::new(&db, &registry);
    for repo in ["libs-nonunique", "remote-cache", "libs-unique"] {
        let req = request(repo, "org/example/lib/1.0-SNAPSHOT/lib-1.0-SNAPSHOT.jar");
        assert_eq!(resolver.resolve(&req).unwrap(), req, "repo {repo}");
    }
    // Unknown repository key
    let req = request("gone", "org/example/lib/1.0-SNAPSHOT/lib-1.0-SNAPSHOT.jar");
    assert_eq!(resolver.resolve(&req).unwrap(), req);
}

fn snapshot_file(rev: &str, suffix: &str) -> String {
    format!("org/example/lib/1.0-SNAPSHOT/lib-1.0-{rev}{suffix}")
}

/// Retention invariant: after a pass at most `max_unique_snapshots` groups
/// remain, and a second pass with no new deploys is a no-op.
#[test]
fn test_cleanup_retention_and_idempotency() {
    let mut db = IndexDb::open_memory().unwrap();
    let revisions = ["20230101.010101-1", "20230102.020202-2", "20230103.030303-3"];
    let mut last = None;
    for (i, rev) in revisions.iter().enumerate() {
        deploy(&mut db, "libs-unique", &snapshot_file(rev, ".jar"), i as u64);
        deploy(&mut db, "libs-unique", &snapshot_file(rev, ".jar.sha1"), i as u64);
        last = Some(deploy(
            &mut db,
            "libs-unique",
            &snapshot_file(rev, ".pom"),
            i as u64,
        ));
    }
    deploy(
        &mut db,
        "libs-unique",
        "org/example/lib/1.0-SNAPSHOT/maven-metadata.xml",
        9,
    );

    let registry = registry(2);
    let cleaner = IntegrationCleaner::new(&db, &registry);
    let cancel = CancellationFlag::default();
    let stats = cleaner
        .clean_for_artifact(last.as_ref().unwrap(), &cancel)
        .unwrap();
    assert_eq!(stats.evicted_groups, 1);
    assert_eq!(stats.deleted_items, 3);

    // Oldest group gone, sidecars included; newer groups and module
    // metadata untouched
    let exists = |p: &str| db.get_node(&request("libs-unique", p)).unwrap().is_some();
    assert!(!exists(&snapshot_file("20230101.010101-1", ".jar")));
    assert!(!exists(&snapshot_file("20230101.010101-1", ".jar.sha1")));
    assert!(exists(&snapshot_file("20230102.020202-2", ".jar")));
    assert!(exists(&snapshot_file("20230103.030303-3", ".jar")));
    assert!(exists("org/example/lib/1.0-SNAPSHOT/maven-metadata.xml"));

    let again = cleaner.clean_for_artifact(&last.unwrap(), &cancel).unwrap();
    assert_eq!(again, Default::default());
}

/// Folder-per-deployment layout: the evicted deployment's folder is
/// removed once it holds no files.
#[test]
fn test_cleanup_removes_empty_integration_folder() {
    let mut db = IndexDb::open_memory().unwrap();
    deploy(
        &mut db,
        "libs-unique",
        "org/example/lib/1.0-20230101.010101-1/lib-1.0-20230101.010101-1.jar",
        100,
    );
    let latest = deploy(
        &mut db,
        "libs-unique",
        "org/example/lib/1.0-20230102.020202-2/lib-1.0-20230102.020202-2.jar",
        200,
    );

    let registry = registry(1);
    let cleaner = IntegrationCleaner::new(&db, &registry);
    let stats = cleaner
        .clean_for_artifact(&latest, &CancellationFlag::default())
        .unwrap();
    assert_eq!(stats.evicted_groups, 1);
    assert_eq!(stats.deleted_folders, 1);

    let old_folder = request("libs-unique", "org/example/lib/1.0-20230101.010101-1");
    assert!(db.get_node(&old_folder).unwrap().is_none());
    assert!(db
        .get_node(&request("libs-unique", "org/example/lib"))
        .unwrap()
        .is_some());
}

/// A folder with a file anywhere beneath it is never deleted, even when
/// its group was evicted.
#[test]
fn test_cleanup_never_deletes_folder_with_descendant_files() {
    let mut db = IndexDb::open_memory().unwrap();
    deploy(
        &mut db,
        "libs-unique",
        "org/example/lib/1.0-20230101.010101-1/lib-1.0-20230101.010101-1.jar",
        100,
    );
    deploy(
        &mut db,
        "libs-unique",
        "org/example/lib/1.0-20230101.010101-1/extra/keep.txt",
        150,
    );
    let latest = deploy(
        &mut db,
        "libs-unique",
        "org/example/lib/1.0-20230102.020202-2/lib-1.0-20230102.020202-2.jar",
        200,
    );

    let registry = registry(1);
    let cleaner = IntegrationCleaner::new(&db, &registry);
    let stats = cleaner
        .clean_for_artifact(&latest, &CancellationFlag::default())
        .unwrap();
    assert_eq!(stats.evicted_groups, 1);
    assert_eq!(stats.deleted_folders, 0);

    let old_folder = request("libs-unique", "org/example/lib/1.0-20230101.010101-1");
    assert!(db.get_node(&old_folder).unwrap().is_some());
    assert!(db
        .get_node(&request(
            "libs-unique",
            "org/example/lib/1.0-20230101.010101-1/extra/keep.txt"
        ))
        .unwrap()
        .is_some());
    // The evicted jar itself is gone
    assert!(db
        .get_node(&request(
            "libs-unique",
            "org/example/lib/1.0-20230101.010101-1/lib-1.0-20230101.010101-1.jar"
        ))
        .unwrap()
        .is_none());
}

#[test]
fn test_cleanup_checks_cancellation_between_groups() {
    let mut db = IndexDb::open_memory().unwrap();
    let mut last = None;
    for (i, rev) in ["20230101.010101-1", "20230102.020202-2", "20230103.030303-3"]
        .iter()
        .enumerate()
    {
        last = Some(deploy(
            &mut db,
            "libs-unique",
            &snapshot_file(rev, ".jar"),
            i as u64,
        ));
    }

    let registry = registry(1);
    let cleaner = IntegrationCleaner::new(&db, &registry);
    let cancel = CancellationFlag::default();
    cancel.cancel();
    let stats = cleaner.clean_for_artifact(&last.unwrap(), &cancel).unwrap();
    assert_eq!(stats, Default::default());
    // Everything still present for the next scheduled run
    for rev in ["20230101.010101-1", "20230102.020202-2", "20230103.030303-3"] {
        assert!(db
            .get_node(&request("libs-unique", &snapshot_file(rev, ".jar")))
            .unwrap()
            .is_some());
    }
}

/// Repository-wide cleanup covers every integration module, not just the
/// one an artifact-created event points at.
#[test]
fn test_repository_cleanup_covers_all_modules() {
    let mut db = IndexDb::open_memory().unwrap();
    for module in ["lib", "app"] {
        for (i, rev) in ["20230101.010101-1", "20230102.020202-2"].iter().enumerate() {
            deploy(
                &mut db,
                "libs-unique",
                &format!("org/example/{module}/1.0-SNAPSHOT/{module}-1.0-{rev}.jar"),
                i as u64,
            );
        }
    }
    // Release versions are never touched
    deploy(&mut db, "libs-unique", "org/example/lib/2.0/lib-2.0.jar", 9);

    let registry = registry(1);
    let cleaner = IntegrationCleaner::new(&db, &registry);
    let stats = cleaner
        .clean_repository("libs-unique", &CancellationFlag::default())
        .unwrap();
    assert_eq!(stats.evicted_groups, 2);

    let exists = |p: &str| db.get_node(&request("libs-unique", p)).unwrap().is_some();
    assert!(!exists("org/example/lib/1.0-SNAPSHOT/lib-1.0-20230101.010101-1.jar"));
    assert!(exists("org/example/lib/1.0-SNAPSHOT/lib-1.0-20230102.020202-2.jar"));
    assert!(!exists("org/example/app/1.0-SNAPSHOT/app-1.0-20230101.010101-1.jar"));
    assert!(exists("org/example/app/1.0-SNAPSHOT/app-1.0-20230102.020202-2.jar"));
    assert!(exists("org/example/lib/2.0/lib-2.0.jar"));

    // Unknown repositories are a no-op
    let none = cleaner
        .clean_repository("gone", &CancellationFlag::default())
        .unwrap();
    assert_eq!(none, Default::default());
}

#[test]
fn test_cleanup_noop_without_retention_limit_or_local_repo() {
    let mut db = IndexDb::open_memory().unwrap();
    let a = deploy(
        &mut db,
        "libs-unique",
        &snapshot_file("20230101.010101-1", ".jar"),
        100,
    );
    let b = deploy(
        &mut db,
        "remote-cache",
        &snapshot_file("20230101.010101-1", ".jar"),
        100,
    );

    // max_unique_snapshots == 0 disables cleanup
    let registry = registry(0);
    let cleaner = IntegrationCleaner::new(&db, &registry);
    let cancel = CancellationFlag::default();
    assert_eq!(cleaner.clean_for_artifact(&a, &cancel).unwrap(), Default::default());
    // Cache repositories are never cleaned
    let registry = self::registry(1);
    let cleaner = IntegrationCleaner::new(&db, &registry);
    assert_eq!(cleaner.clean_for_artifact(&b, &cancel).unwrap(), Default::default());
}
