// SPDX-FileCopyrightText: 2026 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! End-to-end scenarios through the service facade.

use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use quarry::{CancellationFlag, Config, GavcCriteria, RepoPath, RepositoryService};
use quarry_store_db::{IndexDb, PropertyKey};

const CONFIG: &str = r#"
id_step = 50

[[repositories]]
key = "libs-local"
kind = "local"
snapshot_policy = "unique"
max_unique_snapshots = 1
"#;

fn service(config: &str) -> (RepositoryService, Arc<Mutex<IndexDb>>) {
    let config = Config::parse(config).unwrap();
    let db = Arc::new(Mutex::new(IndexDb::open_memory().unwrap()));
    let service = RepositoryService::new(&config, db.clone()).unwrap();
    (service, db)
}

fn at(secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs)
}

fn path(repo: &str, p: &str) -> RepoPath {
    RepoPath::new(repo, p).unwrap()
}

/// Deploying a second unique snapshot to a repository that retains one
/// evicts the first, and a `-SNAPSHOT` request resolves to the survivor.
#[test]
fn test_snapshot_deploy_cleanup_resolve() {
    let (service, db) = service(CONFIG);
    let module = "org/example/lib/1.0-SNAPSHOT";
    let old_jar = path("libs-local", &format!("{module}/lib-1.0-20230101.120000-1.jar"));
    let new_jar = path("libs-local", &format!("{module}/lib-1.0-20230101.130000-2.jar"));
    {
        let mut db = db.lock().unwrap();
        let old_sha1 = path("libs-local", &format!("{module}/lib-1.0-20230101.120000-1.jar.sha1"));
        let new_sha1 = path("libs-local", &format!("{module}/lib-1.0-20230101.130000-2.jar.sha1"));
        db.put_file(&old_jar, at(1_000)).unwrap();
        db.put_file(&old_sha1, at(1_000)).unwrap();
        db.put_file(&new_jar, at(2_000)).unwrap();
        db.put_file(&new_sha1, at(2_000)).unwrap();
    }

    let stats = service
        .run_integration_cleanup("libs-local", &CancellationFlag::new())
        .unwrap();
    assert_eq!(stats.evicted_groups, 1);
    assert_eq!(stats.deleted_items, 2);

    {
        let db = db.lock().unwrap();
        assert!(db.get_node(&old_jar).unwrap().is_none());
        assert!(db.get_node(&new_jar).unwrap().is_some());
    }

    let request = path("libs-local", &format!("{module}/lib-1.0-SNAPSHOT.jar"));
    let resolved = service.resolve_snapshot_request(&request).unwrap();
    assert_eq!(resolved, new_jar);

    // Cleanup at the retention limit is idempotent
    let again = service
        .run_integration_cleanup("libs-local", &CancellationFlag::new())
        .unwrap();
    assert_eq!(again.evicted_groups, 0);
}

#[test]
fn test_search_through_facade() {
    let (service, db) = service(CONFIG);
    {
        let mut db = db.lock().unwrap();
        db.put_file(&path("libs-local", "org/example/app/1.0/app-1.0.jar"), at(10)).unwrap();
        db.put_file(&path("libs-local", "org/example/app/1.0/app-1.0.jar.sha1"), at(10)).unwrap();
        db.put_file(&path("libs-local", "org/other/tool/2.0/tool-2.0.jar"), at(20)).unwrap();
        // Not in the configured registry, must never surface
        db.put_file(&path("stale-repo", "org/example/app/1.0/app-1.0.jar"), at(30)).unwrap();
    }

    let by_name = service.search_artifacts_by_name("app", 10).unwrap();
    assert_eq!(by_name.matches.len(), 1);
    assert_eq!(
        by_name.matches[0].path,
        path("libs-local", "org/example/app/1.0/app-1.0.jar")
    );
    assert!(!by_name.truncated);

    let by_gavc = service
        .search_artifacts_by_coordinates(&GavcCriteria {
            group: "org.example".into(),
            artifact: "app".into(),
            version: String::new(),
            classifier: String::new(),
        })
        .unwrap();
    assert_eq!(by_gavc.matches.len(), 1);
    assert_eq!(by_gavc.matches[0].coordinates.module, "app");
}

/// The configured search order reaches the engine: index order returns
/// insertion order, not name order.
#[test]
fn test_search_order_is_configurable() {
    let config = format!("search_order = \"index-order\"\n{CONFIG}");
    let (service, db) = service(&config);
    {
        let mut db = db.lock().unwrap();
        db.put_file(&path("libs-local", "org/example/zzz/1.0/zzz-1.0.jar"), at(1)).unwrap();
        db.put_file(&path("libs-local", "org/example/aaa/1.0/aaa-1.0.jar"), at(2)).unwrap();
    }

    let result = service.search_artifacts_by_name("1.0", 10).unwrap();
    let names: Vec<&str> = result.matches.iter().map(|m| m.path.name()).collect();
    assert_eq!(names, vec!["zzz-1.0.jar", "aaa-1.0.jar"]);
}

#[test]
fn test_build_searches_through_facade() {
    let (service, db) = service(CONFIG);
    let run = |name: &str, number: &str, started: &str| {
        path("build-info", &format!("builds/{name}/{number}/{started}"))
    };
    {
        let mut db = db.lock().unwrap();
        let first = db.put_folder(&run("app", "1", "1700000000000"), at(1)).unwrap();
        db.put_folder(&run("app", "2", "1700000100000"), at(2)).unwrap();
        db.put_folder(&run("web", "9", "1700000050000"), at(3)).unwrap();
        db.add_property_value(
            first,
            PropertyKey::BuildArtifactChecksums,
            "sha1:356a192b7913b04c54574d18c28d46e6395428ab",
        )
        .unwrap();
    }

    let latest = service.latest_builds_by_name().unwrap();
    assert_eq!(latest.len(), 2);
    let app = latest.iter().find(|r| r.name == "app").unwrap();
    assert_eq!(app.number, "2");

    // Checksum input is normalized before matching
    let producers = service
        .find_builds_by_artifact_checksum("356A192B7913B04C54574D18C28D46E6395428AB", "")
        .unwrap();
    assert_eq!(producers.len(), 1);
    assert_eq!(producers[0].number, "1");

    let none = service.find_builds_by_artifact_checksum("", "").unwrap();
    assert!(none.is_empty());
}

#[test]
fn test_next_id_is_unique_and_increasing() {
    let (service, _db) = service(CONFIG);
    let first = service.next_id().unwrap();
    let second = service.next_id().unwrap();
    assert!(second > first);
}
