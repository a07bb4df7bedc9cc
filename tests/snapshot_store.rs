//! Snapshot store behavior tests
//!
//! Cover history retention counts, live-file freshness, mtime-based pruning
//! order, and the never-fail capture contract.

use chrono::{DateTime, Local, TimeZone};
use std::fs;
use std::time::{Duration, SystemTime};
use tempfile::tempdir;

use pommel::SnapshotStore;

/// Fixed capture times, one second apart, so history filenames never collide
fn at(second: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 5, 17, 12, 0, second).unwrap()
}

#[test]
fn history_count_is_min_of_captures_and_retention() {
    let dir = tempdir().unwrap();
    let store = SnapshotStore::new(dir.path());

    assert!(store.history("Page").unwrap().is_empty());

    for k in 0..5u32 {
        store.capture_at("Page", &format!("v{}", k), 2, at(k));
        let expected = std::cmp::min(k as usize + 1, 2);
        assert_eq!(
            store.history("Page").unwrap().len(),
            expected,
            "after {} captures",
            k + 1
        );
    }
}

#[test]
fn live_file_always_holds_latest_content() {
    let dir = tempdir().unwrap();
    let store = SnapshotStore::new(dir.path());

    store.capture_at("Page", "first", 0, at(0));
    assert_eq!(store.read_live("Page").unwrap().unwrap(), "first");

    store.capture_at("Page", "second", 0, at(1));
    assert_eq!(store.read_live("Page").unwrap().unwrap(), "second");
}

#[test]
fn three_captures_keep_two_newest_history_entries() {
    let dir = tempdir().unwrap();
    let store = SnapshotStore::new(dir.path());

    store.capture_at("PageA", "<html>v1</html>", 2, at(0));
    store.capture_at("PageA", "<html>v2</html>", 2, at(1));
    store.capture_at("PageA", "<html>v3</html>", 2, at(2));

    assert_eq!(store.read_live("PageA").unwrap().unwrap(), "<html>v3</html>");

    let history = store.history("PageA").unwrap();
    assert_eq!(history.len(), 2);

    let names: Vec<String> = history
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert!(names.contains(&"PageA_20240517_120001.html".to_string()));
    assert!(names.contains(&"PageA_20240517_120002.html".to_string()));

    let contents: Vec<String> = history
        .iter()
        .map(|p| fs::read_to_string(p).unwrap())
        .collect();
    assert!(contents.contains(&"<html>v2</html>".to_string()));
    assert!(contents.contains(&"<html>v3</html>".to_string()));
}

#[test]
fn retention_zero_keeps_no_history() {
    let dir = tempdir().unwrap();
    let store = SnapshotStore::new(dir.path());

    store.capture_at("PageB", "x", 0, at(0));

    assert_eq!(store.read_live("PageB").unwrap().unwrap(), "x");
    assert!(store.history("PageB").unwrap().is_empty());
    // The history directory itself still exists
    assert!(dir.path().join("history").is_dir());
}

#[test]
fn same_second_captures_share_one_history_entry() {
    let dir = tempdir().unwrap();
    let store = SnapshotStore::new(dir.path());

    // Identical timestamps produce identical history filenames; the later
    // capture silently overwrites the earlier one
    store.capture_at("Page", "early", 5, at(0));
    store.capture_at("Page", "late", 5, at(0));

    let history = store.history("Page").unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(
        history[0].file_name().unwrap().to_string_lossy(),
        "Page_20240517_120000.html"
    );
    assert_eq!(fs::read_to_string(&history[0]).unwrap(), "late");
    assert_eq!(store.read_live("Page").unwrap().unwrap(), "late");
}

#[test]
fn pruning_orders_by_mtime_not_filename() {
    let dir = tempdir().unwrap();
    let store = SnapshotStore::new(dir.path());

    store.capture_at("Page", "v1", 10, at(0));
    store.capture_at("Page", "v2", 10, at(1));
    store.capture_at("Page", "v3", 10, at(2));

    // Touch the oldest-named entry so it is the most recently modified
    let oldest = dir.path().join("history/Page_20240517_120000.html");
    let file = fs::File::options().write(true).open(&oldest).unwrap();
    file.set_modified(SystemTime::now() + Duration::from_secs(600))
        .unwrap();
    drop(file);

    store.capture_at("Page", "v4", 2, at(3));

    let names: Vec<String> = store
        .history("Page")
        .unwrap()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();

    assert_eq!(names.len(), 2);
    // The touched file survives despite carrying the oldest timestamp in its
    // name; the v2/v3 entries are pruned ahead of it.
    assert!(names.contains(&"Page_20240517_120000.html".to_string()));
    assert!(names.contains(&"Page_20240517_120003.html".to_string()));
}

#[test]
fn subjects_are_pruned_independently() {
    let dir = tempdir().unwrap();
    let store = SnapshotStore::new(dir.path());

    store.capture_at("PageA", "a1", 2, at(0));
    store.capture_at("PageA", "a2", 2, at(1));
    store.capture_at("PageB", "b1", 2, at(2));

    store.capture_at("PageA", "a3", 0, at(3));

    assert!(store.history("PageA").unwrap().is_empty());
    assert_eq!(store.history("PageB").unwrap().len(), 1);
    assert_eq!(store.read_live("PageB").unwrap().unwrap(), "b1");
}

#[test]
fn capture_into_unwritable_root_does_not_fail() {
    let dir = tempdir().unwrap();

    // A root nested under a regular file cannot be created on any platform,
    // regardless of the user the tests run as
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();

    let store = SnapshotStore::new(blocker.join("page_snapshots"));
    store.capture("Page", "<html></html>", 2);

    assert!(!blocker.join("page_snapshots").exists());
}

#[test]
fn read_live_missing_subject_is_none() {
    let dir = tempdir().unwrap();
    let store = SnapshotStore::new(dir.path());
    assert!(store.read_live("NeverCaptured").unwrap().is_none());
}
