//! Persistence behaviour of `DedupStore` across separate opens of the same file.

use std::collections::HashSet;

use adbrief_store::DedupStore;

#[test]
fn reload_after_commit_contains_old_and_new_ids() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("posted_ads.json");

    let mut first = DedupStore::open(&path).expect("open empty store");
    first.commit(["ad-1", "ad-2"]).expect("first commit");

    let mut second = DedupStore::open(&path).expect("reopen store");
    second.commit(vec!["ad-3".to_string()]).expect("second commit");

    let reloaded = DedupStore::open(&path).expect("reload store");
    let expected: HashSet<String> = ["ad-1", "ad-2", "ad-3"]
        .into_iter()
        .map(str::to_string)
        .collect();
    assert!(
        expected.is_subset(reloaded.posted_ids()),
        "reloaded set {:?} is missing committed ids",
        reloaded.posted_ids()
    );
}

#[test]
fn committing_known_ids_keeps_set_size() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("posted_ads.json");

    let mut store = DedupStore::open(&path).unwrap();
    store.commit(["ad-1"]).unwrap();
    let added = store.commit(["ad-1"]).unwrap();

    assert_eq!(added, 0);
    assert_eq!(DedupStore::open(&path).unwrap().len(), 1);
}

#[test]
fn reads_record_written_by_earlier_tooling() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("posted_ads.json");
    std::fs::write(
        &path,
        "{\n  \"posted_ad_ids\": [\n    \"legacy-1\",\n    \"legacy-2\"\n  ],\n  \"last_updated\": \"2026-09-30T09:00:00.000001+00:00\"\n}",
    )
    .unwrap();

    let store = DedupStore::open(&path).expect("legacy record parses");
    assert!(store.contains("legacy-1"));
    assert!(store.contains("legacy-2"));
    assert_eq!(store.len(), 2);
}
