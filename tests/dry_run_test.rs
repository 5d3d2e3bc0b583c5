//! Integration tests for dry-run imports
//!
//! A dry run prints every bulk request it would send and never touches the
//! store, for every supported input format.

mod common;

use common::MemoryStore;
use ferry::core::encoding;
use ferry::core::import::{ImportCoordinator, ImportOptions};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::sync::watch;

async fn dry_run(options: ImportOptions, output: &Path) -> (ferry::core::summary::RunSummary, String) {
    let store = Arc::new(MemoryStore::unreachable());
    let (_tx, rx) = watch::channel(false);

    let summary = ImportCoordinator::new(options, store.clone(), rx)
        .with_dry_run_output(Box::new(std::fs::File::create(output).unwrap()))
        .execute()
        .await
        .unwrap();

    assert_eq!(store.pings.load(Ordering::SeqCst), 0);
    assert_eq!(store.bulk_count(), 0);
    (summary, std::fs::read_to_string(output).unwrap())
}

#[tokio::test]
async fn test_csv_rows_become_documents() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("people.csv");
    std::fs::write(&input, "name,age\nAnn,31\nBob,unknown\nCid\n").unwrap();

    let mut options = ImportOptions::new(&input, "people");
    options.dry_run = true;
    options.id_field = Some("name".to_string());

    let (summary, printed) = dry_run(options, &dir.path().join("out.txt")).await;

    let lines: Vec<&str> = printed.lines().collect();
    assert_eq!(lines[0], "POST /people/_bulk");
    assert_eq!(lines[1], r#"{"index":{"_index":"people","_id":"Ann"}}"#);
    assert_eq!(lines[2], r#"{"name":"Ann","age":31}"#);
    assert_eq!(lines[4], r#"{"name":"Bob","age":"unknown"}"#);

    // The short row is rejected before anything is printed for it
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.failures[0].ordinal, 4);
    assert_eq!(summary.exit_code(), 0);
}

#[tokio::test]
async fn test_gzip_input_with_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("docs.jsonl.gz");
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(b"{\"a\":1}\n{\"a\":2}\n").unwrap();
    std::fs::write(&input, encoder.finish().unwrap()).unwrap();

    let mut options = ImportOptions::new(&input, "docs");
    options.dry_run = true;
    options.pipeline = Some("geoip".to_string());

    let (summary, printed) = dry_run(options, &dir.path().join("out.txt")).await;

    assert!(printed.starts_with("POST /docs/_bulk?pipeline=geoip\n"));
    assert!(printed.contains("{\"a\":2}\n"));
    assert_eq!(summary.skipped, 2);
}

#[tokio::test]
async fn test_chunks_print_one_request_each() {
    let (dir, input) = common::numbered_jsonl(5);

    let mut options = ImportOptions::new(&input, "docs");
    options.dry_run = true;
    options.chunk_size = 2;

    let (summary, printed) = dry_run(options, &dir.path().join("out.txt")).await;

    assert_eq!(printed.matches("POST /docs/_bulk").count(), 3);
    assert_eq!(summary.chunks, 3);
    assert_eq!(summary.skipped, 5);
}

#[tokio::test]
async fn test_latin1_input_is_decoded() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("names.jsonl");
    std::fs::write(&input, b"{\"name\":\"Jos\xe9\"}\n").unwrap();

    let mut options = ImportOptions::new(&input, "docs");
    options.dry_run = true;
    options.encoding = encoding::resolve("latin1").unwrap();

    let (_, printed) = dry_run(options, &dir.path().join("out.txt")).await;
    assert!(printed.contains("{\"name\":\"José\"}"));
}

#[tokio::test]
async fn test_passthrough_output_is_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("actions.jsonl");
    std::fs::write(
        &input,
        "{\"index\":{\"_index\":\"docs\",\"_type\":\"_doc\",\"_id\":\"1\"}}\n{\"a\":1}\n",
    )
    .unwrap();

    let mut options = ImportOptions::new(&input, "docs");
    options.dry_run = true;
    options.generate_action = false;

    let (summary, printed) = dry_run(options, &dir.path().join("out.txt")).await;

    let lines: Vec<&str> = printed.lines().collect();
    assert_eq!(lines[1], r#"{"index":{"_index":"docs","_id":"1"}}"#);
    assert_eq!(lines[2], r#"{"a":1}"#);
    assert_eq!(summary.skipped, 2);
}

#[tokio::test]
async fn test_repeated_dry_runs_print_identical_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("people.csv");
    std::fs::write(
        &input,
        "name,city,zip\nAnn,Oslo,0150\nBob,Bergen,5003\n\nCid,Tromsø,9008\nDee\n",
    )
    .unwrap();

    let options = || {
        let mut options = ImportOptions::new(&input, "people");
        options.dry_run = true;
        options.chunk_size = 2;
        options.id_field = Some("name".to_string());
        options.pipeline = Some("normalize".to_string());
        options
    };

    let first_out = dir.path().join("first.txt");
    let second_out = dir.path().join("second.txt");
    let (first, _) = dry_run(options(), &first_out).await;
    let (second, _) = dry_run(options(), &second_out).await;

    let first_bytes = std::fs::read(&first_out).unwrap();
    assert!(!first_bytes.is_empty());
    assert_eq!(first_bytes, std::fs::read(&second_out).unwrap());

    assert_eq!(first.chunks, second.chunks);
    assert_eq!(first.skipped, second.skipped);
    assert_eq!(first.failed, second.failed);
}

#[tokio::test]
async fn test_blank_csv_rows_are_reported_as_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("people.csv");
    std::fs::write(&input, "name,zip\nAnn,00501\n\n\nBob,10001\n").unwrap();

    let mut options = ImportOptions::new(&input, "people");
    options.dry_run = true;

    let (summary, printed) = dry_run(options, &dir.path().join("out.txt")).await;

    assert!(printed.contains(r#"{"name":"Ann","zip":"00501"}"#));
    assert!(printed.contains(r#"{"name":"Bob","zip":10001}"#));
    // Two printed rows plus two blank lines
    assert_eq!(summary.skipped, 4);
    assert_eq!(summary.failed, 0);
}
