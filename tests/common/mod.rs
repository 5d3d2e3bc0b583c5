//! In-process document store shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use ferry::adapters::store::{BulkItemStatus, DocumentStore, ScrollPage, StoreResult};
use ferry::domain::StoreError;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::watch;

type Responder = Box<dyn Fn(&Value, usize) -> BulkItemStatus + Send + Sync>;

/// One recorded `_bulk` call
#[derive(Debug, Clone)]
pub struct BulkCall {
    pub index: String,
    pub pipeline: Option<String>,
    pub body: String,
}

impl BulkCall {
    /// Number of items in the request body
    pub fn items(&self) -> usize {
        parse_items(&self.body).len()
    }
}

/// Store double that answers bulk and scroll calls from memory
pub struct MemoryStore {
    responder: Responder,
    unreachable: bool,
    hits: Vec<Value>,
    cursor: AtomicUsize,
    page_size: AtomicUsize,
    shutdown_after_bulk: Mutex<Option<watch::Sender<bool>>>,
    pub bulk_calls: Mutex<Vec<BulkCall>>,
    pub pings: AtomicUsize,
    pub fetches: AtomicUsize,
    pub cleared: AtomicUsize,
}

impl MemoryStore {
    /// Accept every item
    pub fn accepting() -> Self {
        Self::responding(|_, _| BulkItemStatus::ok(201))
    }

    /// Answer each item with `responder(document, call_number)`
    ///
    /// `call_number` counts bulk calls from 0; resubmissions are new calls.
    pub fn responding(
        responder: impl Fn(&Value, usize) -> BulkItemStatus + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            unreachable: false,
            hits: Vec::new(),
            cursor: AtomicUsize::new(0),
            page_size: AtomicUsize::new(0),
            shutdown_after_bulk: Mutex::new(None),
            bulk_calls: Mutex::new(Vec::new()),
            pings: AtomicUsize::new(0),
            fetches: AtomicUsize::new(0),
            cleared: AtomicUsize::new(0),
        }
    }

    /// Serve `count` hits of the form `{"_id": "<n>", "_source": {"n": n}}`
    pub fn with_hits(count: usize) -> Self {
        let mut store = Self::accepting();
        store.hits = (1..=count)
            .map(|n| json!({"_index": "docs", "_id": n.to_string(), "_source": {"n": n}}))
            .collect();
        store
    }

    /// Refuse every connection
    pub fn unreachable() -> Self {
        let mut store = Self::accepting();
        store.unreachable = true;
        store
    }

    /// Raise the shutdown flag once the first bulk call is answered
    pub fn shutdown_after_first_bulk(self, sender: watch::Sender<bool>) -> Self {
        *self.shutdown_after_bulk.lock().unwrap() = Some(sender);
        self
    }

    pub fn bulk_count(&self) -> usize {
        self.bulk_calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<BulkCall> {
        self.bulk_calls.lock().unwrap().clone()
    }

    fn check_reachable(&self) -> StoreResult<()> {
        if self.unreachable {
            Err(StoreError::ConnectionFailed("connection refused".to_string()))
        } else {
            Ok(())
        }
    }

    fn page(&self) -> ScrollPage {
        let size = self.page_size.load(Ordering::SeqCst);
        let start = self.cursor.load(Ordering::SeqCst).min(self.hits.len());
        let end = (start + size).min(self.hits.len());
        self.cursor.store(end, Ordering::SeqCst);
        self.fetches.fetch_add(1, Ordering::SeqCst);
        ScrollPage {
            scroll_id: Some("scroll-1".to_string()),
            hits: self.hits[start..end].to_vec(),
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        self.pings.fetch_add(1, Ordering::SeqCst);
        self.check_reachable()
    }

    async fn bulk(
        &self,
        index: &str,
        pipeline: Option<&str>,
        body: String,
    ) -> StoreResult<Vec<BulkItemStatus>> {
        self.check_reachable()?;
        let call_number = {
            let mut calls = self.bulk_calls.lock().unwrap();
            calls.push(BulkCall {
                index: index.to_string(),
                pipeline: pipeline.map(str::to_string),
                body: body.clone(),
            });
            calls.len() - 1
        };

        let statuses = parse_items(&body)
            .iter()
            .map(|document| (self.responder)(document, call_number))
            .collect();

        if let Some(sender) = self.shutdown_after_bulk.lock().unwrap().take() {
            let _ = sender.send(true);
        }
        Ok(statuses)
    }

    async fn open_scroll(
        &self,
        _index: Option<&str>,
        _query: &Value,
        page_size: usize,
        _keep_alive: &str,
    ) -> StoreResult<ScrollPage> {
        self.check_reachable()?;
        self.page_size.store(page_size, Ordering::SeqCst);
        self.cursor.store(0, Ordering::SeqCst);
        Ok(self.page())
    }

    async fn next_scroll(&self, _scroll_id: &str, _keep_alive: &str) -> StoreResult<ScrollPage> {
        self.check_reachable()?;
        Ok(self.page())
    }

    async fn clear_scroll(&self, _scroll_id: &str) -> StoreResult<()> {
        self.cleared.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Split a bulk body into one value per item
///
/// Each item is represented by its document, or by its action line when
/// the action carries no document (`delete`).
pub fn parse_items(body: &str) -> Vec<Value> {
    let mut items = Vec::new();
    let mut lines = body.lines().filter(|line| !line.trim().is_empty());
    while let Some(line) = lines.next() {
        let action: Value = serde_json::from_str(line).unwrap();
        let is_delete = action.get("delete").is_some();
        if is_delete {
            items.push(action);
        } else {
            let document: Value = serde_json::from_str(lines.next().unwrap()).unwrap();
            items.push(document);
        }
    }
    items
}

/// Write `count` lines of `{"n": <line number>}` to a fresh temp file
pub fn numbered_jsonl(count: usize) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("docs.jsonl");
    let body: String = (1..=count).map(|n| format!("{{\"n\":{n}}}\n")).collect();
    std::fs::write(&path, body).unwrap();
    (dir, path)
}
