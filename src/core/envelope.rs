//! Wire units: bulk entries for import, projected documents for export
//!
//! On the import side every chunk becomes a list of [`BulkEntry`] values,
//! one per item the store will report on, plus the records that were
//! rejected before anything was sent.

use crate::domain::{Chunk, ItemFailure, Record, RecordContent};
use serde::Serialize;
use serde_json::{Map, Value};

/// Bulk operations recognised in passthrough input
const ACTIONS: [&str; 4] = ["index", "create", "update", "delete"];

/// One bulk item: its lines and the records they came from
#[derive(Debug, Clone, PartialEq)]
pub struct BulkEntry {
    /// Ordinals of the records that make up this item
    pub ordinals: Vec<u64>,

    /// NDJSON lines, without trailing newlines
    pub lines: Vec<String>,
}

impl BulkEntry {
    fn single(ordinal: u64, lines: Vec<String>) -> Self {
        Self {
            ordinals: vec![ordinal],
            lines,
        }
    }
}

/// Bulk entries and local rejections for one chunk
#[derive(Debug, Default)]
pub struct ChunkEnvelopes {
    /// Entries to submit, in source order
    pub entries: Vec<BulkEntry>,

    /// Records rejected locally; these never reach the store
    pub rejected: Vec<ItemFailure>,
}

impl ChunkEnvelopes {
    /// Number of records covered by entries and rejections together
    pub fn record_count(&self) -> usize {
        self.entries.iter().map(|e| e.ordinals.len()).sum::<usize>() + self.rejected.len()
    }
}

/// Builds import envelopes
#[derive(Debug, Clone)]
pub struct EnvelopeBuilder {
    index: String,
    pipeline: Option<String>,
    generate_action: bool,
    id_path: Option<Vec<String>>,
}

#[derive(Serialize)]
struct ActionLine<'a> {
    index: IndexAction<'a>,
}

#[derive(Serialize)]
struct IndexAction<'a> {
    #[serde(rename = "_index")]
    index: &'a str,

    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pipeline: Option<&'a str>,
}

impl EnvelopeBuilder {
    /// Builder that generates an `index` action for every record
    pub fn generated(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            pipeline: None,
            generate_action: true,
            id_path: None,
        }
    }

    /// Builder that forwards action lines found in the input
    pub fn passthrough(index: impl Into<String>) -> Self {
        Self {
            generate_action: false,
            ..Self::generated(index)
        }
    }

    /// Route documents through an ingest pipeline
    pub fn with_pipeline(mut self, pipeline: Option<String>) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Take document ids from a dotted field path such as `meta.id`
    pub fn with_id_field(mut self, id_field: Option<&str>) -> Self {
        self.id_path = id_field.map(|path| path.split('.').map(str::to_string).collect());
        self
    }

    /// Target index
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Ingest pipeline, if any
    pub fn pipeline(&self) -> Option<&str> {
        self.pipeline.as_deref()
    }

    /// Whether action lines are generated
    pub fn generates_actions(&self) -> bool {
        self.generate_action
    }

    /// Turn a chunk into bulk entries
    pub fn build(&self, chunk: &Chunk) -> ChunkEnvelopes {
        if self.generate_action {
            self.build_generated(chunk)
        } else {
            build_passthrough(chunk)
        }
    }

    fn build_generated(&self, chunk: &Chunk) -> ChunkEnvelopes {
        let mut out = ChunkEnvelopes::default();

        for record in chunk {
            let (document, body) = match &record.content {
                RecordContent::Text(line) => match parse_object(line) {
                    Ok(document) => (document, line.clone()),
                    Err(reason) => {
                        out.rejected.push(ItemFailure::new(record.ordinal, reason));
                        continue;
                    }
                },
                RecordContent::Fields(fields) => match serde_json::to_string(fields) {
                    Ok(body) => (fields.clone(), body),
                    Err(e) => {
                        out.rejected.push(ItemFailure::new(record.ordinal, e.to_string()));
                        continue;
                    }
                },
                RecordContent::Undecodable(reason) => {
                    out.rejected.push(ItemFailure::new(record.ordinal, reason.clone()));
                    continue;
                }
            };

            match self.action_line(&document) {
                Ok(action) => out
                    .entries
                    .push(BulkEntry::single(record.ordinal, vec![action, body])),
                Err(e) => out
                    .rejected
                    .push(ItemFailure::new(record.ordinal, e.to_string())),
            }
        }

        out
    }

    fn action_line(&self, document: &Map<String, Value>) -> serde_json::Result<String> {
        let id = self
            .id_path
            .as_deref()
            .and_then(|path| extract_id(document, path));

        serde_json::to_string(&ActionLine {
            index: IndexAction {
                index: &self.index,
                id,
                pipeline: self.pipeline.as_deref(),
            },
        })
    }
}

/// Parse a line that must hold a JSON object
fn parse_object(line: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(line) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("document is not a JSON object".to_string()),
        Err(e) => Err(format!("invalid JSON: {e}")),
    }
}

/// Follow a dotted path; only strings and numbers make usable ids
fn extract_id(document: &Map<String, Value>, path: &[String]) -> Option<String> {
    let (first, rest) = path.split_first()?;
    let mut value = document.get(first)?;
    for key in rest {
        value = value.as_object()?.get(key)?;
    }

    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A bulk action line found in passthrough input
struct Action {
    op: String,
    line: String,
}

impl Action {
    fn expects_document(&self) -> bool {
        self.op != "delete"
    }
}

/// Recognise a bulk action line and drop the deprecated `_type` key
fn parse_action(line: &str) -> Option<Action> {
    let Ok(Value::Object(mut object)) = serde_json::from_str::<Value>(line) else {
        return None;
    };
    if object.len() != 1 {
        return None;
    }

    let op = object.keys().next()?.clone();
    if !ACTIONS.contains(&op.as_str()) {
        return None;
    }

    let metadata = object.get_mut(&op)?.as_object_mut()?;
    if metadata.remove("_type").is_none() {
        return Some(Action {
            op,
            line: line.to_string(),
        });
    }

    let line = serde_json::to_string(&object).ok()?;
    Some(Action { op, line })
}

/// Whether a record is an action line that needs the following line
///
/// Used to keep an action and its document in the same chunk.
pub fn expects_document(record: &Record) -> bool {
    record
        .as_text()
        .and_then(parse_action)
        .map(|action| action.expects_document())
        .unwrap_or(false)
}

fn build_passthrough(chunk: &Chunk) -> ChunkEnvelopes {
    let mut out = ChunkEnvelopes::default();
    let mut pending: Option<(u64, String)> = None;

    for record in chunk {
        let line = match &record.content {
            RecordContent::Text(line) => line.clone(),
            RecordContent::Fields(fields) => match serde_json::to_string(fields) {
                Ok(line) => line,
                Err(e) => {
                    out.rejected.push(ItemFailure::new(record.ordinal, e.to_string()));
                    continue;
                }
            },
            RecordContent::Undecodable(reason) => {
                out.rejected.push(ItemFailure::new(record.ordinal, reason.clone()));
                continue;
            }
        };

        if let Some(action) = parse_action(&line) {
            if let Some((ordinal, _)) = pending.take() {
                out.rejected.push(ItemFailure::new(
                    ordinal,
                    "action line is not followed by a document",
                ));
            }
            if action.expects_document() {
                pending = Some((record.ordinal, action.line));
            } else {
                out.entries
                    .push(BulkEntry::single(record.ordinal, vec![action.line]));
            }
            continue;
        }

        if let Err(reason) = parse_object(&line) {
            out.rejected.push(ItemFailure::new(record.ordinal, reason));
            continue;
        }

        match pending.take() {
            Some((action_ordinal, action_line)) => out.entries.push(BulkEntry {
                ordinals: vec![action_ordinal, record.ordinal],
                lines: vec![action_line, line],
            }),
            None => out.rejected.push(ItemFailure::new(
                record.ordinal,
                "document line has no preceding action line",
            )),
        }
    }

    if let Some((ordinal, _)) = pending {
        out.rejected.push(ItemFailure::new(
            ordinal,
            "action line is not followed by a document",
        ));
    }

    out
}

/// NDJSON request body for a set of entries
pub fn bulk_body<'a>(entries: impl IntoIterator<Item = &'a BulkEntry>) -> String {
    let mut body = String::new();
    for entry in entries {
        for line in &entry.lines {
            body.push_str(line);
            body.push('\n');
        }
    }
    body
}

/// The bulk request as printed in dry-run mode
pub fn render_request(index: &str, pipeline: Option<&str>, entries: &[BulkEntry]) -> String {
    let query = pipeline
        .map(|p| format!("?pipeline={p}"))
        .unwrap_or_default();
    format!("POST /{index}/_bulk{query}\n{}\n", bulk_body(entries))
}

/// What part of a search hit is exported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// Only the `_source` document
    Source,

    /// The complete hit including metadata
    Full,
}

impl Projection {
    /// Select the exported document from a hit
    pub fn apply(&self, hit: Value) -> Result<Value, String> {
        match self {
            Projection::Full => Ok(hit),
            Projection::Source => match hit {
                Value::Object(mut object) => object
                    .remove("_source")
                    .ok_or_else(|| "hit has no _source".to_string()),
                _ => Err("hit is not a JSON object".to_string()),
            },
        }
    }
}
