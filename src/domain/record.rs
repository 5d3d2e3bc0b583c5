//! Records, chunks and per-item outcomes
//!
//! These are the values that flow through the transfer engine: a [`Record`]
//! is read once from a source, grouped into a [`Chunk`], and each one ends
//! with exactly one terminal [`ItemOutcome`].

use serde_json::{Map, Value};

/// Content of a single record as produced by a source
#[derive(Debug, Clone, PartialEq)]
pub enum RecordContent {
    /// One decoded line of text
    Text(String),

    /// Structured fields (a CSV row or an exported hit)
    Fields(Map<String, Value>),

    /// Bytes that could not be decoded; carries the reason
    Undecodable(String),
}

/// One logical unit of data read from a source
///
/// Records are immutable once read. The ordinal is the 1-based position in
/// the source (line number for text input, row number for CSV, hit number
/// for exports) and is what failure reports refer to.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// 1-based position in the source
    pub ordinal: u64,

    /// Raw content
    pub content: RecordContent,
}

impl Record {
    /// Create a text record
    pub fn text(ordinal: u64, line: impl Into<String>) -> Self {
        Self {
            ordinal,
            content: RecordContent::Text(line.into()),
        }
    }

    /// Create a structured record
    pub fn fields(ordinal: u64, fields: Map<String, Value>) -> Self {
        Self {
            ordinal,
            content: RecordContent::Fields(fields),
        }
    }

    /// Create a record for bytes that failed to decode
    pub fn undecodable(ordinal: u64, reason: impl Into<String>) -> Self {
        Self {
            ordinal,
            content: RecordContent::Undecodable(reason.into()),
        }
    }

    /// Text of the record, if it is a decoded line
    pub fn as_text(&self) -> Option<&str> {
        match &self.content {
            RecordContent::Text(line) => Some(line),
            _ => None,
        }
    }
}

/// Ordered, bounded group of records submitted in one round trip
pub type Chunk = Vec<Record>;

/// Result of one envelope after a transfer attempt
///
/// `Accepted` and `Rejected` are terminal. `Retryable` must be resolved to
/// one of them by the retry controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// The store accepted the item
    Accepted,

    /// Permanently refused; never retried
    Rejected {
        status: Option<u16>,
        reason: String,
    },

    /// Transient failure; eligible for another attempt
    Retryable {
        status: Option<u16>,
        reason: String,
    },
}

impl ItemOutcome {
    /// Shorthand for a rejection without HTTP status
    pub fn rejected(reason: impl Into<String>) -> Self {
        ItemOutcome::Rejected {
            status: None,
            reason: reason.into(),
        }
    }

    /// Whether this outcome ends the item's lifecycle
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ItemOutcome::Retryable { .. })
    }
}

/// A terminal rejection attached to the record it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    /// Ordinal of the rejected record
    pub ordinal: u64,

    /// HTTP status reported for the item, if any
    pub status: Option<u16>,

    /// Human-readable reason
    pub reason: String,
}

impl ItemFailure {
    /// Create a failure without status
    pub fn new(ordinal: u64, reason: impl Into<String>) -> Self {
        Self {
            ordinal,
            status: None,
            reason: reason.into(),
        }
    }

    /// Attach an HTTP status
    pub fn with_status(mut self, status: Option<u16>) -> Self {
        self.status = status;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_constructors() {
        let record = Record::text(3, "{\"a\":1}");
        assert_eq!(record.ordinal, 3);
        assert_eq!(record.as_text(), Some("{\"a\":1}"));

        let broken = Record::undecodable(4, "invalid byte sequence");
        assert!(broken.as_text().is_none());
        assert!(matches!(broken.content, RecordContent::Undecodable(_)));
    }

    #[test]
    fn test_outcome_terminality() {
        assert!(ItemOutcome::Accepted.is_terminal());
        assert!(ItemOutcome::rejected("conflict").is_terminal());
        assert!(!ItemOutcome::Retryable {
            status: Some(429),
            reason: "busy".to_string()
        }
        .is_terminal());
    }

    #[test]
    fn test_item_failure_builder() {
        let failure = ItemFailure::new(1500, "version conflict").with_status(Some(409));
        assert_eq!(failure.ordinal, 1500);
        assert_eq!(failure.status, Some(409));
        assert_eq!(failure.reason, "version conflict");
    }
}
