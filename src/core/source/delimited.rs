//! CSV input
//!
//! The header row names the fields; every data row becomes one structured
//! record. A value becomes a JSON number only when the number prints back as
//! exactly the same text, so `00501`, `+1555` and `1.50` stay strings.
//!
//! Rows end at `\n`; a trailing `\r` on the last field is dropped. Blank rows
//! are counted as skipped, and ordinals are the physical line a row starts on.

use super::RecordSource;
use crate::core::encoding::FileEncoding;
use crate::domain::{FerryError, Record, Result};
use csv::{ByteRecord, ReaderBuilder, Terminator};
use serde_json::{Map, Number, Value};
use std::io::{Chain, Read};

/// Reads one structured record per CSV row
pub struct CsvSource<R> {
    reader: csv::Reader<Chain<R, &'static [u8]>>,
    encoding: FileEncoding,
    headers: Option<Vec<String>>,
    row: ByteRecord,
    skipped: u64,
    finished: bool,
}

impl<R: Read> CsvSource<R> {
    /// Create a source over `reader`; the first row is the header
    pub fn new(reader: R, encoding: FileEncoding) -> Self {
        // The extra newline terminates a last row that has none
        let reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .terminator(Terminator::Any(b'\n'))
            .from_reader(reader.chain(&b"\n"[..]));

        Self {
            reader,
            encoding,
            headers: None,
            row: ByteRecord::new(),
            skipped: 0,
            finished: false,
        }
    }

    /// Physical line the current row starts on
    ///
    /// After a row is read the reader sits on the line following its
    /// terminator; newlines inside quoted fields push that further down.
    fn row_start(&self) -> u64 {
        let embedded = self.row.as_slice().iter().filter(|&&b| b == b'\n').count() as u64;
        self.reader
            .position()
            .line()
            .saturating_sub(1 + embedded)
    }

    fn is_blank(&self) -> bool {
        self.row.len() == 1 && self.row[0].iter().all(u8::is_ascii_whitespace)
    }

    fn read_headers(&mut self) -> Result<Vec<String>> {
        let raw = self
            .reader
            .byte_headers()
            .map_err(|e| FerryError::Input(format!("Failed to read CSV header: {e}")))?
            .clone();

        raw.iter()
            .map(|field| {
                self.encoding
                    .decode(field)
                    .map(|name| name.trim().to_string())
                    .map_err(|reason| FerryError::Input(format!("Invalid CSV header: {reason}")))
            })
            .collect()
    }

    fn build(&self, headers: &[String], ordinal: u64) -> Record {
        if self.row.len() != headers.len() {
            return Record::undecodable(
                ordinal,
                format!(
                    "row has {} fields but the header has {}",
                    self.row.len(),
                    headers.len()
                ),
            );
        }

        let last = headers.len().saturating_sub(1);
        let mut fields = Map::with_capacity(headers.len());
        for (i, (name, raw)) in headers.iter().zip(self.row.iter()).enumerate() {
            let raw = if i == last {
                raw.strip_suffix(b"\r").unwrap_or(raw)
            } else {
                raw
            };
            match self.encoding.decode(raw) {
                Ok(text) => {
                    fields.insert(name.clone(), field_value(text));
                }
                Err(reason) => return Record::undecodable(ordinal, reason),
            }
        }
        Record::fields(ordinal, fields)
    }
}

/// Canonical numbers become JSON numbers, everything else stays a string
fn field_value(text: String) -> Value {
    let number = if let Ok(n) = text.parse::<i64>() {
        Some(Number::from(n))
    } else {
        text.parse::<f64>().ok().and_then(Number::from_f64)
    };

    match number {
        Some(n) if n.to_string() == text => Value::Number(n),
        _ => Value::String(text),
    }
}

impl<R: Read> Iterator for CsvSource<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let headers = match self.headers.take() {
            Some(headers) => headers,
            None => match self.read_headers() {
                Ok(headers) => headers,
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            },
        };

        let item = loop {
            let previous_end = self.reader.position().line();
            match self.reader.read_byte_record(&mut self.row) {
                Ok(true) => {
                    let ordinal = self.row_start();
                    // Empty lines never reach the reader as rows
                    self.skipped += ordinal.saturating_sub(previous_end);
                    if self.is_blank() {
                        self.skipped += 1;
                        continue;
                    }
                    break Some(Ok(self.build(&headers, ordinal)));
                }
                Ok(false) => {
                    // Lines left after the last row, less the appended newline
                    self.skipped += self
                        .reader
                        .position()
                        .line()
                        .saturating_sub(previous_end + 1);
                    self.finished = true;
                    break None;
                }
                Err(e) => {
                    self.finished = true;
                    break Some(Err(FerryError::Input(format!("Failed to read CSV row: {e}"))));
                }
            }
        };

        self.headers = Some(headers);
        item
    }
}

impl<R: Read + Send> RecordSource for CsvSource<R> {
    fn skipped(&self) -> u64 {
        self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RecordContent;
    use serde_json::json;
    use std::io::Cursor;
    use test_case::test_case;

    fn rows(input: &str) -> Vec<Record> {
        CsvSource::new(Cursor::new(input.as_bytes().to_vec()), FileEncoding::utf8())
            .map(|r| r.unwrap())
            .collect()
    }

    #[test]
    fn test_rows_become_objects() {
        let records = rows("name,age,score\nAlice,30,9.5\n\"Bob, Jr.\",41,n/a\n");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].ordinal, 2);
        match &records[0].content {
            RecordContent::Fields(fields) => {
                assert_eq!(
                    Value::Object(fields.clone()),
                    json!({"name": "Alice", "age": 30, "score": 9.5})
                );
            }
            other => panic!("unexpected content: {other:?}"),
        }
        match &records[1].content {
            RecordContent::Fields(fields) => {
                assert_eq!(fields["name"], json!("Bob, Jr."));
                assert_eq!(fields["score"], json!("n/a"));
            }
            other => panic!("unexpected content: {other:?}"),
        }
    }

    #[test]
    fn test_ragged_row_is_rejected_not_fatal() {
        let records = rows("a,b\n1,2\n3\n4,5\n");

        assert_eq!(records.len(), 3);
        assert!(matches!(records[1].content, RecordContent::Undecodable(_)));
        assert!(matches!(records[2].content, RecordContent::Fields(_)));
    }

    #[test]
    fn test_non_numeric_words_stay_strings() {
        assert_eq!(field_value("inf".to_string()), json!("inf"));
        assert_eq!(field_value("NaN".to_string()), json!("NaN"));
        assert_eq!(field_value("-12".to_string()), json!(-12));
    }

    #[test_case("00501" ; "leading zero")]
    #[test_case("+15551234" ; "plus sign")]
    #[test_case("1.50" ; "trailing zero")]
    #[test_case("1e3" ; "exponent")]
    #[test_case(" 30" ; "padded")]
    #[test_case("-0" ; "negative zero")]
    fn test_non_canonical_numbers_stay_strings(text: &str) {
        assert_eq!(field_value(text.to_string()), json!(text));
    }

    #[test]
    fn test_quoted_digits_keep_their_text() {
        let records = rows("zip,phone,count\n\"00501\",\"+15551234\",7\n");
        match &records[0].content {
            RecordContent::Fields(fields) => assert_eq!(
                Value::Object(fields.clone()),
                json!({"zip": "00501", "phone": "+15551234", "count": 7})
            ),
            other => panic!("unexpected content: {other:?}"),
        }
    }

    #[test]
    fn test_blank_rows_are_counted() {
        let mut source = CsvSource::new(
            Cursor::new(b"a,b\n1,2\n\n   \n3,4\n\n".to_vec()),
            FileEncoding::utf8(),
        );
        let records: Vec<Record> = source.by_ref().map(|r| r.unwrap()).collect();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].ordinal, 2);
        assert_eq!(records[1].ordinal, 5);
        assert_eq!(source.skipped(), 3);
    }

    #[test]
    fn test_crlf_rows_and_multiline_fields() {
        let records = rows("a,b\r\n1,\"x\r\ny\"\r\n\r\n2,3");

        assert_eq!(records.len(), 2);
        match &records[0].content {
            RecordContent::Fields(fields) => assert_eq!(fields["b"], json!("x\r\ny")),
            other => panic!("unexpected content: {other:?}"),
        }
        assert_eq!(records[1].ordinal, 5);
        match &records[1].content {
            RecordContent::Fields(fields) => assert_eq!(fields["b"], json!(3)),
            other => panic!("unexpected content: {other:?}"),
        }
    }

    #[test]
    fn test_header_only() {
        assert!(rows("a,b\n").is_empty());
    }
}
