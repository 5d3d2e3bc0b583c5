//! Line-oriented input (JSON lines, plain or decompressed)

use super::RecordSource;
use crate::core::encoding::FileEncoding;
use crate::domain::{FerryError, Record, Result};
use std::io::BufRead;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Reads one record per line from any buffered reader
///
/// Lines are split on `\n`, a trailing `\r` is dropped and surrounding
/// whitespace is trimmed. Blank lines are counted as skipped and do not
/// produce records, but they still advance the ordinal so that ordinals
/// match line numbers in the file.
pub struct LineSource<R> {
    reader: R,
    encoding: FileEncoding,
    buffer: Vec<u8>,
    line_number: u64,
    skipped: u64,
    finished: bool,
}

impl<R: BufRead> LineSource<R> {
    /// Create a source over `reader`
    pub fn new(reader: R, encoding: FileEncoding) -> Self {
        Self {
            reader,
            encoding,
            buffer: Vec::with_capacity(4096),
            line_number: 0,
            skipped: 0,
            finished: false,
        }
    }
}

impl<R: BufRead> Iterator for LineSource<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            self.buffer.clear();
            match self.reader.read_until(b'\n', &mut self.buffer) {
                Ok(0) => self.finished = true,
                Ok(_) => {
                    self.line_number += 1;

                    let mut bytes = self.buffer.as_slice();
                    if self.line_number == 1 && self.encoding.name() == "UTF-8" {
                        bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                    }

                    let text = match self.encoding.decode(bytes) {
                        Ok(text) => text,
                        Err(reason) => {
                            return Some(Ok(Record::undecodable(self.line_number, reason)))
                        }
                    };

                    let line = text.trim();
                    if line.is_empty() {
                        self.skipped += 1;
                        continue;
                    }

                    return Some(Ok(Record::text(self.line_number, line)));
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(FerryError::Input(format!(
                        "Failed to read input after line {}: {}",
                        self.line_number, e
                    ))));
                }
            }
        }
        None
    }
}

impl<R: BufRead + Send> RecordSource for LineSource<R> {
    fn skipped(&self) -> u64 {
        self.skipped
    }
}
