//! Groups a record stream into fixed-size chunks
//!
//! The batcher pulls from its source only when the next chunk is requested,
//! so at most one chunk of records is held in memory.

use crate::domain::{Chunk, Record, Result};

/// Predicate marking a record that must not end a chunk
pub type KeepWithNext = fn(&Record) -> bool;

/// Splits a record iterator into chunks of `chunk_size` records
///
/// Every chunk except the last holds exactly `chunk_size` records. With a
/// [`KeepWithNext`] predicate, a full chunk whose last record matches is
/// closed one record early and that record opens the next chunk instead.
pub struct Batcher<I> {
    source: I,
    chunk_size: usize,
    keep_with_next: Option<KeepWithNext>,
    carried: Option<Record>,
    exhausted: bool,
}

impl<I> Batcher<I>
where
    I: Iterator<Item = Result<Record>>,
{
    /// Create a batcher; a `chunk_size` of zero is treated as one
    pub fn new(source: I, chunk_size: usize) -> Self {
        Self {
            source,
            chunk_size: chunk_size.max(1),
            keep_with_next: None,
            carried: None,
            exhausted: false,
        }
    }

    /// Never end a chunk with a record matching `predicate`
    pub fn keep_with_next(mut self, predicate: KeepWithNext) -> Self {
        self.keep_with_next = Some(predicate);
        self
    }

    /// The underlying record source
    pub fn source(&self) -> &I {
        &self.source
    }

    /// Configured chunk size
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

impl<I> Iterator for Batcher<I>
where
    I: Iterator<Item = Result<Record>>,
{
    type Item = Result<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut chunk = Vec::with_capacity(self.chunk_size);
        if let Some(record) = self.carried.take() {
            chunk.push(record);
        }

        while !self.exhausted && chunk.len() < self.chunk_size {
            match self.source.next() {
                Some(Ok(record)) => chunk.push(record),
                Some(Err(e)) => {
                    self.exhausted = true;
                    return Some(Err(e));
                }
                None => self.exhausted = true,
            }
        }

        if let Some(keep) = self.keep_with_next {
            let full = chunk.len() == self.chunk_size && chunk.len() > 1;
            if full && !self.exhausted && chunk.last().map(keep).unwrap_or(false) {
                self.carried = chunk.pop();
            }
        }

        if chunk.is_empty() {
            None
        } else {
            Some(Ok(chunk))
        }
    }
}
