use std::io::BufRead;

use tracing::warn;

use crate::error::{IndexError, Result};
use crate::record::{parse_record, IndexEntry};

/// What to do with a record that does not parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IndexErrorPolicy {
    /// Log a warning and treat the record as the end of the index.
    #[default]
    Stop,
    /// Return [`IndexError::Malformed`] to the caller.
    Fail,
}

/// Reads index records one line at a time.
///
/// Blank lines are skipped. After the end of input, a malformed record under
/// [`IndexErrorPolicy::Stop`], or any error, the reader yields nothing more.
pub struct IndexReader<R> {
    inner: R,
    policy: IndexErrorPolicy,
    line: usize,
    buf: Vec<u8>,
    done: bool,
}

impl<R: BufRead> IndexReader<R> {
    /// Create a reader that stops at the first malformed record.
    pub fn new(inner: R) -> Self {
        Self::with_policy(inner, IndexErrorPolicy::default())
    }

    pub fn with_policy(inner: R, policy: IndexErrorPolicy) -> Self {
        Self {
            inner,
            policy,
            line: 0,
            buf: Vec::new(),
            done: false,
        }
    }

    /// Read the next window, or `None` at the end of the index.
    pub fn next_window(&mut self) -> Result<Option<IndexEntry>> {
        while !self.done {
            self.buf.clear();
            let read = match self.inner.read_until(b'\n', &mut self.buf) {
                Ok(n) => n,
                Err(err) => {
                    self.done = true;
                    return Err(IndexError::Io(err));
                }
            };
            if read == 0 {
                self.done = true;
                break;
            }
            self.line += 1;

            let parsed = match std::str::from_utf8(&self.buf) {
                Ok(text) if text.trim().is_empty() => continue,
                Ok(text) => parse_record(self.line, text),
                Err(err) => Err(IndexError::Malformed {
                    line: self.line,
                    reason: format!("not valid UTF-8: {err}"),
                }),
            };

            match parsed {
                Ok(entry) => return Ok(Some(entry)),
                Err(err) => {
                    self.done = true;
                    match self.policy {
                        IndexErrorPolicy::Stop => {
                            warn!(error = %err, "stopping at malformed index record");
                            return Ok(None);
                        }
                        IndexErrorPolicy::Fail => return Err(err),
                    }
                }
            }
        }
        Ok(None)
    }

    /// Number of lines consumed so far.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn policy(&self) -> IndexErrorPolicy {
        self.policy
    }

    /// Consume the reader and return the inner source.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: BufRead> Iterator for IndexReader<R> {
    type Item = Result<IndexEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_window().transpose()
    }
}
