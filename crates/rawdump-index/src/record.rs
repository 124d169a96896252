use std::str::FromStr;

use serde::Serialize;

use crate::error::{IndexError, Result};

/// Fields per index record.
pub const FIELD_COUNT: usize = 6;

/// The byte range and step values of one acquisition window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AcquisitionWindow {
    pub start_offset: u64,
    pub end_offset: u64,
    pub step1: f32,
    pub step2: f32,
}

impl AcquisitionWindow {
    /// Span of the window in bytes. A window that ends before it starts is empty.
    pub fn len(&self) -> u64 {
        self.end_offset.saturating_sub(self.start_offset)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A parsed index record together with where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndexEntry {
    /// 1-based line number in the index.
    pub line: usize,
    #[serde(flatten)]
    pub window: AcquisitionWindow,
    /// The producer's two counters, carried along for display only.
    pub counts: [i64; 2],
}

/// Parse one index line.
///
/// The record must have exactly six whitespace-separated fields, two
/// non-negative offsets with `start <= end`, two integers and two floats.
pub fn parse_record(line: usize, text: &str) -> Result<IndexEntry> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    if fields.len() != FIELD_COUNT {
        return Err(malformed(
            line,
            format!("expected {FIELD_COUNT} fields, found {}", fields.len()),
        ));
    }

    let start: i64 = field(line, "start offset", fields[0])?;
    let end: i64 = field(line, "end offset", fields[1])?;
    let count0: i64 = field(line, "first count", fields[2])?;
    let count1: i64 = field(line, "second count", fields[3])?;
    let step1: f32 = field(line, "step1", fields[4])?;
    let step2: f32 = field(line, "step2", fields[5])?;

    let start_offset = u64::try_from(start)
        .map_err(|_| malformed(line, format!("negative start offset {start}")))?;
    let end_offset =
        u64::try_from(end).map_err(|_| malformed(line, format!("negative end offset {end}")))?;
    if end_offset < start_offset {
        return Err(malformed(
            line,
            format!("end offset {end_offset} before start offset {start_offset}"),
        ));
    }

    Ok(IndexEntry {
        line,
        window: AcquisitionWindow {
            start_offset,
            end_offset,
            step1,
            step2,
        },
        counts: [count0, count1],
    })
}

fn field<T: FromStr>(line: usize, name: &str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|err| malformed(line, format!("invalid {name} {raw:?}: {err}")))
}

fn malformed(line: usize, reason: String) -> IndexError {
    IndexError::Malformed { line, reason }
}
