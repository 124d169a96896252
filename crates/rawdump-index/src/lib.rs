//! Acquisition-window index records.
//!
//! The index is a text file with one record per acquisition window:
//!
//! ```text
//! <start offset> <end offset> <count> <count> <step1> <step2>
//! ```
//!
//! Offsets name the byte range `[start, end)` of the window's frames in the
//! data file. The two counters are written by the producer and only checked
//! for shape here.

pub mod error;
pub mod reader;
pub mod record;

pub use error::{IndexError, Result};
pub use reader::{IndexErrorPolicy, IndexReader};
pub use record::{parse_record, AcquisitionWindow, IndexEntry, FIELD_COUNT};
