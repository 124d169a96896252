//! Scanning of readout data sets and reconstruction of frame loss statistics.
//!
//! A data set is an index file (`<prefix>.idxf`) naming acquisition windows
//! and a data file (`<prefix>.rawf`) holding their frames. [`Scanner`] walks
//! the windows in index order, decodes their frames and rebuilds the true
//! frame counts with [`GapReconstructor`].

pub mod error;
pub mod scan;
pub mod source;
pub mod stats;

pub use error::{Result, ScanError};
pub use scan::{scan_window, ScanConfig, ScanMode, ScanSummary, ScanVisitor, Scanner};
pub use source::{data_path, index_path, DataSet, DATA_EXTENSION, INDEX_EXTENSION};
pub use stats::{GapDiagnostics, GapReconstructor, NonMonotonicFrameId, WindowStats};
