//! Decode and account for readout raw data frames.
//!
//! rawdump reads the frame data sets written by the photon-detector readout:
//! an index of acquisition windows plus a stream of packed 64-bit frames.
//! It decodes frames and events and rebuilds the true frame and loss counts
//! of each window, including the empty frames the producer left out.
//!
//! # Crate Structure
//!
//! - [`frame`] — Frame and event decoding, window walking
//! - [`index`] — Acquisition-window index records
//! - [`scan`] — Data set scanning and frame loss reconstruction

/// Re-export frame types.
pub mod frame {
    pub use rawdump_frame::*;
}

/// Re-export index types.
pub mod index {
    pub use rawdump_index::*;
}

/// Re-export scan types.
pub mod scan {
    pub use rawdump_scan::*;
}
