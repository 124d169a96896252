use std::io::BufRead;

use serde::Serialize;
use tracing::debug;

use rawdump_frame::{DecodeConfig, FrameError, FrameSource, RawFrame, WindowReader};
use rawdump_index::{IndexEntry, IndexErrorPolicy, IndexReader};

use crate::error::{Result, ScanError};
use crate::stats::{GapReconstructor, NonMonotonicFrameId, WindowStats};

/// How much of each frame is decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanMode {
    /// Decode every event and hand frames to the visitor.
    #[default]
    Full,
    /// Decode headers only. No events are decoded and no frames are visited.
    StatsOnly,
}

/// Configuration for a scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanConfig {
    pub mode: ScanMode,
    /// Do not pass frames without events to the visitor. Statistics still count them.
    pub suppress_empty: bool,
    /// Handling of malformed index records.
    pub index_policy: IndexErrorPolicy,
    pub decode: DecodeConfig,
}

/// Receives the results of a scan, window by window.
pub trait ScanVisitor {
    fn window_started(&mut self, _entry: &IndexEntry) -> std::io::Result<()> {
        Ok(())
    }

    /// Called for each decoded frame, in stream order.
    fn frame(&mut self, _entry: &IndexEntry, _frame: &RawFrame) -> std::io::Result<()> {
        Ok(())
    }

    fn window_finished(
        &mut self,
        _entry: &IndexEntry,
        _stats: &WindowStats,
    ) -> std::io::Result<()> {
        Ok(())
    }
}

/// Totals for a whole scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub windows: usize,
    #[serde(flatten)]
    pub totals: WindowStats,
}

/// Scans the windows of an index against a frame source.
pub struct Scanner<R, S> {
    index: IndexReader<R>,
    source: S,
    config: ScanConfig,
}

impl<R: BufRead, S: FrameSource> Scanner<R, S> {
    pub fn new(index: R, source: S, config: ScanConfig) -> Self {
        Self {
            index: IndexReader::with_policy(index, config.index_policy),
            source,
            config,
        }
    }

    /// Read the next index record, if any.
    pub fn next_window(&mut self) -> Result<Option<IndexEntry>> {
        Ok(self.index.next_window()?)
    }

    /// Scan one window and return its statistics.
    pub fn scan_window<V: ScanVisitor + ?Sized>(
        &mut self,
        entry: &IndexEntry,
        visitor: &mut V,
    ) -> Result<WindowStats> {
        scan_window(&mut self.source, entry, &self.config, visitor)
    }

    /// Scan every window of the index, in order.
    pub fn run<V: ScanVisitor + ?Sized>(&mut self, visitor: &mut V) -> Result<ScanSummary> {
        let mut summary = ScanSummary::default();
        while let Some(entry) = self.next_window()? {
            let stats = self.scan_window(&entry, visitor)?;
            summary.windows += 1;
            summary.totals.merge(&stats);
        }
        debug!(
            windows = summary.windows,
            total_frames = summary.totals.total_frames,
            lost_frames = summary.totals.lost_frames,
            total_events = summary.totals.total_events,
            "scan finished"
        );
        Ok(summary)
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Consume the scanner and return the frame source.
    pub fn into_source(self) -> S {
        self.source
    }
}

/// Walk the frames of one window and rebuild its statistics.
///
/// Every frame is accounted for, including those the visitor never sees
/// because of [`ScanConfig::suppress_empty`] or [`ScanMode::StatsOnly`].
pub fn scan_window<S, V>(
    source: &mut S,
    entry: &IndexEntry,
    config: &ScanConfig,
    visitor: &mut V,
) -> Result<WindowStats>
where
    S: FrameSource + ?Sized,
    V: ScanVisitor + ?Sized,
{
    let window = &entry.window;
    debug!(
        line = entry.line,
        start = window.start_offset,
        end = window.end_offset,
        step1 = window.step1,
        step2 = window.step2,
        "scanning window"
    );
    visitor.window_started(entry).map_err(ScanError::Output)?;

    let mut reader = WindowReader::with_config(
        source,
        window.start_offset,
        window.end_offset,
        config.decode,
    )
    .map_err(|err| frame_error(entry, window.start_offset, err))?;
    let mut gaps = GapReconstructor::new();

    loop {
        match config.mode {
            ScanMode::StatsOnly => {
                let header = match reader.read_header() {
                    Ok(Some(header)) => header,
                    Ok(None) => break,
                    Err(err) => return Err(frame_error(entry, reader.frame_offset(), err)),
                };
                gaps.push_header(&header)
                    .map_err(|err| gap_error(entry, reader.frame_offset(), err))?;
            }
            ScanMode::Full => {
                let frame = match reader.read_frame() {
                    Ok(Some(frame)) => frame,
                    Ok(None) => break,
                    Err(err) => return Err(frame_error(entry, reader.frame_offset(), err)),
                };
                gaps.push_header(frame.header())
                    .map_err(|err| gap_error(entry, reader.frame_offset(), err))?;

                if config.suppress_empty && frame.n_events() == 0 {
                    continue;
                }
                visitor.frame(entry, &frame).map_err(ScanError::Output)?;
            }
        }
    }

    let diagnostics = *gaps.diagnostics();
    let stats = gaps.finish();
    debug!(
        line = entry.line,
        total_frames = stats.total_frames,
        lost_frames = stats.lost_frames,
        total_events = stats.total_events,
        elided_runs = diagnostics.elided_runs,
        elided_after_kept = diagnostics.elided_after_kept,
        "window finished"
    );
    visitor
        .window_finished(entry, &stats)
        .map_err(ScanError::Output)?;
    Ok(stats)
}

fn frame_error(entry: &IndexEntry, offset: u64, source: FrameError) -> ScanError {
    ScanError::Frame {
        window: entry.line,
        offset,
        source,
    }
}

fn gap_error(entry: &IndexEntry, offset: u64, err: NonMonotonicFrameId) -> ScanError {
    ScanError::NonMonotonicFrameId {
        window: entry.line,
        offset,
        previous: err.previous,
        current: err.current,
    }
}
