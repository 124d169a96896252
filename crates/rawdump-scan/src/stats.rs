//! Frame and loss accounting for one acquisition window.
//!
//! The producer compacts runs of consecutive empty frames: only the first
//! frame of such a run is written and the rest are left out of the stream.
//! The omitted frames are recovered from the gap between the IDs of two
//! consecutively stored frames.
//!
//! The format guarantees that an omitted run is homogeneous: every frame in
//! it has the loss status of the stored frame just before it. Lost and kept
//! frames are never mixed within one run. This cannot be checked from the
//! stream, since the omitted frames are not in it, so the reconstruction is
//! exact only as long as the producer honours it.

use serde::Serialize;
use tracing::trace;

use rawdump_frame::FrameHeader;

/// True frame and event counts for one window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WindowStats {
    pub total_frames: u64,
    pub lost_frames: u64,
    pub total_events: u64,
}

impl WindowStats {
    /// Add another window's counts to these.
    pub fn merge(&mut self, other: &WindowStats) {
        self.total_frames += other.total_frames;
        self.lost_frames += other.lost_frames;
        self.total_events += other.total_events;
    }
}

/// Counters describing the omitted runs seen in a window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GapDiagnostics {
    /// Stored frames followed by at least one omitted frame.
    pub elided_runs: u64,
    /// Frames recovered from ID gaps.
    pub elided_frames: u64,
    /// Omitted runs that were counted as kept frames.
    pub elided_after_kept: u64,
}

/// A frame ID that did not increase within a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("frame ID {current} does not follow frame ID {previous}")]
pub struct NonMonotonicFrameId {
    pub previous: u64,
    pub current: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    BeforeFirstFrame,
    Accumulating { last_id: u64, last_lost: bool },
}

/// Rebuilds [`WindowStats`] from the frames stored for one window.
///
/// Frames must be pushed in stream order. [`finish`](Self::finish) consumes
/// the reconstructor, so a finished window cannot take more frames.
#[derive(Debug, Clone)]
pub struct GapReconstructor {
    state: State,
    stats: WindowStats,
    diagnostics: GapDiagnostics,
}

impl Default for GapReconstructor {
    fn default() -> Self {
        Self::new()
    }
}

impl GapReconstructor {
    pub fn new() -> Self {
        Self {
            state: State::BeforeFirstFrame,
            stats: WindowStats::default(),
            diagnostics: GapDiagnostics::default(),
        }
    }

    /// Account for a stored frame and for any frames omitted before it.
    ///
    /// Returns the number of omitted frames recovered from the ID gap.
    pub fn push(
        &mut self,
        frame_id: u64,
        frame_lost: bool,
        n_events: u32,
    ) -> Result<u64, NonMonotonicFrameId> {
        let gap = match self.state {
            State::BeforeFirstFrame => 0,
            State::Accumulating { last_id, last_lost } => {
                if frame_id <= last_id {
                    return Err(NonMonotonicFrameId {
                        previous: last_id,
                        current: frame_id,
                    });
                }
                let gap = frame_id - last_id - 1;
                if gap > 0 {
                    self.stats.total_frames += gap;
                    if last_lost {
                        self.stats.lost_frames += gap;
                    } else {
                        self.diagnostics.elided_after_kept += 1;
                    }
                    self.diagnostics.elided_runs += 1;
                    self.diagnostics.elided_frames += gap;
                    trace!(after = last_id, gap, lost = last_lost, "recovered omitted frames");
                }
                gap
            }
        };

        self.stats.total_frames += 1;
        if frame_lost {
            self.stats.lost_frames += 1;
        }
        self.stats.total_events += u64::from(n_events);

        self.state = State::Accumulating {
            last_id: frame_id,
            last_lost: frame_lost,
        };
        Ok(gap)
    }

    /// [`push`](Self::push) with the fields of a decoded header.
    pub fn push_header(&mut self, header: &FrameHeader) -> Result<u64, NonMonotonicFrameId> {
        self.push(header.frame_id(), header.frame_lost(), header.n_events())
    }

    /// Counts accumulated so far.
    pub fn stats(&self) -> &WindowStats {
        &self.stats
    }

    pub fn diagnostics(&self) -> &GapDiagnostics {
        &self.diagnostics
    }

    /// ID of the last stored frame, if any.
    pub fn last_frame_id(&self) -> Option<u64> {
        match self.state {
            State::BeforeFirstFrame => None,
            State::Accumulating { last_id, .. } => Some(last_id),
        }
    }

    /// Close the window and return its counts.
    pub fn finish(self) -> WindowStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconstruct(frames: &[(u64, bool, u32)]) -> WindowStats {
        let mut gaps = GapReconstructor::new();
        for &(id, lost, n) in frames {
            gaps.push(id, lost, n).unwrap();
        }
        gaps.finish()
    }

    #[test]
    fn empty_window() {
        assert_eq!(GapReconstructor::new().finish(), WindowStats::default());
    }

    #[test]
    fn first_frame_has_no_gap() {
        let mut gaps = GapReconstructor::new();
        assert_eq!(gaps.last_frame_id(), None);
        assert_eq!(gaps.push(1_000, true, 0).unwrap(), 0);
        assert_eq!(
            gaps.finish(),
            WindowStats {
                total_frames: 1,
                lost_frames: 1,
                total_events: 0
            }
        );
    }

    #[test]
    fn consecutive_frames_count_exactly() {
        let stats = reconstruct(&[
            (5, false, 2),
            (6, true, 0),
            (7, true, 0),
            (8, false, 4),
            (9, false, 1),
        ]);
        assert_eq!(stats.total_frames, 5);
        assert_eq!(stats.lost_frames, 2);
        assert_eq!(stats.total_events, 7);
    }

    #[test]
    fn gap_after_lost_frame_is_lost() {
        let mut gaps = GapReconstructor::new();
        gaps.push(10, true, 0).unwrap();
        assert_eq!(gaps.push(15, true, 0).unwrap(), 4);
        assert_eq!(
            gaps.finish(),
            WindowStats {
                total_frames: 6,
                lost_frames: 6,
                total_events: 0
            }
        );
    }

    #[test]
    fn gap_after_kept_frame_is_kept() {
        let mut gaps = GapReconstructor::new();
        gaps.push(10, false, 3).unwrap();
        assert_eq!(gaps.push(12, false, 0).unwrap(), 1);
        assert_eq!(gaps.diagnostics().elided_after_kept, 1);
        assert_eq!(
            gaps.finish(),
            WindowStats {
                total_frames: 3,
                lost_frames: 0,
                total_events: 3
            }
        );
    }

    #[test]
    fn gap_status_follows_preceding_frame_only() {
        // kept run 2..=4 after frame 1, lost run 6..=9 after frame 5
        let stats = reconstruct(&[(1, false, 1), (5, true, 0), (10, false, 2)]);
        assert_eq!(stats.total_frames, 10);
        assert_eq!(stats.lost_frames, 1 + 4);
        assert_eq!(stats.total_events, 3);
    }

    #[test]
    fn lost_frame_after_kept_gap() {
        // The stored lost frame does not make the run before it lost.
        let stats = reconstruct(&[(0, false, 0), (4, true, 0)]);
        assert_eq!(stats.total_frames, 5);
        assert_eq!(stats.lost_frames, 1);
    }

    #[test]
    fn duplicate_frame_id_is_rejected() {
        let mut gaps = GapReconstructor::new();
        gaps.push(7, false, 1).unwrap();
        let err = gaps.push(7, false, 1).unwrap_err();
        assert_eq!(
            err,
            NonMonotonicFrameId {
                previous: 7,
                current: 7
            }
        );
    }

    #[test]
    fn decreasing_frame_id_is_rejected() {
        let mut gaps = GapReconstructor::new();
        gaps.push(7, false, 1).unwrap();
        gaps.push(9, false, 1).unwrap();
        let err = gaps.push(8, false, 1).unwrap_err();
        assert_eq!(err.previous, 9);
        assert_eq!(err.current, 8);
        // The rejected frame is not counted.
        assert_eq!(gaps.stats().total_frames, 3);
    }

    #[test]
    fn diagnostics_count_runs() {
        let mut gaps = GapReconstructor::new();
        for (id, lost) in [(0, false), (3, true), (4, true), (10, false)] {
            gaps.push(id, lost, 0).unwrap();
        }
        assert_eq!(
            *gaps.diagnostics(),
            GapDiagnostics {
                elided_runs: 2,
                elided_frames: 2 + 5,
                elided_after_kept: 1
            }
        );
    }

    #[test]
    fn push_header_uses_header_fields() {
        let header = FrameHeader::new(3, 42, true, 1).unwrap();
        let mut gaps = GapReconstructor::new();
        gaps.push_header(&header).unwrap();
        assert_eq!(gaps.last_frame_id(), Some(42));
        assert_eq!(
            *gaps.stats(),
            WindowStats {
                total_frames: 1,
                lost_frames: 1,
                total_events: 1
            }
        );
    }

    #[test]
    fn merge_sums_counts() {
        let mut total = WindowStats {
            total_frames: 3,
            lost_frames: 1,
            total_events: 9,
        };
        total.merge(&WindowStats {
            total_frames: 2,
            lost_frames: 2,
            total_events: 0,
        });
        assert_eq!(
            total,
            WindowStats {
                total_frames: 5,
                lost_frames: 3,
                total_events: 9
            }
        );
    }
}
