//! Boundary reconciliation
//!
//! Walks the detected intervals once, in step with the manual boundaries.
//! For every boundary the detected intervals ending before it (within the
//! tolerance) are grouped into one utterance. When no fresh interval ends
//! near a boundary, the boundary either cuts the next detected interval
//! short, or it sits at or before the previous entry's end. In the latter
//! case that reference utterance was swallowed by the previous detected one
//! and its index is folded into the previous label (`uttN-M`).

use crate::{Error, ReconcileConfig, Result};
use log::{debug, warn};
use segalign_core::{AutoInterval, ControlEntry, ManualBoundary};
use std::fmt;

/// Where a manual boundary lands among the detected intervals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// A fresh run of detected intervals `first..=last`
    New { first: usize, last: usize },
    /// No fresh interval; the boundary belongs to the previous entry
    MergeIntoPrevious,
}

/// Utterance label, a single index or a merged range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct UttLabel {
    first: u32,
    last: Option<u32>,
}

impl UttLabel {
    fn new(utt: u32) -> Self {
        Self { first: utt, last: None }
    }

    fn merge(&mut self, utt: u32) {
        self.last = Some(utt);
    }
}

impl fmt::Display for UttLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.last {
            Some(last) => write!(f, "utt{}-{}", self.first, last),
            None => write!(f, "utt{}", self.first),
        }
    }
}

/// An entry still addressed by detected-interval indices
#[derive(Debug, Clone, Copy)]
struct PendingEntry {
    first: usize,
    last: usize,
    end_frame: u64,
    label: UttLabel,
}

/// Reconciles detected endpoints with manual boundaries
pub struct BoundaryReconciler {
    config: ReconcileConfig,
}

impl BoundaryReconciler {
    /// Creates a new reconciler with the given configuration
    pub fn new(config: ReconcileConfig) -> Self {
        Self { config }
    }

    /// Produces one control entry per reconciled utterance.
    ///
    /// Every manual boundary index ends up in exactly one entry label, every
    /// entry has `start <= end` and no entry overlaps the next.
    pub fn reconcile(
        &self,
        boundaries: &[ManualBoundary],
        endpoints: &[AutoInterval],
    ) -> Result<Vec<ControlEntry>> {
        if boundaries.is_empty() {
            return Ok(Vec::new());
        }
        if endpoints.is_empty() {
            return Err(Error::NoEndpoints(boundaries.len()));
        }

        let mut intervals = endpoints.to_vec();
        let pending = self.place_boundaries(boundaries, &mut intervals);

        let mut entries: Vec<ControlEntry> = pending
            .iter()
            .map(|p| ControlEntry::new(intervals[p.first].start, p.end_frame, p.label.to_string()))
            .collect();

        split_overlaps(&mut entries);
        enforce_order(&mut entries);

        Ok(entries)
    }

    /// Groups detected intervals under manual boundaries, snapping ends that
    /// disagree with the annotation by more than the tolerance
    fn place_boundaries(
        &self,
        boundaries: &[ManualBoundary],
        intervals: &mut [AutoInterval],
    ) -> Vec<PendingEntry> {
        let epsilon = self.config.epsilon_frames;
        let mut pending: Vec<PendingEntry> = Vec::with_capacity(boundaries.len());
        let mut next = 0usize;

        for boundary in boundaries {
            let limit = boundary.frame.saturating_add(epsilon);
            while next < intervals.len() && intervals[next].effective_end() < limit {
                next += 1;
            }

            let fresh = pending.last().map_or(0, |p| p.last + 1);
            let past_previous = pending.last().map_or(true, |p| boundary.frame > p.end_frame);
            let placement = if next > fresh {
                Placement::New {
                    first: fresh,
                    last: next - 1,
                }
            } else if next < intervals.len()
                && (pending.is_empty()
                    || (past_previous && intervals[next].start.map_or(true, |start| start < limit)))
            {
                // Boundary falls inside the next detected interval
                next += 1;
                Placement::New {
                    first: fresh,
                    last: fresh,
                }
            } else {
                Placement::MergeIntoPrevious
            };

            match placement {
                Placement::New { first, last } => {
                    let interval = &mut intervals[last];
                    let within = interval
                        .end
                        .is_some_and(|end| end.abs_diff(boundary.frame) <= epsilon);
                    if !within {
                        debug!(
                            "Snapping end of detected utterance {} from {:?} to manual boundary {} (utt{})",
                            last, interval.end, boundary.frame, boundary.utt
                        );
                        interval.end = Some(boundary.frame);
                    }
                    pending.push(PendingEntry {
                        first,
                        last,
                        end_frame: interval.end.unwrap_or(boundary.frame),
                        label: UttLabel::new(boundary.utt),
                    });
                }
                Placement::MergeIntoPrevious => {
                    if let Some(prev) = pending.last_mut() {
                        prev.label.merge(boundary.utt);
                        debug!("Manual utterance {} merged into {}", boundary.utt, prev.label);
                    }
                }
            }
        }

        if next < intervals.len() {
            debug!(
                "{} detected utterances after the last manual boundary were dropped",
                intervals.len() - next
            );
        }

        pending
    }
}

/// Splits overlapping neighbours at the midpoint of the overlap
fn split_overlaps(entries: &mut [ControlEntry]) {
    for i in 1..entries.len() {
        let (head, tail) = entries.split_at_mut(i);
        let prev = &mut head[i - 1];
        let cur = &mut tail[0];
        if let Some(start) = cur.start_frame {
            if prev.end_frame > start {
                let mid = (prev.end_frame + start) / 2;
                debug!("{} overlaps {}, splitting at frame {}", prev.utt_id, cur.utt_id, mid);
                prev.end_frame = mid;
                cur.start_frame = Some(mid);
            }
        }
    }
}

/// Keeps every entry non-empty and in order after snapping moved ends around.
///
/// Only the first entry may keep a cancelled start; later ones start where
/// the previous entry ends.
fn enforce_order(entries: &mut [ControlEntry]) {
    let mut floor = 0u64;
    for (i, entry) in entries.iter_mut().enumerate() {
        match entry.start_frame {
            Some(start) if start < floor => {
                warn!("{} starts at frame {} before the previous end {}", entry.utt_id, start, floor);
                entry.start_frame = Some(floor);
            }
            None if i > 0 => {
                debug!("{} has no detected start, using previous end {}", entry.utt_id, floor);
                entry.start_frame = Some(floor);
            }
            _ => {}
        }
        let start = entry.start_frame.unwrap_or(0);
        if entry.end_frame < start {
            warn!(
                "{} ends at frame {} before its start {}, clamping",
                entry.utt_id, entry.end_frame, start
            );
            entry.end_frame = start;
        }
        floor = entry.end_frame;
    }
}
