//! Gap-filled interval timelines

use segalign_core::Interval;

/// Ordered, gap-free sequence of intervals starting at time 0.
///
/// Intervals are appended in time order. Gaps longer than one frame are
/// covered by unlabeled fillers, shorter gaps are treated as rounding noise
/// and closed by stretching the previous interval, and overlaps are clipped.
#[derive(Debug, Clone)]
pub struct Timeline {
    intervals: Vec<Interval>,
    frame_period: f64,
}

impl Timeline {
    /// Creates an empty timeline for the given frame rate
    pub fn new(frames_per_second: u32) -> Self {
        Self {
            intervals: Vec::new(),
            frame_period: 1.0 / frames_per_second.max(1) as f64,
        }
    }

    /// Appends an interval, filling or closing the gap before it
    pub fn add_interval(&mut self, mut interval: Interval) {
        let slack = self.frame_period / 100.0;

        match self.intervals.last().map(|prev| (prev.start, prev.end)) {
            Some((prev_start, prev_end)) => {
                let gap = interval.start - prev_end;
                if gap > self.frame_period + slack {
                    self.intervals.push(Interval::filler(prev_end, interval.start));
                } else if gap > 0.0 {
                    self.set_last_end(interval.start);
                } else if gap < 0.0 {
                    let clipped = interval.start.max(prev_start);
                    self.set_last_end(clipped);
                    if interval.start < clipped {
                        interval.start = clipped;
                        interval.end = interval.end.max(clipped);
                    }
                }
            }
            None if interval.start > 0.0 => {
                self.intervals.push(Interval::filler(0.0, interval.start));
            }
            None => {}
        }

        self.intervals.push(interval);
    }

    fn set_last_end(&mut self, end: f64) {
        if let Some(last) = self.intervals.last_mut() {
            last.end = end;
        }
    }

    /// All intervals, fillers included
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Intervals that carry an annotatable label
    pub fn labeled(&self) -> impl Iterator<Item = &Interval> {
        self.intervals.iter().filter(|interval| !interval.is_silence())
    }

    /// End of the last interval, or 0 for an empty timeline
    pub fn end(&self) -> f64 {
        self.intervals.last().map_or(0.0, |interval| interval.end)
    }

    /// Number of intervals, fillers included
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Returns true if nothing was added yet
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(timeline: &Timeline) -> Vec<&str> {
        timeline.intervals().iter().map(|i| i.label.as_str()).collect()
    }

    #[test]
    fn test_gap_longer_than_a_frame_gets_filler() {
        let mut timeline = Timeline::new(100);
        timeline.add_interval(Interval::new(0.0, 1.5, "cat"));
        timeline.add_interval(Interval::new(2.0, 3.0, "sat"));

        assert_eq!(labels(&timeline), vec!["cat", "", "sat"]);
        assert_eq!(timeline.intervals()[1], Interval::filler(1.5, 2.0));
    }

    #[test]
    fn test_one_frame_gap_is_closed() {
        let mut timeline = Timeline::new(100);
        timeline.add_interval(Interval::new(0.0, 0.14, "the"));
        timeline.add_interval(Interval::new(0.15, 0.40, "dog"));

        assert_eq!(labels(&timeline), vec!["the", "dog"]);
        assert_eq!(timeline.intervals()[0].end, 0.15);
    }

    #[test]
    fn test_leading_filler() {
        let mut timeline = Timeline::new(100);
        timeline.add_interval(Interval::new(0.5, 1.0, "hi"));

        assert_eq!(timeline.intervals()[0], Interval::filler(0.0, 0.5));
        assert_eq!(timeline.end(), 1.0);
    }

    #[test]
    fn test_overlap_is_clipped() {
        let mut timeline = Timeline::new(100);
        timeline.add_interval(Interval::new(0.0, 1.2, "a"));
        timeline.add_interval(Interval::new(1.0, 2.0, "b"));

        assert_eq!(timeline.intervals()[0].end, 1.0);
        assert_eq!(timeline.intervals()[1].start, 1.0);
    }

    #[test]
    fn test_timeline_is_contiguous() {
        let mut timeline = Timeline::new(100);
        for (start, end, label) in [
            (0.3, 0.8, "a"),
            (0.81, 1.1, "b"),
            (1.1, 1.3, "SIL"),
            (2.0, 2.4, "c"),
            (2.3, 2.9, "d"),
            (5.0, 5.5, "e"),
        ] {
            timeline.add_interval(Interval::new(start, end, label));
        }

        let intervals = timeline.intervals();
        assert_eq!(intervals[0].start, 0.0);
        for pair in intervals.windows(2) {
            assert_eq!(pair[1].start, pair[0].end, "{pair:?}");
        }
        for interval in intervals {
            assert!(interval.start <= interval.end, "{interval:?}");
        }
        let labeled: Vec<_> = timeline.labeled().map(|i| i.label.as_str()).collect();
        assert_eq!(labeled, vec!["a", "b", "c", "d", "e"]);
    }
}
