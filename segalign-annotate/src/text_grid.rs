//! Praat TextGrid writer
//!
//! Unlike the EAF, a TextGrid interval tier must cover the whole recording,
//! so all intervals are kept (silence and fillers included) and every tier
//! is padded with a filler up to the common end time.

use crate::{Alignment, AnnotationWriter, Error, Result, Timeline};
use segalign_core::Interval;
use std::path::Path;
use textgrid::{TextGrid, Tier, TierType};

/// Shortest document written, one millisecond
const MIN_DURATION: f64 = 0.001;

/// Writes alignments as long-format TextGrid files
#[derive(Debug, Clone, Copy, Default)]
pub struct TextGridWriter;

impl TextGridWriter {
    /// Builds the `utterances`, `words` and `phones` interval tiers
    pub fn build(&self, alignment: &Alignment) -> Result<TextGrid> {
        let xmax = alignment.duration().max(MIN_DURATION);
        let mut text_grid = TextGrid::new(0.0, xmax)
            .map_err(|err| Error::TextGrid(format!("Failed to build TextGrid structure: {err}")))?;

        for (name, timeline) in [
            ("utterances", &alignment.utterances),
            ("words", &alignment.words),
            ("phones", &alignment.phones),
        ] {
            text_grid
                .add_tier(interval_tier(name, timeline, xmax))
                .map_err(|err| Error::TextGrid(format!("Failed to add {name} tier: {err}")))?;
        }
        Ok(text_grid)
    }
}

impl AnnotationWriter for TextGridWriter {
    fn write_file(&self, alignment: &Alignment, path: &Path) -> Result<()> {
        self.build(alignment)?
            .to_file(path, false)
            .map_err(|err| Error::TextGrid(format!("Failed to write TextGrid '{}': {err}", path.display())))
    }
}

fn interval_tier(name: &str, timeline: &Timeline, xmax: f64) -> Tier {
    let mut intervals: Vec<Interval> = timeline.intervals().to_vec();
    let end = timeline.end();
    if intervals.is_empty() || end < xmax {
        intervals.push(Interval::filler(end, xmax));
    }

    Tier {
        name: name.to_string(),
        tier_type: TierType::IntervalTier,
        xmin: 0.0,
        xmax,
        intervals: intervals
            .into_iter()
            .map(|interval| textgrid::Interval {
                xmin: interval.start,
                xmax: interval.end,
                text: interval.label,
            })
            .collect(),
        points: Vec::new(),
    }
}
