//! Endpoint detector log
//!
//! The detector reports utterances as event lines:
//!
//! ```text
//! Utt_Start#0, Leader: 0.25, ...
//! Utt_End#0, End: 3.90,  Trailer: 4.00
//! Utt_Cancel
//! ```
//!
//! A start opens an interval at the leader time and an end closes it at the
//! trailer time. A cancel discards the pending start: if an end follows, the
//! interval is kept without a start, if another start follows, nothing was
//! detected. A start arriving while an interval is still open closes that
//! interval without an end (truncated).

use crate::{seconds_to_frames, Result};
use log::{debug, warn};
use regex::Regex;
use std::io::BufRead;
use std::sync::OnceLock;

fn start_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^Utt_Start#\d+, Leader: ([\d.]+),").expect("valid regex"))
}

fn cancel_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^Utt_Cancel").expect("valid regex"))
}

fn end_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^Utt_End#\d+, End: [\d.]+,\s+Trailer: ([\d.]+)").expect("valid regex")
    })
}

/// One automatically detected speech interval, in frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AutoInterval {
    /// Start frame; `None` when the detector cancelled the start
    pub start: Option<u64>,
    /// End frame; `None` when the utterance was truncated
    pub end: Option<u64>,
}

impl AutoInterval {
    /// Creates a new detected interval
    pub fn new(start: Option<u64>, end: Option<u64>) -> Self {
        Self { start, end }
    }

    /// Best known end point: the end, or the start of a truncated interval
    pub fn effective_end(&self) -> u64 {
        self.end.or(self.start).unwrap_or(0)
    }
}

enum Event {
    Start(u64),
    Cancel,
    End(u64),
}

fn parse_event(line: &str, frames_per_second: u32) -> Option<Event> {
    if let Some(caps) = start_line().captures(line) {
        let seconds = caps[1].parse::<f64>().ok()?;
        return Some(Event::Start(seconds_to_frames(seconds, frames_per_second)));
    }
    if cancel_line().is_match(line) {
        return Some(Event::Cancel);
    }
    if let Some(caps) = end_line().captures(line) {
        let seconds = caps[1].parse::<f64>().ok()?;
        return Some(Event::End(seconds_to_frames(seconds, frames_per_second)));
    }
    None
}

/// Reads the endpoint log into detected intervals, in detection order
pub fn read_endpoints<R: BufRead>(reader: R, frames_per_second: u32) -> Result<Vec<AutoInterval>> {
    let mut intervals = Vec::new();
    // Some(_) while an utterance is open; the inner start is None after a cancel
    let mut open: Option<Option<u64>> = None;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        match parse_event(&line, frames_per_second) {
            Some(Event::Start(frame)) => {
                match open.take() {
                    Some(Some(start)) => {
                        warn!("Utterance starting at frame {} was truncated (line {})", start, line_no + 1);
                        intervals.push(AutoInterval::new(Some(start), None));
                    }
                    Some(None) => debug!("Cancelled utterance dropped before line {}", line_no + 1),
                    None => {}
                }
                open = Some(Some(frame));
            }
            Some(Event::Cancel) => {
                open = Some(None);
            }
            Some(Event::End(frame)) => {
                let start = open.take().flatten();
                intervals.push(AutoInterval::new(start, Some(frame)));
            }
            None => {
                if !line.trim().is_empty() {
                    debug!("Ignoring endpoint log line {}: {:?}", line_no + 1, line);
                }
            }
        }
    }

    if let Some(Some(start)) = open {
        warn!("Utterance starting at frame {} has no end", start);
        intervals.push(AutoInterval::new(Some(start), None));
    }

    Ok(intervals)
}
