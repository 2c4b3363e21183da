//! Manually annotated utterance boundaries
//!
//! Each data line gives the end time (seconds) of one reference utterance,
//! optionally preceded by its 1-based utterance index:
//!
//! ```text
//! # utt  end
//! 5      4.00
//! 9      8.20
//! ```
//!
//! Without an explicit index the utterance is numbered by its position among
//! the data lines. Blank lines and `#` comments are ignored.

use crate::{seconds_to_frames, Result};
use log::warn;
use regex::Regex;
use std::io::BufRead;
use std::sync::OnceLock;

fn boundary_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?:(\d+)\s+)?(\d+(?:\.\d*)?|\.\d+)\s*$").expect("valid regex")
    })
}

/// The manually annotated end of one reference utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManualBoundary {
    /// 1-based utterance index
    pub utt: u32,
    /// Annotated end of the utterance, in frames
    pub frame: u64,
}

impl ManualBoundary {
    /// Creates a new manual boundary
    pub fn new(utt: u32, frame: u64) -> Self {
        Self { utt, frame }
    }
}

/// Reads a boundary list.
///
/// Malformed lines and indices that do not increase are logged and skipped.
pub fn read_boundaries<R: BufRead>(reader: R, frames_per_second: u32) -> Result<Vec<ManualBoundary>> {
    let mut boundaries: Vec<ManualBoundary> = Vec::new();
    let mut position: u32 = 0;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        position += 1;

        let Some(caps) = boundary_line().captures(trimmed) else {
            warn!("Invalid boundary line {}: {:?}", line_no + 1, line);
            continue;
        };

        let utt = match caps.get(1) {
            Some(index) => match index.as_str().parse::<u32>() {
                Ok(utt) if utt > 0 => utt,
                _ => {
                    warn!("Invalid utterance index on boundary line {}: {:?}", line_no + 1, line);
                    continue;
                }
            },
            None => position,
        };
        let Ok(seconds) = caps[2].parse::<f64>() else {
            warn!("Invalid boundary time on line {}: {:?}", line_no + 1, line);
            continue;
        };

        if let Some(prev) = boundaries.last() {
            if utt <= prev.utt {
                warn!(
                    "Boundary line {} repeats or reorders utterance {} (after {}), skipping",
                    line_no + 1,
                    utt,
                    prev.utt
                );
                continue;
            }
        }

        boundaries.push(ManualBoundary::new(utt, seconds_to_frames(seconds, frames_per_second)));
    }

    Ok(boundaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_explicit_indices() {
        let input = "# utt end\n5 4.0\n9 8.2\n";
        let boundaries = read_boundaries(Cursor::new(input), 100).unwrap();
        assert_eq!(boundaries, vec![ManualBoundary::new(5, 400), ManualBoundary::new(9, 820)]);
    }

    #[test]
    fn test_positional_indices() {
        let input = "1.25\n\n2.5\n3\n";
        let boundaries = read_boundaries(Cursor::new(input), 100).unwrap();
        assert_eq!(
            boundaries,
            vec![
                ManualBoundary::new(1, 125),
                ManualBoundary::new(2, 250),
                ManualBoundary::new(3, 300),
            ]
        );
    }

    #[test]
    fn test_malformed_and_unordered_lines_are_skipped() {
        let input = "2 1.0\nnot a boundary\n2 1.5\n1 2.0\n4 3.0\n";
        let boundaries = read_boundaries(Cursor::new(input), 100).unwrap();
        assert_eq!(boundaries, vec![ManualBoundary::new(2, 100), ManualBoundary::new(4, 300)]);
    }
}
