//! segalign Core Library
//!
//! This library provides the interval data structures and the line-oriented
//! text formats produced and consumed by a Sphinx-style forced aligner:
//! manual boundary lists, endpoint logs, control files, reference
//! transcripts and word/phone segmentation files.

pub mod boundary;
pub mod control;
pub mod endpoint;
pub mod interval;
pub mod segment;
pub mod transcript;

pub use boundary::ManualBoundary;
pub use control::ControlEntry;
pub use endpoint::AutoInterval;
pub use interval::Interval;
pub use segment::SegmentRecord;
pub use transcript::Transcript;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Recognizer frame rate used when nothing else is configured
pub const DEFAULT_FRAMES_PER_SECOND: u32 = 100;

/// Manual boundary list inside a recording directory
pub const BOUNDARIES_FILE: &str = "boundaries";
/// Endpoint detector log inside a recording directory
pub const ENDPOINTS_FILE: &str = "ep";
/// Utterance control file inside a recording directory
pub const CONTROL_FILE: &str = "ctl";
/// Reference transcript inside a recording directory
pub const TRANSCRIPT_FILE: &str = "insent";

/// Result type for segalign-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for segalign-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Required input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("Invalid frame rate: {0}")]
    InvalidFrameRate(u32),
}

/// Opens a file the run cannot do without.
///
/// A missing file is reported as [`Error::MissingInput`] so callers can tell
/// it apart from other IO failures.
pub fn open_input(path: &Path) -> Result<BufReader<File>> {
    match File::open(path) {
        Ok(file) => Ok(BufReader::new(file)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            Err(Error::MissingInput(path.to_path_buf()))
        }
        Err(err) => Err(Error::Io(err)),
    }
}

/// Reads every line of a reader, with line terminators removed
pub fn read_lines<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let lines = reader.lines().collect::<std::io::Result<Vec<_>>>()?;
    Ok(lines)
}

/// Rejects a zero frame rate, which would make every conversion divide by zero
pub fn check_frame_rate(frames_per_second: u32) -> Result<u32> {
    if frames_per_second == 0 {
        return Err(Error::InvalidFrameRate(frames_per_second));
    }
    Ok(frames_per_second)
}

/// Converts a time in seconds to the nearest frame index
pub fn seconds_to_frames(seconds: f64, frames_per_second: u32) -> u64 {
    (seconds * frames_per_second as f64).round().max(0.0) as u64
}

/// Converts a frame index to seconds
pub fn frames_to_seconds(frames: u64, frames_per_second: u32) -> f64 {
    frames as f64 / frames_per_second as f64
}

/// Converts seconds to whole milliseconds
pub fn seconds_to_millis(seconds: f64) -> u64 {
    (seconds * 1000.0).round().max(0.0) as u64
}
