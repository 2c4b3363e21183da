//! Utterance control file format
//!
//! One utterance per line: `./ <start_frame> <end_frame> <utt_id>`.

use crate::Result;
use regex::Regex;
use std::fmt;
use std::io::Write;
use std::sync::OnceLock;

fn control_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*\S+\s+(\d+)\s+(\d+)\s+(\S+)\s*$").expect("valid regex"))
}

/// A single control file line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlEntry {
    /// First frame of the utterance; `None` when detection cancelled the start
    pub start_frame: Option<u64>,
    /// Last frame of the utterance
    pub end_frame: u64,
    /// Utterance id, `uttN` or `uttN-M` for merged utterances
    pub utt_id: String,
}

impl ControlEntry {
    /// Creates a new control entry
    pub fn new(start_frame: Option<u64>, end_frame: u64, utt_id: impl Into<String>) -> Self {
        Self {
            start_frame,
            end_frame,
            utt_id: utt_id.into(),
        }
    }

    /// Start frame as written to disk; a cancelled start becomes frame 0
    pub fn start_or_zero(&self) -> u64 {
        self.start_frame.unwrap_or(0)
    }

    /// Parses one control line, returning `None` when it does not match
    pub fn parse(line: &str) -> Option<Self> {
        let caps = control_line().captures(line)?;
        let start_frame = caps[1].parse().ok()?;
        let end_frame = caps[2].parse().ok()?;
        Some(Self::new(Some(start_frame), end_frame, &caps[3]))
    }
}

impl fmt::Display for ControlEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "./ {} {} {}", self.start_or_zero(), self.end_frame, self.utt_id)
    }
}

/// Writes control entries, one per line
pub fn write_control<W: Write>(mut writer: W, entries: &[ControlEntry]) -> Result<()> {
    for entry in entries {
        writeln!(writer, "{entry}")?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_control_line() {
        let entry = ControlEntry::parse("./ 120 455 utt3-4").unwrap();
        assert_eq!(entry.start_frame, Some(120));
        assert_eq!(entry.end_frame, 455);
        assert_eq!(entry.utt_id, "utt3-4");

        assert!(ControlEntry::parse("./ 120 utt3").is_none());
        assert!(ControlEntry::parse("").is_none());
    }

    #[test]
    fn test_cancelled_start_written_as_zero() {
        let entries = vec![
            ControlEntry::new(None, 400, "utt5"),
            ControlEntry::new(Some(400), 820, "utt9"),
        ];

        let mut buffer = Vec::new();
        write_control(&mut buffer, &entries).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "./ 0 400 utt5\n./ 400 820 utt9\n");

        let parsed: Vec<_> = text.lines().filter_map(ControlEntry::parse).collect();
        assert_eq!(parsed[0].start_frame, Some(0));
        assert_eq!(parsed[1], entries[1]);
    }
}
