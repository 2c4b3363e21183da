//! Word and phone segmentation files
//!
//! Each record is `<start_frame> <end_frame> [-]<score> <label>`, with frames
//! relative to the start of the utterance. A label may carry an alternate
//! pronunciation marker such as `the(2)`, which is dropped. The column header
//! and the closing `Total score` line written by the aligner are skipped.

use log::warn;
use regex::Regex;
use std::io::BufRead;
use std::sync::OnceLock;

fn segment_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(\d+)\s+(\d+)\s+(-?\d+)\s+(\S+)\s*$").expect("valid regex"))
}

fn alternate_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\([^)]+\)$").expect("valid regex"))
}

/// One segmentation record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentRecord {
    /// First frame, relative to the utterance start
    pub start_frame: u64,
    /// Last frame, relative to the utterance start
    pub end_frame: u64,
    /// Acoustic score
    pub score: i64,
    /// Word or phone with any alternate marker removed
    pub label: String,
}

impl SegmentRecord {
    /// Parses one record, returning `None` when the line does not match or
    /// the record ends before it starts
    pub fn parse(line: &str) -> Option<Self> {
        let caps = segment_line().captures(line)?;
        let start_frame: u64 = caps[1].parse().ok()?;
        let end_frame: u64 = caps[2].parse().ok()?;
        if end_frame < start_frame {
            return None;
        }
        Some(Self {
            start_frame,
            end_frame,
            score: caps[3].parse().ok()?,
            label: alternate_suffix().replace(&caps[4], "").into_owned(),
        })
    }
}

fn is_decoration(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty() || trimmed.starts_with("SFrm") || trimmed.starts_with("Total score")
}

/// Reads all records of a segmentation file, warning about malformed lines
pub fn read_segments<R: BufRead>(reader: R) -> std::io::Result<Vec<SegmentRecord>> {
    let mut records = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        match SegmentRecord::parse(&line) {
            Some(record) => records.push(record),
            None if is_decoration(&line) => {}
            None => warn!("Invalid segment line {}: {:?}", line_no + 1, line),
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_record() {
        let record = SegmentRecord::parse("   12    40   -8123 the(2)").unwrap();
        assert_eq!(record.start_frame, 12);
        assert_eq!(record.end_frame, 40);
        assert_eq!(record.score, -8123);
        assert_eq!(record.label, "the");
    }

    #[test]
    fn test_read_segments_skips_decoration() {
        let file = "\
\t SFrm  EFrm    SegAScr Word
\t    0    14    -51112 <s>
\t   15    40   -134520 hello
garbage line
 Total score:  -185632
";
        let records = read_segments(Cursor::new(file)).unwrap();
        let labels: Vec<_> = records.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["<s>", "hello"]);
    }

    #[test]
    fn test_reversed_record_is_rejected() {
        assert_eq!(SegmentRecord::parse("50 10 -1 x"), None);
        assert!(SegmentRecord::parse("10 10 -1 x").is_some());

        let records = read_segments(Cursor::new("0 9 -5 a\n50 10 -1 x\n10 20 -3 b\n")).unwrap();
        let labels: Vec<_> = records.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["a", "b"]);
    }
}
