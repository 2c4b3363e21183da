//! Timeline reconstruction from control, transcript and segmentation files
//!
//! The control file and the reference transcript are read side by side, one
//! utterance per line. For every utterance the word (`wdseg/<utt>.wdseg`)
//! and phone (`phseg/<utt>.phseg`) segmentations are shifted by the utterance
//! start. When a segmentation is missing, the whole utterance stands in for
//! its words or phones.

use crate::{Alignment, AnnotateConfig, Result};
use log::{info, warn};
use segalign_core::{
    check_frame_rate, frames_to_seconds, open_input, read_lines, segment, ControlEntry, Interval,
    Transcript,
};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Segmentation granularity
#[derive(Debug, Clone, Copy)]
enum Level {
    Word,
    Phone,
}

impl Level {
    fn path(&self, base_dir: &Path, utt_id: &str) -> PathBuf {
        match self {
            Self::Word => base_dir.join("wdseg").join(format!("{utt_id}.wdseg")),
            Self::Phone => base_dir.join("phseg").join(format!("{utt_id}.phseg")),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Word => "word",
            Self::Phone => "phone",
        }
    }
}

/// Builds the alignment of one recording directory
pub struct TimelineBuilder {
    base_dir: PathBuf,
    config: AnnotateConfig,
}

impl TimelineBuilder {
    /// Creates a builder reading from `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>, config: AnnotateConfig) -> Self {
        Self {
            base_dir: base_dir.into(),
            config,
        }
    }

    /// Reads every utterance and returns the gap-filled timelines
    pub fn build(&self) -> Result<Alignment> {
        let fps = check_frame_rate(self.config.frames_per_second)?;

        let ctl_path = self.base_dir.join(segalign_core::CONTROL_FILE);
        let ctl_lines = read_lines(open_input(&ctl_path)?)?;
        let insent_path = self.base_dir.join(segalign_core::TRANSCRIPT_FILE);
        let insent_lines = read_lines(open_input(&insent_path)?)?;

        if ctl_lines.len() != insent_lines.len() {
            warn!(
                "{} has {} lines but {} has {}",
                ctl_path.display(),
                ctl_lines.len(),
                insent_path.display(),
                insent_lines.len()
            );
        }

        let mut alignment = Alignment::new(fps);
        let mut utterances = 0usize;

        for (idx, ctl_line) in ctl_lines.iter().enumerate() {
            let Some(entry) = ControlEntry::parse(ctl_line) else {
                if !ctl_line.trim().is_empty() {
                    warn!("Invalid CTL line {}: {:?}", idx + 1, ctl_line);
                }
                continue;
            };

            let transcript = match insent_lines.get(idx) {
                Some(line) => Transcript::parse(line),
                None => {
                    warn!("No transcript line for {}", entry.utt_id);
                    Transcript::default()
                }
            };
            match &transcript.utt_id {
                Some(id) if *id == entry.utt_id => {}
                Some(id) => warn!(
                    "utt id mismatch between ctl ({}) and insent ({}) on line {}",
                    entry.utt_id,
                    id,
                    idx + 1
                ),
                None => warn!("Invalid insent line {}: no utterance id", idx + 1),
            }

            self.add_utterance(&mut alignment, &entry, &transcript.text, fps);
            utterances += 1;
        }

        info!(
            "Built timelines for {} utterances: {} words, {} phones",
            utterances,
            alignment.words.labeled().count(),
            alignment.phones.labeled().count()
        );

        Ok(alignment)
    }

    fn add_utterance(&self, alignment: &mut Alignment, entry: &ControlEntry, text: &str, fps: u32) {
        let start = frames_to_seconds(entry.start_or_zero(), fps);
        let end = frames_to_seconds(entry.end_frame, fps);
        let utterance = Interval::new(start, end, text);
        alignment.utterances.add_interval(utterance.clone());

        for (level, timeline) in [
            (Level::Word, &mut alignment.words),
            (Level::Phone, &mut alignment.phones),
        ] {
            match self.load_segments(level, &entry.utt_id, start, fps) {
                Ok(intervals) if !intervals.is_empty() => {
                    for interval in intervals {
                        timeline.add_interval(interval);
                    }
                }
                Ok(_) => {
                    warn!("No {} segments for {}; using utt as {}", level.name(), entry.utt_id, level.name());
                    timeline.add_interval(utterance.clone());
                }
                Err(err) => {
                    warn!(
                        "couldn't open {}: {}; using utt as {}",
                        level.path(&self.base_dir, &entry.utt_id).display(),
                        err,
                        level.name()
                    );
                    timeline.add_interval(utterance.clone());
                }
            }
        }
    }

    fn load_segments(
        &self,
        level: Level,
        utt_id: &str,
        offset: f64,
        fps: u32,
    ) -> std::io::Result<Vec<Interval>> {
        let file = File::open(level.path(&self.base_dir, utt_id))?;
        let records = segment::read_segments(BufReader::new(file))?;
        Ok(records
            .into_iter()
            .map(|record| {
                Interval::new(
                    offset + frames_to_seconds(record.start_frame, fps),
                    offset + frames_to_seconds(record.end_frame, fps),
                    record.label,
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn recording(ctl: &str, insent: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ctl"), ctl).unwrap();
        fs::write(dir.path().join("insent"), insent).unwrap();
        fs::create_dir(dir.path().join("wdseg")).unwrap();
        fs::create_dir(dir.path().join("phseg")).unwrap();
        dir
    }

    #[test]
    fn test_segments_are_offset_by_utterance_start() {
        let dir = recording("./ 100 400 utt1\n", "cat sat (utt1)\n");
        fs::write(
            dir.path().join("wdseg/utt1.wdseg"),
            "SFrm EFrm SegAScr Word\n0 150 -100 cat\n200 300 -200 sat(2)\n",
        )
        .unwrap();
        fs::write(dir.path().join("phseg/utt1.phseg"), "0 149 -10 K\n150 300 -10 AE\n").unwrap();

        let alignment = TimelineBuilder::new(dir.path(), AnnotateConfig::default())
            .build()
            .unwrap();

        let words: Vec<_> = alignment
            .words
            .intervals()
            .iter()
            .map(|i| (i.start, i.end, i.label.as_str()))
            .collect();
        assert_eq!(
            words,
            vec![(0.0, 1.0, ""), (1.0, 2.5, "cat"), (2.5, 3.0, ""), (3.0, 4.0, "sat")]
        );
        assert_eq!(alignment.phones.labeled().count(), 2);
        assert_eq!(alignment.utterances.intervals()[1].label, "cat sat");
    }

    #[test]
    fn test_missing_segments_fall_back_to_utterance() {
        let dir = recording("./ 0 250 utt1\n./ 300 500 utt2\n", "hello (utt1)\nworld (utt3)\n");

        let alignment = TimelineBuilder::new(dir.path(), AnnotateConfig::default())
            .build()
            .unwrap();

        let words: Vec<_> = alignment.words.labeled().map(|i| i.label.as_str()).collect();
        assert_eq!(words, vec!["hello", "world"]);
        let phones: Vec<_> = alignment.phones.labeled().map(|i| (i.start, i.end)).collect();
        assert_eq!(phones, vec![(0.0, 2.5), (3.0, 5.0)]);
    }

    #[test]
    fn test_malformed_control_line_is_skipped() {
        let dir = recording("./ 0 100 utt1\nbroken\n./ 100 200 utt3\n", "a (utt1)\nb (utt2)\nc (utt3)\n");

        let alignment = TimelineBuilder::new(dir.path(), AnnotateConfig::default())
            .build()
            .unwrap();

        let words: Vec<_> = alignment.words.labeled().map(|i| i.label.as_str()).collect();
        assert_eq!(words, vec!["a", "c"]);
    }

    #[test]
    fn test_level_names_match() {
        assert_eq!(Level::Word.name(), "word");
        assert_eq!(Level::Phone.name(), "phone");
    }

    #[test]
    fn test_missing_transcript_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ctl"), "./ 0 100 utt1\n").unwrap();

        let result = TimelineBuilder::new(dir.path(), AnnotateConfig::default()).build();
        assert!(matches!(
            result,
            Err(crate::Error::Core(segalign_core::Error::MissingInput(_)))
        ));
    }
}
