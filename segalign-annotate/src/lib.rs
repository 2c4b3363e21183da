//! segalign Annotation Library
//!
//! This library rebuilds absolute word and phone timelines from per-utterance
//! segmentation files and writes them as annotation documents (ELAN EAF or
//! Praat TextGrid).

pub mod builder;
pub mod eaf;
pub mod registry;
pub mod text_grid;
pub mod timeline;
pub mod writer;

pub use builder::TimelineBuilder;
pub use eaf::EafWriter;
pub use registry::{TimePointRegistry, TimeSlot};
pub use text_grid::TextGridWriter;
pub use timeline::Timeline;
pub use writer::AnnotationWriter;

use segalign_core::DEFAULT_FRAMES_PER_SECOND;

/// Result type for segalign-annotate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for segalign-annotate operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("segalign core error: {0}")]
    Core(#[from] segalign_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No time slot registered for {0} ms")]
    MissingTimeSlot(u64),

    #[error("{0}")]
    TextGrid(String),
}

/// Annotation document flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AnnotationFormat {
    /// ELAN annotation document
    #[default]
    Eaf,
    /// Praat TextGrid
    TextGrid,
}

impl AnnotationFormat {
    /// Default output file name for this format
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Eaf => "annotation.eaf",
            Self::TextGrid => "annotation.TextGrid",
        }
    }
}

/// Annotation configuration
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnnotateConfig {
    /// Recognizer frame rate
    pub frames_per_second: u32,
    /// Audio file the annotation document points at
    pub media_file: String,
    /// Participant recorded on every tier
    pub participant: String,
    /// Document flavour to write
    pub format: AnnotationFormat,
}

impl Default for AnnotateConfig {
    fn default() -> Self {
        Self {
            frames_per_second: DEFAULT_FRAMES_PER_SECOND,
            media_file: "audio.wav".to_string(),
            participant: "NA".to_string(),
            format: AnnotationFormat::Eaf,
        }
    }
}

/// Utterance, word and phone timelines of one recording
#[derive(Debug, Clone)]
pub struct Alignment {
    /// One interval per utterance, labeled with its transcript
    pub utterances: Timeline,
    /// Word intervals
    pub words: Timeline,
    /// Phone intervals
    pub phones: Timeline,
}

impl Alignment {
    /// Creates empty timelines for the given frame rate
    pub fn new(frames_per_second: u32) -> Self {
        Self {
            utterances: Timeline::new(frames_per_second),
            words: Timeline::new(frames_per_second),
            phones: Timeline::new(frames_per_second),
        }
    }

    /// Latest end time over all timelines, in seconds
    pub fn duration(&self) -> f64 {
        self.utterances
            .end()
            .max(self.words.end())
            .max(self.phones.end())
    }
}
