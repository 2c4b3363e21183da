//! Labeled time intervals shared by every timeline

/// Labels that mark non-speech segments; never annotated
const SILENCE_LABELS: [&str; 5] = ["<sil>", "SIL", "<s>", "</s>", ""];

/// Returns true for silence markers and empty filler labels
pub fn is_silence(label: &str) -> bool {
    SILENCE_LABELS.contains(&label)
}

/// A labeled stretch of time, in seconds
#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Word, phone or transcript text; empty for gap fillers
    pub label: String,
}

impl Interval {
    /// Creates a new interval
    pub fn new(start: f64, end: f64, label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            label: label.into(),
        }
    }

    /// Creates an unlabeled interval covering a gap
    pub fn filler(start: f64, end: f64) -> Self {
        Self::new(start, end, String::new())
    }

    /// Returns the duration of this interval in seconds
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// Checks whether the label is a silence marker or filler
    pub fn is_silence(&self) -> bool {
        is_silence(&self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_vocabulary() {
        for label in ["<sil>", "SIL", "<s>", "</s>", ""] {
            assert!(is_silence(label), "{label:?} should be silence");
        }
        assert!(!is_silence("sil"));
        assert!(!is_silence("AH"));
    }

    #[test]
    fn test_filler_is_silence() {
        let filler = Interval::filler(1.5, 2.0);
        assert!(filler.is_silence());
        assert_eq!(filler.duration(), 0.5);
    }
}
