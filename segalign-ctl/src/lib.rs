//! segalign Control File Library
//!
//! This library reconciles the utterance endpoints found by an automatic
//! detector with manually annotated utterance boundaries and produces the
//! control file the aligner runs from.

pub mod reconciler;

pub use reconciler::BoundaryReconciler;

use log::info;
use segalign_core::{
    boundary, check_frame_rate, control, endpoint, open_input, ControlEntry,
    DEFAULT_FRAMES_PER_SECOND,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Result type for segalign-ctl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for segalign-ctl operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("segalign core error: {0}")]
    Core(#[from] segalign_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Endpoint log contains no utterances but {0} manual boundaries were given")]
    NoEndpoints(usize),
}

/// Reconciler configuration
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReconcileConfig {
    /// Largest distance (frames) at which a detected end still counts as the manual boundary
    pub epsilon_frames: u64,
    /// Recognizer frame rate used to convert seconds to frames
    pub frames_per_second: u32,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            epsilon_frames: 50,
            frames_per_second: DEFAULT_FRAMES_PER_SECOND,
        }
    }
}

/// Loads `boundaries` and `ep` from a recording directory and reconciles them
pub fn reconcile_dir(base_dir: &Path, config: &ReconcileConfig) -> Result<Vec<ControlEntry>> {
    let fps = check_frame_rate(config.frames_per_second)?;

    let boundaries_path = base_dir.join(segalign_core::BOUNDARIES_FILE);
    let boundaries = boundary::read_boundaries(open_input(&boundaries_path)?, fps)?;
    info!("Loaded {} manual boundaries from {}", boundaries.len(), boundaries_path.display());

    let endpoints_path = base_dir.join(segalign_core::ENDPOINTS_FILE);
    let endpoints = endpoint::read_endpoints(open_input(&endpoints_path)?, fps)?;
    info!("Loaded {} detected utterances from {}", endpoints.len(), endpoints_path.display());

    BoundaryReconciler::new(config.clone()).reconcile(&boundaries, &endpoints)
}

/// Writes reconciled entries as a control file
pub fn write_control_file(path: &Path, entries: &[ControlEntry]) -> Result<()> {
    let file = File::create(path)?;
    control::write_control(BufWriter::new(file), entries)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_reconcile_dir_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("boundaries"), "5 4.0\n9 8.2\n").unwrap();
        fs::write(
            dir.path().join("ep"),
            "Utt_Start#0, Leader: 0.00,\n\
             Utt_End#0, End: 3.95,  Trailer: 4.00\n\
             Utt_Start#1, Leader: 4.00,\n\
             Utt_End#1, End: 8.15,  Trailer: 8.20\n",
        )
        .unwrap();

        let entries = reconcile_dir(dir.path(), &ReconcileConfig::default()).unwrap();
        let ctl = dir.path().join("ctl");
        write_control_file(&ctl, &entries).unwrap();

        assert_eq!(fs::read_to_string(ctl).unwrap(), "./ 0 400 utt5\n./ 400 820 utt9\n");
    }

    #[test]
    fn test_missing_boundaries_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ep"), "").unwrap();

        let err = reconcile_dir(dir.path(), &ReconcileConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Core(segalign_core::Error::MissingInput(_))));
    }
}
