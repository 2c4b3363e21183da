//! Annotation document writers

use crate::{Alignment, AnnotateConfig, AnnotationFormat, EafWriter, Result, TextGridWriter};
use std::path::Path;

/// Serializes an alignment into one annotation document format
pub trait AnnotationWriter {
    /// Writes the whole document to `path`
    fn write_file(&self, alignment: &Alignment, path: &Path) -> Result<()>;
}

/// Picks the writer for the configured format
pub fn for_config(config: &AnnotateConfig) -> Box<dyn AnnotationWriter> {
    match config.format {
        AnnotationFormat::Eaf => Box::new(EafWriter::new(config)),
        AnnotationFormat::TextGrid => Box::new(TextGridWriter),
    }
}
