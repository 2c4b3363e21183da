//! ELAN annotation document (EAF 2.6) writer
//!
//! The document holds one time-order table shared by a `Word` and a
//! `Phoneme` tier. Silence and gap fillers are left out of both tiers.

use crate::{AnnotateConfig, Alignment, AnnotationWriter, Error, Result, TimePointRegistry};
use chrono::{DateTime, FixedOffset, Local};
use segalign_core::{seconds_to_millis, Interval};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const AUTHOR: &str = "HLP Lab Automatic Aligner";
const EAF_VERSION: &str = "2.6";
const SCHEMA_LOCATION: &str = "http://www.mpi.nl/tools/elan/EAFv2.6.xsd";

/// Linguistic types, locale and constraints ELAN expects in every document
const TRAILER: &str = r#"    <LINGUISTIC_TYPE GRAPHIC_REFERENCES="false" LINGUISTIC_TYPE_ID="default-lt" TIME_ALIGNABLE="true"/>
    <LINGUISTIC_TYPE GRAPHIC_REFERENCES="false" LINGUISTIC_TYPE_ID="Word" TIME_ALIGNABLE="true"/>
    <LINGUISTIC_TYPE GRAPHIC_REFERENCES="false" LINGUISTIC_TYPE_ID="Phoneme" TIME_ALIGNABLE="true"/>
    <LOCALE COUNTRY_CODE="US" LANGUAGE_CODE="en"/>
    <CONSTRAINT DESCRIPTION="Time subdivision of parent annotation's time interval, no time gaps allowed within this interval" STEREOTYPE="Time_Subdivision"/>
    <CONSTRAINT DESCRIPTION="Symbolic subdivision of a parent annotation. Annotations refering to the same parent are ordered" STEREOTYPE="Symbolic_Subdivision"/>
    <CONSTRAINT DESCRIPTION="1-1 association with a parent annotation" STEREOTYPE="Symbolic_Association"/>
    <CONSTRAINT DESCRIPTION="Time alignable annotations within the parent annotation's time interval, gaps are allowed" STEREOTYPE="Included_In"/>
"#;

/// Writes alignments as ELAN `.eaf` documents
#[derive(Debug, Clone)]
pub struct EafWriter {
    media_file: String,
    participant: String,
    date: DateTime<FixedOffset>,
}

impl EafWriter {
    /// Creates a writer stamped with the current local time
    pub fn new(config: &AnnotateConfig) -> Self {
        Self {
            media_file: config.media_file.clone(),
            participant: config.participant.clone(),
            date: Local::now().fixed_offset(),
        }
    }

    /// Overrides the document date
    pub fn with_date(mut self, date: DateTime<FixedOffset>) -> Self {
        self.date = date;
        self
    }

    fn write_tier<'a>(
        &self,
        out: &mut dyn Write,
        tier_id: &str,
        intervals: impl Iterator<Item = &'a Interval>,
        registry: &TimePointRegistry,
        next_id: &mut usize,
    ) -> Result<()> {
        writeln!(
            out,
            r#"    <TIER ANNOTATOR="Auto" DEFAULT_LOCALE="en" LINGUISTIC_TYPE_REF="{tier}" PARTICIPANT="{participant}" TIER_ID="{tier}">"#,
            tier = tier_id,
            participant = escape(&self.participant),
        )?;

        for interval in intervals {
            let start = seconds_to_millis(interval.start);
            let end = seconds_to_millis(interval.end);
            let ref1 = registry.slot(start).ok_or(Error::MissingTimeSlot(start))?;
            let ref2 = registry.slot(end).ok_or(Error::MissingTimeSlot(end))?;
            *next_id += 1;

            writeln!(out, "        <ANNOTATION>")?;
            writeln!(
                out,
                r#"            <ALIGNABLE_ANNOTATION ANNOTATION_ID="a{}" TIME_SLOT_REF1="{}" TIME_SLOT_REF2="{}">"#,
                next_id, ref1, ref2
            )?;
            writeln!(
                out,
                "                <ANNOTATION_VALUE>{}</ANNOTATION_VALUE>",
                escape(&interval.label)
            )?;
            writeln!(out, "            </ALIGNABLE_ANNOTATION>")?;
            writeln!(out, "        </ANNOTATION>")?;
        }

        writeln!(out, "    </TIER>")?;
        Ok(())
    }
}

impl AnnotationWriter for EafWriter {
    fn write_file(&self, alignment: &Alignment, path: &Path) -> Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write(alignment, &mut out)
    }
}

impl EafWriter {
    /// Writes the whole document to `out`
    pub fn write(&self, alignment: &Alignment, out: &mut dyn Write) -> Result<()> {
        let registry = TimePointRegistry::from_alignment(alignment);
        let annotation_count = alignment.words.labeled().count() + alignment.phones.labeled().count();
        let media = escape(&self.media_file);

        writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(
            out,
            r#"<ANNOTATION_DOCUMENT AUTHOR="{}" DATE="{}" FORMAT="{}" VERSION="{}" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:noNamespaceSchemaLocation="{}">"#,
            AUTHOR,
            self.date.format("%Y-%m-%dT%H:%M:%S%:z"),
            EAF_VERSION,
            EAF_VERSION,
            SCHEMA_LOCATION
        )?;
        writeln!(out, r#"    <HEADER MEDIA_FILE="" TIME_UNITS="milliseconds">"#)?;
        writeln!(
            out,
            r#"        <MEDIA_DESCRIPTOR MEDIA_URL="file://{media}" MIME_TYPE="audio/x-wav" RELATIVE_MEDIA_URL="file:{media}"/>"#
        )?;
        writeln!(
            out,
            r#"        <PROPERTY NAME="lastUsedAnnotationId">{}</PROPERTY>"#,
            annotation_count
        )?;
        writeln!(out, "    </HEADER>")?;

        writeln!(out, "    <TIME_ORDER>")?;
        for slot in registry.iter() {
            writeln!(
                out,
                r#"        <TIME_SLOT TIME_SLOT_ID="{}" TIME_VALUE="{}"/>"#,
                slot, slot.millis
            )?;
        }
        writeln!(out, "    </TIME_ORDER>")?;

        let mut next_id = 0usize;
        self.write_tier(out, "Word", alignment.words.labeled(), &registry, &mut next_id)?;
        self.write_tier(out, "Phoneme", alignment.phones.labeled(), &registry, &mut next_id)?;

        out.write_all(TRAILER.as_bytes())?;
        writeln!(out, "</ANNOTATION_DOCUMENT>")?;
        out.flush()?;
        Ok(())
    }
}

/// Escapes text for use in XML content and attribute values
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
