//! Source adapters
//!
//! Each adapter turns a foreign format into a complete [`Score`] or fails as
//! a whole; the rest of the crate never sees a partially built score.
//!
//! ```text
//! .xml / .musicxml  → musicxml::parse_musicxml (roxmltree)
//! .mid / .midi      → midi::parse_midi (midly)
//! ```
//!
//! Constructs the model cannot express (unknown accidentals, duration
//! tokens, clef sign/line pairs) fall back to documented defaults instead of
//! failing.

pub mod midi;
pub mod musicxml;

use std::path::Path;

use thiserror::Error;

use crate::models::{ModelError, Score};

pub use midi::parse_midi;
pub use musicxml::parse_musicxml;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("xml parse error: {0}")]
    Xml(String),
    #[error("invalid musicxml: {0}")]
    InvalidMusicXml(String),
    #[error("unsupported musicxml feature: {0}")]
    UnsupportedMusicXml(String),
    #[error("midi parse error: {0}")]
    Midi(String),
    #[error("unsupported file type '{0}': use MusicXML (.xml, .musicxml) or MIDI (.mid, .midi)")]
    UnsupportedFormat(String),
    #[error("source is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
    #[error("inconsistent notation: {0}")]
    Model(#[from] ModelError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ImportError>;

/// Source formats recognised by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    MusicXml,
    Midi,
}

impl SourceFormat {
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "xml" | "musicxml" => Ok(SourceFormat::MusicXml),
            "mid" | "midi" => Ok(SourceFormat::Midi),
            // Compressed MusicXML is a zip container we do not unpack
            _ => Err(ImportError::UnsupportedFormat(file_name.to_string())),
        }
    }
}

/// Import a score from raw bytes, choosing the adapter from the file name
pub fn import_bytes(file_name: &str, bytes: &[u8]) -> Result<Score> {
    let format = SourceFormat::from_file_name(file_name)?;
    log::info!("Importing '{}' as {:?} ({} bytes)", file_name, format, bytes.len());

    let score = match format {
        SourceFormat::MusicXml => parse_musicxml(std::str::from_utf8(bytes)?)?,
        SourceFormat::Midi => parse_midi(bytes)?,
    };

    log::info!(
        "Imported '{}': {} staves, {} measures",
        file_name,
        score.staves.len(),
        score.measure_count()
    );
    Ok(score)
}

/// Read and import a score file from disk
pub fn import_file(path: impl AsRef<Path>) -> Result<Score> {
    let path = path.as_ref();
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    // Check the extension before touching the file
    SourceFormat::from_file_name(&file_name)?;
    let bytes = std::fs::read(path)?;
    import_bytes(&file_name, &bytes)
}

/// File name without its extension, used as a fallback title
pub fn title_from_file_name(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(SourceFormat::from_file_name("a.xml").unwrap(), SourceFormat::MusicXml);
        assert_eq!(SourceFormat::from_file_name("a.MusicXML").unwrap(), SourceFormat::MusicXml);
        assert_eq!(SourceFormat::from_file_name("song.mid").unwrap(), SourceFormat::Midi);
        assert_eq!(SourceFormat::from_file_name("song.MIDI").unwrap(), SourceFormat::Midi);
    }

    #[test]
    fn test_unsupported_extensions() {
        for name in ["score.mxl", "score.pdf", "noext"] {
            assert!(matches!(
                SourceFormat::from_file_name(name),
                Err(ImportError::UnsupportedFormat(_))
            ));
        }
    }

    #[test]
    fn test_import_bytes_rejects_bad_utf8() {
        let err = import_bytes("a.xml", &[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, ImportError::Encoding(_)));
    }

    #[test]
    fn test_title_from_file_name() {
        assert_eq!(title_from_file_name("Bach Invention.musicxml"), "Bach Invention");
        assert_eq!(title_from_file_name("tune"), "tune");
    }
}
