//! Saves embedded documents to an output folder.

use crate::detect::{default_detector, extension_for};
use doclens_core::{Detector, MetadataKey, MetadataRecord, ParseError};
use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Writes each embedded document it is handed into `output_dir`.
///
/// The file is named after the document's `resourceName` (directories
/// stripped) or `file_N` when there is none. A name with no extension gets
/// one from the detected type when the type has a known extension.
pub struct EmbeddedDocumentExtractor {
    output_dir: PathBuf,
    detector: Box<dyn Detector>,
    file_count: usize,
}

impl EmbeddedDocumentExtractor {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self::with_detector(output_dir, Box::new(default_detector()))
    }

    pub fn with_detector(output_dir: impl Into<PathBuf>, detector: Box<dyn Detector>) -> Self {
        Self {
            output_dir: output_dir.into(),
            detector,
            file_count: 0,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn should_parse_embedded(&self, _metadata: &MetadataRecord) -> bool {
        true
    }

    /// Writes `input` to a new file and returns its path. An existing file
    /// of the same name is an error, never overwritten.
    pub fn parse_embedded(
        &mut self,
        input: &mut dyn Read,
        metadata: &MetadataRecord,
    ) -> Result<PathBuf, ParseError> {
        let mut bytes = Vec::new();
        input.read_to_end(&mut bytes)?;

        self.file_count += 1;
        let mut name = metadata
            .get(MetadataKey::ResourceName)
            .and_then(|name| Path::new(name).file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("file_{}", self.file_count));

        if !name.contains('.') {
            let media = self.detector.detect(&bytes, metadata);
            if let Some(extension) = extension_for(&media, &bytes) {
                name.push('.');
                name.push_str(extension);
            }
            debug!(%media, name = %name, "named embedded document");
        }

        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(&name);
        let mut file = OpenOptions::new().write(true).create_new(true).open(&path)?;
        file.write_all(&bytes)?;
        info!(path = %path.display(), bytes = bytes.len(), "extracted embedded document");
        Ok(path)
    }
}
