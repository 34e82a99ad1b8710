use crate::prescription::is_prescription_root;
use crate::xml::root_element;
use doclens_core::{Detector, MediaType, MetadataKey, MetadataRecord};
use infer::MatcherType;
use std::path::Path;

/// Sniffs the leading bytes. Binary signatures come from `infer`; text is
/// told apart by its first markup (HTML, prescription root, any XML root).
#[derive(Debug, Clone, Copy, Default)]
pub struct MagicDetector;

impl Detector for MagicDetector {
    fn detect(&self, head: &[u8], _metadata: &MetadataRecord) -> MediaType {
        if head.is_empty() {
            return MediaType::octet_stream();
        }
        if let Some(media) = binary_signature(head) {
            return media;
        }

        let body = strip_bom(head);
        if !looks_like_text(body) {
            return MediaType::octet_stream();
        }

        let trimmed = trim_ascii_start(body);
        if starts_with_ignore_case(trimmed, b"<!doctype html")
            || starts_with_ignore_case(trimmed, b"<html")
        {
            return MediaType::text("html");
        }
        if trimmed.starts_with(b"<") {
            if is_prescription_root(body) {
                return MediaType::prescription();
            }
            if root_element(body).is_some() {
                return MediaType::xml();
            }
        }
        MediaType::text_plain()
    }
}

/// `infer`'s verdict, leaving its text matchers (HTML, XML, scripts) to the
/// markup checks above.
fn binary_signature(head: &[u8]) -> Option<MediaType> {
    let kind = infer::get(head)?;
    if kind.matcher_type() == MatcherType::Text {
        return None;
    }
    kind.mime_type().parse().ok()
}

/// Extension to media type, first entry per type being its preferred
/// extension.
const EXTENSIONS: &[(&str, &str)] = &[
    ("txt", "text/plain"),
    ("log", "text/plain"),
    ("ls", "text/plain"),
    ("md", "text/markdown"),
    ("markdown", "text/markdown"),
    ("json", "application/json"),
    ("xml", "application/xml"),
    ("xpd", "application/x-prescription+xml"),
    ("html", "text/html"),
    ("htm", "text/html"),
    ("pdf", "application/pdf"),
    ("zip", "application/zip"),
];

/// Maps the extension of the `resourceName` metadata value.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameDetector;

impl Detector for NameDetector {
    fn detect(&self, _head: &[u8], metadata: &MetadataRecord) -> MediaType {
        let Some(name) = metadata.get(MetadataKey::ResourceName) else {
            return MediaType::octet_stream();
        };
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        EXTENSIONS
            .iter()
            .find(|(known, _)| *known == ext)
            .and_then(|(_, media)| media.parse().ok())
            .unwrap_or_else(MediaType::octet_stream)
    }
}

/// Preferred file extension for `media`, without the dot. Types outside the
/// name table fall back to `infer`'s extension for the same `head`.
pub fn extension_for(media: &MediaType, head: &[u8]) -> Option<&'static str> {
    let base = media.base().to_string();
    if let Some((ext, _)) = EXTENSIONS.iter().find(|(_, known)| *known == base) {
        return Some(*ext);
    }
    infer::get(head)
        .filter(|kind| kind.mime_type() == base)
        .map(|kind| kind.extension())
}

/// Trusts a media type someone already wrote under `key`.
#[derive(Debug, Clone)]
pub struct MetadataHintDetector {
    key: String,
}

impl MetadataHintDetector {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Detector for MetadataHintDetector {
    fn detect(&self, _head: &[u8], metadata: &MetadataRecord) -> MediaType {
        metadata
            .get(&self.key)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_else(MediaType::octet_stream)
    }
}

/// Asks each detector in turn; the first answer other than octet-stream wins.
#[derive(Default)]
pub struct CompositeDetector {
    detectors: Vec<Box<dyn Detector>>,
}

impl CompositeDetector {
    pub fn new(detectors: Vec<Box<dyn Detector>>) -> Self {
        Self { detectors }
    }

    pub fn push(&mut self, detector: Box<dyn Detector>) {
        self.detectors.push(detector);
    }
}

impl Detector for CompositeDetector {
    fn detect(&self, head: &[u8], metadata: &MetadataRecord) -> MediaType {
        self.detectors
            .iter()
            .map(|detector| detector.detect(head, metadata))
            .find(|media| !media.is_octet_stream())
            .unwrap_or_else(MediaType::octet_stream)
    }
}

/// Content sniffing first, then the file name.
pub fn default_detector() -> CompositeDetector {
    CompositeDetector::new(vec![Box::new(MagicDetector), Box::new(NameDetector)])
}

fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes)
}

fn trim_ascii_start(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    &bytes[start..]
}

fn starts_with_ignore_case(bytes: &[u8], prefix: &[u8]) -> bool {
    bytes.len() >= prefix.len() && bytes[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// UTF-8 (allowing a multi-byte sequence cut off at the end) with no control
/// bytes other than whitespace.
fn looks_like_text(bytes: &[u8]) -> bool {
    let valid = match std::str::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) if err.error_len().is_none() => {
            // Truncated in the middle of a char by the lookahead cut.
            match std::str::from_utf8(&bytes[..err.valid_up_to()]) {
                Ok(text) => text,
                Err(_) => return false,
            }
        }
        Err(_) => return false,
    };
    !valid
        .chars()
        .any(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t' | '\x0C'))
}
