use crate::crypto::{CipherError, DecryptingReader, SecretKey};
use crate::xml::{root_element, XmlParser};
use doclens_core::config::DetectionConfig;
use doclens_core::handler::ElementMetadataHandler;
use doclens_core::{
    ContentHandler, Detector, MediaType, MetadataKey, MetadataRecord, ParseContext, ParseError,
    Parser, TeeContentHandler,
};
use std::io::Read;
use tracing::debug;

pub const XPD_NAMESPACE: &str = "http://example.com/2011/xpd";
pub const DOCTOR_KEY: &str = "xpd:doctor";
pub const PATIENT_KEY: &str = "xpd:patient";

/// XML parser for digital prescriptions that also lifts the doctor and
/// patient names into metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrescriptionParser;

impl Parser for PrescriptionParser {
    fn supported_types(&self, _context: &ParseContext) -> Vec<MediaType> {
        vec![MediaType::prescription()]
    }

    fn parse(
        &self,
        input: &mut dyn Read,
        handler: &mut dyn ContentHandler,
        metadata: &mut MetadataRecord,
        context: &ParseContext,
    ) -> Result<(), ParseError> {
        if !metadata.contains(MetadataKey::ContentType) {
            metadata.set(MetadataKey::ContentType, MediaType::prescription().to_string());
        }

        let mut doctor = ElementMetadataHandler::new(XPD_NAMESPACE, "doctor", DOCTOR_KEY);
        let mut patient = ElementMetadataHandler::new(XPD_NAMESPACE, "patient", PATIENT_KEY);
        let handlers: Vec<&mut dyn ContentHandler> = vec![handler, &mut doctor, &mut patient];
        let mut tee = TeeContentHandler::new(handlers);

        XmlParser.parse(input, &mut tee, metadata, context)
    }
}

impl From<CipherError> for ParseError {
    fn from(err: CipherError) -> Self {
        match err {
            CipherError::Io(err) => ParseError::Io(err),
            other => ParseError::Decrypt(other.to_string()),
        }
    }
}

/// Opens a sealed stream with `key` and parses the plaintext as a
/// prescription while it is being decrypted.
#[derive(Debug, Clone)]
pub struct EncryptedPrescriptionParser {
    key: SecretKey,
}

impl EncryptedPrescriptionParser {
    pub fn new(key: SecretKey) -> Self {
        Self { key }
    }
}

impl Parser for EncryptedPrescriptionParser {
    fn supported_types(&self, _context: &ParseContext) -> Vec<MediaType> {
        vec![MediaType::prescription()]
    }

    fn parse(
        &self,
        input: &mut dyn Read,
        handler: &mut dyn ContentHandler,
        metadata: &mut MetadataRecord,
        context: &ParseContext,
    ) -> Result<(), ParseError> {
        let mut plain = DecryptingReader::new(input, &self.key)?;
        PrescriptionParser.parse(&mut plain, handler, metadata, context)
    }
}

/// Labels content as a prescription when its decrypted head has an
/// `{XPD_NAMESPACE}prescription` root.
#[derive(Debug, Clone)]
pub struct EncryptedPrescriptionDetector {
    key: SecretKey,
    lookahead: usize,
}

impl EncryptedPrescriptionDetector {
    pub fn new(key: SecretKey) -> Self {
        Self {
            key,
            lookahead: DetectionConfig::default().lookahead_bytes,
        }
    }

    pub fn with_lookahead(mut self, lookahead: usize) -> Self {
        self.lookahead = lookahead;
        self
    }

    fn open_head(&self, head: &[u8]) -> Result<Vec<u8>, CipherError> {
        let head = &head[..head.len().min(self.lookahead)];
        let mut plain = Vec::with_capacity(head.len());
        DecryptingReader::new(head, &self.key)?.read_to_end(&mut plain)?;
        Ok(plain)
    }
}

impl Detector for EncryptedPrescriptionDetector {
    fn detect(&self, head: &[u8], _metadata: &MetadataRecord) -> MediaType {
        match self.open_head(head) {
            Ok(plain) if is_prescription_root(&plain) => MediaType::prescription(),
            Ok(_) => MediaType::octet_stream(),
            Err(err) => {
                debug!("Prescription sniffing could not decrypt: {}", err);
                MediaType::octet_stream()
            }
        }
    }
}

pub fn is_prescription_root(head: &[u8]) -> bool {
    root_element(head).is_some_and(|root| root.is(XPD_NAMESPACE, "prescription"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use doclens_core::BodyContentHandler;

    const SAMPLE: &str = r#"<?xml version="1.0"?>
<xpd:prescription xmlns:xpd="http://example.com/2011/xpd">
  <xpd:doctor>Dr. Ada</xpd:doctor>
  <xpd:patient>Bob</xpd:patient>
  <xpd:drug>Aspirin</xpd:drug>
</xpd:prescription>"#;

    #[test]
    fn test_prescription_parser_lifts_names() {
        let mut body = BodyContentHandler::new();
        let mut metadata = MetadataRecord::new();
        PrescriptionParser
            .parse(
                &mut SAMPLE.as_bytes(),
                &mut body,
                &mut metadata,
                &ParseContext::new(),
            )
            .unwrap();

        assert_eq!(metadata.values(DOCTOR_KEY), ["Dr. Ada"]);
        assert_eq!(metadata.values(PATIENT_KEY), ["Bob"]);
        assert_eq!(
            metadata.get(MetadataKey::ContentType),
            Some("application/x-prescription+xml")
        );
        assert!(body.text().contains("Aspirin"));
    }

    #[test]
    fn test_root_check() {
        assert!(is_prescription_root(SAMPLE.as_bytes()));
        assert!(!is_prescription_root(b"<prescription/>"));
    }
}
