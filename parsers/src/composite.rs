use crate::detect::default_detector;
use crate::prescription::PrescriptionParser;
use crate::text::PlainTextParser;
use crate::xml::XmlParser;
use doclens_core::config::DetectionConfig;
use doclens_core::{
    ContentHandler, Detector, MediaType, MetadataKey, MetadataRecord, ParseContext, ParseError,
    Parser,
};
use std::collections::BTreeMap;
use std::io::Read;
use std::sync::Arc;
use tracing::debug;

/// Routes each media type to the parser registered for it.
#[derive(Default, Clone)]
pub struct CompositeParser {
    parsers: BTreeMap<MediaType, Arc<dyn Parser>>,
    fallback: Option<Arc<dyn Parser>>,
}

impl CompositeParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `parser` for every type it declares. Later registrations
    /// win over earlier ones for the same type.
    pub fn register(&mut self, parser: Arc<dyn Parser>) {
        let context = ParseContext::new();
        for media_type in parser.supported_types(&context) {
            self.parsers.insert(media_type.base(), parser.clone());
        }
    }

    pub fn register_for(&mut self, media_type: MediaType, parser: Arc<dyn Parser>) {
        self.parsers.insert(media_type.base(), parser);
    }

    pub fn set_fallback(&mut self, parser: Arc<dyn Parser>) {
        self.fallback = Some(parser);
    }

    pub fn resolve(&self, media_type: &MediaType) -> Result<Arc<dyn Parser>, ParseError> {
        self.parsers
            .get(&media_type.base())
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| ParseError::Unsupported(media_type.to_string()))
    }

    fn declared_type(metadata: &MetadataRecord) -> Result<MediaType, ParseError> {
        let raw = metadata.get(MetadataKey::ContentType).ok_or_else(|| {
            ParseError::InvalidArgument("Content-Type metadata is required".to_string())
        })?;
        raw.parse()
            .map_err(|_| ParseError::InvalidArgument(format!("bad Content-Type: {}", raw)))
    }
}

impl Parser for CompositeParser {
    fn supported_types(&self, _context: &ParseContext) -> Vec<MediaType> {
        self.parsers.keys().cloned().collect()
    }

    /// Dispatches on the `Content-Type` already present in `metadata`.
    fn parse(
        &self,
        input: &mut dyn Read,
        handler: &mut dyn ContentHandler,
        metadata: &mut MetadataRecord,
        context: &ParseContext,
    ) -> Result<(), ParseError> {
        let media_type = Self::declared_type(metadata)?;
        let parser = self.resolve(&media_type)?;
        parser.parse(input, handler, metadata, context)
    }
}

/// Detects the media type from the content, then delegates.
pub struct AutoDetectParser {
    detector: Box<dyn Detector>,
    parsers: CompositeParser,
    lookahead: usize,
}

impl AutoDetectParser {
    pub fn new(detector: Box<dyn Detector>, parsers: CompositeParser) -> Self {
        Self {
            detector,
            parsers,
            lookahead: DetectionConfig::default().lookahead_bytes,
        }
    }

    pub fn with_config(mut self, config: &DetectionConfig) -> Self {
        self.lookahead = config.lookahead_bytes;
        self
    }

    pub fn parsers(&self) -> &CompositeParser {
        &self.parsers
    }

    pub fn detect(&self, bytes: &[u8], metadata: &MetadataRecord) -> MediaType {
        let head = &bytes[..bytes.len().min(self.lookahead)];
        self.detector.detect(head, metadata)
    }
}

impl Default for AutoDetectParser {
    /// Plain text, generic XML and prescriptions, with plain text as the
    /// fallback.
    fn default() -> Self {
        let mut parsers = CompositeParser::new();
        parsers.register(Arc::new(PlainTextParser));
        parsers.register(Arc::new(XmlParser));
        parsers.register(Arc::new(PrescriptionParser));
        parsers.set_fallback(Arc::new(PlainTextParser));
        Self::new(Box::new(default_detector()), parsers)
    }
}

impl Parser for AutoDetectParser {
    fn supported_types(&self, context: &ParseContext) -> Vec<MediaType> {
        self.parsers.supported_types(context)
    }

    fn parse(
        &self,
        input: &mut dyn Read,
        handler: &mut dyn ContentHandler,
        metadata: &mut MetadataRecord,
        context: &ParseContext,
    ) -> Result<(), ParseError> {
        let mut bytes = Vec::new();
        input.read_to_end(&mut bytes)?;

        let media_type = match metadata
            .get(MetadataKey::ContentType)
            .and_then(|raw| raw.parse::<MediaType>().ok())
        {
            Some(declared) => declared,
            None => {
                let detected = self.detect(&bytes, metadata);
                metadata.set(MetadataKey::ContentType, detected.to_string());
                detected
            }
        };
        debug!("Dispatching {} bytes as {}", bytes.len(), media_type);

        let parser = self.parsers.resolve(&media_type)?;
        parser.parse(&mut bytes.as_slice(), handler, metadata, context)
    }
}
