use crate::error::{DoclensError, ErrorCode};
use crate::handler::ContentHandler;
use crate::media::MediaType;
use crate::metadata::MetadataRecord;
use std::collections::BTreeMap;
use std::io::Read;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Read failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unsupported media type: {0}")]
    Unsupported(String),
    #[error("Malformed lines skipped: {line_numbers:?}")]
    MalformedLines { line_numbers: Vec<usize> },
    #[error("XML error: {0}")]
    Xml(String),
    #[error("Unable to decrypt content: {0}")]
    Decrypt(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl DoclensError for ParseError {
    fn error_code(&self) -> ErrorCode {
        match self {
            ParseError::Io(_) => ErrorCode::ReadFailure,
            ParseError::Unsupported(_) => ErrorCode::UnsupportedMediaType,
            ParseError::MalformedLines { .. } | ParseError::Xml(_) => ErrorCode::MalformedInput,
            ParseError::Decrypt(_) => ErrorCode::Internal,
            ParseError::InvalidArgument(_) => ErrorCode::InvalidArgument,
        }
    }
}

/// Pass-through attributes for a single parse call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseContext {
    attributes: BTreeMap<String, String>,
}

impl ParseContext {
    pub const LOCALE: &'static str = "locale";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

pub trait Parser: Send + Sync {
    fn supported_types(&self, context: &ParseContext) -> Vec<MediaType>;

    fn parse(
        &self,
        input: &mut dyn Read,
        handler: &mut dyn ContentHandler,
        metadata: &mut MetadataRecord,
        context: &ParseContext,
    ) -> Result<(), ParseError>;
}

pub trait Detector: Send + Sync {
    /// Labels the content from its leading bytes and any metadata hints.
    /// Returns `application/octet-stream` when nothing matches.
    fn detect(&self, head: &[u8], metadata: &MetadataRecord) -> MediaType;
}
