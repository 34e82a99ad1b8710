use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("invalid media type: {0}")]
pub struct InvalidMediaType(pub String);

/// A `type/subtype` label with optional `;key=value` parameters.
///
/// Type, subtype and parameter names are lowercased on parse; parameter
/// values are kept as written.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MediaType {
    top: String,
    sub: String,
    params: Vec<(String, String)>,
}

pub const PRESCRIPTION_SUBTYPE: &str = "x-prescription+xml";

impl MediaType {
    pub fn new(top: &str, sub: &str) -> Self {
        Self {
            top: top.to_ascii_lowercase(),
            sub: sub.to_ascii_lowercase(),
            params: Vec::new(),
        }
    }

    pub fn application(sub: &str) -> Self {
        Self::new("application", sub)
    }

    pub fn text(sub: &str) -> Self {
        Self::new("text", sub)
    }

    pub fn text_plain() -> Self {
        Self::text("plain")
    }

    pub fn octet_stream() -> Self {
        Self::application("octet-stream")
    }

    pub fn xml() -> Self {
        Self::application("xml")
    }

    pub fn prescription() -> Self {
        Self::application(PRESCRIPTION_SUBTYPE)
    }

    pub fn with_param(mut self, key: &str, value: &str) -> Self {
        let key = key.to_ascii_lowercase();
        self.params.retain(|(k, _)| *k != key);
        self.params.push((key, value.to_string()));
        self
    }

    pub fn top_level(&self) -> &str {
        &self.top
    }

    pub fn subtype(&self) -> &str {
        &self.sub
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        let key = key.to_ascii_lowercase();
        self.params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Same type without parameters.
    pub fn base(&self) -> MediaType {
        Self::new(&self.top, &self.sub)
    }

    pub fn is_octet_stream(&self) -> bool {
        self.top == "application" && self.sub == "octet-stream"
    }
}

impl FromStr for MediaType {
    type Err = InvalidMediaType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(';');
        let essence = parts.next().unwrap_or("").trim();
        let (top, sub) = essence
            .split_once('/')
            .ok_or_else(|| InvalidMediaType(s.to_string()))?;
        let (top, sub) = (top.trim(), sub.trim());
        if top.is_empty() || sub.is_empty() || sub.contains('/') {
            return Err(InvalidMediaType(s.to_string()));
        }

        let mut media_type = MediaType::new(top, sub);
        for param in parts {
            let param = param.trim();
            if param.is_empty() {
                continue;
            }
            let (key, value) = param
                .split_once('=')
                .ok_or_else(|| InvalidMediaType(s.to_string()))?;
            media_type = media_type.with_param(key.trim(), value.trim().trim_matches('"'));
        }
        Ok(media_type)
    }
}

impl TryFrom<String> for MediaType {
    type Error = InvalidMediaType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MediaType> for String {
    fn from(value: MediaType) -> Self {
        value.to_string()
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.top, self.sub)?;
        for (key, value) in &self.params {
            write!(f, "; {}={}", key, value)?;
        }
        Ok(())
    }
}
