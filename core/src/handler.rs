use crate::metadata::MetadataRecord;
use serde::Serialize;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element<'a> {
    pub namespace: Option<&'a str>,
    pub local_name: &'a str,
    pub attributes: &'a [(String, String)],
}

impl<'a> Element<'a> {
    pub fn new(local_name: &'a str) -> Self {
        Self {
            namespace: None,
            local_name,
            attributes: &[],
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn matches(&self, namespace: &str, local_name: &str) -> bool {
        self.namespace == Some(namespace) && self.local_name == local_name
    }
}

/// Receives the structured text stream produced by a parser.
///
/// Handlers that derive metadata hold it until `end_document`, which is the
/// only event that sees the record.
pub trait ContentHandler {
    fn start_document(&mut self) {}

    fn start_element(&mut self, _element: Element<'_>) {}

    fn characters(&mut self, _text: &str) {}

    fn end_element(&mut self, _element: Element<'_>) {}

    fn end_document(&mut self, _metadata: &mut MetadataRecord) {}
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct IgnoreContentHandler;

impl ContentHandler for IgnoreContentHandler {}

/// Collects character data, optionally capped at `limit` chars.
#[derive(Debug, Default)]
pub struct BodyContentHandler {
    text: String,
    limit: Option<usize>,
    written: usize,
    truncated: bool,
}

impl BodyContentHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    pub fn truncated(&self) -> bool {
        self.truncated
    }
}

impl ContentHandler for BodyContentHandler {
    fn characters(&mut self, text: &str) {
        let Some(limit) = self.limit else {
            self.text.push_str(text);
            return;
        };

        let room = limit.saturating_sub(self.written);
        let count = text.chars().count();
        if count <= room {
            self.text.push_str(text);
            self.written += count;
        } else {
            self.text.extend(text.chars().take(room));
            self.written = limit;
            self.truncated = true;
        }
    }
}

/// Forwards every event to each of its children, in order.
#[derive(Default)]
pub struct TeeContentHandler<'h> {
    handlers: Vec<&'h mut dyn ContentHandler>,
}

impl<'h> TeeContentHandler<'h> {
    pub fn new(handlers: Vec<&'h mut dyn ContentHandler>) -> Self {
        Self { handlers }
    }

    pub fn push(&mut self, handler: &'h mut dyn ContentHandler) {
        self.handlers.push(handler);
    }
}

impl ContentHandler for TeeContentHandler<'_> {
    fn start_document(&mut self) {
        for handler in self.handlers.iter_mut() {
            handler.start_document();
        }
    }

    fn start_element(&mut self, element: Element<'_>) {
        for handler in self.handlers.iter_mut() {
            handler.start_element(element);
        }
    }

    fn characters(&mut self, text: &str) {
        for handler in self.handlers.iter_mut() {
            handler.characters(text);
        }
    }

    fn end_element(&mut self, element: Element<'_>) {
        for handler in self.handlers.iter_mut() {
            handler.end_element(element);
        }
    }

    fn end_document(&mut self, metadata: &mut MetadataRecord) {
        for handler in self.handlers.iter_mut() {
            handler.end_document(metadata);
        }
    }
}

/// Records the trimmed text of every `{namespace}local_name` element under
/// `metadata_key`.
#[derive(Debug)]
pub struct ElementMetadataHandler {
    namespace: String,
    local_name: String,
    metadata_key: String,
    depth: usize,
    buffer: String,
    values: Vec<String>,
}

impl ElementMetadataHandler {
    pub fn new(
        namespace: impl Into<String>,
        local_name: impl Into<String>,
        metadata_key: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            local_name: local_name.into(),
            metadata_key: metadata_key.into(),
            depth: 0,
            buffer: String::new(),
            values: Vec::new(),
        }
    }
}

impl ContentHandler for ElementMetadataHandler {
    fn start_element(&mut self, element: Element<'_>) {
        if element.matches(&self.namespace, &self.local_name) {
            self.depth += 1;
        }
    }

    fn characters(&mut self, text: &str) {
        if self.depth > 0 {
            self.buffer.push_str(text);
        }
    }

    fn end_element(&mut self, element: Element<'_>) {
        if self.depth == 0 || !element.matches(&self.namespace, &self.local_name) {
            return;
        }
        self.depth -= 1;
        if self.depth == 0 {
            let value = self.buffer.trim().to_string();
            self.buffer.clear();
            if !value.is_empty() {
                self.values.push(value);
            }
        }
    }

    fn end_document(&mut self, metadata: &mut MetadataRecord) {
        for value in self.values.drain(..) {
            metadata.add(&self.metadata_key, value);
        }
    }
}

/// Streams character data to `writer` as UTF-8.
///
/// The first write error stops further output and is reported by
/// [`WriteContentHandler::finish`].
#[derive(Debug)]
pub struct WriteContentHandler<W> {
    writer: W,
    error: Option<io::Error>,
}

impl<W: Write> WriteContentHandler<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            error: None,
        }
    }

    /// Flushes and hands the writer back.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> ContentHandler for WriteContentHandler<W> {
    fn characters(&mut self, text: &str) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.writer.write_all(text.as_bytes()) {
            self.error = Some(err);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    /// Element the link came from: `a`, `img`, `link`, ...
    pub kind: String,
    pub uri: String,
    pub title: String,
    pub rel: String,
    /// Anchor text, whitespace-collapsed.
    pub text: String,
}

/// Collects hyperlinks: `href` of `a`, `area` and `link`, `src` of `img`,
/// `frame`, `iframe`, `script` and `embed`.
#[derive(Debug, Default)]
pub struct LinkContentHandler {
    open: Vec<Link>,
    links: Vec<Link>,
}

impl LinkContentHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn into_links(self) -> Vec<Link> {
        self.links
    }

    fn uri_attribute(local_name: &str) -> Option<&'static str> {
        match local_name {
            "a" | "area" | "link" => Some("href"),
            "img" | "frame" | "iframe" | "script" | "embed" => Some("src"),
            _ => None,
        }
    }
}

impl ContentHandler for LinkContentHandler {
    fn start_element(&mut self, element: Element<'_>) {
        let Some(uri) = Self::uri_attribute(element.local_name)
            .and_then(|name| element.attribute(name))
        else {
            return;
        };
        self.open.push(Link {
            kind: element.local_name.to_string(),
            uri: uri.to_string(),
            title: element.attribute("title").unwrap_or_default().to_string(),
            rel: element.attribute("rel").unwrap_or_default().to_string(),
            text: String::new(),
        });
    }

    fn characters(&mut self, text: &str) {
        for link in &mut self.open {
            link.text.push_str(text);
        }
    }

    fn end_element(&mut self, element: Element<'_>) {
        if self
            .open
            .last()
            .is_some_and(|link| link.kind == element.local_name)
        {
            if let Some(mut link) = self.open.pop() {
                link.text = link.text.split_whitespace().collect::<Vec<_>>().join(" ");
                self.links.push(link);
            }
        }
    }
}
