use doclens_core::{
    ContentHandler, Element, MediaType, MetadataKey, MetadataRecord, ParseContext, ParseError,
    Parser,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use std::io::Read;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName {
    pub namespace: Option<String>,
    pub local_name: String,
}

impl QualifiedName {
    pub fn is(&self, namespace: &str, local_name: &str) -> bool {
        self.namespace.as_deref() == Some(namespace) && self.local_name == local_name
    }
}

/// Name of the first element in `head`, or `None` if there is no complete
/// start tag.
pub fn root_element(head: &[u8]) -> Option<QualifiedName> {
    let mut reader = NsReader::from_reader(head);
    let mut buf = Vec::new();
    loop {
        match reader.read_resolved_event_into(&mut buf) {
            Ok((ns, Event::Start(e))) | Ok((ns, Event::Empty(e))) => {
                return Some(QualifiedName {
                    namespace: namespace_of(ns),
                    local_name: String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
                });
            }
            Ok((_, Event::Eof)) | Err(_) => return None,
            _ => {}
        }
        buf.clear();
    }
}

fn namespace_of(ns: ResolveResult<'_>) -> Option<String> {
    match ns {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.0).into_owned()),
        _ => None,
    }
}

struct OwnedElement {
    namespace: Option<String>,
    local_name: String,
    attributes: Vec<(String, String)>,
}

impl OwnedElement {
    fn from_start(ns: ResolveResult<'_>, e: &BytesStart<'_>) -> Result<Self, ParseError> {
        let mut attributes = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|err| ParseError::Xml(err.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            if key == "xmlns" || key.starts_with("xmlns:") {
                continue;
            }
            let value = attr
                .unescape_value()
                .map_err(|err| ParseError::Xml(err.to_string()))?
                .into_owned();
            attributes.push((key, value));
        }

        Ok(Self {
            namespace: namespace_of(ns),
            local_name: String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
            attributes,
        })
    }

    fn view(&self) -> Element<'_> {
        Element {
            namespace: self.namespace.as_deref(),
            local_name: &self.local_name,
            attributes: &self.attributes,
        }
    }
}

/// Feeds every element and text node of `bytes` to `handler`.
pub fn pump_events(bytes: &[u8], handler: &mut dyn ContentHandler) -> Result<(), ParseError> {
    let mut reader = NsReader::from_reader(bytes);
    let mut buf = Vec::new();
    let mut depth = 0usize;
    loop {
        match reader.read_resolved_event_into(&mut buf) {
            Ok((ns, Event::Start(e))) => {
                let element = OwnedElement::from_start(ns, &e)?;
                handler.start_element(element.view());
                depth += 1;
            }
            Ok((ns, Event::Empty(e))) => {
                let element = OwnedElement::from_start(ns, &e)?;
                handler.start_element(element.view());
                handler.end_element(element.view());
            }
            Ok((ns, Event::End(e))) => {
                depth = depth.saturating_sub(1);
                let namespace = namespace_of(ns);
                let local_name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                handler.end_element(Element {
                    namespace: namespace.as_deref(),
                    local_name: &local_name,
                    attributes: &[],
                });
            }
            Ok((_, Event::Text(e))) => {
                let text = e.unescape().map_err(|err| ParseError::Xml(err.to_string()))?;
                handler.characters(&text);
            }
            Ok((_, Event::CData(e))) => {
                handler.characters(&String::from_utf8_lossy(&e.into_inner()));
            }
            Ok((_, Event::Eof)) if depth > 0 => {
                return Err(ParseError::Xml(format!(
                    "document ended with {} unclosed element(s)",
                    depth
                )));
            }
            Ok((_, Event::Eof)) => break,
            Err(err) => return Err(ParseError::Xml(err.to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct XmlParser;

impl Parser for XmlParser {
    fn supported_types(&self, _context: &ParseContext) -> Vec<MediaType> {
        vec![MediaType::xml(), MediaType::text("xml")]
    }

    fn parse(
        &self,
        input: &mut dyn Read,
        handler: &mut dyn ContentHandler,
        metadata: &mut MetadataRecord,
        _context: &ParseContext,
    ) -> Result<(), ParseError> {
        let mut bytes = Vec::new();
        input.read_to_end(&mut bytes)?;

        if !metadata.contains(MetadataKey::ContentType) {
            metadata.set(MetadataKey::ContentType, MediaType::xml().to_string());
        }

        handler.start_document();
        pump_events(&bytes, handler)?;
        handler.end_document(metadata);
        Ok(())
    }
}
