//! Serialising content handlers.

use doclens_core::{ContentHandler, Element, MetadataRecord};
use quick_xml::escape::{escape, partial_escape};

pub const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

/// HTML elements that never take an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Writes the events it receives back out as markup.
///
/// In XML mode an element with no content is written as `<name/>`. In HTML
/// mode only void elements lose their end tag.
#[derive(Debug, Default)]
pub struct ToXmlContentHandler {
    out: String,
    html: bool,
    // Start tag written but not yet closed with `>`.
    pending: bool,
    default_namespaces: Vec<Option<String>>,
}

impl ToXmlContentHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn html() -> Self {
        Self {
            html: true,
            ..Self::default()
        }
    }

    pub fn markup(&self) -> &str {
        &self.out
    }

    pub fn into_markup(self) -> String {
        self.out
    }

    fn close_pending(&mut self) {
        if self.pending {
            self.out.push('>');
            self.pending = false;
        }
    }
}

impl ContentHandler for ToXmlContentHandler {
    fn start_element(&mut self, element: Element<'_>) {
        self.close_pending();
        let current = self.default_namespaces.last().cloned().flatten();
        self.out.push('<');
        self.out.push_str(element.local_name);
        if element.namespace.unwrap_or("") != current.as_deref().unwrap_or("") {
            self.out.push_str(" xmlns=\"");
            self.out.push_str(&escape(element.namespace.unwrap_or("")));
            self.out.push('"');
        }
        for (name, value) in element.attributes {
            self.out.push(' ');
            self.out.push_str(name);
            self.out.push_str("=\"");
            self.out.push_str(&escape(value.as_str()));
            self.out.push('"');
        }
        self.default_namespaces
            .push(element.namespace.map(str::to_string));
        self.pending = true;
    }

    fn characters(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.close_pending();
        self.out.push_str(&partial_escape(text));
    }

    fn end_element(&mut self, element: Element<'_>) {
        self.default_namespaces.pop();
        if self.pending {
            self.pending = false;
            if !self.html {
                self.out.push_str("/>");
                return;
            }
            self.out.push('>');
            if VOID_ELEMENTS.contains(&element.local_name) {
                return;
            }
        }
        self.out.push_str("</");
        self.out.push_str(element.local_name);
        self.out.push('>');
    }

    fn end_document(&mut self, _metadata: &mut MetadataRecord) {
        self.close_pending();
    }
}

/// Frames a document's events in an XHTML page skeleton before passing them
/// on. Elements without a namespace are moved into the XHTML namespace.
pub struct XhtmlContentHandler<'h> {
    inner: &'h mut dyn ContentHandler,
}

impl<'h> XhtmlContentHandler<'h> {
    pub fn new(inner: &'h mut dyn ContentHandler) -> Self {
        Self { inner }
    }

    fn open(&mut self, local_name: &str) {
        self.inner.start_element(xhtml(local_name, &[]));
    }

    fn close(&mut self, local_name: &str) {
        self.inner.end_element(xhtml(local_name, &[]));
    }
}

fn xhtml<'a>(local_name: &'a str, attributes: &'a [(String, String)]) -> Element<'a> {
    Element {
        namespace: Some(XHTML_NS),
        local_name,
        attributes,
    }
}

impl ContentHandler for XhtmlContentHandler<'_> {
    fn start_document(&mut self) {
        self.inner.start_document();
        self.open("html");
        self.open("head");
        self.open("title");
        self.close("title");
        self.close("head");
        self.open("body");
    }

    fn start_element(&mut self, element: Element<'_>) {
        self.inner.start_element(Element {
            namespace: element.namespace.or(Some(XHTML_NS)),
            ..element
        });
    }

    fn characters(&mut self, text: &str) {
        self.inner.characters(text);
    }

    fn end_element(&mut self, element: Element<'_>) {
        self.inner.end_element(Element {
            namespace: element.namespace.or(Some(XHTML_NS)),
            ..element
        });
    }

    fn end_document(&mut self, metadata: &mut MetadataRecord) {
        self.close("body");
        self.close("html");
        self.inner.end_document(metadata);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element<'a>(local_name: &'a str, attributes: &'a [(String, String)]) -> Element<'a> {
        Element {
            namespace: None,
            local_name,
            attributes,
        }
    }

    #[test]
    fn test_xml_escapes_and_self_closes() {
        let attrs = [("href".to_string(), "a?b=1&c=\"2\"".to_string())];
        let mut out = ToXmlContentHandler::new();
        out.start_document();
        out.start_element(element("a", &attrs));
        out.characters("fish & <chips>");
        out.end_element(element("a", &attrs));
        out.start_element(element("br", &[]));
        out.end_element(element("br", &[]));
        out.end_document(&mut MetadataRecord::new());

        assert_eq!(
            out.markup(),
            "<a href=\"a?b=1&amp;c=&quot;2&quot;\">fish &amp; &lt;chips&gt;</a><br/>"
        );
    }

    #[test]
    fn test_namespace_declared_only_on_change() {
        let mut out = ToXmlContentHandler::new();
        let outer = Element {
            namespace: Some("urn:a"),
            local_name: "root",
            attributes: &[],
        };
        out.start_element(outer);
        out.start_element(Element {
            namespace: Some("urn:a"),
            ..Element::new("same")
        });
        out.end_element(Element::new("same"));
        out.start_element(Element::new("plain"));
        out.characters("x");
        out.end_element(Element::new("plain"));
        out.end_element(outer);

        assert_eq!(
            out.into_markup(),
            "<root xmlns=\"urn:a\"><same/><plain xmlns=\"\">x</plain></root>"
        );
    }

    #[test]
    fn test_html_mode_keeps_end_tags() {
        let mut out = ToXmlContentHandler::html();
        out.start_element(element("p", &[]));
        out.end_element(element("p", &[]));
        out.start_element(element("br", &[]));
        out.end_element(element("br", &[]));
        assert_eq!(out.markup(), "<p></p><br>");
    }

    #[test]
    fn test_xhtml_skeleton() {
        let mut out = ToXmlContentHandler::html();
        {
            let mut page = XhtmlContentHandler::new(&mut out);
            page.start_document();
            page.start_element(element("p", &[]));
            page.characters("hi");
            page.end_element(element("p", &[]));
            page.end_document(&mut MetadataRecord::new());
        }
        assert_eq!(
            out.markup(),
            "<html xmlns=\"http://www.w3.org/1999/xhtml\"><head><title></title></head>\
             <body><p>hi</p></body></html>"
        );
    }
}
