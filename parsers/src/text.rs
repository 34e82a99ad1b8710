use doclens_core::{
    ContentHandler, Element, MediaType, MetadataKey, MetadataRecord, ParseContext, ParseError,
    Parser,
};
use std::io::Read;

/// Fallback parser: the whole stream as one paragraph of UTF-8 text.
/// Invalid sequences are replaced rather than rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextParser;

impl Parser for PlainTextParser {
    fn supported_types(&self, _context: &ParseContext) -> Vec<MediaType> {
        vec![MediaType::text_plain()]
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
        let text = String::from_utf8_lossy(&bytes);

        metadata.set(
            MetadataKey::ContentType,
            MediaType::text_plain().with_param("charset", "UTF-8").to_string(),
        );
        if let Some(locale) = context.get(ParseContext::LOCALE) {
            metadata.set(MetadataKey::ContentLanguage, locale);
        }

        handler.start_document();
        handler.start_element(Element::new("p"));
        handler.characters(&text);
        handler.end_element(Element::new("p"));
        handler.end_document(metadata);
        Ok(())
    }
}
