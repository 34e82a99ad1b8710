//! One-call helpers over the default auto-detecting parser.

use crate::chunker::ChunkingHandler;
use crate::composite::AutoDetectParser;
use crate::xhtml::{ToXmlContentHandler, XhtmlContentHandler};
use doclens_core::handler::IgnoreContentHandler;
use doclens_core::{
    BodyContentHandler, ContentHandler, Link, LinkContentHandler, MediaType, MetadataKey,
    MetadataRecord, ParseContext, ParseError, Parser, TeeContentHandler, WriteContentHandler,
};
use std::fs::File;
use std::io::{BufWriter, Read};
use std::path::Path;
use tracing::debug;

pub fn detect_doc_type(input: &mut dyn Read) -> Result<MediaType, ParseError> {
    let mut bytes = Vec::new();
    input.read_to_end(&mut bytes)?;
    Ok(AutoDetectParser::default().detect(&bytes, &MetadataRecord::new()))
}

/// Like [`detect_doc_type`], with the file name as an extra hint.
pub fn detect_named(input: &mut dyn Read, resource_name: &str) -> Result<MediaType, ParseError> {
    let mut bytes = Vec::new();
    input.read_to_end(&mut bytes)?;
    let mut metadata = MetadataRecord::new();
    metadata.set(MetadataKey::ResourceName, resource_name);
    Ok(AutoDetectParser::default().detect(&bytes, &metadata))
}

pub fn content(input: &mut dyn Read) -> Result<String, ParseError> {
    let mut body = BodyContentHandler::new();
    let mut metadata = MetadataRecord::new();
    AutoDetectParser::default().parse(input, &mut body, &mut metadata, &ParseContext::new())?;
    Ok(body.into_text())
}

pub fn metadata(input: &mut dyn Read) -> Result<MetadataRecord, ParseError> {
    let mut metadata = MetadataRecord::new();
    AutoDetectParser::default().parse(
        input,
        &mut IgnoreContentHandler,
        &mut metadata,
        &ParseContext::new(),
    )?;
    Ok(metadata)
}

pub fn plain_text_chunks(
    input: &mut dyn Read,
    max_chars: usize,
) -> Result<Vec<String>, ParseError> {
    let mut chunks = ChunkingHandler::new(max_chars);
    let mut metadata = MetadataRecord::new();
    AutoDetectParser::default().parse(input, &mut chunks, &mut metadata, &ParseContext::new())?;
    Ok(chunks.into_chunks())
}

/// The document as a full XHTML page.
pub fn parse_to_html(input: &mut dyn Read) -> Result<String, ParseError> {
    let mut markup = ToXmlContentHandler::html();
    let mut metadata = MetadataRecord::new();
    AutoDetectParser::default().parse(
        input,
        &mut XhtmlContentHandler::new(&mut markup),
        &mut metadata,
        &ParseContext::new(),
    )?;
    Ok(markup.into_markup())
}

/// Only the markup the parser emits, with no page skeleton around it.
pub fn parse_body_to_html(input: &mut dyn Read) -> Result<String, ParseError> {
    let mut markup = ToXmlContentHandler::html();
    let mut metadata = MetadataRecord::new();
    AutoDetectParser::default().parse(input, &mut markup, &mut metadata, &ParseContext::new())?;
    Ok(markup.into_markup())
}

/// Writes the document's text to `output` and returns the links it contains.
pub fn store_by_parser(input: &mut dyn Read, output: &Path) -> Result<Vec<Link>, ParseError> {
    let mut text = WriteContentHandler::new(BufWriter::new(File::create(output)?));
    let mut links = LinkContentHandler::new();
    let mut metadata = MetadataRecord::new();
    {
        let mut tee = TeeContentHandler::new(vec![
            &mut text as &mut dyn ContentHandler,
            &mut links,
        ]);
        AutoDetectParser::default().parse(input, &mut tee, &mut metadata, &ParseContext::new())?;
    }
    text.finish()?;

    let links = links.into_links();
    debug!(path = %output.display(), links = links.len(), "stored parsed text");
    Ok(links)
}
