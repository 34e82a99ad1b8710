use doclens_core::{
    ContentHandler, Element, MediaType, MetadataRecord, ParseContext, ParseError, Parser,
};
use std::io::Read;
use std::path::Path;
use walkdir::WalkDir;

/// Reads a directory path from the stream and emits an `a` link per
/// version entry in it. Entries named `current*` and symlinks are left out.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentAreaParser;

impl DocumentAreaParser {
    pub fn versions(area: &Path) -> Result<Vec<(String, String)>, ParseError> {
        let mut versions = Vec::new();
        let walker = WalkDir::new(area)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();
        for entry in walker {
            let entry = entry.map_err(|err| ParseError::Io(err.into()))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with("current") || entry.path_is_symlink() {
                continue;
            }
            let absolute = entry.path().canonicalize()?;
            versions.push((format!("file://{}", absolute.display()), name));
        }
        Ok(versions)
    }
}

impl Parser for DocumentAreaParser {
    fn supported_types(&self, _context: &ParseContext) -> Vec<MediaType> {
        vec![MediaType::text_plain()]
    }

    fn parse(
        &self,
        input: &mut dyn Read,
        handler: &mut dyn ContentHandler,
        metadata: &mut MetadataRecord,
        _context: &ParseContext,
    ) -> Result<(), ParseError> {
        let mut raw = String::new();
        input.read_to_string(&mut raw)?;
        let area = Path::new(raw.trim());
        if !area.is_dir() {
            return Err(ParseError::InvalidArgument(format!(
                "not a directory: {}",
                area.display()
            )));
        }

        let versions = Self::versions(area)?;

        handler.start_document();
        for (href, name) in &versions {
            let attributes = [("href".to_string(), href.clone())];
            let link = Element {
                namespace: None,
                local_name: "a",
                attributes: &attributes,
            };
            handler.start_element(link);
            handler.characters(name);
            handler.end_element(link);
        }
        handler.end_document(metadata);
        Ok(())
    }
}
