use doclens_core::config::ListingConfig;
use doclens_core::{
    ContentHandler, MediaType, MetadataKey, MetadataRecord, ParseContext, ParseError, Parser,
};
use serde::Serialize;
use std::io::Read;
use tracing::{debug, warn};

/// Fields ahead of the date: permissions, links, owner, group, size.
const LEADING_FIELDS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingOptions {
    /// Fail the parse (after applying every good line) when any non-blank
    /// line had to be skipped.
    pub strict: bool,
    /// Tokens making up the modification date. `ls -l` prints three.
    pub date_tokens: usize,
}

impl Default for ListingOptions {
    fn default() -> Self {
        Self {
            strict: false,
            date_tokens: 3,
        }
    }
}

impl From<&ListingConfig> for ListingOptions {
    fn from(config: &ListingConfig) -> Self {
        Self {
            strict: config.strict,
            date_tokens: config.date_tokens,
        }
    }
}

impl ListingOptions {
    pub fn min_tokens(&self) -> usize {
        LEADING_FIELDS + self.date_tokens
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    pub permissions: String,
    pub hard_links: String,
    pub owner: String,
    pub group: String,
    pub size: String,
    pub last_modified: String,
    pub filename: String,
}

impl DirectoryEntry {
    /// Splits one listing line on runs of ASCII whitespace. Other Unicode
    /// spaces (such as U+00A0) stay inside their field. `None` when the line
    /// has too few tokens.
    pub fn parse_line(line: &str, date_tokens: usize) -> Option<Self> {
        let tokens: Vec<&str> = line
            .split(is_field_separator)
            .filter(|token| !token.is_empty())
            .collect();
        let date_end = LEADING_FIELDS + date_tokens;
        if tokens.len() < date_end {
            return None;
        }

        Some(Self {
            permissions: tokens[0].to_string(),
            hard_links: tokens[1].to_string(),
            owner: tokens[2].to_string(),
            group: tokens[3].to_string(),
            size: tokens[4].to_string(),
            last_modified: tokens[LEADING_FIELDS..date_end].join(" "),
            filename: tokens[date_end..].join(" "),
        })
    }

    /// `x` somewhere in the mode and not a directory. Symlinks count too.
    pub fn is_executable(&self) -> bool {
        self.permissions.contains('x') && !self.permissions.contains('d')
    }

    fn record_into(&self, metadata: &mut MetadataRecord) {
        metadata.add(MetadataKey::FilePermissions, self.permissions.as_str());
        metadata.add(MetadataKey::NumHardLinks, self.hard_links.as_str());
        metadata.add(MetadataKey::FileOwner, self.owner.as_str());
        metadata.add(MetadataKey::FileOwnerGroup, self.group.as_str());
        metadata.add(MetadataKey::FileSize, self.size.as_str());
        metadata.add(MetadataKey::LastModifiedDate, self.last_modified.as_str());
        metadata.add(MetadataKey::Filename, self.filename.as_str());

        if self.is_executable() {
            increment_executables(metadata);
        }
    }
}

/// `[ \t\n\x0B\x0C\r]`, the separators `ls` output is split on.
fn is_field_separator(c: char) -> bool {
    c.is_ascii_whitespace() || c == '\x0B'
}

fn increment_executables(metadata: &mut MetadataRecord) {
    let current = match metadata.get(MetadataKey::NumExecutables) {
        Some(raw) => raw.parse::<u64>().unwrap_or_else(|_| {
            warn!("Resetting non-numeric NumExecutables value {:?}", raw);
            0
        }),
        None => 0,
    };
    metadata.set(MetadataKey::NumExecutables, (current + 1).to_string());
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListingReport {
    pub entries: usize,
    /// 1-based numbers of non-blank lines that were too short.
    pub skipped_lines: Vec<usize>,
}

/// Turns `ls -l` style text into per-field metadata values.
#[derive(Debug, Clone, Default)]
pub struct DirectoryListParser {
    options: ListingOptions,
}

impl DirectoryListParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ListingOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> ListingOptions {
        self.options
    }

    pub fn parse_listing(
        &self,
        input: &mut dyn Read,
        metadata: &mut MetadataRecord,
    ) -> Result<ListingReport, ParseError> {
        let mut text = String::new();
        input.read_to_string(&mut text)?;

        let mut report = ListingReport::default();
        for (index, line) in text.lines().enumerate() {
            match DirectoryEntry::parse_line(line, self.options.date_tokens) {
                Some(entry) => {
                    entry.record_into(metadata);
                    report.entries += 1;
                }
                None if line.trim().is_empty() => {}
                None => report.skipped_lines.push(index + 1),
            }
        }

        debug!(
            "Parsed {} listing entries, skipped {} lines",
            report.entries,
            report.skipped_lines.len()
        );
        Ok(report)
    }
}

impl Parser for DirectoryListParser {
    fn supported_types(&self, _context: &ParseContext) -> Vec<MediaType> {
        vec![MediaType::text_plain()]
    }

    fn parse(
        &self,
        input: &mut dyn Read,
        _handler: &mut dyn ContentHandler,
        metadata: &mut MetadataRecord,
        _context: &ParseContext,
    ) -> Result<(), ParseError> {
        let report = self.parse_listing(input, metadata)?;
        if self.options.strict && !report.skipped_lines.is_empty() {
            return Err(ParseError::MalformedLines {
                line_numbers: report.skipped_lines,
            });
        }
        Ok(())
    }
}
