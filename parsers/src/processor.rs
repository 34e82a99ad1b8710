use crate::composite::AutoDetectParser;
use crate::phone::PhoneExtractingHandler;
use anyhow::Context;
use doclens_core::config::AppConfig;
use doclens_core::{MetadataKey, MetadataRecord, ParseContext, Parser};
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::Path;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// Harvests phone numbers from every file under a folder.
pub struct PhoneProcessor {
    parser: AutoDetectParser,
    min_digits: usize,
    phone_numbers: BTreeSet<String>,
    seen_digests: HashSet<String>,
    successful_files: usize,
    duplicate_files: usize,
    failed_files: usize,
}

impl PhoneProcessor {
    pub fn new() -> Self {
        Self::with_parser(AutoDetectParser::default(), 7)
    }

    pub fn with_parser(parser: AutoDetectParser, min_digits: usize) -> Self {
        Self {
            parser,
            min_digits,
            phone_numbers: BTreeSet::new(),
            seen_digests: HashSet::new(),
            successful_files: 0,
            duplicate_files: 0,
            failed_files: 0,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::with_parser(
            AutoDetectParser::default().with_config(&config.detection),
            config.phone.min_digits,
        )
    }

    pub fn phone_numbers(&self) -> &BTreeSet<String> {
        &self.phone_numbers
    }

    pub fn successful_files(&self) -> usize {
        self.successful_files
    }

    pub fn failed_files(&self) -> usize {
        self.failed_files
    }

    /// Files skipped because identical bytes were already processed.
    pub fn duplicate_files(&self) -> usize {
        self.duplicate_files
    }

    /// Parses one file and returns the numbers found in it. A file whose
    /// content was already parsed successfully yields nothing and counts as
    /// a duplicate; copies of a file that failed are parsed (and fail) again.
    pub fn process(&mut self, path: &Path) -> anyhow::Result<Vec<String>> {
        let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
        let digest = content_digest(&bytes);
        if self.seen_digests.contains(&digest) {
            debug!("{}: duplicate content, skipped", path.display());
            self.duplicate_files += 1;
            return Ok(Vec::new());
        }

        let mut metadata = MetadataRecord::new();
        if let Some(name) = path.file_name() {
            metadata.set(MetadataKey::ResourceName, name.to_string_lossy());
        }
        let mut handler = PhoneExtractingHandler::new(self.min_digits);
        self.parser
            .parse(&mut bytes.as_slice(), &mut handler, &mut metadata, &ParseContext::new())
            .with_context(|| format!("parse {}", path.display()))?;

        self.seen_digests.insert(digest);
        let found = metadata.values(MetadataKey::PhoneNumbers).to_vec();
        debug!("{}: {} phone numbers", path.display(), found.len());
        self.phone_numbers.extend(found.iter().cloned());
        Ok(found)
    }

    /// Walks `folder` recursively. Files that fail to open or parse are
    /// counted, not fatal.
    pub fn process_folder(&mut self, folder: &Path) {
        info!("Scanning {} for phone numbers", folder.display());
        for entry in WalkDir::new(folder).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    if err.depth() == 0 {
                        error!("Cannot walk folder {}: {}", folder.display(), err);
                        return;
                    }
                    warn!("Skipping unreadable entry: {}", err);
                    self.failed_files += 1;
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let duplicates = self.duplicate_files;
            match self.process(entry.path()) {
                Ok(_) if self.duplicate_files > duplicates => {}
                Ok(_) => self.successful_files += 1,
                Err(err) => {
                    warn!("Failed to process {}: {:#}", entry.path().display(), err);
                    self.failed_files += 1;
                }
            }
        }
        info!(
            "Phone scan finished: {} ok, {} duplicate, {} failed, {} unique numbers",
            self.successful_files,
            self.duplicate_files,
            self.failed_files,
            self.phone_numbers.len()
        );
    }
}

fn content_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

impl Default for PhoneProcessor {
    fn default() -> Self {
        Self::new()
    }
}
