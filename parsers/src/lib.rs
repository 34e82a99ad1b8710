pub mod analyzer;
pub mod area;
pub mod chunker;
pub mod composite;
pub mod crypto;
pub mod detect;
pub mod extractor;
pub mod listing;
pub mod phone;
pub mod prescription;
pub mod processor;
pub mod text;
pub mod xhtml;
pub mod xml;

pub use composite::{AutoDetectParser, CompositeParser};
pub use extractor::EmbeddedDocumentExtractor;
pub use listing::{DirectoryEntry, DirectoryListParser, ListingOptions, ListingReport};
