pub mod config;
pub mod error;
pub mod handler;
pub mod media;
pub mod metadata;
pub mod parser;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use handler::{
    BodyContentHandler, ContentHandler, Element, Link, LinkContentHandler, TeeContentHandler,
    WriteContentHandler,
};
pub use media::MediaType;
pub use metadata::{MetadataKey, MetadataRecord};
pub use parser::{Detector, ParseContext, ParseError, Parser};

pub fn init_tracing() {
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

    let filter_layer = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // A second call (e.g. from several tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init();
}
