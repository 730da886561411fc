pub mod content;
pub mod enrichment;
pub mod outcome;

pub use content::{ContentRecord, ContentType, PLACEHOLDER_POSTER, ParseContentTypeError};
pub use enrichment::{EnrichmentOutcome, EnrichmentRecord};
pub use outcome::SourceOutcome;
