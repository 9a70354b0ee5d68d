//! jobscrape: Extract job listings and page summaries as JSON
//!
//! Commands:
//! - scrape: CSS-selector extraction (job board listing or generic page)
//! - llm: Language-model extraction of listing fields

pub mod dom;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod llm;
pub mod logging;
pub mod normalize;
pub mod output;
pub mod schema;
pub mod scrape;
pub mod sections;
pub mod sites;
pub mod text;

pub use error::{ConfigError, ExtractError, FetchError, LlmError, ParseError};
pub use extract::{extract, extract_html, ExtractedRecord, FieldValue};
pub use fetch::{FetchConfig, Fetcher};
pub use normalize::{GenericPageRecord, JobRecord};
pub use schema::{ExtractMode, FieldSpec, Schema};
pub use scrape::{scrape_html, scrape_url, ScrapeOutput};
pub use sections::{split_sections, SectionMarker};
pub use sites::{route, Route};
