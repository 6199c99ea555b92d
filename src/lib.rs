//! Funnel-stage content ideation.
//!
//! Scrapes a business website, extracts a business profile, assembles a
//! prompt context and asks a schema-constrained model for guest-post
//! topics grouped by product/event, funnel stage, audience and
//! publication niche. The result is flattened into rows for export.

pub mod analyzer;
pub mod config;
pub mod context;
pub mod crawlers;
pub mod error;
pub mod export;
pub mod filter;
pub mod flatten;
pub mod generator;
pub mod http;
pub mod model;
pub mod parsers;
pub mod pipeline;
pub mod prompts;
pub mod results;
pub mod schema;
pub mod session;
pub mod testing;

// Re-export commonly used types for convenience
pub use config::AppConfig;
pub use error::{Error, ErrorKind, Result};
pub use flatten::{RowFilter, TopicRow, flatten};
pub use model::{BusinessProfile, FunnelStage, TopicTree};
pub use pipeline::{Pipeline, PipelineOutput};
pub use results::{PageRecord, ScrapeOutput};
pub use session::{BusinessDetails, ScrapeContext, SessionContext};
