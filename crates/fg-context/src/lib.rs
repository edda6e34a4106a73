//! # fg-context
//!
//! Context aggregation and prompt assembly for the narrative-map service.
//!
//! - [`ContextAggregator`]: fan-out/fan-in load of a client's engagement and
//!   evidence record sets (read-only, no side effects)
//! - [`document`]: renders the loaded context into the single ordered text
//!   document the generator consumes
//! - [`prompts`]: the fixed system prompts and the user-message template
//!   with the required JSON output contract

#![deny(unsafe_code)]

pub mod aggregator;
pub mod constants;
pub mod document;
pub mod prompts;

pub use aggregator::{AggregateError, ClientContext, ContextAggregator};
pub use document::render_document;
