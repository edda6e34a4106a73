//! # fg-insights
//!
//! The narrative-map insight pipeline and the coaching chat service.
//!
//! - [`InsightGenerator`]: one provider call, fence-stripped JSON parse,
//!   structural validation — all-or-nothing, no partial output
//! - [`merger`]: pure merge of generated output against stored state and
//!   zone reference content (provenance stamps, version bump)
//! - [`NarrativeMapService`]: aggregate → generate → merge → conditional
//!   persist → audit append, returning the merged payload to the caller
//! - [`ChatService`]: single-pass prompt-and-respond for coaches — no merge,
//!   no versioning, no persistence

#![deny(unsafe_code)]

pub mod chat;
pub mod errors;
pub mod generator;
pub mod merger;
pub mod pipeline;

pub use chat::{ChatError, ChatRequest, ChatService};
pub use errors::InsightError;
pub use generator::InsightGenerator;
pub use merger::merge_insights;
pub use pipeline::{GenerateOutcome, NarrativeMapService};
