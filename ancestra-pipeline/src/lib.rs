//! Report-creation pipeline.
//!
//! Sequences the in-process reconciler, the SQLite store and the two
//! external annotators (ancestry estimator, haplogroup classifier) into
//! one blocking run per report. A report's metadata row is inserted only
//! after every prior stage has succeeded, so the presence of a row in
//! `reports` means the whole pipeline completed for it.

pub mod ancestry;
pub mod config;
pub mod haplogroup;
pub mod pipeline;
pub mod tools;

pub use config::PipelineConfig;
pub use pipeline::Pipeline;
pub use tools::{ToolCommand, ToolError, ToolOutput};
