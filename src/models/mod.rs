//! Data models for the Diploma Pro application.
//!
//! Field names serialize in camelCase to match the documents the web client reads.

mod catalog;
mod document;
mod job;
mod notice;
mod push;
mod resource;
mod settings;

pub use catalog::*;
pub use document::*;
pub use job::*;
pub use notice::*;
pub use push::*;
pub use resource::*;
pub use settings::*;
