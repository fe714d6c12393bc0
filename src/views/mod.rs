//! Derived views over collection snapshots.
//!
//! Everything here is pure: given the documents of a snapshot, produce the list
//! a client renders. Views are re-derived from scratch on every snapshot.

mod listing;
mod projector;
mod unread;

pub use listing::*;
pub use projector::*;
pub use unread::*;
