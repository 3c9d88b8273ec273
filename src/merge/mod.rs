//! PDF merging.
//!
//! [`MergeQueue`] holds the documents in output order; [`Merger`] reads them
//! and concatenates their pages.

pub mod merger;
pub mod queue;

pub use merger::{MergeInput, MergeResult, MergeStatistics, Merger};
pub use queue::{MergeQueue, QueueEntry};
