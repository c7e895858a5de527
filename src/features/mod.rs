//! Deployment flow: mode decision and add-mode merging

pub mod apply;
pub mod merge;

pub use apply::{DeployRequest, Outcome, apply};
pub use merge::{MergeOutcome, merge_items};
