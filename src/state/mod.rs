//! Outcome tracking for a mirror run
//!
//! # Components
//!
//! - `DatasetOutcome`: what happened to one dataset or file during the crawl
//! - `SyncOutcome`: what happened to one file during the remote sync
//! - `StatusTally`: counts of both, folded from stage results

mod outcome;
mod tally;

pub use outcome::{DatasetOutcome, SyncOutcome};
pub use tally::StatusTally;
