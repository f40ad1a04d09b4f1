//! Output module for run artifacts and summaries
//!
//! This module handles:
//! - Persisting the crawl's target list as JSON so it can be replayed
//! - Rendering the final outcome tally

mod datasets;
mod summary;

pub use datasets::{read_datasets, write_datasets};
pub use summary::{format_summary, print_summary};
