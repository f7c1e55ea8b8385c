//! Pool lifecycle tracking.
//!
//! Tracks what the keeper did to every watched pool:
//! - Rebalances and the rewards they paid
//! - Failed attempts
//! - Quarantine and release after malicious rate queries

mod events;
mod tracker;

pub use events::*;
pub use tracker::*;
