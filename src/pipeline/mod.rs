//! Pipeline entry points.
//!
//! - `Canary::run`: scrape, compare, notify and save
//! - `Canary::preview`: scrape and build the message only

pub mod canary;

pub use canary::{Canary, Preview, build_message, check_message};
