#![forbid(unsafe_code)]

//! `bead-intercom`: a Slack front end for a beads issue tracker.
//!
//! Free-text chat messages are classified into commands, executed against
//! the beads REST API, and answered with renderer-agnostic cards. Button
//! presses and form submissions on those cards route back through the same
//! pipeline.

pub mod api;
pub mod bot;
pub mod cards;
pub mod config;
pub mod errors;
pub mod health;
pub mod models;
pub mod slack;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
