//! din-core — Pure types, command matching, and narration.
//!
//! No async runtime, no I/O, no platform dependencies.

pub mod commands;
pub mod fuzzy;
pub mod narrate;
pub mod types;
pub mod wav;
