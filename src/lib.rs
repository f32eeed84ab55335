//! histcarve: browser history extraction from live profile databases.
//!
//! Each configured browser family is expanded into candidate database
//! paths, every existing database is copied to a private snapshot, queried,
//! and the normalized rows are exported once per family.

pub mod cli;
pub mod config;
pub mod logging;
pub mod metadata;
pub mod parsers;
pub mod pipeline;
pub mod snapshot;
pub mod sources;
pub mod util;
