//! CLI subcommand implementations.

pub mod clients;
pub mod playtime;
pub mod report;
pub mod timeline;
pub mod util;
