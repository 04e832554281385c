pub mod error;
pub mod gaps;
pub mod loader;
pub mod persist;
pub mod pipeline;
pub mod queries;
pub mod season_format;
pub mod snapshots;
pub mod standings;
pub mod team_names;
