// Analyzer module: per-ticker volume statistics and extremity ranking.

pub mod summary;
pub mod ranking;

// Re-export the entry points for ease of use.
pub use ranking::{extremity, rank};
pub use summary::summarize;
