pub mod analyzer;
pub mod config;
pub mod model;
pub mod pipeline;
pub mod prompt;
pub mod provider;
pub mod report;
pub mod universe;
pub mod utils;
