// Public API exports
pub mod adapters;
pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod ports;
pub mod prettyprint;
pub mod report;

// Re-export key types for easy access
pub use application::*;
pub use domain::*;
pub use ports::*;
