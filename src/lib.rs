pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod types;

// Application use cases and the ports they depend on
pub mod app;
// Adapters implementing those ports
pub mod infra;
