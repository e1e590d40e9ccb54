pub mod app;
pub mod assets;
pub mod config;
pub mod constants;
pub mod error;
pub mod importer;
pub mod infra;
pub mod logging;
pub mod markup;
pub mod pipeline;
pub mod sources;
pub mod triggers;
pub mod types;
pub mod writer;
