pub mod admin;
pub mod builder;
pub mod cli;
pub mod config;
pub mod error;
pub mod state_factory;
pub mod telemetry;

pub use builder::WardenTableBuilder;
pub use config::WardenConfig;
pub use error::ServerError;
