use clap::{Parser, Subcommand};

/// Warden API gateway.
#[derive(Parser, Debug)]
#[command(name = "warden-server", about = "Standalone HTTP server for the warden API gateway")]
pub struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, default_value = "config.json")]
    pub config: String,

    /// Override `log_level` from the config file.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override `listen_port` from the config file.
    #[arg(long)]
    pub listen_port: Option<u16>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the server (the default when no subcommand is given).
    Run,
    /// Send an admin reload call to a running instance.
    Reload {
        /// Base URL of the running instance's admin port, e.g. `http://127.0.0.1:8080`.
        #[arg(long)]
        url: String,
    },
    /// Parse and validate a config file without starting the server.
    ValidateConfig,
}
