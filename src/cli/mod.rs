//! Command-line interface for Atelier.

use clap::{Parser, Subcommand};

/// Atelier - artist and artwork catalog
#[derive(Parser)]
#[command(name = "atelier")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the web server (default)
    #[command(alias = "web")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Create a user, or reset the password and API key of an existing one
    #[command(alias = "useradd")]
    CreateUser {
        /// Login name
        username: String,
        /// New password (at least 8 characters)
        password: String,
    },
}

impl Cli {
    /// The subcommand to run, falling back to `serve`.
    #[must_use]
    pub fn command_or_default(self) -> Commands {
        self.command.unwrap_or(Commands::Serve)
    }
}
