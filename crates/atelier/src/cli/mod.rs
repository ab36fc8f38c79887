//! Command-line interface for atelier.
//!
//! This module provides the CLI structure and command handlers for the
//! `atelier` binary.

mod commands;
mod handlers;
mod session;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AuthCommand, CartCommand, ConfigCommand, ContentCommand, CredentialArgs, OrdersCommand,
    ProductArgs, ProductCommand, ServeCommand, StatusCommand, ValueTypeArg,
};
pub use handlers::run;
pub use session::{SessionFile, StoredSession};

/// atelier - Studio website with editable content and a small store
///
/// Serves the studio's pages with their saved content applied, and manages
/// that content, the product catalog, carts and orders.
#[derive(Debug, Parser)]
#[command(name = "atelier")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the site
    Serve(ServeCommand),

    /// Show backend status
    Status(StatusCommand),

    /// Inspect and edit page content
    #[command(subcommand)]
    Content(ContentCommand),

    /// Manage accounts and the current session
    #[command(subcommand)]
    Auth(AuthCommand),

    /// Manage the product catalog
    #[command(subcommand)]
    Product(ProductCommand),

    /// Manage the signed-in user's cart
    #[command(subcommand)]
    Cart(CartCommand),

    /// List the signed-in user's orders
    Orders(OrdersCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.quiet, self.verbose)
    }
}
