//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::content::ValueType;

/// Serve command arguments.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Address to listen on, overriding the configuration
    #[arg(short, long, value_name = "ADDR")]
    pub bind: Option<String>,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Page content commands.
#[derive(Debug, Subcommand)]
pub enum ContentCommand {
    /// List the editable fields of a page template
    Scan {
        /// Page identifier (`global`, `home`, `booking`, ...)
        page: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the fields of a page with their saved values (admin)
    Show {
        /// Page identifier
        page: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Save a value for a field (admin)
    Set {
        /// Page identifier
        page: String,

        /// Content key
        key: String,

        /// New value; omit when uploading a file
        value: Option<String>,

        /// How the value is applied; defaults to the type found in the template
        #[arg(short = 't', long = "type", value_enum)]
        value_type: Option<ValueTypeArg>,

        /// Image to upload as the value
        #[arg(short, long, value_name = "FILE", conflicts_with = "value")]
        file: Option<PathBuf>,
    },

    /// Drop a saved value so the template value shows again (admin)
    Reset {
        /// Page identifier
        page: String,

        /// Content key
        key: String,
    },

    /// Print a page with its saved content applied
    Render {
        /// Page identifier
        page: String,

        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

/// Account commands.
#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Create an account and sign in
    SignUp(CredentialArgs),

    /// Sign in to an existing account
    SignIn(CredentialArgs),

    /// End the current session
    SignOut,

    /// Show the signed-in account
    Whoami,

    /// Give an account admin rights
    GrantAdmin {
        /// Email of the account
        email: String,
    },
}

/// Email and password.
#[derive(Debug, Args)]
pub struct CredentialArgs {
    /// Account email
    #[arg(short, long)]
    pub email: String,

    /// Account password
    #[arg(short, long)]
    pub password: String,
}

/// Catalog commands.
#[derive(Debug, Subcommand)]
pub enum ProductCommand {
    /// List products in the store
    List {
        /// Include hidden products (admin)
        #[arg(short, long)]
        all: bool,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Create a product, or update one with --id (admin)
    Save(ProductArgs),

    /// Delete a product (admin)
    Delete {
        /// Product id
        id: String,
    },
}

/// Product form fields.
#[derive(Debug, Args)]
pub struct ProductArgs {
    /// Product to update; a new one is created when omitted
    #[arg(long)]
    pub id: Option<String>,

    /// Product name
    #[arg(short, long)]
    pub name: String,

    /// Price in dollars, e.g. 24.50
    #[arg(short, long)]
    pub price: String,

    /// Description
    #[arg(short, long, default_value = "")]
    pub description: String,

    /// Comma-separated categories
    #[arg(long, default_value = "")]
    pub categories: String,

    /// Units on hand
    #[arg(long, default_value = "")]
    pub inventory: String,

    /// Hide the product from the store
    #[arg(long)]
    pub hidden: bool,

    /// Product photo to upload
    #[arg(long, value_name = "FILE")]
    pub image: Option<PathBuf>,
}

/// Cart commands for the signed-in user.
#[derive(Debug, Subcommand)]
pub enum CartCommand {
    /// Show the cart and its total
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Add one unit of a product
    Add {
        /// Product id
        product_id: String,
    },

    /// Set the quantity of a product; zero removes it
    Set {
        /// Product id
        product_id: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },

    /// Remove a product
    Remove {
        /// Product id
        product_id: String,
    },

    /// Place an order for everything in the cart
    Checkout,
}

/// Orders command arguments.
#[derive(Debug, Args)]
pub struct OrdersCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Content type argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ValueTypeArg {
    /// Element text
    Text,
    /// Link target
    Href,
    /// Image source
    Src,
    /// CSS background image
    Background,
    /// Meta tag content
    Meta,
    /// Embedded object data
    Data,
}

impl From<ValueTypeArg> for ValueType {
    fn from(arg: ValueTypeArg) -> Self {
        match arg {
            ValueTypeArg::Text => Self::Text,
            ValueTypeArg::Href => Self::Href,
            ValueTypeArg::Src => Self::Src,
            ValueTypeArg::Background => Self::Background,
            ValueTypeArg::Meta => Self::Meta,
            ValueTypeArg::Data => Self::Data,
        }
    }
}
