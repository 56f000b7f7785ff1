//! Shared types: the crate `Result`, remote wire envelopes, and CLI subcommands.
use clap::Subcommand;
use serde::{Deserialize, Serialize};

use crate::{QuoteError, Quote};

/// A specialized Result type for quotebin operations.
pub type Result<T> = std::result::Result<T, QuoteError>;

/// Request body for PUT and POST: `{"quotes": [...]}`
#[derive(Debug, Serialize)]
pub struct BinPayload<'a> {
    pub quotes: &'a [Quote],
}

/// The `record` part of a bin response
#[derive(Debug, Default, Deserialize)]
pub struct BinRecord {
    #[serde(default)]
    pub quotes: Vec<Quote>,
}

/// The `metadata` part of a bin response. Only the id is of interest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BinMetadata {
    #[serde(default)]
    pub id: Option<String>,
}

/// Response envelope shared by GET, PUT and POST
#[derive(Debug, Default, Deserialize)]
pub struct BinEnvelope {
    #[serde(default)]
    pub record: Option<BinRecord>,
    #[serde(default)]
    pub metadata: Option<BinMetadata>,
}

/// Result of reading a bin. A missing bin is not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Found(Vec<Quote>),
    NotFound,
}

/// Available subcommands for the quotebin application
#[derive(Subcommand)]
pub enum Commands {
    /// Capture a new quote and save it to the remote bin
    Add {
        /// The quote text
        text: String,

        /// Who said it
        #[clap(short, long)]
        author: String,

        /// Font to display it in (name or CSS family, defaults to settings)
        #[clap(short, long)]
        font: Option<String>,

        /// Font size in pixels (defaults to settings)
        #[clap(short, long)]
        size: Option<u32>,
    },

    /// List quotes, newest first
    List {
        /// Limit the number of quotes shown (0 shows all)
        #[clap(short = 'n', long, default_value_t = 0)]
        limit: usize,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Show one quote by ID or slug
    Show {
        /// ID or slug of the quote
        key: String,

        /// Format output as raw JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Show the quote after the given one, wrapping around
    Next {
        /// ID of the current quote
        id: String,
    },

    /// Show the quote before the given one, wrapping around
    Prev {
        /// ID of the current quote
        id: String,
    },

    /// Delete a quote by ID
    Remove {
        /// ID of the quote to delete
        id: String,
    },

    /// Fetch the remote bin and refresh the local cache
    Sync,

    /// Show or change display settings
    Settings {
        /// Font to use for new quotes (name or CSS family)
        #[clap(short, long)]
        font: Option<String>,

        /// Font size in pixels
        #[clap(short, long)]
        size: Option<u32>,

        /// Enable or disable dark mode
        #[clap(short, long)]
        dark_mode: Option<bool>,

        /// Reset settings to defaults
        #[clap(short, long)]
        reset: bool,

        /// List the available fonts
        #[clap(long)]
        fonts: bool,
    },
}
