//! Quote capture library
//!
//! This library keeps a collection of short quotes, styled with decorative
//! fonts, in a remote JSON bin, with local settings and an offline cache.

mod cli;
mod config;
mod errors;
mod local_store;
mod quote;
mod quotes;
mod remote;
mod settings;
mod types;

// Re-export key components
pub use cli::*;
pub use config::*;
pub use errors::*;
pub use local_store::*;
pub use quote::*;
pub use quotes::*;
pub use remote::*;
pub use settings::*;
pub use types::*;
