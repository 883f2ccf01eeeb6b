//! # freidok
//!
//! Retrieve publications and institutions from the FreiDok repository of the
//! University of Freiburg and render them as Markdown, HTML, JSON or a custom
//! template.
//!
//! ## Architecture
//!
//! A request flows through these modules in order:
//!
//! - [`query`]: field set resolution and translation of filters into API parameters
//! - [`sources`]: the live API or a saved JSON file behind the [`Source`] trait
//! - [`process`]: client-side exclusions, author formatting, language selection
//! - [`render`]: built-in and custom templates, JSON passthrough, output targets
//!
//! [`pipeline`] chains them; [`config`] and [`models`] are shared by all.

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod process;
pub mod query;
pub mod render;
pub mod sources;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{FreidokError, Result};
pub use models::{Institution, ItemList, Publication};
pub use sources::Source;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
