//! Utility modules shared by the sources.

mod http;

pub use http::{HttpClient, USER_AGENT};
