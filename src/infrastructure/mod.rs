//! Infrastructure layer
//!
//! Configuration, logging bootstrap and document rendering.

mod config;
mod document;
mod logging;

pub use config::{Config, DocumentFormat};
pub use document::Document;
pub use logging::init_logging;
