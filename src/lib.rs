pub mod analytics;
mod api;
pub mod args;
mod backup;
mod cache;
pub mod commands;
mod config;
mod error;
mod mcp;
pub mod model;
mod session;
mod utils;

#[cfg(test)]
mod test;

pub use api::{Mode, TEST_MODE_ENV};
pub use config::Config;
pub use error::Error;
pub use error::ErrorType;
pub use error::Result;
pub use session::{Owner, Session};
