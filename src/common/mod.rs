//! Common utilities shared between the load and compare tools

pub mod config;
pub mod error;
pub mod logging;
pub mod paths;

pub use error::{Error, Result};
