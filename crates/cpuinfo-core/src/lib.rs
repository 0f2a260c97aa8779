//! Core types for the cpuinfo log parser.
//!
//! Holds the data model, the error taxonomy, CLI settings and the numeric
//! helpers shared by the parsing and reporting layers.

pub mod calculations;
pub mod error;
pub mod models;
pub mod settings;

pub use error::{ParserError, Result};
