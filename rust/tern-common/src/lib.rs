//! Core definitions (errors and common result types), relied upon by all tern-* crates.

pub mod error;
pub mod result;

pub use result::Result;
