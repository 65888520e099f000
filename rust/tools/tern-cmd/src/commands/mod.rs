//! Command implementations for tern-cmd

use anyhow::{Context, Result};
use std::path::Path;
use tern_query::Document;

pub mod build;
pub mod inspect;
pub mod query;

/// Opens a store file as a queryable document.
pub fn open_document(store_path: &str) -> Result<Document> {
    Document::open(Path::new(store_path))
        .with_context(|| format!("Failed to open store: {store_path}"))
}

/// Interprets a pattern slot argument: `?` (or an empty string) leaves the
/// slot unbound.
pub fn parse_slot(arg: &str) -> Option<&str> {
    match arg {
        "" | "?" => None,
        term => Some(term),
    }
}

/// Renders a stored term back to N-Triples syntax: literals and blank
/// nodes are stored verbatim, IRIs without their angle brackets.
pub fn format_term(term: &str) -> String {
    if term.starts_with('"') || term.starts_with("_:") {
        term.to_string()
    } else {
        format!("<{term}>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_parsing() {
        assert_eq!(parse_slot("?"), None);
        assert_eq!(parse_slot(""), None);
        assert_eq!(parse_slot("http://ex/a"), Some("http://ex/a"));
    }

    #[test]
    fn term_formatting() {
        assert_eq!(format_term("http://ex/a"), "<http://ex/a>");
        assert_eq!(format_term("\"lit\"@en"), "\"lit\"@en");
        assert_eq!(format_term("_:b0"), "_:b0");
    }
}
