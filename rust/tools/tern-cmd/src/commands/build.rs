//! Build command implementation

use anyhow::{Context, Result};
use std::path::Path;
use tern_store::ntriples;

use crate::commands::open_document;

pub fn run(source: &str, store_path: &str, indexed: bool) -> Result<()> {
    ntriples::build_store(Path::new(source), Path::new(store_path), indexed)
        .with_context(|| format!("Failed to build store from: {source}"))?;

    let doc = open_document(store_path)?;
    // Shared terms appear in both the subject and object counts.
    let terms =
        doc.num_subjects() + doc.num_objects() + doc.num_predicates() - doc.num_shared();
    println!(
        "Built {} ({} triples, {} terms)",
        store_path,
        doc.num_triples(),
        terms
    );
    Ok(())
}
