//! Query command implementation

use anyhow::Result;
use tern_index::Window;
use tern_query::TriplePattern;

use crate::commands::{format_term, open_document, parse_slot};

pub fn run(
    subject: &str,
    predicate: &str,
    object: &str,
    offset: u64,
    limit: Option<u64>,
    store_path: &str,
) -> Result<()> {
    let doc = open_document(store_path)?;
    let pattern = TriplePattern::new(
        parse_slot(subject),
        parse_slot(predicate),
        parse_slot(object),
    );
    let (iter, hint) = doc.search(pattern, Window::new(offset, limit))?;

    let mut shown = 0u64;
    for triple in iter {
        let [s, p, o] = triple?;
        println!(
            "{} {} {} .",
            format_term(&s),
            format_term(&p),
            format_term(&o)
        );
        shown += 1;
    }
    eprintln!(
        "{shown} result(s) shown, {} total ({})",
        hint.count,
        if hint.exact { "exact" } else { "estimated" }
    );
    Ok(())
}
