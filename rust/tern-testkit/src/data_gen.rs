//! Data generation utilities for testing.
//!
//! Produces small, deterministic RDF graphs as term-triples or as
//! N-Triples documents in temp files.

use std::io::{Seek, SeekFrom, Write};

/// A term-triple in stored (bracket-less IRI) form.
pub type TermTriple = (String, String, String);

/// The three-fact graph used by the windowing and join scenarios:
/// {(a,p,b), (a,p,c), (d,p,b)} under the `http://tern.test/` namespace.
pub fn tiny_graph() -> Vec<TermTriple> {
    [("a", "p", "b"), ("a", "p", "c"), ("d", "p", "b")]
        .into_iter()
        .map(|(s, p, o)| (iri(s), iri(p), iri(o)))
        .collect()
}

/// Expands a local name into the test namespace.
pub fn iri(local: &str) -> String {
    format!("http://tern.test/{local}")
}

/// Generates a pseudo-random graph with `count` facts over bounded
/// subject/predicate/object pools. Deterministic for a fixed `seed`;
/// duplicates are possible and intended (stores deduplicate).
pub fn random_graph(count: usize, seed: u64) -> Vec<TermTriple> {
    let mut rng = fastrand::Rng::with_seed(seed);
    let subjects = count.div_ceil(4).max(1);
    let predicates = count.div_ceil(16).max(1);
    let objects = count.div_ceil(2).max(1);
    (0..count)
        .map(|_| {
            (
                iri(&format!("s{}", rng.usize(0..subjects))),
                iri(&format!("p{}", rng.usize(0..predicates))),
                iri(&format!("o{}", rng.usize(0..objects))),
            )
        })
        .collect()
}

/// Writes a graph as an N-Triples document into a named temp file,
/// positioned at the start.
pub fn ntriples_file(triples: &[TermTriple]) -> anyhow::Result<tempfile::NamedTempFile> {
    let mut file = tempfile::NamedTempFile::new()?;
    for (s, p, o) in triples {
        writeln!(file, "<{s}> <{p}> <{o}> .")?;
    }
    file.flush()?;
    file.seek(SeekFrom::Start(0))?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_graph_is_deterministic() {
        assert_eq!(random_graph(50, 7), random_graph(50, 7));
        assert_ne!(random_graph(50, 7), random_graph(50, 8));
    }

    #[test]
    fn ntriples_file_contains_one_line_per_fact() {
        let file = ntriples_file(&tiny_graph()).unwrap();
        let text = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.starts_with("<http://tern.test/a>"));
    }
}
