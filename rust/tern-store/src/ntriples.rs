//! Minimal line-oriented N-Triples reader and the store build entry point.
//!
//! This is the ingestion boundary: it turns a source RDF document into a
//! store file, and is not part of the query path. The supported subset is
//! one fact per line — IRI references in angle brackets (stored without
//! the brackets), blank nodes (`_:label`), and literals with optional
//! language tag or datatype (stored verbatim, quotes included) — ending in
//! a `.`. Blank lines and `#` comments are skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::debug;
use tern_common::{Result, error::Error};

use crate::store::TripleStore;

/// One parsed fact, terms in stored (bracket-less) form.
pub type TermTriple = (String, String, String);

/// Reads every fact of an N-Triples document.
pub fn read_file(path: &Path) -> Result<Vec<TermTriple>> {
    let file =
        File::open(path).map_err(|e| Error::io(path.display().to_string(), e))?;
    let mut triples = Vec::new();
    for (lineno, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| Error::io(path.display().to_string(), e))?;
        if let Some(triple) = parse_line(&line)
            .map_err(|e| Error::load(path.display().to_string(), format!("line {}: {e}", lineno + 1)))?
        {
            triples.push(triple);
        }
    }
    debug!("read {} facts from {}", triples.len(), path.display());
    Ok(triples)
}

/// Builds a store file from an N-Triples document.
pub fn build_store(source: &Path, dest: &Path, indexed: bool) -> Result<()> {
    let triples = read_file(source)?;
    let store = TripleStore::from_triples(
        triples.iter().map(|(s, p, o)| (s.as_str(), p.as_str(), o.as_str())),
        indexed,
    );
    store.write_to_path(dest)
}

/// Parses one line; `Ok(None)` for blank lines and comments.
pub fn parse_line(line: &str) -> std::result::Result<Option<TermTriple>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let mut rest = line;
    let subject = take_term(&mut rest)?;
    let predicate = take_term(&mut rest)?;
    let object = take_term(&mut rest)?;
    let rest = rest.trim_start();
    if rest != "." {
        return Err(format!("expected terminating '.', found '{rest}'"));
    }
    Ok(Some((subject, predicate, object)))
}

/// Consumes one term from the front of `rest`.
fn take_term(rest: &mut &str) -> std::result::Result<String, String> {
    *rest = rest.trim_start();
    let s = *rest;
    if let Some(tail) = s.strip_prefix('<') {
        let end = tail
            .find('>')
            .ok_or_else(|| "unterminated IRI reference".to_string())?;
        *rest = &tail[end + 1..];
        return Ok(tail[..end].to_string());
    }
    if s.starts_with("_:") {
        let end = s
            .find(char::is_whitespace)
            .ok_or_else(|| "unterminated blank node".to_string())?;
        let (term, tail) = s.split_at(end);
        *rest = tail;
        return Ok(term.to_string());
    }
    if s.starts_with('"') {
        let mut escaped = false;
        let mut close = None;
        for (i, c) in s.char_indices().skip(1) {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                close = Some(i);
                break;
            }
        }
        let close = close.ok_or_else(|| "unterminated literal".to_string())?;
        // Language tag or datatype suffix belongs to the literal.
        let tail = &s[close + 1..];
        let suffix_len = tail
            .find(|c: char| c.is_whitespace())
            .unwrap_or(tail.len());
        let term = &s[..close + 1 + suffix_len];
        *rest = &tail[suffix_len..];
        return Ok(term.to_string());
    }
    Err(format!("unrecognized term at '{s}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iri_triple() {
        let t = parse_line("<http://ex/a> <http://ex/p> <http://ex/b> .")
            .unwrap()
            .unwrap();
        assert_eq!(
            t,
            (
                "http://ex/a".to_string(),
                "http://ex/p".to_string(),
                "http://ex/b".to_string()
            )
        );
    }

    #[test]
    fn parses_literals() {
        let t = parse_line("<http://ex/a> <http://ex/p> \"hello world\" .")
            .unwrap()
            .unwrap();
        assert_eq!(t.2, "\"hello world\"");

        let t = parse_line("<http://ex/a> <http://ex/p> \"top class\"@en .")
            .unwrap()
            .unwrap();
        assert_eq!(t.2, "\"top class\"@en");

        let t = parse_line(
            "<http://ex/a> <http://ex/p> \"5\"^^<http://www.w3.org/2001/XMLSchema#integer> .",
        )
        .unwrap()
        .unwrap();
        assert_eq!(t.2, "\"5\"^^<http://www.w3.org/2001/XMLSchema#integer>");
    }

    #[test]
    fn parses_escaped_quote_in_literal() {
        let t = parse_line(r#"<http://ex/a> <http://ex/p> "say \"hi\"" ."#)
            .unwrap()
            .unwrap();
        assert_eq!(t.2, r#""say \"hi\"""#);
    }

    #[test]
    fn parses_blank_nodes() {
        let t = parse_line("_:b0 <http://ex/p> _:b1 .").unwrap().unwrap();
        assert_eq!(t.0, "_:b0");
        assert_eq!(t.2, "_:b1");
    }

    #[test]
    fn skips_blanks_and_comments() {
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(parse_line("# a comment").unwrap(), None);
    }

    #[test]
    fn build_store_produces_a_loadable_file() {
        use crate::store::{OpenOptions, TripleStore};
        use tern_index::TripleIndex;

        let source = tern_testkit::data_gen::ntriples_file(
            &tern_testkit::data_gen::tiny_graph(),
        )
        .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("graph.tern");
        build_store(source.path(), &dest, true).unwrap();

        let store = TripleStore::read_from_path(&dest, OpenOptions::default()).unwrap();
        assert_eq!(store.num_triples(), 3);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_line("not a triple").is_err());
        assert!(parse_line("<http://ex/a> <http://ex/p> <http://ex/b>").is_err());
        assert!(parse_line("<http://ex/a> <http://ex/p> \"unterminated .").is_err());
    }
}
