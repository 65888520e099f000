//! The document facade: one loaded store, queried through patterns,
//! joins, and term/identifier conversions.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;
use tern_common::{Result, error::Error};
use tern_index::{
    Dictionary, IdPattern, IdTriple, SizeHint, TermId, TermPosition, TripleIndex, UNBOUND, Window,
};
use tern_store::{OpenOptions, TripleStore};

use crate::iter::{PatternIter, TripleBytesIterator, TripleIdIterator, TripleIterator};
use crate::join::{JoinIterator, JoinTerm};
use crate::pattern::TriplePattern;
use crate::repr::{Bytes, BytesTriple, Representation, StringTriple, Terms};

/// A read-only view over one triple store.
///
/// A document owns its dictionary and index behind `Arc`s, so it is cheap
/// to share across threads; all query operations take `&self`.
pub struct Document {
    path: Option<PathBuf>,
    dict: Arc<dyn Dictionary>,
    index: Arc<dyn TripleIndex>,
}

impl Document {
    /// Opens a store file with default options.
    pub fn open(path: impl AsRef<Path>) -> Result<Document> {
        Self::open_with(path, OpenOptions::default())
    }

    /// Opens a store file.
    ///
    /// # Errors
    ///
    /// Fails with `ErrorKind::Load` when the file is missing, truncated,
    /// corrupted, or not a store file.
    pub fn open_with(path: impl AsRef<Path>, options: OpenOptions) -> Result<Document> {
        let path = path.as_ref();
        let store = TripleStore::read_from_path(path, options)
            .map_err(|e| Error::load(path.display().to_string(), e.to_string()))?;
        debug!("opened document {} ({} triples)", path.display(), store.table().num_triples());
        let store = Arc::new(store);
        let dict: Arc<dyn Dictionary> = store.clone();
        let index: Arc<dyn TripleIndex> = store;
        Ok(Document {
            path: Some(path.to_path_buf()),
            dict,
            index,
        })
    }

    /// Wraps an already-loaded dictionary + index pair.
    pub fn from_parts(dict: Arc<dyn Dictionary>, index: Arc<dyn TripleIndex>) -> Document {
        Document {
            path: None,
            dict,
            index,
        }
    }

    /// The file this document was opened from, when it was.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Searches for facts matching `pattern`, yielding term strings.
    ///
    /// Returns the iterator together with the pre-window cardinality hint
    /// of the pattern (also available as the iterator's `cardinality`). A
    /// bound term unknown to the dictionary yields an exhausted iterator
    /// and an exact zero hint, never an error.
    pub fn search(
        &self,
        pattern: TriplePattern,
        window: Window,
    ) -> Result<(TripleIterator<'_>, SizeHint)> {
        self.search_with::<Terms>(pattern, window)
    }

    /// Like [`Document::search`], yielding byte-encoded terms.
    pub fn search_bytes(
        &self,
        pattern: TriplePattern,
        window: Window,
    ) -> Result<(TripleBytesIterator<'_>, SizeHint)> {
        self.search_with::<Bytes>(pattern, window)
    }

    /// Searches with an identifier pattern, yielding identifier-triples.
    ///
    /// Unlike the term-level searches, a bound identifier that is out of
    /// range for its role is an error, not an empty result: identifiers
    /// carry no "unknown term" reading.
    pub fn search_ids(
        &self,
        pattern: IdPattern,
        window: Window,
    ) -> Result<(TripleIdIterator<'_>, SizeHint)> {
        let term_pattern = self.pattern_from_ids(&pattern)?;
        let (stream, hint) = self.index.search(pattern, window)?;
        let iter = PatternIter::new(self.dict.as_ref(), stream, term_pattern, window, hint);
        Ok((iter, hint))
    }

    /// Evaluates a conjunction of patterns sharing named variables.
    pub fn search_join(&self, patterns: &[[JoinTerm; 3]]) -> Result<JoinIterator<'_>> {
        JoinIterator::new(self.dict.as_ref(), self.index.as_ref(), patterns)
    }

    fn search_with<R: Representation>(
        &self,
        pattern: TriplePattern,
        window: Window,
    ) -> Result<(PatternIter<'_, R>, SizeHint)> {
        let mut ids = [UNBOUND; 3];
        let slots = [
            pattern.subject.clone(),
            pattern.predicate.clone(),
            pattern.object.clone(),
        ];
        for (pos, slot) in slots.iter().enumerate() {
            if let Some(term) = slot {
                match self.dict.term_to_id(term, TermPosition::of_slot(pos)) {
                    Some(id) => ids[pos] = id,
                    None => {
                        debug!("term '{term}' unknown as {}, empty result", TermPosition::of_slot(pos));
                        let iter = PatternIter::empty(self.dict.as_ref(), pattern, window);
                        return Ok((iter, SizeHint::exact(0)));
                    }
                }
            }
        }
        let (stream, hint) = self
            .index
            .search(IdPattern::new(ids[0], ids[1], ids[2]), window)?;
        let iter = PatternIter::new(self.dict.as_ref(), stream, pattern, window, hint);
        Ok((iter, hint))
    }

    /// Resolves the bound slots of an identifier pattern back to terms,
    /// validating them in the process.
    fn pattern_from_ids(&self, pattern: &IdPattern) -> Result<TriplePattern> {
        let mut terms: [Option<String>; 3] = [None, None, None];
        for pos in 0..3 {
            let id = pattern.get(pos);
            if id != UNBOUND {
                terms[pos] = Some(self.dict.id_to_term(id, TermPosition::of_slot(pos))?);
            }
        }
        let [subject, predicate, object] = terms;
        Ok(TriplePattern {
            subject,
            predicate,
            object,
        })
    }

    /// Looks up the identifier of `term` for `position`.
    ///
    /// # Errors
    ///
    /// Fails with `ErrorKind::UnknownTerm` when the term is not in the
    /// dictionary for that role.
    pub fn term_to_id(&self, term: &str, position: TermPosition) -> Result<TermId> {
        self.dict
            .term_to_id(term, position)
            .ok_or_else(|| Error::unknown_term(term, position.as_str()))
    }

    /// Resolves an identifier to its term string.
    pub fn id_to_term(&self, id: TermId, position: TermPosition) -> Result<String> {
        self.dict.id_to_term(id, position)
    }

    /// Resolves an identifier to the byte encoding of its term.
    pub fn id_to_bytes(&self, id: TermId, position: TermPosition) -> Result<Vec<u8>> {
        self.dict.id_to_bytes(id, position)
    }

    /// Converts a full identifier-triple to term strings.
    pub fn triple_id_to_terms(&self, triple: IdTriple) -> Result<StringTriple> {
        Terms::decode(self.dict.as_ref(), triple)
    }

    /// Converts a full identifier-triple to byte-encoded terms.
    pub fn triple_id_to_bytes(&self, triple: IdTriple) -> Result<BytesTriple> {
        Bytes::decode(self.dict.as_ref(), triple)
    }

    /// Total number of facts in the store.
    pub fn num_triples(&self) -> u64 {
        self.index.num_triples()
    }

    /// Distinct subjects, shared terms included.
    pub fn num_subjects(&self) -> u64 {
        self.dict.num_shared() + self.dict.num_subjects()
    }

    pub fn num_predicates(&self) -> u64 {
        self.dict.num_predicates()
    }

    /// Distinct objects, shared terms included.
    pub fn num_objects(&self) -> u64 {
        self.dict.num_shared() + self.dict.num_objects()
    }

    /// Terms occurring as both subject and object.
    pub fn num_shared(&self) -> u64 {
        self.dict.num_shared()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("path", &self.path)
            .field("triples", &self.index.num_triples())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> Document {
        let store = Arc::new(TripleStore::from_triples(
            [("a", "p", "b"), ("a", "p", "c"), ("d", "p", "b")],
            true,
        ));
        Document::from_parts(store.clone(), store)
    }

    #[test]
    fn search_streams_matching_terms() {
        let doc = document();
        let (iter, hint) = doc
            .search(TriplePattern::new(Some("a"), None, None), Window::all())
            .unwrap();
        assert_eq!(hint, SizeHint::exact(2));
        let triples: Vec<StringTriple> = iter.map(|t| t.unwrap()).collect();
        assert_eq!(
            triples,
            [
                ["a".to_string(), "p".to_string(), "b".to_string()],
                ["a".to_string(), "p".to_string(), "c".to_string()],
            ]
        );
    }

    #[test]
    fn unknown_bound_term_yields_empty_with_exact_zero() {
        let doc = document();
        let (mut iter, hint) = doc
            .search(TriplePattern::new(Some("z"), Some("p"), None), Window::all())
            .unwrap();
        assert_eq!(hint, SizeHint::exact(0));
        assert!(!iter.has_next());
        assert!(iter.next().is_none());
    }

    #[test]
    fn windowed_search_skips_and_caps() {
        let doc = document();
        let (iter, hint) = doc
            .search(TriplePattern::any(), Window::new(1, Some(1)))
            .unwrap();
        // The hint describes the pattern, not the window.
        assert_eq!(hint, SizeHint::exact(3));
        let triples: Vec<StringTriple> = iter.map(|t| t.unwrap()).collect();
        assert_eq!(triples, [["a".to_string(), "p".to_string(), "c".to_string()]]);
    }

    #[test]
    fn id_search_validates_bound_identifiers() {
        let doc = document();
        let p = doc.term_to_id("p", TermPosition::Predicate).unwrap();
        let (iter, hint) = doc
            .search_ids(IdPattern::new(UNBOUND, p, UNBOUND), Window::all())
            .unwrap();
        assert_eq!(hint.count, 3);
        assert_eq!(iter.count(), 3);

        let err = doc
            .search_ids(IdPattern::new(999, UNBOUND, UNBOUND), Window::all())
            .unwrap_err();
        assert!(matches!(
            err.kind(),
            tern_common::error::ErrorKind::InvalidIdentifier { .. }
        ));
    }

    #[test]
    fn representations_agree() {
        let doc = document();
        let pattern = TriplePattern::new(None, None, Some("b"));
        let (terms, _) = doc.search(pattern.clone(), Window::all()).unwrap();
        let (bytes, _) = doc.search_bytes(pattern, Window::all()).unwrap();
        for (t, b) in terms.zip(bytes) {
            let t = t.unwrap();
            let b = b.unwrap();
            for pos in 0..3 {
                assert_eq!(t[pos].as_bytes(), b[pos].as_slice());
            }
        }
    }

    #[test]
    fn conversions_roundtrip_and_fail_cleanly() {
        let doc = document();
        let id = doc.term_to_id("b", TermPosition::Object).unwrap();
        assert_eq!(doc.id_to_term(id, TermPosition::Object).unwrap(), "b");
        assert_eq!(doc.id_to_bytes(id, TermPosition::Object).unwrap(), b"b");

        let err = doc.term_to_id("nope", TermPosition::Subject).unwrap_err();
        assert!(matches!(
            err.kind(),
            tern_common::error::ErrorKind::UnknownTerm { .. }
        ));
    }

    #[test]
    fn stats_include_shared_terms_on_both_sides() {
        let doc = document();
        // "b" is never a subject here, so only "a" and "d" count.
        assert_eq!(doc.num_triples(), 3);
        assert_eq!(doc.num_subjects(), 2);
        assert_eq!(doc.num_objects(), 2);
        assert_eq!(doc.num_predicates(), 1);
        assert_eq!(doc.num_shared(), 0);
    }

    #[test]
    fn join_runs_through_the_facade() {
        let doc = document();
        let patterns = [
            [JoinTerm::var("x"), JoinTerm::bound("p"), JoinTerm::bound("b")],
        ];
        let join = doc.search_join(&patterns).unwrap();
        assert_eq!(join.count(), 2);
    }
}
