//! The pattern iterator family: one cursor engine over an index stream,
//! generic over the value representation.
//!
//! The engine adds to the raw index stream:
//!
//! - limit/offset windowing (the offset is pushed down to the index, the
//!   limit is enforced here),
//! - a one-slot raw lookahead buffer giving idempotent `peek` and a
//!   non-consuming `has_next`,
//! - a monotonically increasing count of results read,
//! - the cardinality hint captured at construction.
//!
//! Exhaustion is the normal end of the sequence and surfaces as `None`; a
//! mid-stream identifier that fails to resolve is a corrupt store and
//! aborts iteration with an error.

use std::marker::PhantomData;

use tern_common::{Result, error::Error};
use tern_index::{Dictionary, IdTriple, IdTripleStream, SizeHint, Window};

use crate::pattern::TriplePattern;
use crate::repr::{Bytes, Ids, Representation, Terms};

/// Iterator over matching facts as term strings.
pub type TripleIterator<'a> = PatternIter<'a, Terms>;

/// Iterator over matching facts as raw identifier-triples.
pub type TripleIdIterator<'a> = PatternIter<'a, Ids>;

/// Iterator over matching facts as byte-encoded terms.
pub type TripleBytesIterator<'a> = PatternIter<'a, Bytes>;

/// Lazy cursor over the facts matching one triple pattern.
///
/// Created by the `Document` search operations. The cursor is resumable
/// (`peek` never consumes) and releases the underlying index stream when
/// dropped, consumed or not.
pub struct PatternIter<'a, R: Representation> {
    dict: &'a dyn Dictionary,
    stream: IdTripleStream<'a>,
    pattern: TriplePattern,
    window: Window,
    hint: SizeHint,
    nb_reads: u64,
    lookahead: Option<IdTriple>,
    pending_err: Option<Error>,
    done: bool,
    _repr: PhantomData<R>,
}

impl<R: Representation> std::fmt::Debug for PatternIter<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternIter")
            .field("pattern", &self.pattern)
            .field("window", &self.window)
            .field("hint", &self.hint)
            .field("nb_reads", &self.nb_reads)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl<'a, R: Representation> PatternIter<'a, R> {
    pub(crate) fn new(
        dict: &'a dyn Dictionary,
        stream: IdTripleStream<'a>,
        pattern: TriplePattern,
        window: Window,
        hint: SizeHint,
    ) -> PatternIter<'a, R> {
        PatternIter {
            dict,
            stream,
            pattern,
            window,
            hint,
            nb_reads: 0,
            lookahead: None,
            pending_err: None,
            done: false,
            _repr: PhantomData,
        }
    }

    /// An immediately-exhausted iterator with an exact zero hint, used
    /// when a bound pattern term is unknown to the dictionary.
    pub(crate) fn empty(
        dict: &'a dyn Dictionary,
        pattern: TriplePattern,
        window: Window,
    ) -> PatternIter<'a, R> {
        PatternIter::new(
            dict,
            Box::new(std::iter::empty()),
            pattern,
            window,
            SizeHint::exact(0),
        )
    }

    /// True iff another result remains, considering the lookahead buffer
    /// and the remaining limit. Does not consume.
    pub fn has_next(&mut self) -> bool {
        if self.window.is_full(self.nb_reads) {
            return false;
        }
        self.fill();
        self.lookahead.is_some() || self.pending_err.is_some()
    }

    /// Returns the next result without advancing.
    ///
    /// Idempotent: repeated peeks observe the same value until `next` is
    /// called. `Ok(None)` signals exhaustion.
    ///
    /// # Errors
    ///
    /// Fails when the stream fails, or when a streamed identifier cannot
    /// be resolved (`ErrorKind::CorruptStore`).
    pub fn peek(&mut self) -> Result<Option<R::Value>> {
        if self.window.is_full(self.nb_reads) {
            return Ok(None);
        }
        self.fill();
        if let Some(err) = self.pending_err.take() {
            self.done = true;
            return Err(err);
        }
        match self.lookahead {
            Some(triple) => Ok(Some(self.decode(triple)?)),
            None => Ok(None),
        }
    }

    /// The cardinality hint captured at construction (never recomputed as
    /// results are consumed). Describes the pattern before windowing.
    pub fn cardinality(&self) -> SizeHint {
        self.hint
    }

    /// The originating term pattern.
    pub fn pattern(&self) -> &TriplePattern {
        &self.pattern
    }

    pub fn subject(&self) -> Option<&str> {
        self.pattern.subject.as_deref()
    }

    pub fn predicate(&self) -> Option<&str> {
        self.pattern.predicate.as_deref()
    }

    pub fn object(&self) -> Option<&str> {
        self.pattern.object.as_deref()
    }

    pub fn limit(&self) -> Option<u64> {
        self.window.limit
    }

    pub fn offset(&self) -> u64 {
        self.window.offset
    }

    /// Cumulative number of results already read.
    pub fn nb_reads(&self) -> u64 {
        self.nb_reads
    }

    /// Pulls the stream into the lookahead buffer if it is empty.
    fn fill(&mut self) {
        if self.lookahead.is_none() && self.pending_err.is_none() && !self.done {
            match self.stream.next() {
                Some(Ok(triple)) => self.lookahead = Some(triple),
                Some(Err(err)) => {
                    self.pending_err = Some(err);
                }
                None => self.done = true,
            }
        }
    }

    fn decode(&self, triple: IdTriple) -> Result<R::Value> {
        R::decode(self.dict, triple).map_err(|e| {
            Error::corrupt_store(format!("streamed triple failed to resolve: {e}"))
        })
    }
}

impl<'a, R: Representation> Iterator for PatternIter<'a, R> {
    type Item = Result<R::Value>;

    fn next(&mut self) -> Option<Result<R::Value>> {
        if self.window.is_full(self.nb_reads) {
            return None;
        }
        self.fill();
        if let Some(err) = self.pending_err.take() {
            self.done = true;
            return Some(Err(err));
        }
        let triple = self.lookahead.take()?;
        match self.decode(triple) {
            Ok(value) => {
                self.nb_reads += 1;
                Some(Ok(value))
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.hint.exact {
            let remaining = self
                .window
                .clamp(self.hint.count)
                .saturating_sub(self.nb_reads) as usize;
            (remaining, Some(remaining))
        } else {
            (0, Some(self.window.clamp(self.hint.count) as usize))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tern_index::{IdPattern, TripleIndex};
    use tern_store::TripleStore;

    fn store() -> TripleStore {
        TripleStore::from_triples(
            [("a", "p", "b"), ("a", "p", "c"), ("d", "p", "b")],
            true,
        )
    }

    fn iter_all<'a>(store: &'a TripleStore, window: Window) -> TripleIdIterator<'a> {
        let (stream, hint) = store.search(IdPattern::any(), window).unwrap();
        PatternIter::new(store, stream, TriplePattern::any(), window, hint)
    }

    #[test]
    fn peek_is_idempotent_and_agrees_with_next() {
        let store = store();
        let mut it = iter_all(&store, Window::all());
        let first = it.peek().unwrap().unwrap();
        assert_eq!(it.peek().unwrap().unwrap(), first);
        assert_eq!(it.peek().unwrap().unwrap(), first);
        assert_eq!(it.next().unwrap().unwrap(), first);
        let second = it.peek().unwrap().unwrap();
        assert_ne!(second, first);
        assert_eq!(it.next().unwrap().unwrap(), second);
    }

    #[test]
    fn nb_reads_tracks_consumption_and_respects_limit() {
        let store = store();
        let mut it = iter_all(&store, Window::new(0, Some(2)));
        assert_eq!(it.nb_reads(), 0);
        assert!(it.has_next());
        it.next().unwrap().unwrap();
        it.next().unwrap().unwrap();
        assert_eq!(it.nb_reads(), 2);
        assert!(!it.has_next());
        assert!(it.next().is_none());
        assert_eq!(it.peek().unwrap(), None);
    }

    #[test]
    fn exact_hint_matches_enumeration() {
        let store = store();
        let mut it = iter_all(&store, Window::all());
        let hint = it.cardinality();
        assert!(hint.exact);
        let produced = it.by_ref().count() as u64;
        assert_eq!(produced, hint.count);
        assert_eq!(it.nb_reads(), produced);
    }

    #[test]
    fn empty_iterator_is_exhausted_from_the_start() {
        let store = store();
        let mut it: TripleIdIterator<'_> =
            PatternIter::empty(&store, TriplePattern::any(), Window::all());
        assert_eq!(it.cardinality(), SizeHint::exact(0));
        assert!(!it.has_next());
        assert_eq!(it.peek().unwrap(), None);
        assert!(it.next().is_none());
        assert_eq!(it.nb_reads(), 0);
    }

    #[test]
    fn stream_error_surfaces_once() {
        let store = store();
        let stream: IdTripleStream<'_> = Box::new(
            [
                Ok(IdTriple::new(1, 1, 1)),
                Err(Error::corrupt_store("bad page")),
            ]
            .into_iter(),
        );
        let mut it: TripleIdIterator<'_> = PatternIter::new(
            &store,
            stream,
            TriplePattern::any(),
            Window::all(),
            SizeHint::estimate(2),
        );
        assert!(it.next().unwrap().is_ok());
        assert!(it.has_next());
        assert!(it.next().unwrap().is_err());
        assert!(it.next().is_none());
    }

    #[test]
    fn unresolvable_identifier_is_a_corrupt_store() {
        let store = store();
        let stream: IdTripleStream<'_> =
            Box::new([Ok(IdTriple::new(999, 999, 999))].into_iter());
        let mut it: TripleIterator<'_> = PatternIter::new(
            &store,
            stream,
            TriplePattern::any(),
            Window::all(),
            SizeHint::estimate(1),
        );
        let err = it.next().unwrap().unwrap_err();
        assert!(matches!(
            err.kind(),
            tern_common::error::ErrorKind::CorruptStore { .. }
        ));
        assert!(it.next().is_none());
    }
}
