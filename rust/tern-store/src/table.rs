//! SPO-ordered triple table with optional auxiliary orderings.
//!
//! The table keeps all facts sorted by (subject, predicate, object); this
//! is the document order every stream follows for subject-bound patterns
//! and full scans. When built with auxiliary orderings, two permutations
//! of the table — by (predicate, subject, object) and by (object,
//! predicate, subject) — serve predicate- and object-bound patterns with
//! prefix binary searches instead of scans.
//!
//! Search strategy per bound-slot combination:
//!
//! | pattern | strategy            | hint      |
//! |---------|---------------------|-----------|
//! | S??,SP?,SPO | SPO prefix range | exact     |
//! | S?O     | subject range + filter | estimate |
//! | ?P?     | PSO prefix range (scan if unindexed) | exact (estimate) |
//! | ?PO     | OPS prefix range (scan if unindexed) | exact (estimate) |
//! | ??O     | OPS prefix range (scan if unindexed) | exact (estimate) |
//! | ???     | full table          | exact     |

use std::ops::Range;

use tern_common::{Result, verify_data};
use tern_index::{IdPattern, IdTriple, IdTripleStream, SizeHint, TermId, TripleIndex, Window};

/// Immutable, SPO-sorted triple collection.
#[derive(Debug, Default)]
pub struct TripleTable {
    triples: Vec<IdTriple>,
    /// Permutation of `triples` ordered by (predicate, subject, object).
    pso: Option<Vec<u32>>,
    /// Permutation of `triples` ordered by (object, predicate, subject).
    ops: Option<Vec<u32>>,
}

impl TripleTable {
    /// Builds a table from an arbitrary triple list: sorts, deduplicates,
    /// and optionally builds the auxiliary orderings.
    pub fn new(mut triples: Vec<IdTriple>, indexed: bool) -> TripleTable {
        triples.sort_unstable();
        triples.dedup();
        let mut table = TripleTable {
            triples,
            pso: None,
            ops: None,
        };
        if indexed {
            table.build_orderings();
        }
        table
    }

    /// Assembles a table from an already SPO-sorted, duplicate-free list,
    /// validating the order (used by the file loader).
    pub fn from_sorted(triples: Vec<IdTriple>, indexed: bool) -> Result<TripleTable> {
        verify_data!(triples, triples.windows(2).all(|w| w[0] < w[1]));
        let mut table = TripleTable {
            triples,
            pso: None,
            ops: None,
        };
        if indexed {
            table.build_orderings();
        }
        Ok(table)
    }

    pub fn triples(&self) -> &[IdTriple] {
        &self.triples
    }

    pub fn is_indexed(&self) -> bool {
        self.pso.is_some()
    }

    fn build_orderings(&mut self) {
        let mut pso: Vec<u32> = (0..self.triples.len() as u32).collect();
        pso.sort_unstable_by_key(|&i| {
            let t = self.triples[i as usize];
            (t.predicate, t.subject, t.object)
        });
        let mut ops: Vec<u32> = (0..self.triples.len() as u32).collect();
        ops.sort_unstable_by_key(|&i| {
            let t = self.triples[i as usize];
            (t.object, t.predicate, t.subject)
        });
        self.pso = Some(pso);
        self.ops = Some(ops);
    }

    /// Contiguous SPO range of facts whose components match the bound
    /// prefix `(subject[, predicate[, object]])`.
    fn spo_range(&self, s: TermId, p: TermId, o: TermId) -> Range<usize> {
        let key_len = if p == 0 {
            1
        } else if o == 0 {
            2
        } else {
            3
        };
        let key = |t: &IdTriple| match key_len {
            1 => (t.subject, 0, 0),
            2 => (t.subject, t.predicate, 0),
            _ => (t.subject, t.predicate, t.object),
        };
        let probe = key(&IdTriple::new(s, p, o));
        let start = self.triples.partition_point(|t| key(t) < probe);
        let end = self.triples.partition_point(|t| key(t) <= probe);
        start..end
    }

    fn perm_range<K: Ord>(
        &self,
        perm: &[u32],
        probe: K,
        key: impl Fn(&IdTriple) -> K,
    ) -> Range<usize> {
        let start = perm.partition_point(|&i| key(&self.triples[i as usize]) < probe);
        let end = perm.partition_point(|&i| key(&self.triples[i as usize]) <= probe);
        start..end
    }

    /// Picks the access path for a pattern, returning the base stream
    /// source and the pre-window cardinality hint.
    fn plan(&self, pattern: IdPattern) -> (Source<'_>, SizeHint) {
        let IdPattern {
            subject: s,
            predicate: p,
            object: o,
        } = pattern;
        if s != 0 {
            let range = self.spo_range(s, p, o);
            // The only residual constraint a subject range can leave over
            // is the object of an S?O pattern.
            let residual = p == 0 && o != 0;
            let hint = range_hint(range.len() as u64, !residual);
            return (Source::Slice(&self.triples[range]), hint);
        }
        if o != 0 {
            if let Some(ops) = &self.ops {
                let range = if p != 0 {
                    self.perm_range(ops, (o, p), |t| (t.object, t.predicate))
                } else {
                    self.perm_range(ops, (o,), |t| (t.object,))
                };
                let hint = SizeHint::exact(range.len() as u64);
                return (Source::Perm(&ops[range]), hint);
            }
            return (Source::Scan, scan_hint(self.triples.len() as u64));
        }
        if p != 0 {
            if let Some(pso) = &self.pso {
                let range = self.perm_range(pso, (p,), |t| (t.predicate,));
                let hint = SizeHint::exact(range.len() as u64);
                return (Source::Perm(&pso[range]), hint);
            }
            return (Source::Scan, scan_hint(self.triples.len() as u64));
        }
        (
            Source::Slice(&self.triples),
            SizeHint::exact(self.triples.len() as u64),
        )
    }
}

enum Source<'a> {
    Slice(&'a [IdTriple]),
    Perm(&'a [u32]),
    Scan,
}

fn range_hint(len: u64, exact: bool) -> SizeHint {
    // An empty enclosing range proves zero matches even when a residual
    // filter remains.
    if exact || len == 0 {
        SizeHint::exact(if exact { len } else { 0 })
    } else {
        SizeHint::estimate(len)
    }
}

fn scan_hint(total: u64) -> SizeHint {
    if total == 0 {
        SizeHint::exact(0)
    } else {
        SizeHint::estimate(total)
    }
}

impl TripleIndex for TripleTable {
    fn search<'a>(
        &'a self,
        pattern: IdPattern,
        window: Window,
    ) -> Result<(IdTripleStream<'a>, SizeHint)> {
        let (source, hint) = self.plan(pattern);
        let base: Box<dyn Iterator<Item = IdTriple> + 'a> = match source {
            Source::Slice(slice) => Box::new(slice.iter().copied()),
            Source::Perm(perm) => Box::new(perm.iter().map(|&i| self.triples[i as usize])),
            Source::Scan => Box::new(self.triples.iter().copied()),
        };
        let matched = base
            .filter(move |t| pattern.matches(t))
            .skip(window.offset as usize);
        let stream: IdTripleStream<'a> = match window.limit {
            Some(limit) => Box::new(matched.take(limit as usize).map(Ok)),
            None => Box::new(matched.map(Ok)),
        };
        Ok((stream, hint))
    }

    fn num_triples(&self) -> u64 {
        self.triples.len() as u64
    }
}
