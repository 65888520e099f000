//! The triple index collaborator trait.

use tern_common::Result;

use crate::model::{IdPattern, IdTriple, SizeHint, Window};

/// A lazily-produced ordered stream of identifier-triples.
///
/// Streams borrow the index read-only; any number of independently
/// positioned streams may be open over the same index concurrently.
pub type IdTripleStream<'a> = Box<dyn Iterator<Item = Result<IdTriple>> + 'a>;

/// Ordered pattern lookup over an immutable triple collection.
pub trait TripleIndex: Send + Sync {
    /// Searches for all facts matching `pattern`, windowed by `window`.
    ///
    /// The stream yields matches in an implementation-defined but stable
    /// total order for a fixed pattern (document order): repeated calls
    /// with the same pattern observe the same order. `window.offset`
    /// leading matches are skipped before the first yielded result, and at
    /// most `window.limit` results are produced when a limit is set.
    ///
    /// The returned [`SizeHint`] describes the cardinality of the pattern
    /// *before* windowing. It is captured once; consuming the stream does
    /// not update it.
    fn search<'a>(
        &'a self,
        pattern: IdPattern,
        window: Window,
    ) -> Result<(IdTripleStream<'a>, SizeHint)>;

    /// Total number of facts in the collection.
    fn num_triples(&self) -> u64;
}
