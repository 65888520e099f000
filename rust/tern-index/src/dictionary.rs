//! The term dictionary collaborator trait.

use tern_common::Result;

use crate::model::{TermId, TermPosition};

/// Bidirectional mapping between RDF terms and dense integer identifiers,
/// partitioned into four identifier spaces (subject, predicate, object,
/// shared subject-object).
///
/// Translation is a pure function of its inputs for the lifetime of the
/// loaded store: identical `(term, position)` or `(id, position)` inputs
/// always produce identical outputs. Implementations must be safe for
/// concurrent reads.
pub trait Dictionary: Send + Sync {
    /// Looks up the identifier of `term` in the given identifier space.
    ///
    /// Returns `None` when the term is not present for that role. At the
    /// search layer this is a legitimate "zero matches" outcome, not an
    /// error.
    fn term_to_id(&self, term: &str, position: TermPosition) -> Option<TermId>;

    /// Resolves an identifier back to its term.
    ///
    /// # Errors
    ///
    /// Fails with `ErrorKind::InvalidIdentifier` when `id` is zero or out
    /// of range for `position`.
    fn id_to_term(&self, id: TermId, position: TermPosition) -> Result<String>;

    /// Resolves an identifier to the opaque byte encoding of its term.
    ///
    /// The returned bytes must be value-equivalent to the string form of
    /// the same logical term.
    fn id_to_bytes(&self, id: TermId, position: TermPosition) -> Result<Vec<u8>> {
        Ok(self.id_to_term(id, position)?.into_bytes())
    }

    /// Re-expresses an identifier in another role's identifier space.
    ///
    /// Returns `Ok(None)` when the term exists in `from` but not in `to`.
    /// The default implementation round-trips through the term string.
    ///
    /// # Errors
    ///
    /// Fails when `id` is invalid for `from`.
    fn translate_id(
        &self,
        id: TermId,
        from: TermPosition,
        to: TermPosition,
    ) -> Result<Option<TermId>> {
        if from == to {
            return Ok(Some(id));
        }
        let term = self.id_to_term(id, from)?;
        Ok(self.term_to_id(&term, to))
    }

    /// Number of terms in the shared subject-object section.
    fn num_shared(&self) -> u64;

    /// Number of distinct subject-only terms (shared terms excluded).
    fn num_subjects(&self) -> u64;

    /// Number of distinct predicates.
    fn num_predicates(&self) -> u64;

    /// Number of distinct object-only terms (shared terms excluded).
    fn num_objects(&self) -> u64;
}
