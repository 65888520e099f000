//! Value representation strategies for pattern iterators.
//!
//! One windowing engine serves three representations of the same logical
//! result: human-readable term strings, raw dictionary identifiers, and
//! the opaque byte encoding. A [`Representation`] only decides how an
//! identifier-triple pulled from the index is decoded at the boundary;
//! the three variants are required to be value-equivalent for the same
//! logical term.

use tern_common::Result;
use tern_index::{Dictionary, IdTriple, TermPosition};

/// A fact as term strings, in (subject, predicate, object) order.
pub type StringTriple = [String; 3];

/// A fact as byte-encoded terms, in (subject, predicate, object) order.
pub type BytesTriple = [Vec<u8>; 3];

/// Decoding strategy applied to each identifier-triple at the iterator
/// boundary.
pub trait Representation {
    type Value: Clone;

    /// Decodes one identifier-triple.
    ///
    /// Fails only when an identifier produced by the stream does not
    /// resolve in the dictionary; the caller escalates that to a corrupt
    /// store condition.
    fn decode(dict: &dyn Dictionary, triple: IdTriple) -> Result<Self::Value>;
}

/// Term-string representation.
pub struct Terms;

impl Representation for Terms {
    type Value = StringTriple;

    fn decode(dict: &dyn Dictionary, triple: IdTriple) -> Result<StringTriple> {
        Ok([
            dict.id_to_term(triple.subject, TermPosition::Subject)?,
            dict.id_to_term(triple.predicate, TermPosition::Predicate)?,
            dict.id_to_term(triple.object, TermPosition::Object)?,
        ])
    }
}

/// Raw identifier representation; decoding is the identity.
pub struct Ids;

impl Representation for Ids {
    type Value = IdTriple;

    fn decode(_dict: &dyn Dictionary, triple: IdTriple) -> Result<IdTriple> {
        Ok(triple)
    }
}

/// Byte-encoded representation.
pub struct Bytes;

impl Representation for Bytes {
    type Value = BytesTriple;

    fn decode(dict: &dyn Dictionary, triple: IdTriple) -> Result<BytesTriple> {
        Ok([
            dict.id_to_bytes(triple.subject, TermPosition::Subject)?,
            dict.id_to_bytes(triple.predicate, TermPosition::Predicate)?,
            dict.id_to_bytes(triple.object, TermPosition::Object)?,
        ])
    }
}
