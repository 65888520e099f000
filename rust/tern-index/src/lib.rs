//! Core index infrastructure for the tern triple store.
//!
//! This crate defines the data model shared by every tern-* crate (term
//! identifiers, identifier-triples, patterns, size hints, result windows)
//! together with the two collaborator traits the query layer is written
//! against:
//!
//! - [`Dictionary`]: bidirectional mapping between RDF terms and dense
//!   integer identifiers, partitioned by role.
//! - [`TripleIndex`]: ordered, windowed streams of identifier-triples
//!   matching a pattern, with a cardinality hint.
//!
//! Storage engines implement both traits; the query layer never assumes a
//! concrete on-disk layout.

pub mod dictionary;
pub mod index;
pub mod model;

pub use dictionary::Dictionary;
pub use index::{IdTripleStream, TripleIndex};
pub use model::{IdPattern, IdTriple, SizeHint, TermId, TermPosition, UNBOUND, Window};
