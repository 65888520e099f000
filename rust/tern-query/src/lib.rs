//! Query evaluation over a read-only triple store.
//!
//! This crate is the query core of tern. It turns triple patterns into
//! lazy, resumable cursors over matching facts and composes several such
//! cursors into conjunctive joins:
//!
//! - [`PatternIter`]: one windowing/peek/limit engine, generic over the
//!   value representation ([`repr::Terms`], [`repr::Ids`],
//!   [`repr::Bytes`]) so the three public iterator variants behave
//!   identically.
//! - [`JoinIterator`]: left-deep nested-loop evaluation of several
//!   patterns sharing named variables, with duplicate suppression.
//! - [`Document`]: the facade owning one dictionary + index pair, exposing
//!   search, join construction, term/identifier conversion and statistics.
//!
//! The crate is written against the collaborator traits of `tern-index`
//! and never assumes a concrete storage layout; `tern-store` supplies the
//! bundled engine behind [`Document::open`].

pub mod document;
pub mod iter;
pub mod join;
pub mod pattern;
pub mod repr;

pub use document::Document;
pub use iter::{PatternIter, TripleBytesIterator, TripleIdIterator, TripleIterator};
pub use join::{Binding, JoinIterator, JoinTerm, Solution};
pub use pattern::TriplePattern;
pub use repr::{Bytes, BytesTriple, Ids, Representation, StringTriple, Terms};
