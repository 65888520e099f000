//! The bundled storage engine for tern: a four-section term dictionary and
//! an SPO-ordered triple table behind a checksummed, compressed binary
//! file format.
//!
//! The query layer (`tern-query`) is written against the `Dictionary` and
//! `TripleIndex` traits of `tern-index`; [`TripleStore`] is the engine this
//! workspace ships. It keeps everything in memory: the dictionary sections
//! and the triple table are decoded eagerly at load time, with optional
//! auxiliary orderings for predicate- and object-bound patterns.
//!
//! Stores are immutable once written. They are built either from an
//! N-Triples document ([`ntriples::build_store`]) or programmatically via
//! [`TripleStore::from_triples`].

pub mod dictionary;
pub mod format;
pub mod ntriples;
pub mod store;
pub mod table;

pub use dictionary::TermDictionary;
pub use store::{OpenOptions, TripleStore};
pub use table::TripleTable;
