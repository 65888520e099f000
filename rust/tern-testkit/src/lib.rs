//! Test utilities and helpers for the tern project.
//!
//! This crate provides synthetic RDF graph generation and temp-file
//! fixtures used by the store and query test suites. It is only intended
//! as a dev-dependency within this workspace.

pub mod data_gen;
