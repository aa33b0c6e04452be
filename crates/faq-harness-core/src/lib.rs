//! # FAQ Harness Core
//!
//! Pure retrieval logic for FAQ Harness: corpus parsing, cross-language term
//! normalization, heuristic relevance scoring, and context assembly.
//!
//! This crate performs no I/O and holds no global state. The calling
//! application loads the corpus once, builds the tables, and passes them by
//! reference into [`assemble::assemble`] for every query.

pub mod assemble;
pub mod corpus;
pub mod models;
pub mod normalize;
pub mod score;
pub mod topics;
