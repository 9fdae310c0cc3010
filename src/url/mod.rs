//! URL handling module for linkcheck
//!
//! Canonicalizes URLs into the form used for duplicate suppression: two
//! links that normalize to the same string refer to the same resource and
//! are fetched at most once per run.

mod normalize;

pub use normalize::normalize;
