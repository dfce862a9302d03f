//! ROLEFORGE: consolidated role-registry tooling.
//!
//! Merges per-domain IIQ role files into a single consolidated index,
//! validates the index against a JSON schema, and enforces identity
//! uniqueness (AD CN + display name) across the merged set.

pub mod cli;
pub mod registry;
