//! Release-candidate artefacts: naming, retrieval, and verification.
//!
//! # Sub-modules
//!
//! - [`candidate`] - Candidate identity and derived dist names (`Candidate`).
//! - [`fetch`] - Idempotent download into the local cache (`Fetcher`).
//! - [`checksum`] - SHA-512 checksum verification.
//! - [`signature`] - OpenPGP detached-signature verification.
//! - [`archive`] - Top-level `LICENSE`/`NOTICE` inspection.

pub mod archive;
pub mod candidate;
pub mod checksum;
pub mod fetch;
pub mod signature;
