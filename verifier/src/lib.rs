//! Release-candidate verifier for Apache project source distributions.
//!
//! This crate checks that a release candidate's published links are
//! reachable, fetches its source archive, checksum, and detached signature
//! into a local cache, and verifies the SHA-512 digest, the announcer's
//! OpenPGP signature, and the presence of top-level legal files. It is used
//! by the `sixer` CLI binary and can be driven programmatically.
//!
//! # Modules
//!
//! - [`artefact`] - Candidate naming, fetching, and content verification
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - Layered run configuration
//! - [`dirs`] - Platform directory lookup
//! - [`error`] - Crate-wide error type
//! - [`exec`] - External command execution with a timeout
//! - [`http`] - HTTP transport abstraction
//! - [`keys`] - Announcer public-key resolution
//! - [`logging`] - Log subscriber setup for the binary
//! - [`output`] - Report rendering
//! - [`pipeline`] - Verification run orchestration
//! - [`probe`] - Link reachability probes
//! - [`project`] - Known projects and their identities
//! - [`session`] - Per-run session configuration
//! - [`source_host`] - Source-host changelog and commit links

pub mod artefact;
pub mod cli;
pub mod config;
pub mod dirs;
pub mod error;
pub mod exec;
pub mod http;
pub mod keys;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod probe;
pub mod project;
pub mod session;
pub mod source_host;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
