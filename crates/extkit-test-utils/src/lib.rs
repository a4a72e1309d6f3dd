//! Shared test fixtures for the extkit workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`git`] for committing a fixture tree into a real repository
//! - [`remote`] for [`RemoteFixture`], a directory shaped like the remote
//!   extension repository

pub mod git;
pub mod remote;

pub use remote::{RemoteFixture, minimal_manifest};
