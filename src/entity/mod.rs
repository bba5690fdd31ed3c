//! Database entity models for staged-intake.
//!
//! This module contains the Sea-ORM entity definitions backing the three
//! stores of the workflow: the session registry, the short-lived staging
//! area and the durable submission table.

/// Session entity: one row per submission session, with lifecycle state.
pub mod session;

/// Staging entity: one row per (session, section) pair.
pub mod staging_entry;

/// Submission entity: committed, immutable submission records.
pub mod submission;
