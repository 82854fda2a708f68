//! # rigscan common
//!
//! Shared models and pure logic for the scanner:
//!
//! * [`network`]: target expressions, IPv4 ranges, local networks, scan results and
//!   the port catalog.
//! * [`config`]: runtime configuration and the immutable [`config::ScanConfiguration`].
//! * [`error`]: the error taxonomy surfaced by a scan run.
//! * [`scan`]: lifecycle types shared between the orchestrator and its callers.
//! * [`lookup`] / [`repository`]: collaborator contracts consumed by the core.

pub mod config;
pub mod error;
pub mod log;
pub mod lookup;
pub mod network;
pub mod repository;
pub mod scan;
