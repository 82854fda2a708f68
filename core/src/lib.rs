//! # rigscan core
//!
//! Probing and orchestration.
//!
//! * [`probe`]: the transport contracts the orchestrator is written against.
//! * [`network`]: the real transports (TCP connect, TCP handshake, ICMP echo).
//! * [`scanner`]: the phased, bounded-concurrency [`scanner::Scanner`].
//! * [`service`]: runs a scan and hands the results to lookup and persistence.
//! * [`lookup`]: host lookups, among them reverse DNS.

pub mod lookup;
pub mod network;
pub mod probe;
pub mod repository;
pub mod scanner;
pub mod service;
