//! Cross-crate scenario tests.
//!
//! Everything here drives the public `rigscan-core` API. Fake transports live in
//! [`fakes`]; the loopback tests use the real TCP probers against 127.0.0.1.

#[cfg(test)]
mod fakes;
#[cfg(test)]
mod loopback;
#[cfg(test)]
mod scenarios;
