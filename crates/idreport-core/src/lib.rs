//! # idreport-core: Foundational Types
//!
//! Leaf crate of the identification report stack. Every other crate in the
//! workspace depends on `idreport-core`; it depends on nothing internal.
//!
//! ## Contents
//!
//! 1. **Error taxonomy.** [`ErrorKind`] names the four kinds of failure the
//!    stack distinguishes (configuration, cryptographic, validation, parse).
//!    [`CryptoError`] and [`ParseError`] are shared by the crypto and report
//!    crates; every error type in the workspace reports its kind through a
//!    `kind()` method.
//!
//! 2. **Millisecond timestamps.** [`Timestamp`] is UTC-only and truncated to
//!    millisecond precision, which is the precision identification reports
//!    carry on the wire.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `idreport-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod temporal;

pub use error::{CryptoError, ErrorKind, ParseError};
pub use temporal::Timestamp;
