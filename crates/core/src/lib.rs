//! Pure domain logic for the payflow worker.
//!
//! This crate has no async code and no internal dependencies. It provides:
//!
//! - [`variables`] — the copy-on-write variable bag attached to a leased job.
//! - [`channel`] — typed schemas for structured job variables.
//! - [`validation`] — the transaction payload validation algorithm.
//! - [`error_codes`] — the transfer error-code table used for observability.
//! - [`variable_names`] — canonical names of well-known workflow variables.

pub mod channel;
pub mod error_codes;
pub mod validation;
pub mod variable_names;
pub mod variables;

pub use variables::{VariableContext, VariableMap};
