//! Shared foundational types used across the Sinew fabric router.
//!
//! This crate provides interned identifiers for fabric names and the common
//! result type used to report internal (programmer) errors.

#![warn(missing_docs)]

pub mod ident;
pub mod result;

pub use ident::{Ident, Interner};
pub use result::{InternalError, SinewResult};
