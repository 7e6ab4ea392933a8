//! tr-core: stable foundation for tiltring.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - error (shared error types)

pub mod error;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use error::{TrError, TrResult};
pub use numeric::*;
