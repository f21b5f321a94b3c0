//! Domain layer - error types shared by the range table and its loaders
//!
//! This layer contains no I/O. Only error definitions live here.

pub mod errors;

pub use errors::RangeTableError;
