//! Utility modules shared by the front end: error types and source
//! location tracking.

pub mod errors;
pub mod location;

// Re-exports
pub use errors::*;
pub use location::{SourceLocation, SourceMap, Span};
