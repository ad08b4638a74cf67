//! Request middleware.
//!
//! Purpose: middleware components for request lifecycle concerns such as
//! trace-id propagation.

pub mod trace;

pub use trace::Trace;
