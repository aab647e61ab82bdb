//! Interval module
//!
//! This module provides the augmented interval tree that indexes every edge
//! interval of a temporal graph for half-open overlap queries.

/// Arena-backed AVL interval tree
pub mod tree;

// Re-export key types
pub use tree::{Interval, IntervalTree};
