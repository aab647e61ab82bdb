//! IntervalGraph: interval-indexed temporal graphs
//!
//! This crate stores undirected edges that only exist during a half-open time
//! interval `[begin, end)` and derives two views from them:
//!
//! - a static graph for any time window ([`TemporalGraph::extract_view`])
//! - a run-length compressed sequence of static graphs for discretized time
//!   steps ([`SnapshotSequence`]), with lazy ranged access ([`RangeCursor`])
//!
//! ```
//! use intervalgraph::{Attrs, StaticGraph, TemporalGraph, ViewOptions};
//!
//! let mut graph = TemporalGraph::new();
//! graph.add_edge(1, 2, 0, 5, Attrs::new()).unwrap();
//! graph.add_edge(2, 3, 3, 8, Attrs::new()).unwrap();
//!
//! let view: StaticGraph<i32> = graph.extract_view(0, 4, &ViewOptions::default()).unwrap();
//! assert!(view.has_edge(&1, &2));
//! assert!(view.has_edge(&2, &3));
//! ```

#![warn(missing_docs)]

/// Edge and node attribute values
pub mod attrs;

/// Lazy cursors over snapshot sequences
pub mod cursor;

/// Plain-text edge list ingestion
pub mod edgelist;

/// Temporal graph store
pub mod graph;

/// Augmented interval tree
pub mod interval;

/// Run-length compressed snapshot sequences
pub mod snapshot;

/// Static views and the window-to-view builder
pub mod view;

// Re-exports
pub use attrs::{AttrValue, Attrs, SharedAttrs};
pub use config::{EdgeListConfig, ViewOptions};
pub use cursor::RangeCursor;
pub use error::{Error, Result};
pub use graph::{EdgeKey, EdgeRecord, NodeId, Snapshots, TemporalGraph};
pub use interval::{Interval, IntervalTree};
pub use snapshot::{Run, SnapshotSequence};
pub use view::{StaticGraph, StaticView, build_view};

/// Time unit used for every interval bound
pub type Timestamp = i64;

/// Error types for interval graph operations
pub mod error {
    use crate::Timestamp;
    use std::io;

    /// Error types that can occur in interval graph operations
    #[derive(Debug, thiserror::Error)]
    pub enum Error {
        /// An edge or query window with `begin >= end`
        #[error("invalid interval: begin {begin} must be strictly less than end {end}")]
        InvalidInterval {
            /// Interval start
            begin: Timestamp,
            /// Interval end
            end: Timestamp,
        },

        /// An argument outside the accepted domain
        #[error("invalid argument: {0}")]
        InvalidArgument(String),

        /// A logical snapshot index outside the sequence
        #[error("index {index} out of range for sequence of length {len}")]
        IndexOutOfRange {
            /// Requested index
            index: i64,
            /// Sequence length at the time of the call
            len: usize,
        },

        /// A raw ingestion field that could not be coerced
        #[error("line {line}: cannot convert field {field:?}")]
        TypeConversion {
            /// 1-based source line
            line: usize,
            /// Offending raw field
            field: String,
        },

        /// A per-snapshot argument list with the wrong number of entries
        #[error("expected {expected} entries, got {actual}")]
        SizeMismatch {
            /// Expected count
            expected: usize,
            /// Supplied count
            actual: usize,
        },

        /// An I/O error occurred
        #[error("I/O error: {0}")]
        Io(#[from] io::Error),
    }

    /// Result alias for interval graph operations
    pub type Result<T> = std::result::Result<T, Error>;

    /// Reject empty and inverted intervals
    pub(crate) fn check_interval(begin: Timestamp, end: Timestamp) -> Result<()> {
        if begin >= end {
            return Err(Error::InvalidInterval { begin, end });
        }
        Ok(())
    }
}

/// Configuration options
pub mod config {
    /// Options controlling what a window extraction copies into the view
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct ViewOptions {
        /// Copy stored edge attributes onto view edges
        pub edge_attrs: bool,
        /// Record each interval's bounds as edge attributes
        pub interval_attrs: bool,
        /// Copy stored node attributes onto view nodes
        pub node_attrs: bool,
        /// Attribute key receiving the interval begin
        pub begin_key: String,
        /// Attribute key receiving the interval end
        pub end_key: String,
    }

    impl Default for ViewOptions {
        fn default() -> Self {
            Self {
                edge_attrs: false,
                interval_attrs: false,
                node_attrs: false,
                begin_key: "begin".to_string(),
                end_key: "end".to_string(),
            }
        }
    }

    impl ViewOptions {
        /// Enable or disable edge attributes
        pub fn with_edge_attrs(mut self, enabled: bool) -> Self {
            self.edge_attrs = enabled;
            self
        }

        /// Enable or disable interval bound attributes
        pub fn with_interval_attrs(mut self, enabled: bool) -> Self {
            self.interval_attrs = enabled;
            self
        }

        /// Enable or disable node attributes
        pub fn with_node_attrs(mut self, enabled: bool) -> Self {
            self.node_attrs = enabled;
            self
        }

        /// Rename the interval bound attribute keys
        pub fn with_interval_keys(mut self, begin_key: &str, end_key: &str) -> Self {
            self.begin_key = begin_key.to_string();
            self.end_key = end_key.to_string();
            self
        }
    }

    /// Configuration for the edge list reader
    #[derive(Debug, Clone)]
    pub struct EdgeListConfig {
        /// Lines starting with this prefix are skipped
        pub comment_prefix: String,
        /// Field separator; `None` splits on any whitespace
        pub delimiter: Option<char>,
        /// Accept RFC 3339 datetimes in the begin/end columns
        pub parse_datetimes: bool,
    }

    impl Default for EdgeListConfig {
        fn default() -> Self {
            Self {
                comment_prefix: "#".to_string(),
                delimiter: None,
                parse_datetimes: false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_interval() {
        assert!(error::check_interval(0, 1).is_ok());
        assert!(matches!(
            error::check_interval(3, 3),
            Err(Error::InvalidInterval { begin: 3, end: 3 })
        ));
        assert!(error::check_interval(5, 2).is_err());
    }

    #[test]
    fn test_view_options_builder() {
        let opts = ViewOptions::default()
            .with_edge_attrs(true)
            .with_interval_attrs(true)
            .with_interval_keys("start", "stop");

        assert!(opts.edge_attrs);
        assert!(opts.interval_attrs);
        assert!(!opts.node_attrs);
        assert_eq!(opts.begin_key, "start");
        assert_eq!(opts.end_key, "stop");
    }
}
