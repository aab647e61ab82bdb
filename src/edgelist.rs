//! Plain-text edge list ingestion
//!
//! Each data line reads `u v begin end [key=value ...]`. Blank lines and
//! lines starting with the configured comment prefix are skipped.

use std::fs::File;
use std::io::BufRead;
use std::path::Path;

use chrono::DateTime;
use memmap2::Mmap;
use tracing::{debug, warn};

use crate::attrs::{AttrValue, Attrs};
use crate::config::EdgeListConfig;
use crate::graph::TemporalGraph;
use crate::{Error, Result, Timestamp};

/// One parsed edge list line
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeLine {
    /// First endpoint
    pub u: String,
    /// Second endpoint
    pub v: String,
    /// Interval start
    pub begin: Timestamp,
    /// Interval end
    pub end: Timestamp,
    /// Trailing `key=value` attributes
    pub attrs: Attrs,
}

fn parse_time(raw: &str, line: usize, config: &EdgeListConfig) -> Result<Timestamp> {
    if let Ok(t) = raw.parse::<Timestamp>() {
        return Ok(t);
    }
    if config.parse_datetimes {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Ok(dt.timestamp());
        }
    }
    Err(Error::TypeConversion {
        line,
        field: raw.to_string(),
    })
}

/// Parse a single line; `Ok(None)` for blank and comment lines
pub fn parse_line(text: &str, line: usize, config: &EdgeListConfig) -> Result<Option<EdgeLine>> {
    let text = text.trim();
    if text.is_empty() || text.starts_with(config.comment_prefix.as_str()) {
        return Ok(None);
    }

    let fields: Vec<&str> = match config.delimiter {
        Some(d) => text.split(d).map(str::trim).filter(|f| !f.is_empty()).collect(),
        None => text.split_whitespace().collect(),
    };
    let [u, v, begin, end, rest @ ..] = fields.as_slice() else {
        return Err(Error::TypeConversion {
            line,
            field: text.to_string(),
        });
    };

    let mut attrs = Attrs::new();
    for field in rest {
        let Some((key, value)) = field.split_once('=') else {
            return Err(Error::TypeConversion {
                line,
                field: field.to_string(),
            });
        };
        attrs.insert(key.to_string(), AttrValue::parse(value));
    }

    Ok(Some(EdgeLine {
        u: u.to_string(),
        v: v.to_string(),
        begin: parse_time(begin, line, config)?,
        end: parse_time(end, line, config)?,
        attrs,
    }))
}

/// Parse every data line of `reader`
pub fn parse_edgelist<R: BufRead>(reader: R, config: &EdgeListConfig) -> Result<Vec<EdgeLine>> {
    let mut edges = Vec::new();
    for (i, text) in reader.lines().enumerate() {
        if let Some(edge) = parse_line(&text?, i + 1, config)? {
            edges.push(edge);
        }
    }
    Ok(edges)
}

/// Parse `reader` and add every edge to `graph`, returning the number of lines added.
///
/// Parsing finishes before the first insertion, so a malformed line leaves
/// `graph` untouched.
pub fn load_edgelist<R: BufRead>(graph: &mut TemporalGraph<String>, reader: R, config: &EdgeListConfig) -> Result<usize> {
    let edges = parse_edgelist(reader, config)?;
    for (i, edge) in edges.iter().enumerate() {
        if edge.begin >= edge.end {
            warn!(index = i, begin = edge.begin, end = edge.end, "rejecting empty edge interval");
            return Err(Error::InvalidInterval {
                begin: edge.begin,
                end: edge.end,
            });
        }
    }

    let count = edges.len();
    for edge in edges {
        graph.add_edge(edge.u, edge.v, edge.begin, edge.end, edge.attrs)?;
    }
    debug!(edges = count, "loaded edge list");
    Ok(count)
}

/// Read an edge list file into a new temporal graph.
///
/// The file is memory mapped rather than streamed through a buffer.
pub fn read_edgelist<P: AsRef<Path>>(path: P, config: &EdgeListConfig) -> Result<TemporalGraph<String>> {
    let file = File::open(path.as_ref())?;
    let mut graph = TemporalGraph::new();
    if file.metadata()?.len() == 0 {
        return Ok(graph);
    }

    // Safety: the map is read-only and dropped before this function returns
    let map = unsafe { Mmap::map(&file)? };
    load_edgelist(&mut graph, &map[..], config)?;
    Ok(graph)
}
