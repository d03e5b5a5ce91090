//! Deduplicated waypoint nodes of one floor, gathered across trace files.

use crate::trace::TraceRecord;
use std::cmp::Ordering;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WaypointError {
    #[error("no waypoints found in {records} trace record(s)")]
    EmptyWaypointSet { records: usize },
}

/// Waypoint position stored at single precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaypointNode {
    pub x: f32,
    pub y: f32,
}

impl WaypointNode {
    pub fn new(x: f32, y: f32) -> Self {
        // -0.0 and 0.0 are the same node
        Self {
            x: x + 0.0,
            y: y + 0.0,
        }
    }

    fn lexicographic(&self, other: &Self) -> Ordering {
        self.x
            .total_cmp(&other.x)
            .then_with(|| self.y.total_cmp(&other.y))
    }
}

/// Unique waypoint nodes, sorted lexicographically by (x, y).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaypointSet {
    nodes: Vec<WaypointNode>,
}

impl WaypointSet {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[WaypointNode] {
        &self.nodes
    }

    pub fn iter(&self) -> impl Iterator<Item = &WaypointNode> {
        self.nodes.iter()
    }

    pub fn contains(&self, node: WaypointNode) -> bool {
        let node = WaypointNode::new(node.x, node.y);
        self.nodes
            .binary_search_by(|probe| probe.lexicographic(&node))
            .is_ok()
    }
}

impl FromIterator<WaypointNode> for WaypointSet {
    fn from_iter<I: IntoIterator<Item = WaypointNode>>(iter: I) -> Self {
        let mut nodes: Vec<WaypointNode> = iter
            .into_iter()
            .map(|node| WaypointNode::new(node.x, node.y))
            .collect();
        nodes.sort_by(WaypointNode::lexicographic);
        nodes.dedup();
        Self { nodes }
    }
}

/// Collect the waypoints of every record into one deduplicated set.
///
/// Non-finite positions cannot be graph nodes and are dropped. An empty
/// result is valid: floors recorded only with testing traces have none.
pub fn aggregate<'a, I>(records: I) -> WaypointSet
where
    I: IntoIterator<Item = &'a TraceRecord>,
{
    let mut record_count = 0;
    let mut sample_count = 0;
    let mut nodes = Vec::new();
    for record in records {
        record_count += 1;
        for sample in record.waypoint() {
            sample_count += 1;
            let node = WaypointNode::new(sample.value.x as f32, sample.value.y as f32);
            if node.x.is_finite() && node.y.is_finite() {
                nodes.push(node);
            } else {
                warn!(
                    file_id = record.file_id(),
                    timestamp = sample.timestamp,
                    "Dropping non-finite waypoint"
                );
            }
        }
    }

    let set: WaypointSet = nodes.into_iter().collect();
    debug!(
        records = record_count,
        samples = sample_count,
        unique = set.len(),
        "Waypoints aggregated"
    );
    set
}

/// Like [`aggregate`], but an empty result is an error.
pub fn aggregate_strict<'a, I>(records: I) -> Result<WaypointSet, WaypointError>
where
    I: IntoIterator<Item = &'a TraceRecord>,
{
    let records: Vec<&TraceRecord> = records.into_iter().collect();
    let set = aggregate(records.iter().copied());
    if set.is_empty() {
        return Err(WaypointError::EmptyWaypointSet {
            records: records.len(),
        });
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{DecodeError, decode_str};

    fn record(file_id: &str, waypoints: &[(f64, f64)]) -> Result<TraceRecord, DecodeError> {
        let text: String = waypoints
            .iter()
            .enumerate()
            .map(|(i, (x, y))| format!("{i}\tTYPE_WAYPOINT\t{x}\t{y}\n"))
            .collect();
        decode_str(&text, file_id)
    }

    #[test]
    fn duplicates_across_files_collapse() -> Result<(), DecodeError> {
        let a = record("a", &[(1.0, 1.0), (1.0, 1.0)])?;
        let b = record("b", &[(2.0, 2.0)])?;

        let set = aggregate([&a, &b]);

        assert_eq!(set.len(), 2);
        assert_eq!(
            set.nodes(),
            &[WaypointNode::new(1.0, 1.0), WaypointNode::new(2.0, 2.0)]
        );
        Ok(())
    }

    #[test]
    fn order_of_files_does_not_matter() -> Result<(), DecodeError> {
        let a = record("a", &[(5.5, 1.0), (0.25, 9.0)])?;
        let b = record("b", &[(0.25, 9.0), (3.0, -2.0)])?;

        assert_eq!(aggregate([&a, &b]), aggregate([&b, &a]));
        assert_eq!(aggregate([&a, &b]), aggregate([&a, &b, &a, &b]));
        Ok(())
    }

    #[test]
    fn values_equal_at_single_precision_are_one_node() -> Result<(), DecodeError> {
        let a = record("a", &[(0.1, 0.2), (0.100000001, 0.2)])?;
        let set = aggregate([&a]);
        assert_eq!(set.len(), 1);
        assert!(set.contains(WaypointNode::new(0.1, 0.2)));
        Ok(())
    }

    #[test]
    fn nodes_sort_lexicographically() {
        let set: WaypointSet = [
            WaypointNode::new(2.0, 0.0),
            WaypointNode::new(1.0, 5.0),
            WaypointNode::new(1.0, -5.0),
            WaypointNode::new(-0.0, 3.0),
            WaypointNode::new(0.0, 3.0),
        ]
        .into_iter()
        .collect();

        let xs: Vec<(f32, f32)> = set.iter().map(|n| (n.x, n.y)).collect();
        assert_eq!(xs, vec![(0.0, 3.0), (1.0, -5.0), (1.0, 5.0), (2.0, 0.0)]);
    }

    #[test]
    fn non_finite_waypoints_are_dropped() -> Result<(), DecodeError> {
        let a = record("a", &[(f64::NAN, 1.0), (1.0, f64::INFINITY), (4.0, 4.0)])?;
        let set = aggregate([&a]);
        assert_eq!(set.nodes(), &[WaypointNode::new(4.0, 4.0)]);
        Ok(())
    }

    #[test]
    fn empty_set_is_valid_unless_strict() -> Result<(), DecodeError> {
        let testing = decode_str("1\tTYPE_WIFI\ta\tb\t-50\n", "testing")?;

        assert!(aggregate([&testing]).is_empty());
        assert_eq!(
            aggregate_strict([&testing]),
            Err(WaypointError::EmptyWaypointSet { records: 1 })
        );
        Ok(())
    }

    #[test]
    fn strict_mode_passes_through_non_empty_set() -> Result<(), Box<dyn std::error::Error>> {
        let a = record("a", &[(1.0, 2.0)])?;
        let set = aggregate_strict([&a])?;
        assert_eq!(set.len(), 1);
        Ok(())
    }
}
