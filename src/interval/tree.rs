//! Augmented AVL interval tree over half-open `[begin, end)` intervals
//!
//! Nodes live in a flat arena and reference their children by index. Each node
//! carries the maximum `end` of its subtree, which lets overlap queries prune
//! whole subtrees that finish before the query window starts.

use std::cmp::Ordering;

use crate::error::check_interval;
use crate::{Error, Result, Timestamp};

/// A stored interval with its ordering key and payload
#[derive(Debug, Clone, PartialEq)]
pub struct Interval<K, V> {
    /// Interval start (inclusive)
    pub begin: Timestamp,
    /// Interval end (exclusive)
    pub end: Timestamp,
    /// Identity key, ordered after `(begin, end)`
    pub key: K,
    /// Attached payload
    pub value: V,
}

impl<K: Ord, V> Interval<K, V> {
    /// Whether this interval intersects `[begin, end)`
    pub fn overlaps(&self, begin: Timestamp, end: Timestamp) -> bool {
        self.begin < end && self.end > begin
    }

    fn cmp_key(&self, begin: Timestamp, end: Timestamp, key: &K) -> Ordering {
        (self.begin, self.end, &self.key).cmp(&(begin, end, key))
    }
}

#[derive(Debug, Clone)]
struct Node<K, V> {
    interval: Interval<K, V>,
    /// Largest `end` in this subtree
    max_end: Timestamp,
    height: i32,
    left: Option<usize>,
    right: Option<usize>,
}

/// Balanced interval tree keyed by `(begin, end, key)`
#[derive(Debug, Clone)]
pub struct IntervalTree<K, V> {
    nodes: Vec<Node<K, V>>,
    root: Option<usize>,
}

impl<K, V> Default for IntervalTree<K, V> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
        }
    }
}

impl<K: Ord, V> IntervalTree<K, V> {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty tree with room for `capacity` intervals
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            root: None,
        }
    }

    /// Number of stored intervals
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Height of the tree (0 when empty)
    pub fn height(&self) -> i32 {
        self.height_of(self.root)
    }

    /// Insert an interval.
    ///
    /// Re-adding an existing `(begin, end, key)` replaces its payload and leaves
    /// the size unchanged.
    pub fn add(&mut self, begin: Timestamp, end: Timestamp, key: K, value: V) -> Result<()> {
        check_interval(begin, end)?;
        let interval = Interval {
            begin,
            end,
            key,
            value,
        };
        let root = self.root;
        self.root = Some(self.insert_node(root, interval));
        Ok(())
    }

    /// Whether the exact interval `(begin, end, key)` is stored
    pub fn contains(&self, begin: Timestamp, end: Timestamp, key: &K) -> bool {
        self.find(begin, end, key).is_some()
    }

    /// Payload of the exact interval `(begin, end, key)`
    pub fn get(&self, begin: Timestamp, end: Timestamp, key: &K) -> Option<&V> {
        self.find(begin, end, key)
            .map(|idx| &self.nodes[idx].interval.value)
    }

    /// Every interval intersecting `[begin, end)`, in `(begin, end, key)` order.
    ///
    /// An empty or inverted window matches nothing.
    pub fn query_overlap(&self, begin: Timestamp, end: Timestamp) -> Vec<&Interval<K, V>> {
        let mut result = Vec::new();
        if begin < end {
            self.collect_overlapping(self.root, begin, end, &mut result);
        }
        result
    }

    /// `(min begin, max end)` across all intervals
    pub fn bounds(&self) -> Option<(Timestamp, Timestamp)> {
        let root = self.root?;
        let mut idx = root;
        while let Some(left) = self.nodes[idx].left {
            idx = left;
        }
        Some((self.nodes[idx].interval.begin, self.nodes[root].max_end))
    }

    /// All intervals in `(begin, end, key)` order
    pub fn iter(&self) -> impl Iterator<Item = &Interval<K, V>> + '_ {
        let mut ordered = Vec::with_capacity(self.nodes.len());
        self.collect_inorder(self.root, &mut ordered);
        ordered.into_iter()
    }

    /// Check ordering, balance and the `max_end` augmentation
    pub fn validate(&self) -> Result<()> {
        let mut previous: Option<&Interval<K, V>> = None;
        for interval in self.iter() {
            if let Some(prev) = previous {
                if prev.cmp_key(interval.begin, interval.end, &interval.key) != Ordering::Less {
                    return Err(Error::InvalidArgument("interval tree out of order".to_string()));
                }
            }
            previous = Some(interval);
        }
        self.validate_node(self.root).map(|_| ())
    }

    fn validate_node(&self, idx: Option<usize>) -> Result<(i32, Timestamp)> {
        let Some(idx) = idx else {
            return Ok((0, Timestamp::MIN));
        };
        let node = &self.nodes[idx];
        let (lh, lmax) = self.validate_node(node.left)?;
        let (rh, rmax) = self.validate_node(node.right)?;

        if (lh - rh).abs() > 1 || node.height != 1 + lh.max(rh) {
            return Err(Error::InvalidArgument("interval tree unbalanced".to_string()));
        }
        let max_end = node.interval.end.max(lmax).max(rmax);
        if node.max_end != max_end {
            return Err(Error::InvalidArgument("stale subtree max end".to_string()));
        }
        Ok((node.height, max_end))
    }

    fn find(&self, begin: Timestamp, end: Timestamp, key: &K) -> Option<usize> {
        let mut cursor = self.root;
        while let Some(idx) = cursor {
            let node = &self.nodes[idx];
            cursor = match node.interval.cmp_key(begin, end, key) {
                Ordering::Equal => return Some(idx),
                Ordering::Greater => node.left,
                Ordering::Less => node.right,
            };
        }
        None
    }

    fn collect_overlapping<'a>(
        &'a self,
        idx: Option<usize>,
        begin: Timestamp,
        end: Timestamp,
        result: &mut Vec<&'a Interval<K, V>>,
    ) {
        let Some(idx) = idx else {
            return;
        };
        let node = &self.nodes[idx];

        // Nothing in this subtree ends after the window starts
        if node.max_end <= begin {
            return;
        }

        self.collect_overlapping(node.left, begin, end, result);

        if node.interval.overlaps(begin, end) {
            result.push(&node.interval);
        }

        // Right subtree only holds intervals starting at or after this one
        if node.interval.begin < end {
            self.collect_overlapping(node.right, begin, end, result);
        }
    }

    fn collect_inorder<'a>(&'a self, idx: Option<usize>, result: &mut Vec<&'a Interval<K, V>>) {
        if let Some(idx) = idx {
            let node = &self.nodes[idx];
            self.collect_inorder(node.left, result);
            result.push(&node.interval);
            self.collect_inorder(node.right, result);
        }
    }

    /// Insert below `slot`, returning the index of the new subtree root
    fn insert_node(&mut self, slot: Option<usize>, interval: Interval<K, V>) -> usize {
        let Some(idx) = slot else {
            self.nodes.push(Node {
                max_end: interval.end,
                interval,
                height: 1,
                left: None,
                right: None,
            });
            return self.nodes.len() - 1;
        };

        let ordering = self.nodes[idx]
            .interval
            .cmp_key(interval.begin, interval.end, &interval.key);
        match ordering {
            Ordering::Greater => {
                let left = self.nodes[idx].left;
                let child = self.insert_node(left, interval);
                self.nodes[idx].left = Some(child);
            }
            Ordering::Less => {
                let right = self.nodes[idx].right;
                let child = self.insert_node(right, interval);
                self.nodes[idx].right = Some(child);
            }
            Ordering::Equal => {
                self.nodes[idx].interval.value = interval.value;
                return idx;
            }
        }
        self.rebalance(idx)
    }

    fn height_of(&self, idx: Option<usize>) -> i32 {
        idx.map_or(0, |i| self.nodes[i].height)
    }

    fn max_end_of(&self, idx: Option<usize>) -> Timestamp {
        idx.map_or(Timestamp::MIN, |i| self.nodes[i].max_end)
    }

    fn update(&mut self, idx: usize) {
        let (left, right) = (self.nodes[idx].left, self.nodes[idx].right);
        let height = 1 + self.height_of(left).max(self.height_of(right));
        let max_end = self.nodes[idx]
            .interval
            .end
            .max(self.max_end_of(left))
            .max(self.max_end_of(right));
        let node = &mut self.nodes[idx];
        node.height = height;
        node.max_end = max_end;
    }

    fn balance_factor(&self, idx: usize) -> i32 {
        self.height_of(self.nodes[idx].left) - self.height_of(self.nodes[idx].right)
    }

    fn rotate_right(&mut self, idx: usize) -> usize {
        let Some(pivot) = self.nodes[idx].left else {
            return idx;
        };
        self.nodes[idx].left = self.nodes[pivot].right;
        self.nodes[pivot].right = Some(idx);
        self.update(idx);
        self.update(pivot);
        pivot
    }

    fn rotate_left(&mut self, idx: usize) -> usize {
        let Some(pivot) = self.nodes[idx].right else {
            return idx;
        };
        self.nodes[idx].right = self.nodes[pivot].left;
        self.nodes[pivot].left = Some(idx);
        self.update(idx);
        self.update(pivot);
        pivot
    }

    fn rebalance(&mut self, idx: usize) -> usize {
        self.update(idx);
        let balance = self.balance_factor(idx);

        if balance > 1 {
            if let Some(left) = self.nodes[idx].left {
                if self.balance_factor(left) < 0 {
                    let rotated = self.rotate_left(left);
                    self.nodes[idx].left = Some(rotated);
                }
            }
            return self.rotate_right(idx);
        }

        if balance < -1 {
            if let Some(right) = self.nodes[idx].right {
                if self.balance_factor(right) > 0 {
                    let rotated = self.rotate_right(right);
                    self.nodes[idx].right = Some(rotated);
                }
            }
            return self.rotate_left(idx);
        }

        idx
    }
}
