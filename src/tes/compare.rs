//! Tree-similarity metrics over [`TesTree`] values.
//!
//! All three metrics only look at tree shape (children counts), never at the
//! TES payloads, so a derived tree can be compared directly against a
//! synthetic target tree described by (level, id, parent) rows.

use crate::tes::{TesTree, TesTreeNode};
use std::collections::BTreeMap;

impl TesTree {
    /// Exact match up to reordering of children: both trees must have equal
    /// depth and there must exist, node by node, a permutation of one side's
    /// children under which all paired subtrees match recursively.
    ///
    /// The permutation search is exhaustive and therefore factorial in the
    /// branching factor; it is only meant for the small trees that occur as
    /// differentiation hierarchies.
    pub fn matches(&self, other: &TesTree) -> bool {
        self.matches_to_depth(other, other.depth() + 1)
    }

    /// [`TesTree::matches`], with the recursive comparison stopping below
    /// `limit` levels.
    pub fn matches_to_depth(&self, other: &TesTree, limit: usize) -> bool {
        if self.depth() != other.depth() {
            return false;
        }
        nodes_match(self.root(), other.root(), 0, limit)
    }

    /// Minimum edit-like distance between the two trees: unmatched subtrees
    /// count their full node count, matched children are paired positionally
    /// under the permutation of `other`'s children that minimizes the total.
    /// Zero means the trees match exactly up to child order.
    pub fn distance(&self, other: &TesTree) -> usize {
        node_distance(self.root(), other.root())
    }

    /// Level-synchronous histogram distance: at every depth, compare the
    /// "children per node" histograms of both trees by L1 distance (keys
    /// missing on one side count in full) and sum over all depths.
    ///
    /// Cheaper than the paired metrics and insensitive to subtree
    /// arrangement.
    pub fn histogram_distance(&self, other: &TesTree) -> usize {
        let mut ours: Vec<&TesTreeNode> = vec![self.root()];
        let mut theirs: Vec<&TesTreeNode> = vec![other.root()];
        let mut distance = 0;
        while !(ours.is_empty() && theirs.is_empty()) {
            distance += histogram_level_distance(&ours, &theirs);
            ours = ours.iter().flat_map(|node| node.children()).collect();
            theirs = theirs.iter().flat_map(|node| node.children()).collect();
        }
        distance
    }
}

fn nodes_match(node: &TesTreeNode, other: &TesTreeNode, level: usize, limit: usize) -> bool {
    if level == limit {
        return true;
    }
    if node.child_count() != other.child_count() {
        return false;
    }
    if node.child_count() == 0 {
        return true;
    }

    let mut permutation: Vec<usize> = (0..other.child_count()).collect();
    loop {
        let all_match = node
            .children()
            .iter()
            .zip(permutation.iter().map(|&position| &other.children()[position]))
            .all(|(child, other_child)| nodes_match(child, other_child, level + 1, limit));
        if all_match {
            return true;
        }
        if !next_permutation(&mut permutation) {
            return false;
        }
    }
}

fn node_distance(node: &TesTreeNode, other: &TesTreeNode) -> usize {
    // A childless side contributes the whole other subtree.
    if node.child_count() == 0 && other.child_count() == 0 {
        return 0;
    }
    if node.child_count() == 0 {
        return other.descendant_count();
    }
    if other.child_count() == 0 {
        return node.descendant_count();
    }

    let paired = node.child_count().min(other.child_count());
    let mut permutation: Vec<usize> = (0..other.child_count()).collect();
    let mut best: Option<usize> = None;
    loop {
        let mut total = 0;
        for position in 0..paired {
            total += node_distance(
                &node.children()[position],
                &other.children()[permutation[position]],
            );
        }
        // Surplus children on either side cost themselves plus their
        // subtree.
        for child in &node.children()[paired..] {
            total += 1 + child.descendant_count();
        }
        for &position in &permutation[paired..] {
            total += 1 + other.children()[position].descendant_count();
        }
        best = Some(best.map_or(total, |current| current.min(total)));
        if !next_permutation(&mut permutation) {
            break;
        }
    }
    best.unwrap_or(0)
}

fn histogram_level_distance(ours: &[&TesTreeNode], theirs: &[&TesTreeNode]) -> usize {
    let our_histogram = child_count_histogram(ours);
    let their_histogram = child_count_histogram(theirs);
    let mut distance = 0;
    for (key, &count) in &our_histogram {
        distance += count.abs_diff(their_histogram.get(key).copied().unwrap_or(0));
    }
    for (key, &count) in &their_histogram {
        if !our_histogram.contains_key(key) {
            distance += count;
        }
    }
    distance
}

fn child_count_histogram(nodes: &[&TesTreeNode]) -> BTreeMap<usize, usize> {
    let mut histogram = BTreeMap::new();
    for node in nodes {
        *histogram.entry(node.child_count()).or_insert(0) += 1;
    }
    histogram
}

/// Advance `permutation` to its lexicographic successor in place; returns
/// `false` once the last permutation has been reached.
pub(crate) fn next_permutation(permutation: &mut [usize]) -> bool {
    if permutation.len() < 2 {
        return false;
    }
    let mut pivot = permutation.len() - 1;
    while pivot > 0 && permutation[pivot - 1] >= permutation[pivot] {
        pivot -= 1;
    }
    if pivot == 0 {
        return false;
    }
    let mut swap = permutation.len() - 1;
    while permutation[swap] <= permutation[pivot - 1] {
        swap -= 1;
    }
    permutation.swap(pivot - 1, swap);
    permutation[pivot..].reverse();
    true
}
