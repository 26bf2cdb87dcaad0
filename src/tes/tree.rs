use crate::attractor::AttractorId;
use crate::tes::Tes;
use log::debug;
use std::fmt::{Display, Formatter};

/// Structural failures raised while building or extending a TES tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TesTreeError {
    /// The root threshold did not reduce the attractors to a single
    /// surviving cluster.
    NotATree { clusters: usize },
    /// A node listing did not start with a root row at level zero.
    MissingRoot,
    /// The parent referenced by a manually added node does not exist.
    NodeNotFound { level: usize, id: usize },
    /// A tree cannot be built from an empty threshold sequence.
    EmptyDeltas,
}

impl Display for TesTreeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TesTreeError::NotATree { clusters } => {
                write!(
                    f,
                    "The root threshold produces {clusters} clusters instead of one"
                )
            }
            TesTreeError::MissingRoot => {
                write!(f, "The node listing must start with a level-zero root")
            }
            TesTreeError::NodeNotFound { level, id } => {
                write!(f, "Parent node {id} not found at level {level}")
            }
            TesTreeError::EmptyDeltas => {
                write!(f, "The threshold sequence must contain at least one value")
            }
        }
    }
}

impl std::error::Error for TesTreeError {}

/// A node of a [`TesTree`]: an optional TES payload (synthetic nodes of
/// externally described trees carry none), an id, and the owned children.
///
/// Node identity is positional: a node is addressed by its depth and id, not
/// by its payload.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TesTreeNode {
    id: usize,
    tes: Option<Tes>,
    children: Vec<TesTreeNode>,
}

impl TesTreeNode {
    fn new(id: usize, tes: Option<Tes>) -> TesTreeNode {
        TesTreeNode {
            id,
            tes,
            children: Vec::new(),
        }
    }

    /// The id of this node (unique within its tree).
    pub fn id(&self) -> usize {
        self.id
    }

    /// The TES payload, if the node has one.
    pub fn tes(&self) -> Option<&Tes> {
        self.tes.as_ref()
    }

    /// The children of this node, in creation order.
    pub fn children(&self) -> &[TesTreeNode] {
        &self.children
    }

    /// The number of children of this node.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// The number of nodes in this subtree, excluding the node itself.
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| 1 + child.descendant_count())
            .sum()
    }

    pub(crate) fn depth(&self) -> usize {
        self.children
            .iter()
            .map(TesTreeNode::depth)
            .max()
            .map_or(0, |deepest| deepest + 1)
    }
}

/// A hierarchy of nested TES clusters, carved out of an attractor transition
/// matrix by an ascending threshold sequence, or described externally as
/// (level, id, parent) rows.
///
/// The tree strictly owns its nodes top-down; there are no parent links and
/// no cycles.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TesTree {
    root: TesTreeNode,
}

impl TesTree {
    /// Build the TES tree of `matrix` under the threshold sequence `deltas`.
    ///
    /// `matrix` is a normalized transition matrix over attractors `0..dim`;
    /// `deltas[0]` is the root threshold (conventionally `0.0`) and every
    /// following value opens one more level below the root.
    ///
    /// At each level, entries below the level's threshold are zeroed (on a
    /// per-level copy), attractors are clustered by mutual reachability in
    /// the transitive closure, and clusters with any remaining outgoing edge
    /// are discarded. The root level must produce exactly one surviving
    /// cluster, otherwise the build fails with [`TesTreeError::NotATree`].
    /// Deeper levels recurse into the sub-matrix of each surviving cluster.
    pub fn build(matrix: &[Vec<f64>], deltas: &[f64]) -> Result<TesTree, TesTreeError> {
        if deltas.is_empty() {
            return Err(TesTreeError::EmptyDeltas);
        }
        let ids: Vec<AttractorId> = (0..matrix.len()).map(AttractorId).collect();
        let mut next_id = 0usize;

        let (thresholded, clusters) = level_clusters(matrix, deltas[0]);
        if clusters.len() != 1 {
            debug!(
                "Root threshold {} leaves {} clusters.",
                deltas[0],
                clusters.len()
            );
            return Err(TesTreeError::NotATree {
                clusters: clusters.len(),
            });
        }
        let tes = Tes::new(clusters[0].iter().map(|&local| ids[local]).collect());
        let mut root = TesTreeNode::new(take_id(&mut next_id), Some(tes));
        // The level below the root still considers the full attractor set;
        // only deeper levels restrict to their parent cluster.
        grow_children(&mut root, &thresholded, &ids, deltas, 1, &mut next_id);
        Ok(TesTree { root })
    }

    /// A tree with a single synthetic node (no TES payload), used as the
    /// starting point for externally described trees.
    pub fn with_root(id: usize) -> TesTree {
        TesTree {
            root: TesTreeNode::new(id, None),
        }
    }

    /// Add a synthetic node under the parent with the given id at
    /// `level - 1`.
    pub fn add_node(&mut self, id: usize, level: usize, parent_id: usize) -> Result<(), TesTreeError> {
        let Some(parent_level) = level.checked_sub(1) else {
            return Err(TesTreeError::MissingRoot);
        };
        let Some(parent) = find_node_mut(&mut self.root, 0, parent_level, parent_id) else {
            return Err(TesTreeError::NodeNotFound {
                level: parent_level,
                id: parent_id,
            });
        };
        parent.children.push(TesTreeNode::new(id, None));
        Ok(())
    }

    /// Build a tree from externally supplied `(level, id, parent id)` rows.
    /// The first row must describe the root at level zero (its parent id is
    /// ignored); every other row is added with [`TesTree::add_node`], so
    /// parents must be listed before their children.
    pub fn from_levels(rows: &[(usize, usize, usize)]) -> Result<TesTree, TesTreeError> {
        let Some(&(root_level, root_id, _)) = rows.first() else {
            return Err(TesTreeError::MissingRoot);
        };
        if root_level != 0 {
            return Err(TesTreeError::MissingRoot);
        }
        let mut tree = TesTree::with_root(root_id);
        for &(level, id, parent_id) in &rows[1..] {
            tree.add_node(id, level, parent_id)?;
        }
        Ok(tree)
    }

    /// The root node.
    pub fn root(&self) -> &TesTreeNode {
        &self.root
    }

    /// The depth of the tree in edges (a lone root has depth zero).
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// The total number of nodes, root included.
    pub fn node_count(&self) -> usize {
        1 + self.root.descendant_count()
    }

    /// The number of leaf nodes.
    pub fn leaf_count(&self) -> usize {
        fn leafs(node: &TesTreeNode) -> usize {
            if node.children.is_empty() {
                1
            } else {
                node.children.iter().map(leafs).sum()
            }
        }
        leafs(&self.root)
    }

    /// All `(parent id, child id)` edges in depth-first order.
    pub fn edges(&self) -> Vec<(usize, usize)> {
        fn collect(node: &TesTreeNode, edges: &mut Vec<(usize, usize)>) {
            for child in &node.children {
                edges.push((node.id, child.id));
                collect(child, edges);
            }
        }
        let mut edges = Vec::new();
        collect(&self.root, &mut edges);
        edges
    }
}

fn take_id(next_id: &mut usize) -> usize {
    let id = *next_id;
    *next_id += 1;
    id
}

fn find_node_mut(
    node: &mut TesTreeNode,
    node_level: usize,
    level: usize,
    id: usize,
) -> Option<&mut TesTreeNode> {
    if node_level == level {
        return (node.id == id).then_some(node);
    }
    node.children
        .iter_mut()
        .find_map(|child| find_node_mut(child, node_level + 1, level, id))
}

/// Attach one level of children to `node` and recurse: threshold the matrix,
/// extract the surviving clusters, and grow each cluster's subtree inside its
/// own sub-matrix.
fn grow_children(
    node: &mut TesTreeNode,
    matrix: &[Vec<f64>],
    ids: &[AttractorId],
    deltas: &[f64],
    level: usize,
    next_id: &mut usize,
) {
    if level >= deltas.len() {
        return;
    }
    let (thresholded, clusters) = level_clusters(matrix, deltas[level]);
    for cluster in &clusters {
        let tes = Tes::new(cluster.iter().map(|&local| ids[local]).collect());
        node.children
            .push(TesTreeNode::new(take_id(next_id), Some(tes)));
    }
    for (child, cluster) in node.children.iter_mut().zip(&clusters) {
        let (sub_matrix, sub_ids) = restrict(&thresholded, ids, cluster);
        grow_children(child, &sub_matrix, &sub_ids, deltas, level + 1, next_id);
    }
}

/// Threshold the matrix and return it together with the surviving clusters
/// (as lists of local attractor positions, ordered by first member).
///
/// A cluster is a maximal set of mutually reachable attractors in the
/// transitive closure of the thresholded matrix; clusters that still have an
/// edge leaving them are dropped entirely, which silently removes their
/// attractors from this and all deeper levels.
fn level_clusters(matrix: &[Vec<f64>], threshold: f64) -> (Vec<Vec<f64>>, Vec<Vec<usize>>) {
    let dim = matrix.len();
    let thresholded: Vec<Vec<f64>> = matrix
        .iter()
        .map(|row| {
            row.iter()
                .map(|&value| if value < threshold { 0.0 } else { value })
                .collect()
        })
        .collect();

    // Boolean reachability closure of the thresholded matrix.
    let mut reach: Vec<Vec<bool>> = thresholded
        .iter()
        .map(|row| row.iter().map(|&value| value > 0.0).collect())
        .collect();
    for via in 0..dim {
        for from in 0..dim {
            if !reach[from][via] {
                continue;
            }
            for to in 0..dim {
                if reach[via][to] {
                    reach[from][to] = true;
                }
            }
        }
    }

    // Merge mutually reachable attractors.
    let mut partition = DisjointSet::new(dim);
    for first in 0..dim {
        for second in (first + 1)..dim {
            if reach[first][second] && reach[second][first] {
                partition.union(first, second);
            }
        }
    }
    let clusters = partition.clusters();

    // Keep only closed clusters: any outgoing edge disqualifies the whole
    // cluster.
    let closed: Vec<Vec<usize>> = clusters
        .into_iter()
        .filter(|cluster| {
            cluster.iter().all(|&from| {
                (0..dim).all(|to| thresholded[from][to] == 0.0 || cluster.contains(&to))
            })
        })
        .collect();

    (thresholded, closed)
}

/// Restrict a matrix (and the id labelling of its rows) to the given
/// positions.
fn restrict(
    matrix: &[Vec<f64>],
    ids: &[AttractorId],
    positions: &[usize],
) -> (Vec<Vec<f64>>, Vec<AttractorId>) {
    let sub_matrix = positions
        .iter()
        .map(|&row| positions.iter().map(|&column| matrix[row][column]).collect())
        .collect();
    let sub_ids = positions.iter().map(|&position| ids[position]).collect();
    (sub_matrix, sub_ids)
}

/// A disjoint-set over `0..len` used for the mutual-reachability merge.
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(len: usize) -> DisjointSet {
        DisjointSet {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, element: usize) -> usize {
        let mut root = element;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Path compression.
        let mut current = element;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    fn union(&mut self, first: usize, second: usize) {
        let first = self.find(first);
        let second = self.find(second);
        if first != second {
            // Attach to the smaller root so cluster order follows first
            // members.
            let (low, high) = if first < second {
                (first, second)
            } else {
                (second, first)
            };
            self.parent[high] = low;
        }
    }

    /// Materialize the current partition as clusters ordered by their first
    /// member, members in ascending order.
    fn clusters(&mut self) -> Vec<Vec<usize>> {
        let len = self.parent.len();
        let mut by_root: Vec<Vec<usize>> = vec![Vec::new(); len];
        for element in 0..len {
            let root = self.find(element);
            by_root[root].push(element);
        }
        by_root.into_iter().filter(|set| !set.is_empty()).collect()
    }
}
