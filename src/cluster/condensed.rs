//! Condensed cluster tree: construction, stability selection, labeling.
//!
//! The condensed tree is a pruned single-linkage dendrogram. Walking the
//! dendrogram top-down, a split only counts as a real cluster split when both
//! sides still hold at least `min_cluster_size` points; otherwise the smaller
//! side's points "fall out" of the current cluster one by one.
//!
//! Ids share one space: `0..n` are points, `n` is the root cluster, and new
//! clusters get `n + 1, n + 2, ...` in breadth-first order, so every child
//! cluster id is larger than its parent's.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use super::util::UnionFind;
use super::NOISE;

/// One row of the condensed hierarchy.
///
/// `child` merges into `parent` at density `lambda_val` (the reciprocal of the
/// merge distance). `child_size` is 1 when `child` is a single point falling
/// out of `parent`, and the sub-cluster's point count otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CondensedHierarchyEdge {
    /// Cluster the child belongs to above this density.
    pub parent: i64,
    /// Point index (`child_size == 1`) or cluster id.
    pub child: i64,
    /// Density level of the merge.
    pub lambda_val: f64,
    /// Points under `child` at the moment of the merge.
    pub child_size: usize,
}

impl CondensedHierarchyEdge {
    /// Whether this edge describes a sub-cluster rather than a lone point.
    #[inline]
    pub fn is_cluster(&self) -> bool {
        self.child_size > 1
    }
}

/// Internal dendrogram node: `left`/`right` are point indices (`< n`) or
/// `n + i` for the `i`-th merge.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LinkageNode {
    pub(crate) left: usize,
    pub(crate) right: usize,
    pub(crate) distance: f64,
    pub(crate) size: usize,
}

/// Build the single-linkage dendrogram from MST edges sorted by ascending weight.
pub(crate) fn single_linkage(mst: &[(usize, usize, f64)], n: usize) -> Vec<LinkageNode> {
    let mut uf = UnionFind::new(n);
    // UF root -> dendrogram node currently representing that component.
    let mut comp_node: Vec<usize> = (0..n).collect();
    let mut nodes = Vec::with_capacity(mst.len());

    for &(u, v, distance) in mst {
        let ru = uf.find(u);
        let rv = uf.find(v);
        if ru == rv {
            continue;
        }
        nodes.push(LinkageNode {
            left: comp_node[ru],
            right: comp_node[rv],
            distance,
            size: uf.size[ru] + uf.size[rv],
        });
        let root = uf.union_roots(ru, rv);
        comp_node[root] = n + nodes.len() - 1;
    }
    nodes
}

fn node_size(linkage: &[LinkageNode], n: usize, node: usize) -> usize {
    if node < n {
        1
    } else {
        linkage[node - n].size
    }
}

/// Point indices under a dendrogram node, ascending.
fn leaves(linkage: &[LinkageNode], n: usize, node: usize) -> Vec<usize> {
    let mut out = Vec::new();
    let mut stack = vec![node];
    while let Some(x) = stack.pop() {
        if x < n {
            out.push(x);
        } else {
            let link = &linkage[x - n];
            stack.push(link.left);
            stack.push(link.right);
        }
    }
    out.sort_unstable();
    out
}

/// Condense a dendrogram with `n` leaves.
///
/// Merge distances must be strictly positive.
pub(crate) fn condense(
    linkage: &[LinkageNode],
    n: usize,
    min_cluster_size: usize,
) -> Vec<CondensedHierarchyEdge> {
    let mut edges = Vec::new();
    if linkage.is_empty() {
        return edges;
    }

    let root = n + linkage.len() - 1;
    let mut relabel = vec![0i64; n + linkage.len()];
    relabel[root] = n as i64;
    let mut next_label = n as i64 + 1;

    let fall_out = |edges: &mut Vec<CondensedHierarchyEdge>, node: usize, parent: i64, lambda: f64| {
        for p in leaves(linkage, n, node) {
            edges.push(CondensedHierarchyEdge {
                parent,
                child: p as i64,
                lambda_val: lambda,
                child_size: 1,
            });
        }
    };

    let mut queue = VecDeque::from([root]);
    while let Some(node) = queue.pop_front() {
        let link = linkage[node - n];
        let parent = relabel[node];
        let lambda = 1.0 / link.distance;

        let left_size = node_size(linkage, n, link.left);
        let right_size = node_size(linkage, n, link.right);
        let left_big = left_size >= min_cluster_size;
        let right_big = right_size >= min_cluster_size;

        match (left_big, right_big) {
            (true, true) => {
                for (child, size) in [(link.left, left_size), (link.right, right_size)] {
                    relabel[child] = next_label;
                    next_label += 1;
                    edges.push(CondensedHierarchyEdge {
                        parent,
                        child: relabel[child],
                        lambda_val: lambda,
                        child_size: size,
                    });
                    if child >= n {
                        queue.push_back(child);
                    }
                }
            }
            (true, false) => {
                relabel[link.left] = parent;
                fall_out(&mut edges, link.right, parent, lambda);
                if link.left >= n {
                    queue.push_back(link.left);
                }
            }
            (false, true) => {
                relabel[link.right] = parent;
                fall_out(&mut edges, link.left, parent, lambda);
                if link.right >= n {
                    queue.push_back(link.right);
                }
            }
            (false, false) => {
                fall_out(&mut edges, link.left, parent, lambda);
                fall_out(&mut edges, link.right, parent, lambda);
            }
        }
    }
    edges
}

/// Cluster stability: `sum over rows with parent c of (lambda - birth(c)) * child_size`.
///
/// The root (`n`) is born at lambda 0.
pub(crate) fn stabilities(edges: &[CondensedHierarchyEdge], n: usize) -> BTreeMap<i64, f64> {
    let mut birth: BTreeMap<i64, f64> = BTreeMap::new();
    birth.insert(n as i64, 0.0);
    for e in edges.iter().filter(|e| e.is_cluster()) {
        birth.insert(e.child, e.lambda_val);
    }

    let mut stability: BTreeMap<i64, f64> = birth.keys().map(|&c| (c, 0.0)).collect();
    for e in edges {
        let b = birth.get(&e.parent).copied().unwrap_or(0.0);
        *stability.entry(e.parent).or_insert(0.0) += (e.lambda_val - b) * e.child_size as f64;
    }
    stability
}

/// Excess-of-mass selection of a flat, non-overlapping cluster set.
///
/// Clusters are visited bottom-up; a cluster replaces its selected
/// descendants when its own stability beats the sum of theirs. The root is
/// never selected.
pub fn select_clusters(edges: &[CondensedHierarchyEdge], n: usize) -> BTreeSet<i64> {
    let root = n as i64;
    let mut stability = stabilities(edges, n);

    let mut children: BTreeMap<i64, Vec<i64>> = BTreeMap::new();
    for e in edges.iter().filter(|e| e.is_cluster()) {
        children.entry(e.parent).or_default().push(e.child);
    }

    let candidates: Vec<i64> = stability.keys().copied().filter(|&c| c != root).collect();
    let mut selected: BTreeSet<i64> = candidates.iter().copied().collect();

    for &c in candidates.iter().rev() {
        let kids = children.get(&c).map(Vec::as_slice).unwrap_or(&[]);
        let subtree: f64 = kids.iter().map(|k| stability.get(k).copied().unwrap_or(0.0)).sum();
        let own = stability.get(&c).copied().unwrap_or(0.0);
        if subtree > own {
            selected.remove(&c);
            stability.insert(c, subtree);
        } else {
            let mut stack: Vec<i64> = kids.to_vec();
            while let Some(d) = stack.pop() {
                selected.remove(&d);
                if let Some(grand) = children.get(&d) {
                    stack.extend_from_slice(grand);
                }
            }
        }
    }
    selected
}

/// Label every point with its selected ancestor cluster id, or [`NOISE`].
pub fn label_points(
    edges: &[CondensedHierarchyEdge],
    selected: &BTreeSet<i64>,
    n: usize,
) -> Vec<i64> {
    let parent_of: BTreeMap<i64, i64> = edges
        .iter()
        .filter(|e| e.is_cluster())
        .map(|e| (e.child, e.parent))
        .collect();

    let mut labels = vec![NOISE; n];
    for e in edges.iter().filter(|e| !e.is_cluster()) {
        let mut cluster = e.parent;
        let label = loop {
            if selected.contains(&cluster) {
                break cluster;
            }
            match parent_of.get(&cluster) {
                Some(&p) => cluster = p,
                None => break NOISE,
            }
        };
        if let Some(slot) = usize::try_from(e.child).ok().and_then(|i| labels.get_mut(i)) {
            *slot = label;
        }
    }
    labels
}
