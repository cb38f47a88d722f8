use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;

use crate::models::{Link, NodeId, OrbitalNode};

/// A connected group of at least two nodes joined by strong links.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    /// Member ids in discovery order.
    pub members: Vec<NodeId>,
}

impl Cluster {
    pub fn contains(&self, id: &str) -> bool {
        self.members.iter().any(|m| m == id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// A node with links reaching into two or more clusters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeCandidate {
    pub id: NodeId,
    pub links_count: u32,
    /// Index pairs `(i, j)`, `i < j`, of the clusters this node connects.
    pub cluster_pairs: Vec<(usize, usize)>,
}

/// Breadth-first connected components over links with `strength >= threshold`.
///
/// Nodes are visited in slice order and members are listed in discovery order.
/// Components of a single node are dropped. Links naming missing nodes are ignored.
///
/// # Example
/// ```
/// use stardust_orbital::analysis::find_clusters;
/// use stardust_orbital::models::{Link, OrbitalNode};
///
/// let nodes: Vec<_> = ["a", "b", "c"].iter().map(|id| OrbitalNode::new(*id, 0.0, 0.0, 1.0)).collect();
/// let links = vec![Link::new("a", "b", 0.9), Link::new("b", "c", 0.1)];
/// let clusters = find_clusters(&nodes, &links, 0.7);
/// assert_eq!(clusters.len(), 1);
/// assert_eq!(clusters[0].members, vec!["a".to_string(), "b".to_string()]);
/// ```
pub fn find_clusters(nodes: &[OrbitalNode], links: &[Link], threshold: f64) -> Vec<Cluster> {
    let index: HashMap<&str, usize> = nodes.iter().enumerate().map(|(i, n)| (n.id.as_str(), i)).collect();

    // Adjacency lists keep link order so traversal is deterministic.
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    for link in links.iter().filter(|l| l.strength >= threshold) {
        let (Some(&a), Some(&b)) = (index.get(link.source_id.as_str()), index.get(link.target_id.as_str())) else {
            continue;
        };
        if a != b {
            adjacency[a].push(b);
            adjacency[b].push(a);
        }
    }

    let mut visited = vec![false; nodes.len()];
    let mut clusters = Vec::new();
    for start in 0..nodes.len() {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        let mut members = vec![start];
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for &next in &adjacency[current] {
                if !visited[next] {
                    visited[next] = true;
                    members.push(next);
                    queue.push_back(next);
                }
            }
        }
        if members.len() >= 2 {
            clusters.push(Cluster {
                members: members.into_iter().map(|i| nodes[i].id.clone()).collect(),
            });
        }
    }
    clusters
}

/// Nodes that could join pairs of clusters, ranked by `links_count`.
///
/// For every unordered pair of clusters, any node of the full node set with at
/// least one link into each of the two clusters is a candidate; all links count,
/// whatever their strength. A node bridging several pairs is reported once with
/// every pair it bridges. Ties keep discovery order. At most `top_n` are returned.
pub fn suggest_bridges(
    nodes: &[OrbitalNode],
    links: &[Link],
    clusters: &[Cluster],
    top_n: usize,
) -> Vec<BridgeCandidate> {
    let membership: Vec<HashSet<&str>> = clusters
        .iter()
        .map(|c| c.members.iter().map(String::as_str).collect())
        .collect();

    let mut candidates: Vec<BridgeCandidate> = Vec::new();
    for node in nodes {
        // Which clusters does this node reach through at least one link?
        let mut reaches = vec![false; clusters.len()];
        for link in links {
            let Some(other) = link.other_end(&node.id) else {
                continue;
            };
            if other == node.id {
                continue;
            }
            for (ci, members) in membership.iter().enumerate() {
                if members.contains(other) {
                    reaches[ci] = true;
                }
            }
        }

        let mut pairs = Vec::new();
        for i in 0..clusters.len() {
            for j in (i + 1)..clusters.len() {
                if reaches[i] && reaches[j] {
                    pairs.push((i, j));
                }
            }
        }
        if !pairs.is_empty() {
            candidates.push(BridgeCandidate {
                id: node.id.clone(),
                links_count: node.links_count,
                cluster_pairs: pairs,
            });
        }
    }

    candidates.sort_by(|a, b| b.links_count.cmp(&a.links_count));
    candidates.truncate(top_n);
    candidates
}
