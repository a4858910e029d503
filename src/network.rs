//! # Network Graph Builder
//!
//! Builds the directed, weighted repost-flow graph over a bounded set of
//! influential users. The node set comes from the top-spreaders
//! aggregation; edge weights are recomputed from raw [`Repost`] rows
//! restricted to pairs where both endpoints are members of that set
//! (bounded-subgraph policy). Node reach still uses the cached repost
//! counters, which may include amplification from outside the node set —
//! the two paths are intentionally not unified.
//!
//! [`Repost`]: crate::model::Repost

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::engine::TopSpreadersQuery;
use crate::model::UserId;
use crate::ratio::node_size;
use crate::store::Snapshot;

pub const DEFAULT_NODE_LIMIT: usize = 100;

#[derive(Debug, Clone, Serialize)]
pub struct NetworkGraph {
    pub nodes: Vec<NetworkNode>,
    pub edges: Vec<NetworkEdge>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NetworkNode {
    pub id: UserId,
    /// Display label for the visualization (the username).
    pub label: String,
    pub verified: bool,
    pub articles_shared: u64,
    pub reach: u64,
    /// Saturating visual size in [10, 50]; not a layout computation.
    pub size: f64,
}

/// Edge directed from the original poster to the reposting user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkEdge {
    pub source: UserId,
    pub target: UserId,
    pub weight: u64,
}

/// Construct the bounded spreader graph with at most `limit` nodes.
pub fn build_network(snap: &Snapshot, limit: usize) -> NetworkGraph {
    // 1) Node set: top spreaders across all labels.
    let spreaders = TopSpreadersQuery { label: None, limit }.run(snap);
    let members: HashSet<UserId> = spreaders.iter().map(|s| s.user_id).collect();

    // 2) Edge weights from raw repost rows, both endpoints in the set.
    //    Self-reposts are excluded from edges but still count in node
    //    metrics upstream.
    let mut weights: BTreeMap<(UserId, UserId), u64> = BTreeMap::new();
    for repost in &snap.reposts {
        let Some(post) = snap.post(repost.post_id) else {
            continue;
        };
        if repost.user_id == post.user_id {
            continue;
        }
        if !members.contains(&repost.user_id) || !members.contains(&post.user_id) {
            continue;
        }
        *weights.entry((post.user_id, repost.user_id)).or_default() += 1;
    }

    let nodes = spreaders
        .into_iter()
        .map(|s| NetworkNode {
            id: s.user_id,
            label: s.username,
            verified: s.verified,
            articles_shared: s.articles_shared,
            reach: s.reach,
            size: node_size(s.reach),
        })
        .collect();

    let edges = weights
        .into_iter()
        .map(|((poster, reposter), weight)| NetworkEdge {
            source: poster,
            target: reposter,
            weight,
        })
        .collect();

    NetworkGraph { nodes, edges }
}
