use crate::{common::check_damping, *};
use algograph::graph::VertexId;
use std::{collections::HashSet, hash::Hash};

/// The random surfer's one-step distribution over a [`LinkGraph`].
///
/// With probability `damping` the surfer follows one of the current node's
/// links, chosen uniformly; otherwise it jumps to any node uniformly. A
/// dangling node jumps uniformly with probability 1.
pub struct TransitionModel<'a, K> {
    graph: &'a LinkGraph<K>,
    damping: f64,
}

impl<'a, K: Ord + Hash + Clone> TransitionModel<'a, K> {
    pub fn new(graph: &'a LinkGraph<K>, damping: f64) -> Result<Self> {
        check_damping(damping)?;
        Ok(Self { graph, damping })
    }

    pub fn damping(&self) -> f64 {
        self.damping
    }

    /// Distribution of the next node when the surfer is at `current`.
    pub fn distribution(&self, current: &K) -> Result<TransitionDistribution<K>> {
        let u = self.graph.vertex(current).ok_or_else(|| {
            Error::InvalidParameter("current node is not in the graph".to_string())
        })?;
        let weights = self.weights(&u);
        Ok(self
            .graph
            .vertex_order()
            .iter()
            .zip(weights)
            .map(|(v, w)| (self.graph.name(v).clone(), w))
            .collect())
    }

    /// Same distribution as [`Self::distribution`], positionally aligned
    /// with [`LinkGraph::vertex_order`].
    pub(crate) fn weights(&self, u: &VertexId) -> Vec<f64> {
        let n = self.graph.len();
        let degree = self.graph.out_degree(u);
        if degree == 0 {
            return vec![1.0 / (n as f64); n];
        }
        let base = (1.0 - self.damping) / (n as f64);
        let unit = self.damping / (degree as f64);
        let links: HashSet<VertexId, ahash::RandomState> = self.graph.out_vertices(u).collect();
        self.graph
            .vertex_order()
            .iter()
            .map(|v| if links.contains(v) { base + unit } else { base })
            .collect()
    }
}

/// One-shot form of [`TransitionModel::distribution`].
pub fn transition_model<K: Ord + Hash + Clone>(
    graph: &LinkGraph<K>,
    current: &K,
    damping: f64,
) -> Result<TransitionDistribution<K>> {
    TransitionModel::new(graph, damping)?.distribution(current)
}
