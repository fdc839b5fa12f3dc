use crate::{Error, Result};
use algograph::graph::*;
use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    hash::Hash,
};

/// An immutable directed link graph over documents named by `K`.
///
/// Construction normalizes every outgoing set once: self links and links to
/// identifiers that are not themselves nodes are dropped. A node whose set
/// ends up empty is a dangling node.
///
/// The keyed view (`outgoing`) is what callers see. The estimators walk a
/// vertex-indexed copy of the same topology.
#[derive(Debug, Clone)]
pub struct LinkGraph<K> {
    links: BTreeMap<K, BTreeSet<K>>,
    graph: directed::TreeBackedGraph,
    vertices: BTreeMap<K, VertexId>,
    names: HashMap<VertexId, K, ahash::RandomState>,
    out_degrees: HashMap<VertexId, usize, ahash::RandomState>,
    // vertices in identifier order
    order: Vec<VertexId>,
}

impl<K: Ord + Hash + Clone> LinkGraph<K> {
    /// Builds a graph from `(node, referenced identifiers)` pairs.
    ///
    /// Repeated nodes merge their references. Fails with
    /// [`Error::InvalidGraph`] when no node is given.
    pub fn new<I, L>(links: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, L)>,
        L: IntoIterator<Item = K>,
    {
        let raw = {
            let mut raw: BTreeMap<K, BTreeSet<K>> = BTreeMap::new();
            for (page, targets) in links {
                raw.entry(page).or_default().extend(targets);
            }
            raw
        };
        if raw.is_empty() {
            return Err(Error::InvalidGraph(
                "a link graph needs at least one node".to_string(),
            ));
        }

        let links: BTreeMap<K, BTreeSet<K>> = raw
            .iter()
            .map(|(page, targets)| {
                let kept = targets
                    .iter()
                    .filter(|t| *t != page && raw.contains_key(*t))
                    .cloned()
                    .collect();
                (page.clone(), kept)
            })
            .collect();
        let dropped = raw.values().map(BTreeSet::len).sum::<usize>()
            - links.values().map(BTreeSet::len).sum::<usize>();

        let mut graph = directed::TreeBackedGraph::new();
        let vertices: BTreeMap<K, VertexId> = links
            .keys()
            .map(|page| (page.clone(), graph.add_vertex()))
            .collect();
        for (page, targets) in links.iter() {
            let u = vertices[page];
            for t in targets.iter() {
                graph.add_edge(u, vertices[t]);
            }
        }
        let names: HashMap<_, _, ahash::RandomState> =
            vertices.iter().map(|(page, v)| (*v, page.clone())).collect();
        let out_degrees: HashMap<_, _, ahash::RandomState> = links
            .iter()
            .map(|(page, targets)| (vertices[page], targets.len()))
            .collect();
        let order: Vec<VertexId> = vertices.values().copied().collect();

        let res = Self {
            links,
            graph,
            vertices,
            names,
            out_degrees,
            order,
        };
        log::debug!(
            "link graph: {} nodes, {} links, {} dangling, {} references dropped",
            res.len(),
            res.link_count(),
            res.dangling_count(),
            dropped
        );
        Ok(res)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Always false for a constructed graph.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Node identifiers in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = &K> + '_ {
        self.links.keys()
    }

    pub fn contains(&self, node: &K) -> bool {
        self.links.contains_key(node)
    }

    /// Normalized outgoing links of `node`, or `None` if it is not a node.
    pub fn outgoing(&self, node: &K) -> Option<&BTreeSet<K>> {
        self.links.get(node)
    }

    pub fn is_dangling(&self, node: &K) -> Option<bool> {
        self.links.get(node).map(BTreeSet::is_empty)
    }

    pub fn dangling_count(&self) -> usize {
        self.links.values().filter(|t| t.is_empty()).count()
    }

    pub fn link_count(&self) -> usize {
        self.graph.edge_size()
    }

    /// The whole normalized mapping.
    pub fn links(&self) -> &BTreeMap<K, BTreeSet<K>> {
        &self.links
    }

    pub(crate) fn vertex_order(&self) -> &[VertexId] {
        &self.order
    }

    pub(crate) fn vertex(&self, node: &K) -> Option<VertexId> {
        self.vertices.get(node).copied()
    }

    pub(crate) fn name(&self, v: &VertexId) -> &K {
        self.names.get(v).unwrap()
    }

    pub(crate) fn out_degree(&self, v: &VertexId) -> usize {
        *self.out_degrees.get(v).unwrap()
    }

    pub(crate) fn out_vertices(&self, v: &VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.graph.out_edges(v).map(|e| e.sink)
    }

    /// Vertices linking to `v`.
    pub(crate) fn in_vertices(&self, v: &VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.graph.in_edges(v).map(|e| e.source)
    }

    pub(crate) fn dangling_vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.order
            .iter()
            .copied()
            .filter(|v| self.out_degree(v) == 0)
    }

    /// Maps a vertex-keyed vector back to identifiers.
    pub(crate) fn by_name<T: Copy>(
        &self,
        values: &HashMap<VertexId, T, ahash::RandomState>,
    ) -> BTreeMap<K, T> {
        self.order
            .iter()
            .map(|v| (self.name(v).clone(), *values.get(v).unwrap()))
            .collect()
    }
}
