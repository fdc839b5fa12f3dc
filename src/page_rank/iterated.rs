use super::*;
use crate::{
    common::{check_damping, check_tolerance},
    *,
};
use algograph::graph::VertexId;
use std::{
    collections::{BTreeMap, HashMap},
    fmt::Debug,
    hash::Hash,
};

/// PageRank as the fixed point of the random-surfer recurrence.
///
/// Every round recomputes all ranks from the previous round's vector only.
/// A dangling node spreads its rank over all nodes, like the surfer jumping
/// uniformly from it. Rounds stop once no node moved by `tolerance` or more.
pub struct IteratedPageRank<'a, K> {
    graph: &'a LinkGraph<K>,
    damping: f64,
    tolerance: f64,
    max_iterations: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub damping: f64,
    pub tolerance: f64,
    /// Gives up with [`Error::NonConvergence`] after this many rounds.
    pub max_iterations: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            damping: DEFAULT_DAMPING,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IteratedRanks<K> {
    pub page_rank: RankVector<K>,
    /// Per-node change made by the last round.
    pub delta: BTreeMap<K, f64>,
    pub iterations: usize,
}

impl<'a, K: Ord + Hash + Clone> IteratedPageRank<'a, K> {
    pub fn new(g: &'a LinkGraph<K>, config: &Config) -> Result<Self> {
        check_damping(config.damping)?;
        check_tolerance(config.tolerance)?;
        if config.max_iterations == Some(0) {
            return Err(Error::InvalidParameter(
                "max_iterations=0, expected positive".to_string(),
            ));
        }
        Ok(Self {
            graph: g,
            damping: config.damping,
            tolerance: config.tolerance,
            max_iterations: config.max_iterations,
        })
    }
}

impl<K: Ord + Hash + Clone + Debug> PageRank<K> for IteratedPageRank<'_, K> {
    type Result = IteratedRanks<K>;

    fn calc(&mut self) -> crate::Result<Self::Result> {
        let graph = self.graph;
        let damping = self.damping;
        let order = graph.vertex_order();
        let n = order.len() as f64;
        log::info!(
            "iterating PageRank over {} nodes: damping={}, tolerance={}",
            order.len(),
            damping,
            self.tolerance
        );

        let teleport = (1.0 - damping) / n;
        let mut p: HashMap<VertexId, f64, ahash::RandomState> =
            order.iter().map(|v| (*v, 1.0 / n)).collect();
        let mut r: HashMap<VertexId, f64, ahash::RandomState> =
            HashMap::with_capacity_and_hasher(order.len(), ahash::RandomState::new());
        let mut delta: HashMap<VertexId, f64, ahash::RandomState> =
            HashMap::with_capacity_and_hasher(order.len(), ahash::RandomState::new());
        let mut progress = Progress::default();
        let mut iterations = 0;
        loop {
            iterations += 1;
            let dangling: f64 = graph
                .dangling_vertices()
                .map(|v| p.get(&v).unwrap() / n)
                .sum();
            for v in order.iter() {
                let incoming: f64 = graph
                    .in_vertices(v)
                    .map(|u| p.get(&u).unwrap() / (graph.out_degree(&u) as f64))
                    .sum();
                r.insert(*v, teleport + damping * (incoming + dangling));
            }

            delta.clear();
            for v in order.iter() {
                let a = p.get(v).unwrap();
                let b = r.get(v).unwrap();
                delta.insert(*v, b - a);
            }
            let max_delta = delta.values().fold(0.0, |m: f64, d| m.max(d.abs()));
            log::trace!("iteration {iterations}: max delta {max_delta}");

            if !r.values().all(|x| x.is_finite()) {
                return Err(Error::NonConvergence {
                    iterations,
                    max_delta: f64::NAN,
                });
            }
            if delta.values().all(|d| d.abs() < self.tolerance) {
                log::info!("converged after {iterations} iterations, max delta {max_delta}");
                return Ok(IteratedRanks {
                    page_rank: graph.by_name(&r),
                    delta: graph.by_name(&delta),
                    iterations,
                });
            }
            if progress.stalled(max_delta) {
                log::warn!("stalled after {iterations} iterations, max delta {max_delta}");
                return Err(Error::NonConvergence {
                    iterations,
                    max_delta,
                });
            }
            if self.max_iterations.is_some_and(|max| iterations >= max) {
                log::warn!("gave up after {iterations} iterations, max delta {max_delta}");
                return Err(Error::NonConvergence {
                    iterations,
                    max_delta,
                });
            }

            std::mem::swap(&mut p, &mut r);
        }
    }
}

/// Rounds allowed without a new smallest max delta.
const STALL_ROUNDS: usize = 100;

/// Tracks the smallest max delta seen so far. Rounding noise can keep the
/// deltas from shrinking any further; that shows up as no new minimum for
/// [`STALL_ROUNDS`] rounds.
#[derive(Debug)]
struct Progress {
    best: f64,
    since_best: usize,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            best: f64::INFINITY,
            since_best: 0,
        }
    }
}

impl Progress {
    fn stalled(&mut self, max_delta: f64) -> bool {
        if max_delta < self.best {
            self.best = max_delta;
            self.since_best = 0;
        } else {
            self.since_best += 1;
        }
        self.since_best >= STALL_ROUNDS
    }
}

impl<K: Debug> PageRankResult<K> for IteratedRanks<K> {
    fn page_rank(&self) -> &RankVector<K> {
        &self.page_rank
    }

    fn debug(&self) -> impl Debug + '_ {
        IteratedRanksDebug { result: self }
    }
}

pub struct IteratedRanksDebug<'a, K> {
    result: &'a IteratedRanks<K>,
}

impl<K: Debug> Debug for IteratedRanksDebug<'_, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rows = self.result.page_rank.iter().zip(self.result.delta.values());
        for ((page, p), d) in rows {
            writeln!(f, "{page:?}: {p:?}, {d:?}")?;
        }
        Ok(())
    }
}

/// Iterates the PageRank recurrence until every node moves by less than `tolerance`.
pub fn iterate_pagerank<K>(
    graph: &LinkGraph<K>,
    damping: f64,
    tolerance: f64,
) -> Result<RankVector<K>>
where
    K: Ord + Hash + Clone + Debug,
{
    let config = Config {
        damping,
        tolerance,
        max_iterations: None,
    };
    let res = IteratedPageRank::new(graph, &config)?.calc()?;
    Ok(res.page_rank)
}
