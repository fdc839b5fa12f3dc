use super::*;
use crate::{
    common::check_samples,
    *,
};
use algograph::graph::VertexId;
use rand::{distr::weighted::WeightedIndex, prelude::*};
use std::{
    collections::{hash_map::Entry, BTreeMap, HashMap},
    fmt::Debug,
    hash::Hash,
};

/// Monte Carlo PageRank: the visit frequencies of one random-surfer walk.
///
/// The walk draws from the owned random source `R` only, so a seeded source
/// reproduces the same estimate.
pub struct SampledPageRank<'a, K, R>
where
    R: Rng,
{
    graph: &'a LinkGraph<K>,
    model: TransitionModel<'a, K>,
    samples: usize,
    rng: R,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub damping: f64,
    pub samples: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            damping: DEFAULT_DAMPING,
            samples: DEFAULT_SAMPLES,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SampledRanks<K> {
    pub page_rank: RankVector<K>,
    pub visits: BTreeMap<K, usize>,
    pub samples: usize,
}

impl<'a, K: Ord + Hash + Clone, R: Rng> SampledPageRank<'a, K, R> {
    pub fn new(g: &'a LinkGraph<K>, config: &Config, rng: R) -> Result<Self> {
        check_samples(config.samples)?;
        Ok(Self {
            graph: g,
            model: TransitionModel::new(g, config.damping)?,
            samples: config.samples,
            rng,
        })
    }
}

impl<K, R> PageRank<K> for SampledPageRank<'_, K, R>
where
    K: Ord + Hash + Clone + Debug,
    R: Rng,
{
    type Result = SampledRanks<K>;

    fn calc(&mut self) -> crate::Result<Self::Result> {
        let graph = self.graph;
        let order = graph.vertex_order();
        log::info!(
            "sampling PageRank over {} nodes: damping={}, samples={}",
            order.len(),
            self.model.damping(),
            self.samples
        );

        let mut visits: HashMap<VertexId, usize, ahash::RandomState> =
            order.iter().map(|v| (*v, 0)).collect();
        // one table per visited vertex, built on first visit
        let mut tables: HashMap<VertexId, WeightedIndex<f64>, ahash::RandomState> =
            HashMap::with_hasher(ahash::RandomState::new());
        let mut cur = *order
            .choose(&mut self.rng)
            .ok_or_else(|| Error::InvalidGraph("no node to start from".to_string()))?;
        for _ in 0..self.samples {
            let table = match tables.entry(cur) {
                Entry::Occupied(e) => e.into_mut(),
                Entry::Vacant(e) => {
                    let table = WeightedIndex::new(self.model.weights(&cur)).map_err(|err| {
                        Error::InvalidParameter(format!("transition weights: {err}"))
                    })?;
                    e.insert(table)
                }
            };
            cur = order[table.sample(&mut self.rng)];
            *visits.get_mut(&cur).unwrap() += 1;
        }
        log::debug!("walk visited {} of {} nodes", tables.len(), order.len());

        let n = self.samples as f64;
        let visits = graph.by_name(&visits);
        let page_rank = visits
            .iter()
            .map(|(page, count)| (page.clone(), *count as f64 / n))
            .collect();
        Ok(SampledRanks {
            page_rank,
            visits,
            samples: self.samples,
        })
    }
}

impl<K: Debug> PageRankResult<K> for SampledRanks<K> {
    fn page_rank(&self) -> &RankVector<K> {
        &self.page_rank
    }

    fn debug(&self) -> impl Debug + '_ {
        SampledRanksDebug { result: self }
    }
}

pub struct SampledRanksDebug<'a, K> {
    result: &'a SampledRanks<K>,
}

impl<K: Debug> Debug for SampledRanksDebug<'_, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rows = self.result.page_rank.iter().zip(self.result.visits.values());
        for ((page, p), visits) in rows {
            writeln!(f, "{page:?}: {p:?}, {visits}/{}", self.result.samples)?;
        }
        Ok(())
    }
}

/// Estimates PageRank from `samples` steps of a random-surfer walk driven by `rng`.
pub fn sample_pagerank<K, R>(
    graph: &LinkGraph<K>,
    damping: f64,
    samples: usize,
    rng: &mut R,
) -> Result<RankVector<K>>
where
    K: Ord + Hash + Clone + Debug,
    R: Rng,
{
    let config = Config { damping, samples };
    let res = SampledPageRank::new(graph, &config, rng)?.calc()?;
    Ok(res.page_rank)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(3407)
    }

    #[test]
    fn single_node() {
        let g = LinkGraph::new([("a", vec!["a"])]).unwrap();
        let ranks = sample_pagerank(&g, 0.85, 100, &mut rng()).unwrap();
        let oracle: RankVector<&str> = [("a", 1.0)].into_iter().collect();
        assert_eq!(ranks, oracle);
    }

    #[test]
    fn symmetric_pair() {
        let _ = env_logger::builder().is_test(true).try_init();
        let g = LinkGraph::new([("a", vec!["b"]), ("b", vec!["a"])]).unwrap();
        let ranks = sample_pagerank(&g, 0.85, DEFAULT_SAMPLES, &mut rng()).unwrap();
        for p in ranks.values() {
            assert!((p - 0.5).abs() < 0.03, "{ranks:?}");
        }
    }

    #[test]
    fn seeded_runs_agree() {
        let g = LinkGraph::new([
            ("1", vec!["2"]),
            ("2", vec!["1", "3"]),
            ("3", vec!["2", "4", "5"]),
            ("4", vec!["1", "2"]),
            ("5", vec![]),
        ])
        .unwrap();
        let trial = sample_pagerank(&g, 0.85, 5_000, &mut rng()).unwrap();
        let oracle = sample_pagerank(&g, 0.85, 5_000, &mut rng()).unwrap();
        assert_eq!(trial, oracle);
    }

    #[test]
    fn visits_add_up() {
        let g = LinkGraph::new([("a", vec!["b", "c"]), ("b", vec!["c"]), ("c", vec![])]).unwrap();
        let config = Config {
            samples: 1_000,
            ..Config::default()
        };
        let res = SampledPageRank::new(&g, &config, rng())
            .unwrap()
            .calc()
            .unwrap();
        assert_eq!(res.visits.values().sum::<usize>(), 1_000);
        assert_eq!(res.page_rank.len(), 3);
        let total = norm_1(res.page_rank().values());
        assert!((total - 1.0).abs() < 1e-9, "{:?}", res.debug());
    }

    #[test]
    fn debug_lists_visits() {
        let g = LinkGraph::new([("a", vec!["b"]), ("b", vec![])]).unwrap();
        let config = Config {
            samples: 10,
            ..Config::default()
        };
        let res = SampledPageRank::new(&g, &config, rng())
            .unwrap()
            .calc()
            .unwrap();
        let out = format!("{:?}", res.debug());
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2, "{out}");
        assert!(lines.iter().all(|l| l.ends_with("/10")), "{out}");
        assert!(lines[0].starts_with("\"a\": "), "{out}");
    }

    #[test]
    fn rejects_bad_parameters() {
        let g = LinkGraph::new([("a", vec!["b"]), ("b", vec![])]).unwrap();
        let res = sample_pagerank(&g, 0.85, 0, &mut rng());
        assert!(matches!(res, Err(Error::InvalidParameter(_))), "{res:?}");
        let res = sample_pagerank(&g, 1.0, 100, &mut rng());
        assert!(matches!(res, Err(Error::InvalidParameter(_))), "{res:?}");
    }

    #[quickcheck]
    fn sums_to_one(links: Vec<(u8, Vec<u8>)>, seed: u64) {
        if links.is_empty() {
            return;
        }
        let g = LinkGraph::new(links).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let ranks = sample_pagerank(&g, 0.85, 200, &mut rng).unwrap();
        assert_eq!(ranks.len(), g.len());
        let total = norm_1(ranks.values());
        assert!((total - 1.0).abs() < 1e-9, "total={total}");
    }
}
