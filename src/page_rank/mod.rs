//! PageRank estimators over a [`LinkGraph`](crate::LinkGraph).
//!
//! [`sampled`] simulates the random surfer and counts visits. [`iterated`]
//! solves the same chain's stationary distribution by fixed-point iteration.
//! Both read the graph only, so one graph can feed both at once.

mod traits;
pub use self::traits::*;
mod transition;
pub use self::transition::{transition_model, TransitionModel};
pub mod iterated;
pub use self::iterated::{iterate_pagerank, IteratedPageRank, IteratedRanks};
pub mod sampled;
pub use self::sampled::{sample_pagerank, SampledPageRank, SampledRanks};
