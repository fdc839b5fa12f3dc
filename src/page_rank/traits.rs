use crate::*;

pub trait PageRank<K> {
    type Result: PageRankResult<K>;

    fn calc(&mut self) -> crate::Result<Self::Result>;
}

pub trait PageRankResult<K> {
    fn page_rank(&self) -> &RankVector<K>;
    fn debug(&self) -> impl std::fmt::Debug + '_;
}
