use log::{debug, info};
use rayon::prelude::*;

use crate::error::{Result, RetrievalError};
use crate::retrieval::{RankedMatch, top_k};
use crate::store::{ImageEntry, VectorStore};

/// 单张查询图片的检索结果
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult<'a> {
    pub query: &'a ImageEntry,
    /// 按距离升序排列，最多 k 个
    pub matches: Vec<RankedMatch<'a>>,
}

/// 检索进度回调，默认实现均为空操作
pub trait Progress: Sync {
    /// 开始检索，`total` 为实际参与检索的查询数量
    fn start(&self, _total: usize) {}
    /// 完成一张查询图片
    fn advance(&self, _query: &ImageEntry) {}
    fn finish(&self) {}
}

impl Progress for () {}

/// 对一组查询图片在整个向量库上做 top-k 检索
pub struct RetrievalSession<'a> {
    store: &'a VectorStore,
    k: usize,
    max_queries: Option<usize>,
    threads: usize,
    observer: &'a dyn Progress,
}

impl<'a> RetrievalSession<'a> {
    pub fn new(store: &'a VectorStore, k: usize) -> Self {
        Self { store, k, max_queries: None, threads: 1, observer: &() }
    }

    /// 最多处理多少张查询图片，`Some(0)` 与 `None` 相同，表示不限制
    pub fn max_queries(mut self, max_queries: Option<usize>) -> Self {
        self.max_queries = max_queries.filter(|&n| n > 0);
        self
    }

    /// 检索线程数，1 为单线程顺序执行，0 为使用全部 CPU
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn observer(mut self, observer: &'a dyn Progress) -> Self {
        self.observer = observer;
        self
    }

    /// 使用向量库中的全部图片作为查询
    pub fn run_all(&self) -> Result<Vec<QueryResult<'a>>> {
        self.run(self.store.entries())
    }

    /// 执行检索
    ///
    /// 没有向量的查询图片会被直接跳过，之后按输入顺序截取前 `max_queries` 张。
    /// 返回结果的顺序与输入顺序一致。
    pub fn run(
        &self,
        queries: impl IntoIterator<Item = &'a ImageEntry>,
    ) -> Result<Vec<QueryResult<'a>>> {
        let queries = queries
            .into_iter()
            .filter(|q| q.record.is_some())
            .take(self.max_queries.unwrap_or(usize::MAX))
            .collect::<Vec<_>>();

        if queries.is_empty() {
            return Err(RetrievalError::NoUsableData("no query image has a VLAD vector"));
        }

        info!("对 {} 张查询图片进行 top-{} 检索", queries.len(), self.k);
        self.observer.start(queries.len());

        let results = if self.threads == 1 {
            queries.into_iter().map(|q| self.query_one(q)).collect::<Result<Vec<_>>>()?
        } else {
            let threads = if self.threads == 0 { num_cpus::get() } else { self.threads };
            debug!("使用 {threads} 个线程检索");
            let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
            // par_iter 的 collect 会保持原有顺序
            pool.install(|| {
                queries.into_par_iter().map(|q| self.query_one(q)).collect::<Result<Vec<_>>>()
            })?
        };

        self.observer.finish();
        Ok(results)
    }

    fn query_one(&self, query: &'a ImageEntry) -> Result<QueryResult<'a>> {
        // run 中已经过滤掉了没有向量的图片
        let vector = query.vector().unwrap_or_default();
        let matches = top_k(vector, self.store.retrievable(), self.k, &query.id)?;
        self.observer.advance(query);
        Ok(QueryResult { query, matches })
    }
}
