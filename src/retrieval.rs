use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::distance::l2;
use crate::error::{Result, RetrievalError};
use crate::store::ImageEntry;

/// 一条检索结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedMatch<'a> {
    pub entry: &'a ImageEntry,
    pub distance: f32,
}

/// 候选项在输入中的位置及其距离
#[derive(Debug, Clone, Copy)]
struct Neighbor {
    pos: usize,
    distance: f32,
}

// 先比较距离，距离相同时比较输入顺序，保证结果稳定
// NaN 无论符号位如何都排在最后
impl Ord for Neighbor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .is_nan()
            .cmp(&other.distance.is_nan())
            .then_with(|| self.distance.total_cmp(&other.distance))
            .then(self.pos.cmp(&other.pos))
    }
}

impl PartialOrd for Neighbor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Neighbor {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Neighbor {}

/// 只保留最小的 k 个元素的大顶堆
struct TopKNeighbors {
    heap: BinaryHeap<Neighbor>,
    k: usize,
}

impl TopKNeighbors {
    fn new(k: usize) -> Self {
        Self { heap: BinaryHeap::with_capacity(k + 1), k }
    }

    fn push(&mut self, neighbor: Neighbor) {
        if self.heap.len() < self.k {
            self.heap.push(neighbor);
        } else if self.heap.peek().is_some_and(|top| neighbor < *top) {
            self.heap.pop();
            self.heap.push(neighbor);
        }
    }

    /// 按距离从小到大返回
    fn into_sorted_vec(self) -> Vec<Neighbor> {
        self.heap.into_sorted_vec()
    }
}

/// 暴力检索与 query 距离最近的 k 个候选项
///
/// 参数：
/// - query: 查询向量
/// - candidates: 候选图片，没有向量的会被跳过
/// - k: 返回的最近邻居数量
/// - exclude: 需要排除的图片 ID，通常是查询图片本身
///
/// 结果按距离升序排列，距离相同时保持候选项的输入顺序。
pub fn top_k<'a>(
    query: &[f32],
    candidates: impl IntoIterator<Item = &'a ImageEntry>,
    k: usize,
    exclude: &str,
) -> Result<Vec<RankedMatch<'a>>> {
    if k == 0 {
        return Ok(vec![]);
    }

    let mut eligible = vec![];
    let mut topk = TopKNeighbors::new(k);
    for entry in candidates {
        if entry.id == exclude {
            continue;
        }
        let Some(vector) = entry.vector() else {
            continue;
        };
        if vector.len() != query.len() {
            return Err(RetrievalError::DimensionMismatch {
                expected: query.len(),
                actual: vector.len(),
            });
        }
        topk.push(Neighbor { pos: eligible.len(), distance: l2(query, vector) });
        eligible.push(entry);
    }

    Ok(topk
        .into_sorted_vec()
        .into_iter()
        .map(|n| RankedMatch { entry: eligible[n.pos], distance: n.distance })
        .collect())
}
