//! 批次调度
//!
//! 把总题数平均分到每个主题上，余数按主题顺序从前往后各加一道

use crate::models::question::BatchTarget;

/// 计算每个主题的目标题数
///
/// 返回值与 `topics` 一一对应，目标为 0 的主题也会保留，由调用方跳过
pub fn schedule(total_count: usize, topics: &[String]) -> Vec<BatchTarget> {
    if topics.is_empty() {
        return Vec::new();
    }

    let k = topics.len();
    let base = total_count / k;
    let remainder = total_count % k;

    topics
        .iter()
        .enumerate()
        .map(|(i, topic)| BatchTarget {
            topic: topic.clone(),
            target_count: if i < remainder { base + 1 } else { base },
        })
        .collect()
}
