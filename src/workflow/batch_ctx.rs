//! 批次处理上下文
//!
//! 封装"我正在处理哪个请求的第几个主题"这一信息

use std::fmt::Display;

/// 批次处理上下文
#[derive(Debug, Clone)]
pub struct BatchCtx {
    /// 请求索引（仅用于日志显示）
    pub request_index: usize,

    /// 主题在计划中的位置（从1开始）
    pub topic_index: usize,

    /// 计划中的主题总数
    pub topic_total: usize,

    /// 主题名称
    pub topic: String,

    /// 本批次的目标题数
    pub target_count: usize,
}

impl BatchCtx {
    pub fn new(
        request_index: usize,
        topic_index: usize,
        topic_total: usize,
        topic: String,
        target_count: usize,
    ) -> Self {
        Self {
            request_index,
            topic_index,
            topic_total,
            topic,
            target_count,
        }
    }
}

impl Display for BatchCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[请求 {} | 主题 {}/{} {}]",
            self.request_index, self.topic_index, self.topic_total, self.topic
        )
    }
}
