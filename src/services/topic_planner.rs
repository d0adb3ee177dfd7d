//! 主题规划 - 业务能力层
//!
//! 只负责"这个科目要分成哪些主题"，不关心题目数量和生成流程

use std::sync::Arc;
use tracing::debug;

use crate::models::catalog::{TopicKey, TopicTable};
use crate::models::request::GenerationRequest;

/// 主题计划
///
/// 永远非空：主题表里没有对应条目时退化为只包含科目名称的单元素计划
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicPlan {
    topics: Vec<String>,
    fallback: bool,
}

impl TopicPlan {
    /// 主题表中没有条目时使用的计划
    pub fn fallback(subject: &str) -> Self {
        Self {
            topics: vec![subject.to_string()],
            fallback: true,
        }
    }

    /// 单个主题（学习材料模式使用）
    pub fn single(topic: impl Into<String>) -> Self {
        Self {
            topics: vec![topic.into()],
            fallback: false,
        }
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback
    }
}

/// 主题规划器
pub struct TopicPlanner {
    table: Arc<TopicTable>,
}

impl TopicPlanner {
    pub fn new(table: Arc<TopicTable>) -> Self {
        Self { table }
    }

    /// 为请求生成主题计划
    pub fn plan(&self, request: &GenerationRequest) -> TopicPlan {
        let key = TopicKey::for_request(request);

        match self.table.get(&key) {
            Some(labels) => {
                let topics: Vec<String> = labels
                    .iter()
                    .map(|label| label.trim())
                    .filter(|label| !label.is_empty())
                    .map(str::to_string)
                    .collect();

                if topics.is_empty() {
                    debug!("主题表条目为空，使用科目名称: {}", request.subject);
                    return TopicPlan::fallback(&request.subject);
                }

                TopicPlan {
                    topics,
                    fallback: false,
                }
            }
            None => {
                debug!("主题表中没有 {:?}，使用科目名称", key);
                TopicPlan::fallback(&request.subject)
            }
        }
    }
}
