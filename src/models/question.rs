use serde::{Deserialize, Serialize};

/// 每道选择题的选项数量
pub const OPTION_COUNT: usize = 4;

/// 通过校验的选择题
///
/// 只由响应解析器构造，保证 `options.len() == 4` 且 `correct_answer < 4`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    #[serde(default)]
    pub explanation: String,
}

impl std::fmt::Display for QuestionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let preview = if self.question.chars().count() > 80 {
            self.question.chars().take(80).collect::<String>() + "..."
        } else {
            self.question.clone()
        };
        write!(f, "{} [答案: {}]", preview, self.correct_answer)
    }
}

/// 单个主题分到的目标题数
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchTarget {
    pub topic: String,
    pub target_count: usize,
}

/// 单个主题的生成结果
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub topic: String,
    pub requested_count: usize,
    pub records: Vec<QuestionRecord>,
    pub attempts_consumed: usize,
    pub succeeded: bool,
    /// 最后一次失败的原因（成功时为 None）
    pub last_error: Option<String>,
}

impl BatchOutcome {
    pub fn success(topic: impl Into<String>, requested_count: usize, records: Vec<QuestionRecord>, attempts: usize) -> Self {
        Self {
            topic: topic.into(),
            requested_count,
            records,
            attempts_consumed: attempts,
            succeeded: true,
            last_error: None,
        }
    }

    pub fn exhausted(topic: impl Into<String>, requested_count: usize, attempts: usize, last_error: Option<String>) -> Self {
        Self {
            topic: topic.into(),
            requested_count,
            records: Vec::new(),
            attempts_consumed: attempts,
            succeeded: false,
            last_error,
        }
    }
}

/// 整个请求的生成结果，交给持久化方
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationOutcome {
    pub records: Vec<QuestionRecord>,
    /// 重试耗尽的主题（按主题计划顺序）
    pub failed_topics: Vec<String>,
    /// 参与调度的题目总数
    pub total_count: usize,
    /// 所有主题消耗的调用次数
    pub attempts_consumed: usize,
}

impl GenerationOutcome {
    /// 实际生成的题目数量
    pub fn effective_count(&self) -> usize {
        self.records.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed_topics.is_empty() && self.records.len() >= self.total_count
    }
}
