//! 结果写入服务 - 业务能力层
//!
//! 只负责"把生成结果交给存储"：分配测验 ID 和题目顺序，写成 JSON 文件

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

use crate::models::question::{GenerationOutcome, QuestionRecord};
use crate::models::request::{Difficulty, GenerationMode, GenerationRequest};

/// 每道题的答题时间（秒）
pub const SECONDS_PER_QUESTION: usize = 60;

/// 带顺序的题目
#[derive(Debug, Serialize)]
pub struct OrderedQuestion<'a> {
    /// 从 1 开始
    pub order: usize,
    #[serde(flatten)]
    pub record: &'a QuestionRecord,
}

/// 写入存储的测验草稿
#[derive(Debug, Serialize)]
pub struct QuizDraft<'a> {
    pub quiz_id: String,
    pub title: String,
    pub category: &'a str,
    pub level: &'a str,
    pub subject: &'a str,
    pub difficulty: Difficulty,
    pub mode: GenerationMode,
    pub time_limit_secs: usize,
    pub requested_count: usize,
    pub total_count: usize,
    pub effective_count: usize,
    pub failed_topics: &'a [String],
    pub generated_at: String,
    pub questions: Vec<OrderedQuestion<'a>>,
}

impl<'a> QuizDraft<'a> {
    pub fn new(
        quiz_id: String,
        request: &'a GenerationRequest,
        mode: GenerationMode,
        outcome: &'a GenerationOutcome,
        generated_at: DateTime<Local>,
    ) -> Self {
        Self {
            quiz_id,
            title: request.display_title(),
            category: &request.category,
            level: &request.level,
            subject: &request.subject,
            difficulty: request.difficulty,
            mode,
            time_limit_secs: outcome.effective_count() * SECONDS_PER_QUESTION,
            requested_count: request.requested_count(),
            total_count: outcome.total_count,
            effective_count: outcome.effective_count(),
            failed_topics: &outcome.failed_topics,
            generated_at: generated_at.to_rfc3339(),
            questions: outcome
                .records
                .iter()
                .enumerate()
                .map(|(idx, record)| OrderedQuestion {
                    order: idx + 1,
                    record,
                })
                .collect(),
        }
    }
}

/// 结果写入服务
pub struct OutcomeWriter {
    output_folder: PathBuf,
}

impl OutcomeWriter {
    pub fn new(output_folder: impl Into<PathBuf>) -> Self {
        Self {
            output_folder: output_folder.into(),
        }
    }

    /// 写入一个请求的结果，返回文件路径
    pub async fn write(
        &self,
        source_name: &str,
        request: &GenerationRequest,
        mode: GenerationMode,
        outcome: &GenerationOutcome,
    ) -> Result<PathBuf> {
        let now = Local::now();
        let quiz_id = quiz_id(source_name, now);
        let draft = QuizDraft::new(quiz_id.clone(), request, mode, outcome, now);

        fs::create_dir_all(&self.output_folder)
            .await
            .with_context(|| format!("无法创建输出目录: {}", self.output_folder.display()))?;

        let path = self.output_folder.join(format!("{}.json", quiz_id));
        let content = serde_json::to_string_pretty(&draft)?;

        fs::write(&path, content)
            .await
            .with_context(|| format!("无法写入文件: {}", path.display()))?;

        debug!(
            "写入结果: {} | 题目 {} | 失败主题 {}",
            path.display(),
            draft.effective_count,
            draft.failed_topics.len()
        );

        Ok(path)
    }
}

/// 测验 ID：时间戳 + 请求文件名
fn quiz_id(source_name: &str, now: DateTime<Local>) -> String {
    let cleaned: String = source_name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{}-{}", now.format("%Y%m%d%H%M%S"), cleaned)
}
