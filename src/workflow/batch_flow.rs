//! 批次处理流程 - 流程层（重试控制器）
//!
//! 核心职责：定义"一个主题"的完整生成流程
//!
//! 状态流转：
//! Pending → Attempting → Success
//!                      → Attempting（重试）
//!                      → Exhausted（3 次全部失败）
//!
//! 失败只影响当前主题，不会向调用方抛出错误

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::clients::GenerationClient;
use crate::config::GeneratorSettings;
use crate::error::{AttemptError, ParseError, ServiceError};
use crate::models::question::BatchOutcome;
use crate::services::prompt::Prompt;
use crate::services::response_parser::{self, ParsedBatch};
use crate::workflow::batch_ctx::BatchCtx;

/// 每个主题最多尝试的次数
pub const MAX_ATTEMPTS: usize = 3;

/// 单次尝试的结果
#[derive(Debug)]
pub enum AttemptResult {
    /// 调用成功且至少有一道合格题目
    Success(ParsedBatch),
    /// 调用成功但响应无法使用
    ParseFailed(ParseError),
    /// 调用失败（网络、额度、超时）
    ServiceFailed(ServiceError),
}

impl AttemptResult {
    pub fn into_result(self) -> Result<ParsedBatch, AttemptError> {
        match self {
            AttemptResult::Success(batch) => Ok(batch),
            AttemptResult::ParseFailed(e) => Err(e.into()),
            AttemptResult::ServiceFailed(e) => Err(e.into()),
        }
    }
}

/// 批次处理流程
///
/// - 不持有任何可变状态，可以同时处理多个主题
/// - 只依赖生成客户端和解析能力
pub struct BatchFlow {
    client: Arc<dyn GenerationClient>,
    settings: GeneratorSettings,
}

impl BatchFlow {
    pub fn new(client: Arc<dyn GenerationClient>, settings: GeneratorSettings) -> Self {
        Self { client, settings }
    }

    /// 运行一个批次，直到成功或重试耗尽
    pub async fn run(&self, ctx: &BatchCtx, prompt: &Prompt) -> BatchOutcome {
        let max_tokens = self.settings.token_budget(ctx.target_count);
        let mut last_error = None;

        info!("{} 🤖 开始生成 {} 道题目", ctx, ctx.target_count);

        for attempt in 1..=MAX_ATTEMPTS {
            debug!("{} 第 {}/{} 次尝试 (max_tokens: {})", ctx, attempt, MAX_ATTEMPTS, max_tokens);

            match self.attempt(prompt, max_tokens).await.into_result() {
                Ok(batch) => {
                    let mut records = batch.records;
                    if !batch.rejected.is_empty() {
                        warn!("{} ⚠️ 丢弃 {} 道不合格题目", ctx, batch.rejected.len());
                    }
                    if records.len() > ctx.target_count {
                        debug!("{} 返回 {} 道题，截断到 {}", ctx, records.len(), ctx.target_count);
                        records.truncate(ctx.target_count);
                    }

                    info!(
                        "{} ✓ 生成成功: {}/{} 道 (尝试 {} 次)",
                        ctx,
                        records.len(),
                        ctx.target_count,
                        attempt
                    );
                    return BatchOutcome::success(&ctx.topic, ctx.target_count, records, attempt);
                }
                Err(e) => {
                    warn!("{} ⚠️ 第 {}/{} 次尝试失败: {}", ctx, attempt, MAX_ATTEMPTS, e);
                    last_error = Some(e.to_string());

                    if attempt < MAX_ATTEMPTS && !self.settings.retry_delay.is_zero() {
                        tokio::time::sleep(self.settings.retry_delay).await;
                    }
                }
            }
        }

        warn!("{} ❌ 已尝试 {} 次，放弃该主题", ctx, MAX_ATTEMPTS);
        BatchOutcome::exhausted(&ctx.topic, ctx.target_count, MAX_ATTEMPTS, last_error)
    }

    /// 单次尝试：调用 + 解析
    async fn attempt(&self, prompt: &Prompt, max_tokens: u32) -> AttemptResult {
        let call = self.client.complete(&prompt.user, Some(&prompt.system), max_tokens);

        let raw_text = match tokio::time::timeout(self.settings.call_timeout, call).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => return AttemptResult::ServiceFailed(e),
            Err(_) => {
                return AttemptResult::ServiceFailed(ServiceError::Timeout {
                    secs: self.settings.call_timeout.as_secs_f64(),
                })
            }
        };

        match response_parser::parse_response(&raw_text) {
            Ok(batch) => AttemptResult::Success(batch),
            Err(e) => AttemptResult::ParseFailed(e),
        }
    }
}
