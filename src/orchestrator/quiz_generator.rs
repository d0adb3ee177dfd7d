//! 单个请求生成器 - 编排层
//!
//! ## 职责
//!
//! 本模块负责把一个生成请求拆成多个批次并汇总结果，是请求级别的编排器。
//!
//! ## 核心功能
//!
//! 1. **主题规划**：委托 `TopicPlanner` 得到主题列表
//! 2. **批次调度**：把总题数分到每个主题，目标为 0 的主题直接跳过
//! 3. **流程调度**：为每个主题运行 `BatchFlow`（带重试）
//! 4. **结果汇总**：按主题顺序拼接，按模式决定是否打乱
//!
//! 单个主题失败不会影响其他主题，也不会让整个请求失败

use futures::stream::{self, StreamExt};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::{debug, info};

use crate::clients::GenerationClient;
use crate::config::GeneratorSettings;
use crate::error::{GenerationError, GenerationResult};
use crate::models::catalog::TopicTable;
use crate::models::question::{BatchOutcome, BatchTarget, GenerationOutcome};
use crate::models::request::GenerationRequest;
use crate::services::aggregator::{self, AggregationMode};
use crate::services::batch_scheduler;
use crate::services::prompt::{self, Prompt, MIN_MATERIAL_CHARS};
use crate::services::topic_planner::TopicPlanner;
use crate::workflow::{BatchCtx, BatchFlow};

/// 测验生成器
///
/// 客户端在构造时显式传入，生成器本身不持有可变状态
pub struct QuizGenerator {
    planner: TopicPlanner,
    flow: BatchFlow,
    settings: GeneratorSettings,
}

impl QuizGenerator {
    pub fn new(
        client: Arc<dyn GenerationClient>,
        topics: Arc<TopicTable>,
        settings: GeneratorSettings,
    ) -> Self {
        Self {
            planner: TopicPlanner::new(topics),
            flow: BatchFlow::new(client, settings.clone()),
            settings,
        }
    }

    /// 按主题计划生成，结果打乱顺序
    pub async fn generate(&self, request: &GenerationRequest, request_index: usize) -> GenerationOutcome {
        let plan = self.planner.plan(request);
        let targets = batch_scheduler::schedule(request.total_count(), plan.topics());

        log_plan(request_index, request, plan.len(), plan.is_fallback(), &targets);

        let topic_total = targets.len();
        let jobs: Vec<(BatchCtx, Prompt)> = targets
            .into_iter()
            .enumerate()
            .filter(|(_, target)| target.target_count > 0)
            .map(|(idx, target)| {
                let prompt = prompt::topic_prompt(request, &target.topic, target.target_count);
                let ctx = BatchCtx::new(request_index, idx + 1, topic_total, target.topic, target.target_count);
                (ctx, prompt)
            })
            .collect();

        if jobs.len() < topic_total {
            debug!(
                "[请求 {}] 跳过 {} 个目标为 0 的主题",
                request_index,
                topic_total - jobs.len()
            );
        }

        let outcomes = self.run_batches(&jobs).await;

        aggregator::aggregate(
            outcomes,
            request.total_count(),
            AggregationMode::Randomized,
            &mut self.rng(),
        )
    }

    /// 基于学习材料单批生成，保持模型返回的顺序
    pub async fn generate_from_material(
        &self,
        request: &GenerationRequest,
        material: &str,
        request_index: usize,
    ) -> GenerationResult<GenerationOutcome> {
        let material = material.trim();
        let len = material.chars().count();
        if len < MIN_MATERIAL_CHARS {
            return Err(GenerationError::InsufficientMaterial {
                len,
                min: MIN_MATERIAL_CHARS,
            });
        }

        let material = prompt::truncate_material(material);
        info!(
            "[请求 {}] 📄 学习材料模式: {} 个字符, {} 道题",
            request_index,
            material.chars().count(),
            request.total_count()
        );

        let ctx = BatchCtx::new(request_index, 1, 1, request.display_title(), request.total_count());
        let prompt = prompt::material_prompt(request, material, request.total_count());
        let outcome = self.flow.run(&ctx, &prompt).await;

        Ok(aggregator::aggregate(
            vec![outcome],
            request.total_count(),
            AggregationMode::Ordered,
            &mut self.rng(),
        ))
    }

    /// 运行所有批次，结果按主题计划顺序返回（与完成顺序无关）
    async fn run_batches(&self, jobs: &[(BatchCtx, Prompt)]) -> Vec<BatchOutcome> {
        let batches: Vec<_> = jobs
            .iter()
            .map(|(ctx, prompt)| self.flow.run(ctx, prompt))
            .collect();

        stream::iter(batches)
            .buffered(self.settings.max_concurrent_topics.max(1))
            .collect()
            .await
    }

    fn rng(&self) -> StdRng {
        match self.settings.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

// ========== 日志辅助函数 ==========

fn log_plan(
    request_index: usize,
    request: &GenerationRequest,
    topic_count: usize,
    fallback: bool,
    targets: &[BatchTarget],
) {
    info!("[请求 {}] 开始生成: {}", request_index, request);
    if request.was_clamped() {
        info!(
            "[请求 {}] 请求 {} 道题，超过上限，按 {} 道处理",
            request_index, request.requested_count(), request.total_count()
        );
    }
    if fallback {
        info!("[请求 {}] 主题表中没有对应条目，使用科目名称作为唯一主题", request_index);
    } else {
        info!("[请求 {}] 主题数量: {}", request_index, topic_count);
    }
    for target in targets {
        debug!("[请求 {}]   {} → {} 道", request_index, target.topic, target.target_count);
    }
}
