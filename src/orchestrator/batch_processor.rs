//! 批量请求处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量请求的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：创建日志文件、加载科目目录、显式构造生成客户端
//! 2. **批量加载**：扫描并加载所有待处理的请求（`Vec<RequestSpec>`）
//! 3. **并发控制**：使用 Semaphore 限制同时处理的请求数量
//! 4. **分批处理**：将请求分批次处理，每批完成后再开始下一批
//! 5. **全局统计**：汇总所有请求的处理结果
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单个请求的细节
//! - **资源所有者**：唯一创建生成客户端的模块
//! - **向下委托**：委托 request_processor 处理单个请求

use crate::clients::{GenerationClient, OpenAiGenerationClient};
use crate::config::Config;
use crate::models::catalog::Catalog;
use crate::models::request::RequestSpec;
use crate::models::loaders;
use crate::orchestrator::quiz_generator::QuizGenerator;
use crate::orchestrator::request_processor::{self, RequestReport};
use crate::services::outcome_writer::OutcomeWriter;
use crate::utils::logging;
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    catalog: Arc<Catalog>,
    generator: Arc<QuizGenerator>,
    writer: Arc<OutcomeWriter>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        logging::init_log_file(&config.output_log_file)?;

        logging::log_startup(&config);

        let catalog = loaders::load_catalog(Path::new(&config.catalog_file))
            .await
            .context("加载科目目录失败")?;
        info!(
            "✓ 科目目录: {} 个科目, {} 组主题",
            catalog.subject_count(),
            catalog.topics().len()
        );

        let client: Arc<dyn GenerationClient> = Arc::new(OpenAiGenerationClient::new(&config));

        Ok(Self::with_client(config, catalog, client))
    }

    /// 使用指定的生成客户端创建应用
    pub fn with_client(config: Config, catalog: Catalog, client: Arc<dyn GenerationClient>) -> Self {
        let topics = Arc::new(catalog.topics().clone());
        let generator = QuizGenerator::new(client, topics, config.generator_settings());
        let writer = OutcomeWriter::new(&config.output_folder);

        Self {
            config,
            catalog: Arc::new(catalog),
            generator: Arc::new(generator),
            writer: Arc::new(writer),
        }
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<ProcessingStats> {
        let all_requests = self.load_requests().await?;

        if all_requests.is_empty() {
            warn!("⚠️ 没有找到待处理的请求文件，程序结束");
            return Ok(ProcessingStats::default());
        }

        let total_requests = all_requests.len();
        logging::log_requests_loaded(total_requests, self.config.max_concurrent_requests);

        let stats = self.process_all_requests(all_requests).await?;

        logging::print_final_stats(&stats, &self.config.output_log_file);

        Ok(stats)
    }

    /// 加载请求
    async fn load_requests(&self) -> Result<Vec<RequestSpec>> {
        info!("📁 正在扫描待处理的请求...");
        loaders::load_all_request_files(&self.config.requests_folder).await
    }

    /// 处理所有请求
    async fn process_all_requests(&self, all_requests: Vec<RequestSpec>) -> Result<ProcessingStats> {
        let batch_size = self.config.max_concurrent_requests.max(1);
        let semaphore = Arc::new(Semaphore::new(batch_size));
        let total_requests = all_requests.len();
        let mut stats = ProcessingStats {
            total: total_requests,
            ..Default::default()
        };

        let total_batches = total_requests.div_ceil(batch_size);

        for batch_start in (0..total_requests).step_by(batch_size) {
            let batch_end = (batch_start + batch_size).min(total_requests);
            let batch_requests = &all_requests[batch_start..batch_end];
            let batch_num = (batch_start / batch_size) + 1;

            logging::log_batch_start(batch_num, total_batches, batch_start + 1, batch_end, total_requests);

            let batch_result = self
                .process_batch(batch_requests, batch_start, semaphore.clone())
                .await?;

            logging::log_batch_complete(batch_num, batch_result.succeeded, batch_result.succeeded + batch_result.failed);
            stats.absorb(batch_result);
        }

        Ok(stats)
    }

    /// 处理单个批次
    async fn process_batch(
        &self,
        batch_requests: &[RequestSpec],
        batch_start: usize,
        semaphore: Arc<Semaphore>,
    ) -> Result<ProcessingStats> {
        let mut batch_handles = Vec::new();

        for (idx, spec) in batch_requests.iter().enumerate() {
            let request_index = batch_start + idx + 1;
            let permit = semaphore.clone().acquire_owned().await?;

            let generator = self.generator.clone();
            let catalog = self.catalog.clone();
            let writer = self.writer.clone();
            let spec = spec.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                request_processor::process_request(&generator, &catalog, &writer, &spec, request_index)
                    .await
                    .map_err(|e| {
                        error!("[请求 {}] ❌ 处理失败: {:#}", request_index, e);
                        e
                    })
            });
            batch_handles.push((request_index, handle));
        }

        let mut result = ProcessingStats {
            total: batch_requests.len(),
            ..Default::default()
        };

        for (request_index, handle) in batch_handles {
            match handle.await {
                Ok(Ok(report)) => {
                    self.append_report(request_index, Ok(&report));
                    result.record_success(&report);
                }
                Ok(Err(e)) => {
                    self.append_report(request_index, Err(&e));
                    result.failed += 1;
                }
                Err(e) => {
                    error!("[请求 {}] 任务执行失败: {}", request_index, e);
                    result.failed += 1;
                }
            }
        }

        Ok(result)
    }

    /// 写日志文件失败只记录警告，不影响其他请求的结果
    fn append_report(&self, request_index: usize, report: std::result::Result<&RequestReport, &anyhow::Error>) {
        if let Err(e) = logging::append_report(&self.config.output_log_file, request_index, report) {
            warn!(
                "[请求 {}] ⚠️ 写入日志文件失败 ({}): {:#}",
                request_index, self.config.output_log_file, e
            );
        }
    }
}

/// 处理统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessingStats {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// 实际生成的题目数
    pub questions: usize,
    /// 重试耗尽的主题数
    pub exhausted_topics: usize,
}

impl ProcessingStats {
    fn record_success(&mut self, report: &RequestReport) {
        self.succeeded += 1;
        self.questions += report.effective_count;
        self.exhausted_topics += report.failed_topics.len();
    }

    fn absorb(&mut self, batch: ProcessingStats) {
        self.succeeded += batch.succeeded;
        self.failed += batch.failed;
        self.questions += batch.questions;
        self.exhausted_topics += batch.exhausted_topics;
    }
}
