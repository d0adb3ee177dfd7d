//! 单个请求处理器 - 编排层
//!
//! 解析请求文件 → 生成 → 写入结果。结构性错误（配置/科目不存在）在生成前直接返回。

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::models::catalog::Catalog;
use crate::models::loaders;
use crate::models::request::{GenerationMode, RequestSpec};
use crate::orchestrator::quiz_generator::QuizGenerator;
use crate::services::outcome_writer::OutcomeWriter;

/// 单个请求的处理报告
#[derive(Debug, Clone, Default)]
pub struct RequestReport {
    pub title: String,
    pub total_count: usize,
    pub effective_count: usize,
    pub failed_topics: Vec<String>,
    pub output_path: Option<PathBuf>,
}

/// 处理单个请求
pub async fn process_request(
    generator: &QuizGenerator,
    catalog: &Catalog,
    writer: &OutcomeWriter,
    spec: &RequestSpec,
    request_index: usize,
) -> Result<RequestReport> {
    let resolved = catalog.resolve(spec)?;
    let request = &resolved.request;

    let outcome = match resolved.mode {
        GenerationMode::TopicPlanned => generator.generate(request, request_index).await,
        GenerationMode::Document => {
            let material_path = material_path(spec, resolved.material_file.as_deref().unwrap_or_default());
            let material = loaders::load_material(&material_path).await?;
            generator
                .generate_from_material(request, &material, request_index)
                .await?
        }
    };

    if !outcome.failed_topics.is_empty() {
        warn!(
            "[请求 {}] ⚠️ {} 个主题重试耗尽: {}",
            request_index,
            outcome.failed_topics.len(),
            outcome.failed_topics.join(", ")
        );
    }

    let output_path = writer
        .write(&source_name(spec, request_index), request, resolved.mode, &outcome)
        .await?;

    info!(
        "[请求 {}] ✅ 完成: {}/{} 道题 → {}",
        request_index,
        outcome.effective_count(),
        outcome.total_count,
        output_path.display()
    );

    Ok(RequestReport {
        title: request.display_title(),
        total_count: outcome.total_count,
        effective_count: outcome.effective_count(),
        failed_topics: outcome.failed_topics,
        output_path: Some(output_path),
    })
}

/// 相对路径以请求文件所在目录为基准
fn material_path(spec: &RequestSpec, material_file: &str) -> PathBuf {
    let path = Path::new(material_file);
    if path.is_absolute() {
        return path.to_path_buf();
    }

    match spec.file_path.as_deref().and_then(|p| Path::new(p).parent()) {
        Some(dir) => dir.join(path),
        None => path.to_path_buf(),
    }
}

/// 结果文件名：请求文件名（不含扩展名），没有文件时使用请求索引
fn source_name(spec: &RequestSpec, request_index: usize) -> String {
    spec.file_path
        .as_deref()
        .and_then(|p| Path::new(p).file_stem())
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| format!("request-{}", request_index))
}
