use anyhow::Result;
/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use std::fs::{self, OpenOptions};
use std::io::Write;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::orchestrator::batch_processor::ProcessingStats;
use crate::orchestrator::request_processor::RequestReport;

/// 初始化 tracing 订阅器
///
/// `RUST_LOG` 优先；否则按 verbose 选择 debug 或 info。重复调用不会报错。
pub fn init(verbose: bool) {
    let default_level = if verbose {
        "info,quiz_generate=debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化日志文件
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n测验生成日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 向日志文件追加一行
pub fn append_log_line(log_file_path: &str, line: &str) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(log_file_path)?;
    writeln!(file, "{}", line)?;
    Ok(())
}

/// 把单个请求的处理结果写入日志文件
pub fn append_report(
    log_file_path: &str,
    request_index: usize,
    report: std::result::Result<&RequestReport, &anyhow::Error>,
) -> Result<()> {
    let line = match report {
        Ok(report) => {
            let mut line = format!(
                "[请求 {}] ✅ {} | {}/{} 道题",
                request_index,
                truncate_text(&report.title, 40),
                report.effective_count,
                report.total_count
            );
            if !report.failed_topics.is_empty() {
                line.push_str(&format!(" | 失败主题: {}", report.failed_topics.join(", ")));
            }
            if let Some(path) = &report.output_path {
                line.push_str(&format!(" | {}", path.display()));
            }
            line
        }
        Err(e) => format!("[请求 {}] ❌ {:#}", request_index, e),
    };
    append_log_line(log_file_path, &line)
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 测验批量生成模式");
    info!("🤖 模型: {} (temperature {})", config.llm_model_name, config.llm_temperature);
    info!(
        "📊 最大并发: {} 个请求, 每个请求 {} 个主题",
        config.max_concurrent_requests, config.max_concurrent_topics
    );
    info!("{}", "=".repeat(60));
}

/// 记录请求加载信息
pub fn log_requests_loaded(total: usize, max_concurrent: usize) {
    info!("✓ 找到 {} 个待处理的请求", total);
    info!("📋 将以每批 {} 个的方式处理", max_concurrent);
    info!("💡 每批完成后再开始下一批\n");
}

/// 记录批次开始信息
pub fn log_batch_start(batch_num: usize, total_batches: usize, start: usize, end: usize, total: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始处理第 {}/{} 批", batch_num, total_batches);
    info!("📄 本批请求: {}-{} / 共 {} 个", start, end, total);
    info!("{}", "=".repeat(60));
}

/// 记录批次完成信息
pub fn log_batch_complete(batch_num: usize, success: usize, total: usize) {
    info!("\n{}", "─".repeat(60));
    info!("✓ 第 {} 批完成: 成功 {}/{}", batch_num, success, total);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(stats: &ProcessingStats, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!("完成时间: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", stats.succeeded, stats.total);
    info!("❌ 失败: {}", stats.failed);
    info!("📝 生成题目: {} 道", stats.questions);
    if stats.exhausted_topics > 0 {
        info!("⚠️ 重试耗尽的主题: {} 个", stats.exhausted_topics);
    }
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("数学测验", 2), "数学...");
        assert_eq!(truncate_text("short", 10), "short");
    }

    #[test]
    fn test_log_file_header_and_report_lines() {
        let dir = std::env::temp_dir().join(format!("quiz_log_test_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("output.txt");
        let path_str = path.to_str().unwrap();

        init_log_file(path_str).unwrap();
        let report = RequestReport {
            title: "Mathematics - Easy Quiz".into(),
            total_count: 10,
            effective_count: 8,
            failed_topics: vec!["Algebra".into()],
            output_path: Some(PathBuf::from("output/a.json")),
        };
        append_report(path_str, 1, Ok(&report)).unwrap();
        append_report(path_str, 2, Err(&anyhow::anyhow!("科目不存在"))).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("测验生成日志"));
        assert!(content.contains("[请求 1] ✅ Mathematics - Easy Quiz | 8/10 道题 | 失败主题: Algebra"));
        assert!(content.contains("[请求 2] ❌ 科目不存在"));

        fs::remove_dir_all(&dir).unwrap();
    }
}
