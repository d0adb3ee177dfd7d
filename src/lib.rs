//! # Quiz Generate
//!
//! 一个用于批量生成选择题测验的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 生成客户端的抽象与实现
//! - `GenerationClient` - 输入提示词，输出文本
//! - `OpenAiGenerationClient` - 基于 OpenAI 兼容接口的实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每个能力都是无状态的
//! - `TopicPlanner` - 主题规划
//! - `batch_scheduler` - 题数分配
//! - `prompt` - 提示词构造
//! - `response_parser` - 解析并校验模型输出
//! - `aggregator` - 汇总批次结果
//! - `OutcomeWriter` - 写结果文件
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个主题"的完整生成流程
//! - `BatchCtx` - 上下文封装（请求索引 + 主题位置）
//! - `BatchFlow` - 重试控制（调用 → 解析 → 重试/放弃）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量请求处理器，管理资源和并发
//! - `orchestrator/request_processor` - 单个请求处理器
//! - `orchestrator/quiz_generator` - 把一个请求拆成多个批次并汇总
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{GenerationClient, OpenAiGenerationClient};
pub use config::{Config, GeneratorSettings};
pub use error::{GenerationError, GenerationResult, ParseError, ServiceError};
pub use models::{Difficulty, GenerationOutcome, GenerationRequest, QuestionRecord, RequestSpec};
pub use orchestrator::{process_request, App, QuizGenerator};
pub use workflow::{BatchCtx, BatchFlow};
