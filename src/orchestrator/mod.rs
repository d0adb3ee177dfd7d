//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量请求处理器
//! - 管理应用生命周期（初始化、运行）
//! - 批量加载请求文件（Vec<RequestSpec>）
//! - 控制并发数量（Semaphore）
//! - 唯一创建生成客户端的地方
//! - 输出全局统计信息
//!
//! ### `request_processor` - 单个请求处理器
//! - 通过科目目录解析请求
//! - 按生成模式分派（主题计划 / 学习材料）
//! - 写入结果文件
//!
//! ### `quiz_generator` - 测验生成器
//! - 主题规划 → 批次调度 → 逐主题生成 → 汇总
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<RequestSpec>)
//!     ↓
//! request_processor (处理单个 RequestSpec)
//!     ↓
//! quiz_generator (处理单个 GenerationRequest)
//!     ↓
//! workflow::BatchFlow (处理单个主题，带重试)
//!     ↓
//! services (能力层：planner / scheduler / prompt / parser / aggregator)
//!     ↓
//! clients (生成客户端)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：batch_processor 管批量，request_processor 管单个请求
//! 2. **资源隔离**：只有编排层创建生成客户端，其他层通过参数拿到它
//! 3. **向下依赖**：编排层 → workflow → services → clients

pub mod batch_processor;
pub mod quiz_generator;
pub mod request_processor;

// 重新导出主要类型
pub use batch_processor::{App, ProcessingStats};
pub use quiz_generator::QuizGenerator;
pub use request_processor::{process_request, RequestReport};
