use thiserror::Error;

/// 请求级错误
///
/// 在任何生成工作开始之前就会返回给调用方，不做重试
#[derive(Debug, Error)]
pub enum GenerationError {
    /// 保存的测验配置不存在
    #[error("测验配置不存在: {config_id}")]
    ConfigurationNotFound { config_id: u64 },
    /// 科目不存在
    #[error("科目不存在: {subject_id}")]
    SubjectNotFound { subject_id: u64 },
    /// 题目数量为 0
    #[error("题目数量必须大于 0")]
    InvalidQuestionCount,
    /// 学习材料可用文本过少
    #[error("学习材料文本不足: 只有 {len} 个字符，至少需要 {min} 个")]
    InsufficientMaterial { len: usize, min: usize },
    /// 请求没有指定任何题目来源
    #[error("请求必须指定 config_id、subject_id 或 material_file 之一")]
    MissingSource,
}

/// 生成服务错误（可重试）
#[derive(Debug, Error)]
pub enum ServiceError {
    /// API 调用失败（网络、额度等）
    #[error("LLM API调用失败 (模型: {model}): {message}")]
    ApiCallFailed { model: String, message: String },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
    /// 请求构建失败
    #[error("LLM请求构建失败: {0}")]
    InvalidRequest(String),
    /// 调用超时
    #[error("LLM调用超时 ({secs:.1} 秒)")]
    Timeout { secs: f64 },
}

/// 模型输出解析错误（可重试）
#[derive(Debug, Error)]
pub enum ParseError {
    /// 找不到 JSON 数组
    #[error("响应中没有找到 JSON 数组")]
    NoArray,
    /// JSON 解码失败
    #[error("JSON解析失败: {0}")]
    InvalidJson(#[from] serde_json::Error),
    /// 所有题目都没有通过校验
    #[error("没有合格的题目 (丢弃 {rejected} 个)")]
    NoValidRecords { rejected: usize },
}

/// 单次尝试的失败原因
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// 目录文件加载错误
#[derive(Debug, Error)]
pub enum CatalogError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 便捷构造函数 ==========

impl ServiceError {
    /// 创建LLM API调用错误
    pub fn api_call_failed(model: impl Into<String>, source: impl std::fmt::Display) -> Self {
        ServiceError::ApiCallFailed {
            model: model.into(),
            message: source.to_string(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 请求级结果类型
pub type GenerationResult<T> = Result<T, GenerationError>;
