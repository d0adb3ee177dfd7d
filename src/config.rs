use std::time::Duration;

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 同时处理的请求数量
    pub max_concurrent_requests: usize,
    /// 单个请求内同时生成的主题数量（1 表示按顺序逐个生成）
    pub max_concurrent_topics: usize,
    /// 请求 TOML 文件存放目录
    pub requests_folder: String,
    /// 生成结果 JSON 输出目录
    pub output_folder: String,
    /// 科目 / 保存配置 / 主题表 所在的 TOML 文件
    pub catalog_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    /// 打乱题目顺序时使用的随机种子（不设置则每次不同）
    pub shuffle_seed: Option<u64>,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_temperature: f32,
    /// 单次调用超时（秒）
    pub llm_timeout_secs: u64,
    /// 每道题预留的输出 token 数
    pub tokens_per_question: u32,
    /// 单次调用的输出 token 上限
    pub max_output_tokens: u32,
    /// 两次重试之间的等待时间（毫秒）
    pub retry_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 4,
            max_concurrent_topics: 1,
            requests_folder: "requests".to_string(),
            output_folder: "output".to_string(),
            catalog_file: "data/catalog.toml".to_string(),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            shuffle_seed: None,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-3.5-turbo".to_string(),
            llm_temperature: 0.7,
            llm_timeout_secs: 60,
            tokens_per_question: 300,
            max_output_tokens: 4000,
            retry_delay_ms: 500,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_concurrent_requests: std::env::var("MAX_CONCURRENT_REQUESTS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_requests),
            max_concurrent_topics: std::env::var("MAX_CONCURRENT_TOPICS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_topics),
            requests_folder: std::env::var("REQUESTS_FOLDER").unwrap_or(default.requests_folder),
            output_folder: std::env::var("OUTPUT_FOLDER").unwrap_or(default.output_folder),
            catalog_file: std::env::var("CATALOG_FILE").unwrap_or(default.catalog_file),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            shuffle_seed: std::env::var("SHUFFLE_SEED").ok().and_then(|v| v.parse().ok()).or(default.shuffle_seed),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            llm_temperature: std::env::var("LLM_TEMPERATURE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.llm_temperature),
            llm_timeout_secs: std::env::var("LLM_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.llm_timeout_secs),
            tokens_per_question: std::env::var("TOKENS_PER_QUESTION").ok().and_then(|v| v.parse().ok()).unwrap_or(default.tokens_per_question),
            max_output_tokens: std::env::var("MAX_OUTPUT_TOKENS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_output_tokens),
            retry_delay_ms: std::env::var("RETRY_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.retry_delay_ms),
        }
    }

    /// 提取编排层需要的参数
    pub fn generator_settings(&self) -> GeneratorSettings {
        GeneratorSettings {
            tokens_per_question: self.tokens_per_question,
            max_output_tokens: self.max_output_tokens,
            call_timeout: Duration::from_secs(self.llm_timeout_secs),
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            max_concurrent_topics: self.max_concurrent_topics.max(1),
            shuffle_seed: self.shuffle_seed,
        }
    }
}

/// 生成器运行参数
#[derive(Clone, Debug)]
pub struct GeneratorSettings {
    pub tokens_per_question: u32,
    pub max_output_tokens: u32,
    pub call_timeout: Duration,
    pub retry_delay: Duration,
    pub max_concurrent_topics: usize,
    pub shuffle_seed: Option<u64>,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Config::default().generator_settings()
    }
}

impl GeneratorSettings {
    /// 按目标题数计算单次调用的输出 token 预算
    pub fn token_budget(&self, target_count: usize) -> u32 {
        let wanted = (target_count as u64).saturating_mul(self.tokens_per_question as u64);
        wanted.min(self.max_output_tokens as u64) as u32
    }
}
