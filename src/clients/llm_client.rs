//! LLM 生成客户端
//!
//! 编排层只依赖 [`GenerationClient`] trait，不关心具体模型和协议。
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ServiceError;

/// 文本生成能力
///
/// 实现必须可以在多个调用之间（包括并发调用）安全复用，不保存单次调用的状态
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// 发送一次补全请求，返回模型的原始文本
    async fn complete(
        &self,
        user_message: &str,
        system_message: Option<&str>,
        max_output_tokens: u32,
    ) -> Result<String, ServiceError>;
}

/// 兼容 OpenAI API 的生成客户端
pub struct OpenAiGenerationClient {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
}

impl OpenAiGenerationClient {
    /// 创建新的客户端
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            temperature: config.llm_temperature,
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    fn build_messages(
        &self,
        user_message: &str,
        system_message: Option<&str>,
    ) -> Result<Vec<ChatCompletionRequestMessage>, ServiceError> {
        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(|e| ServiceError::InvalidRequest(e.to_string()))?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(|e| ServiceError::InvalidRequest(e.to_string()))?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        Ok(messages)
    }
}

#[async_trait]
impl GenerationClient for OpenAiGenerationClient {
    async fn complete(
        &self,
        user_message: &str,
        system_message: Option<&str>,
        max_output_tokens: u32,
    ) -> Result<String, ServiceError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!(
            "用户消息长度: {} 字符, max_tokens: {}",
            user_message.len(),
            max_output_tokens
        );

        let messages = self.build_messages(user_message, system_message)?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(max_output_tokens)
            .build()
            .map_err(|e| ServiceError::InvalidRequest(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            ServiceError::api_call_failed(&self.model_name, e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| ServiceError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok(content.trim().to_string())
    }
}
