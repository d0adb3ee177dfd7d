//! 生成请求
//!
//! `RequestSpec` 是请求文件的原始内容，`GenerationRequest` 是解析并校验之后的不可变请求

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{GenerationError, GenerationResult};

/// 单个请求允许的最大题目数量
pub const MAX_QUESTIONS: usize = 100;

/// 学习材料模式下没有指定标题时使用的标题
pub const UNTITLED_QUIZ: &str = "Untitled Quiz";

/// 难度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// 首字母大写的名称，用于默认标题
    pub fn title_case(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 生成模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// 按主题拆分生成，结果打乱顺序
    TopicPlanned,
    /// 基于学习材料单批生成，保持顺序
    Document,
}

/// 请求文件内容
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<u64>,
    /// 学习材料（纯文本文件）路径
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_file: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default = "default_num_questions")]
    pub num_questions: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing, skip_deserializing)]
    pub file_path: Option<String>,
}

fn default_num_questions() -> usize {
    10
}

impl Default for RequestSpec {
    fn default() -> Self {
        Self {
            config_id: None,
            subject_id: None,
            material_file: None,
            difficulty: Difficulty::default(),
            num_questions: default_num_questions(),
            title: None,
            file_path: None,
        }
    }
}

impl RequestSpec {
    pub fn with_file_path(mut self, file_path: String) -> Self {
        self.file_path = Some(file_path);
        self
    }
}

/// 校验后的生成请求
///
/// 只能通过 [`GenerationRequest::new`] 创建，题目数量在创建之后不可修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    pub category: String,
    pub level: String,
    pub subject: String,
    pub difficulty: Difficulty,
    /// 截断到 [`MAX_QUESTIONS`] 之后的题目数量
    total_count: usize,
    /// 调用方原始请求的数量
    requested_count: usize,
    pub title: Option<String>,
}

impl GenerationRequest {
    pub fn new(
        category: impl Into<String>,
        level: impl Into<String>,
        subject: impl Into<String>,
        difficulty: Difficulty,
        requested_count: usize,
        title: Option<String>,
    ) -> GenerationResult<Self> {
        if requested_count == 0 {
            return Err(GenerationError::InvalidQuestionCount);
        }

        Ok(Self {
            category: category.into(),
            level: level.into(),
            subject: subject.into(),
            difficulty,
            total_count: requested_count.min(MAX_QUESTIONS),
            requested_count,
            title: title.filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn requested_count(&self) -> usize {
        self.requested_count
    }

    /// 请求数量是否被截断
    pub fn was_clamped(&self) -> bool {
        self.requested_count > self.total_count
    }

    /// 标题，未指定时使用 "科目 - 难度 Quiz"
    pub fn display_title(&self) -> String {
        match &self.title {
            Some(title) => title.clone(),
            None => format!("{} - {} Quiz", self.subject, self.difficulty.title_case()),
        }
    }
}

impl fmt::Display for GenerationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} / {} ({}, {} 题)",
            self.category, self.level, self.subject, self.difficulty, self.total_count
        )
    }
}
