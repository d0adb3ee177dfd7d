//! 科目目录
//!
//! 包含三部分：科目列表、用户保存的测验配置、主题表。
//! 主题表以 (category, level, subject, difficulty) 组合键索引。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{GenerationError, GenerationResult};
use crate::models::request::{Difficulty, GenerationMode, GenerationRequest, RequestSpec, UNTITLED_QUIZ};

/// 学习材料模式下没有指定科目时使用的名称
pub const GENERAL: &str = "General";

/// 科目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectEntry {
    pub id: u64,
    pub name: String,
    pub level: String,
    pub category: String,
}

/// 保存的测验配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedConfig {
    pub id: u64,
    pub subject_id: u64,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub number_of_questions: usize,
}

/// 主题表中的一行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicEntry {
    pub category: String,
    pub level: String,
    pub subject: String,
    pub difficulty: Difficulty,
    pub labels: Vec<String>,
}

/// 主题表组合键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TopicKey {
    pub category: String,
    pub level: String,
    pub subject: String,
    pub difficulty: Difficulty,
}

impl TopicKey {
    pub fn new(
        category: impl Into<String>,
        level: impl Into<String>,
        subject: impl Into<String>,
        difficulty: Difficulty,
    ) -> Self {
        Self {
            category: category.into(),
            level: level.into(),
            subject: subject.into(),
            difficulty,
        }
    }

    pub fn for_request(request: &GenerationRequest) -> Self {
        Self::new(&request.category, &request.level, &request.subject, request.difficulty)
    }
}

/// 主题表
#[derive(Debug, Clone, Default)]
pub struct TopicTable {
    entries: HashMap<TopicKey, Vec<String>>,
}

impl TopicTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入一组主题，同一个键重复插入时后者覆盖前者
    pub fn insert(&mut self, key: TopicKey, labels: Vec<String>) {
        self.entries.insert(key, labels);
    }

    pub fn get(&self, key: &TopicKey) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<TopicEntry> for TopicTable {
    fn from_iter<I: IntoIterator<Item = TopicEntry>>(iter: I) -> Self {
        let mut table = TopicTable::new();
        for entry in iter {
            let key = TopicKey::new(entry.category, entry.level, entry.subject, entry.difficulty);
            table.insert(key, entry.labels);
        }
        table
    }
}

/// 目录文件的原始结构
#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    subjects: Vec<SubjectEntry>,
    #[serde(default)]
    saved_configs: Vec<SavedConfig>,
    #[serde(default)]
    topics: Vec<TopicEntry>,
}

/// 解析后的请求
#[derive(Debug, Clone)]
pub struct ResolvedRequest {
    pub request: GenerationRequest,
    pub mode: GenerationMode,
    /// 学习材料模式下的材料路径
    pub material_file: Option<String>,
}

/// 科目目录
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    subjects: HashMap<u64, SubjectEntry>,
    saved_configs: HashMap<u64, SavedConfig>,
    topics: TopicTable,
}

impl Catalog {
    pub fn new(subjects: Vec<SubjectEntry>, saved_configs: Vec<SavedConfig>, topics: TopicTable) -> Self {
        Self {
            subjects: subjects.into_iter().map(|s| (s.id, s)).collect(),
            saved_configs: saved_configs.into_iter().map(|c| (c.id, c)).collect(),
            topics,
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        let file: CatalogFile = toml::from_str(content)?;
        Ok(Self::new(
            file.subjects,
            file.saved_configs,
            file.topics.into_iter().collect(),
        ))
    }

    pub fn topics(&self) -> &TopicTable {
        &self.topics
    }

    pub fn subject_count(&self) -> usize {
        self.subjects.len()
    }

    pub fn subject(&self, subject_id: u64) -> GenerationResult<&SubjectEntry> {
        self.subjects
            .get(&subject_id)
            .ok_or(GenerationError::SubjectNotFound { subject_id })
    }

    pub fn saved_config(&self, config_id: u64) -> GenerationResult<&SavedConfig> {
        self.saved_configs
            .get(&config_id)
            .ok_or(GenerationError::ConfigurationNotFound { config_id })
    }

    /// 把请求文件解析为生成请求
    ///
    /// 优先级：config_id > material_file > subject_id
    pub fn resolve(&self, spec: &RequestSpec) -> GenerationResult<ResolvedRequest> {
        if let Some(config_id) = spec.config_id {
            let saved = self.saved_config(config_id)?;
            let subject = self.subject(saved.subject_id)?;
            return Ok(ResolvedRequest {
                request: GenerationRequest::new(
                    &subject.category,
                    &subject.level,
                    &subject.name,
                    saved.difficulty,
                    saved.number_of_questions,
                    spec.title.clone(),
                )?,
                mode: GenerationMode::TopicPlanned,
                material_file: None,
            });
        }

        if let Some(material_file) = &spec.material_file {
            let (category, level, subject) = match spec.subject_id {
                Some(id) => {
                    let s = self.subject(id)?;
                    (s.category.clone(), s.level.clone(), s.name.clone())
                }
                None => (GENERAL.to_string(), GENERAL.to_string(), GENERAL.to_string()),
            };
            let title = spec
                .title
                .clone()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| UNTITLED_QUIZ.to_string());
            return Ok(ResolvedRequest {
                request: GenerationRequest::new(
                    category,
                    level,
                    subject,
                    spec.difficulty,
                    spec.num_questions,
                    Some(title),
                )?,
                mode: GenerationMode::Document,
                material_file: Some(material_file.clone()),
            });
        }

        if let Some(subject_id) = spec.subject_id {
            let subject = self.subject(subject_id)?;
            return Ok(ResolvedRequest {
                request: GenerationRequest::new(
                    &subject.category,
                    &subject.level,
                    &subject.name,
                    spec.difficulty,
                    spec.num_questions,
                    spec.title.clone(),
                )?,
                mode: GenerationMode::TopicPlanned,
                material_file: None,
            });
        }

        Err(GenerationError::MissingSource)
    }
}
