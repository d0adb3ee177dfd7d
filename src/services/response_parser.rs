//! 模型响应解析 - 业务能力层
//!
//! 模型返回的是自由文本，可能带有 markdown 代码块和前后说明文字。
//! 处理步骤：
//! 1. 如果有代码块，只保留代码块里的内容
//! 2. 截取第一个 `[` 到最后一个 `]`
//! 3. 解析为 JSON 数组
//! 4. 逐条校验，不合格的题目直接丢弃；一条都不剩时返回错误，由重试控制器决定是否重试

use regex::Regex;
use serde_json::Value as JsonValue;
use std::fmt;
use tracing::debug;

use crate::error::ParseError;
use crate::models::question::{QuestionRecord, OPTION_COUNT};

/// 题目被丢弃的原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// 数组元素不是对象
    NotAnObject,
    /// 缺少题干或题干为空
    MissingQuestion,
    /// 缺少 options 数组
    MissingOptions,
    /// 选项数量不是 4
    WrongOptionCount(usize),
    /// 选项不是字符串
    NonTextOption,
    /// correct_answer 缺失或不是非负整数
    InvalidAnswer,
    /// correct_answer 超出 [0, 3]
    AnswerOutOfRange(u64),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::NotAnObject => write!(f, "不是对象"),
            RejectReason::MissingQuestion => write!(f, "题干为空"),
            RejectReason::MissingOptions => write!(f, "缺少选项"),
            RejectReason::WrongOptionCount(n) => write!(f, "选项数量为 {}，需要 {}", n, OPTION_COUNT),
            RejectReason::NonTextOption => write!(f, "选项不是文本"),
            RejectReason::InvalidAnswer => write!(f, "答案索引无效"),
            RejectReason::AnswerOutOfRange(i) => write!(f, "答案索引 {} 超出范围 [0, {}]", i, OPTION_COUNT - 1),
        }
    }
}

/// 被丢弃的题目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// 在原始数组中的位置
    pub index: usize,
    pub reason: RejectReason,
}

/// 一次响应的解析结果
#[derive(Debug, Clone, Default)]
pub struct ParsedBatch {
    pub records: Vec<QuestionRecord>,
    pub rejected: Vec<Rejection>,
}

/// 解析模型的原始响应
pub fn parse_response(raw_text: &str) -> Result<ParsedBatch, ParseError> {
    let content = strip_code_fence(raw_text);
    let array_text = slice_json_array(content).ok_or(ParseError::NoArray)?;

    let elements: Vec<JsonValue> = serde_json::from_str(array_text)?;

    let mut batch = ParsedBatch::default();
    for (index, element) in elements.iter().enumerate() {
        match validate_record(element) {
            Ok(record) => batch.records.push(record),
            Err(reason) => {
                debug!("丢弃第 {} 道题: {}", index + 1, reason);
                batch.rejected.push(Rejection { index, reason });
            }
        }
    }

    if batch.records.is_empty() {
        return Err(ParseError::NoValidRecords {
            rejected: batch.rejected.len(),
        });
    }

    Ok(batch)
}

/// 校验单道题目
///
/// 只有题干非空、恰好 4 个文本选项、答案索引在 [0, 3] 的题目才会被接受
pub fn validate_record(value: &JsonValue) -> Result<QuestionRecord, RejectReason> {
    let object = value.as_object().ok_or(RejectReason::NotAnObject)?;

    let question = object
        .get("question")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or(RejectReason::MissingQuestion)?;

    let raw_options = object
        .get("options")
        .and_then(|v| v.as_array())
        .ok_or(RejectReason::MissingOptions)?;

    if raw_options.len() != OPTION_COUNT {
        return Err(RejectReason::WrongOptionCount(raw_options.len()));
    }

    let options = raw_options
        .iter()
        .map(|o| o.as_str().map(|s| s.trim().to_string()))
        .collect::<Option<Vec<String>>>()
        .ok_or(RejectReason::NonTextOption)?;

    let correct_answer = object
        .get("correct_answer")
        .and_then(|v| v.as_u64())
        .ok_or(RejectReason::InvalidAnswer)?;

    if correct_answer >= OPTION_COUNT as u64 {
        return Err(RejectReason::AnswerOutOfRange(correct_answer));
    }

    let explanation = object
        .get("explanation")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    Ok(QuestionRecord {
        question: question.to_string(),
        options,
        correct_answer: correct_answer as usize,
        explanation,
    })
}

/// 去掉 markdown 代码块标记，只保留第一个代码块的内容
///
/// 开始标记必须位于行首；题干里的行内 ``` 不算代码块
fn strip_code_fence(text: &str) -> &str {
    if let Ok(re) = Regex::new(r"(?m)^[ \t]*```[A-Za-z0-9_+-]*[ \t]*\r?\n?([\s\S]*?)(?:^[ \t]*```|```[ \t]*\r?$)") {
        if let Some(inner) = re.captures(text).and_then(|caps| caps.get(1)) {
            return inner.as_str();
        }
    }
    text
}

/// 截取第一个 `[` 到最后一个 `]`
fn slice_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}
