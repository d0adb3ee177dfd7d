//! 提示词构建
//!
//! 每个批次一份提示词，重试时复用

use crate::models::request::GenerationRequest;

/// 系统消息
pub const SYSTEM_MESSAGE: &str = "You are an expert quiz generator. Return only valid JSON arrays.";

/// 学习材料最多保留的字符数
pub const MATERIAL_CHAR_LIMIT: usize = 5000;

/// 学习材料至少需要的字符数
pub const MIN_MATERIAL_CHARS: usize = 50;

/// 一次调用的提示词
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// 输出格式要求，所有提示词共用
const OUTPUT_FORMAT: &str = r#"Return ONLY a valid JSON array with this exact structure:
[
    {
        "question": "Question text here?",
        "options": ["Option 1", "Option 2", "Option 3", "Option 4"],
        "correct_answer": 0,
        "explanation": "Explanation of the correct answer"
    }
]

Important:
- Each question must have exactly 4 options
- correct_answer must be the index (0-3) of the correct option
- Do not wrap the array in any other object and do not add commentary"#;

/// 按主题生成的提示词
pub fn topic_prompt(request: &GenerationRequest, topic: &str, target_count: usize) -> Prompt {
    let user = format!(
        r#"Generate {count} multiple-choice questions for a quiz on {subject}.

Topic: {topic}
Category: {category}
Level: {level}
Difficulty: {difficulty}
Standard: Indian curriculum

Every question must be about the topic "{topic}" and match {difficulty} difficulty.

{format}
- Provide clear explanations"#,
        count = target_count,
        subject = request.subject,
        topic = topic,
        category = request.category,
        level = request.level,
        difficulty = request.difficulty,
        format = OUTPUT_FORMAT,
    );

    Prompt {
        system: SYSTEM_MESSAGE.to_string(),
        user,
    }
}

/// 基于学习材料的提示词
pub fn material_prompt(request: &GenerationRequest, material: &str, target_count: usize) -> Prompt {
    let user = format!(
        r#"Based on the following study material, generate {count} multiple-choice questions.

Difficulty: {difficulty}

Study Material:
{material}

{format}"#,
        count = target_count,
        difficulty = request.difficulty,
        material = material,
        format = OUTPUT_FORMAT,
    );

    Prompt {
        system: SYSTEM_MESSAGE.to_string(),
        user,
    }
}

/// 截断学习材料（按字符而不是字节）
pub fn truncate_material(material: &str) -> &str {
    match material.char_indices().nth(MATERIAL_CHAR_LIMIT) {
        Some((byte_index, _)) => &material[..byte_index],
        None => material,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::request::Difficulty;

    fn request() -> GenerationRequest {
        GenerationRequest::new("Academics", "10th Grade", "Mathematics", Difficulty::Easy, 20, None).unwrap()
    }

    #[test]
    fn test_topic_prompt_embeds_context() {
        let prompt = topic_prompt(&request(), "Quadratic Equations", 3);
        assert_eq!(prompt.system, SYSTEM_MESSAGE);
        for needle in [
            "Generate 3 multiple-choice questions",
            "Topic: Quadratic Equations",
            "Category: Academics",
            "Level: 10th Grade",
            "Difficulty: easy",
            "quiz on Mathematics",
            "exactly 4 options",
        ] {
            assert!(prompt.user.contains(needle), "缺少: {}", needle);
        }
    }

    #[test]
    fn test_material_prompt_embeds_material() {
        let prompt = material_prompt(&request(), "Photosynthesis converts light.", 5);
        assert!(prompt.user.contains("generate 5 multiple-choice questions"));
        assert!(prompt.user.contains("Photosynthesis converts light."));
    }

    #[test]
    fn test_truncate_material_counts_chars() {
        let long = "é".repeat(MATERIAL_CHAR_LIMIT + 10);
        assert_eq!(truncate_material(&long).chars().count(), MATERIAL_CHAR_LIMIT);
        assert_eq!(truncate_material("short"), "short");
    }
}
