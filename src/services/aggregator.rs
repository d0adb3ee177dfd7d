//! 结果汇总
//!
//! 按主题计划顺序拼接各批次的题目，随机模式下再整体打乱

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::question::{BatchOutcome, GenerationOutcome};

/// 汇总方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationMode {
    /// 保持拼接顺序
    Ordered,
    /// 拼接后整体打乱，最终顺序不再体现题目来自哪个主题
    Randomized,
}

/// 汇总所有批次
///
/// `outcomes` 必须按主题计划顺序排列；打乱只改变顺序，不增减题目
pub fn aggregate<R: Rng + ?Sized>(
    outcomes: Vec<BatchOutcome>,
    total_count: usize,
    mode: AggregationMode,
    rng: &mut R,
) -> GenerationOutcome {
    let mut result = GenerationOutcome {
        total_count,
        ..Default::default()
    };

    for outcome in outcomes {
        result.attempts_consumed += outcome.attempts_consumed;
        if outcome.succeeded {
            result.records.extend(outcome.records);
        } else {
            result.failed_topics.push(outcome.topic);
        }
    }

    if mode == AggregationMode::Randomized {
        result.records.shuffle(rng);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::QuestionRecord;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn record(text: &str) -> QuestionRecord {
        QuestionRecord {
            question: text.to_string(),
            options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            correct_answer: 0,
            explanation: String::new(),
        }
    }

    fn outcomes() -> Vec<BatchOutcome> {
        vec![
            BatchOutcome::success("Algebra", 2, vec![record("a1"), record("a2")], 1),
            BatchOutcome::exhausted("Geometry", 2, 3, Some("timeout".into())),
            BatchOutcome::success("Statistics", 3, (1..=3).map(|i| record(&format!("s{}", i))).collect(), 2),
        ]
    }

    fn questions(outcome: &GenerationOutcome) -> Vec<String> {
        outcome.records.iter().map(|r| r.question.clone()).collect()
    }

    #[test]
    fn test_ordered_keeps_plan_order() {
        let mut rng = StdRng::seed_from_u64(7);
        let outcome = aggregate(outcomes(), 7, AggregationMode::Ordered, &mut rng);

        assert_eq!(questions(&outcome), vec!["a1", "a2", "s1", "s2", "s3"]);
        assert_eq!(outcome.failed_topics, vec!["Geometry"]);
        assert_eq!(outcome.attempts_consumed, 6);
        assert_eq!(outcome.effective_count(), 5);
        assert!(!outcome.is_complete());
    }

    #[test]
    fn test_randomized_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(42);
        let ordered = aggregate(outcomes(), 7, AggregationMode::Ordered, &mut rng);
        let shuffled = aggregate(outcomes(), 7, AggregationMode::Randomized, &mut rng);

        let mut a = questions(&ordered);
        let mut b = questions(&shuffled);
        a.sort();
        b.sort();
        assert_eq!(a, b);
        assert_eq!(shuffled.failed_topics, ordered.failed_topics);
    }

    #[test]
    fn test_same_seed_same_order() {
        let first = aggregate(outcomes(), 7, AggregationMode::Randomized, &mut StdRng::seed_from_u64(1));
        let second = aggregate(outcomes(), 7, AggregationMode::Randomized, &mut StdRng::seed_from_u64(1));
        assert_eq!(questions(&first), questions(&second));
    }

    #[test]
    fn test_empty_input() {
        let outcome = aggregate(Vec::new(), 0, AggregationMode::Randomized, &mut StdRng::seed_from_u64(0));
        assert!(outcome.records.is_empty());
        assert!(outcome.is_complete());
    }
}
