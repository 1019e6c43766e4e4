use crate::models::question::Question;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QuestionResult {
    pub question_id: String,
    pub selected_option_id: Option<String>,
    pub correct_option_id: String,
    pub is_correct: bool,
}

/// Pure scoring and correctness derivation. Free of side effects, so any number
/// of calls on the same inputs yields identical results.
pub struct ScoringService;

impl ScoringService {
    /// Count of questions whose recorded response is exactly the correct
    /// option. Unanswered or malformed questions count as incorrect.
    pub fn score(questions: &[Question], responses: &BTreeMap<String, String>) -> i32 {
        questions
            .iter()
            .filter(|q| responses.get(&q.id) == Some(&q.correct_option_id))
            .count() as i32
    }

    /// Rounded percentage, 0 for an empty assessment rather than a division by
    /// zero.
    pub fn accuracy_percent(score: i32, total_questions: i32) -> i32 {
        if total_questions <= 0 {
            return 0;
        }
        ((score as f64 / total_questions as f64) * 100.0).round() as i32
    }

    /// Per-question correctness in assessment order.
    pub fn review(
        questions: &[Question],
        responses: &BTreeMap<String, String>,
    ) -> Vec<QuestionResult> {
        questions
            .iter()
            .map(|q| {
                let selected = responses.get(&q.id).cloned();
                let is_correct = selected.as_deref() == Some(q.correct_option_id.as_str());
                QuestionResult {
                    question_id: q.id.clone(),
                    selected_option_id: selected,
                    correct_option_id: q.correct_option_id.clone(),
                    is_correct,
                }
            })
            .collect()
    }
}
