use std::collections::BTreeMap;

use classroom_backend::models::question::{McqOption, Question};
use classroom_backend::services::scoring_service::ScoringService;

fn question(id: &str, correct: &str) -> Question {
    Question {
        id: id.to_string(),
        text: format!("Question {}", id),
        options: vec![
            McqOption {
                id: "a".to_string(),
                text: "Option A".to_string(),
            },
            McqOption {
                id: "b".to_string(),
                text: "Option B".to_string(),
            },
            McqOption {
                id: "c".to_string(),
                text: "Option C".to_string(),
            },
            McqOption {
                id: "d".to_string(),
                text: "Option D".to_string(),
            },
        ],
        correct_option_id: correct.to_string(),
        explanation: None,
        image_url: None,
    }
}

fn responses(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(q, o)| (q.to_string(), o.to_string()))
        .collect()
}

#[test]
fn two_of_three_correct_scores_two() {
    let questions = vec![question("q3", "b"), question("q4", "b"), question("q5", "b")];
    let answers = responses(&[("q3", "b"), ("q4", "a"), ("q5", "b")]);

    assert_eq!(ScoringService::score(&questions, &answers), 2);
    assert_eq!(ScoringService::accuracy_percent(2, 3), 67);

    let review = ScoringService::review(&questions, &answers);
    let wrong: Vec<&str> = review
        .iter()
        .filter(|r| !r.is_correct)
        .map(|r| r.question_id.as_str())
        .collect();
    assert_eq!(wrong, vec!["q4"]);
}

#[test]
fn unanswered_counts_as_incorrect() {
    let questions = vec![question("q1", "a"), question("q2", "c")];
    let answers = responses(&[("q1", "a")]);

    assert_eq!(ScoringService::score(&questions, &answers), 1);
    let review = ScoringService::review(&questions, &answers);
    assert_eq!(review[1].selected_option_id, None);
    assert!(!review[1].is_correct);
}

#[test]
fn responses_for_unknown_questions_are_ignored() {
    let questions = vec![question("q1", "a")];
    let answers = responses(&[("q1", "a"), ("ghost", "a")]);

    assert_eq!(ScoringService::score(&questions, &answers), 1);
    assert_eq!(ScoringService::review(&questions, &answers).len(), 1);
}

#[test]
fn accuracy_rounds_and_handles_empty() {
    assert_eq!(ScoringService::accuracy_percent(0, 0), 0);
    assert_eq!(ScoringService::accuracy_percent(0, 5), 0);
    assert_eq!(ScoringService::accuracy_percent(5, 5), 100);
    assert_eq!(ScoringService::accuracy_percent(1, 3), 33);
    assert_eq!(ScoringService::accuracy_percent(1, 6), 17);
}

#[test]
fn scoring_is_repeatable() {
    let questions = vec![question("q1", "d"), question("q2", "b")];
    let answers = responses(&[("q1", "d"), ("q2", "a")]);

    let first = ScoringService::review(&questions, &answers);
    let second = ScoringService::review(&questions, &answers);
    assert_eq!(first, second);
    assert_eq!(
        ScoringService::score(&questions, &answers),
        ScoringService::score(&questions, &answers)
    );
}
