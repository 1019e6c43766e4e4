use classroom_backend::models::question::{McqOption, Question};
use classroom_backend::services::ai_service::{AiService, EXPLANATION_FALLBACK};

fn question() -> Question {
    Question {
        id: "q1".to_string(),
        text: "What is 2 + 2?".to_string(),
        options: vec![
            McqOption {
                id: "a".to_string(),
                text: "3".to_string(),
            },
            McqOption {
                id: "b".to_string(),
                text: "4".to_string(),
            },
        ],
        correct_option_id: "b".to_string(),
        explanation: None,
        image_url: None,
    }
}

#[tokio::test]
async fn unreachable_api_degrades_to_fallback_text() {
    // Nothing listens on this port, so every call fails at connect time.
    let service = AiService::new(
        "sk-test".to_string(),
        "http://127.0.0.1:9".to_string(),
        reqwest::Client::new(),
    );
    let q = question();

    let explanation = service.explain_mistake(&q, Some("a")).await;
    assert_eq!(explanation, EXPLANATION_FALLBACK);

    // The endpoint stays retryable: a second ask behaves the same.
    let again = service.explain_mistake(&q, Some("a")).await;
    assert_eq!(again, EXPLANATION_FALLBACK);
}
