use crate::dto::assessment_dto::DraftAssessment;
use crate::error::{Error, Result};
use crate::models::question::{check_question_set, Question, OPTION_IDS};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::time::Duration;

/// Shown whenever the explanation call fails; the session keeps going and the
/// student may simply ask again.
pub const EXPLANATION_FALLBACK: &str =
    "I'm having trouble connecting to my knowledge base right now. Please try again later!";

const TUTOR_PERSONA: &str = "You are an expert tutor for an online classroom. \
Your tone is professional, encouraging, and clear. \
Provide deep, reassuring, and logical explanations (max 100 words).";

/// Cap on the prompt share of an uploaded text document.
const MAX_DOCUMENT_CHARS: usize = 20_000;

#[derive(Clone)]
pub struct AiService {
    client: Client,
    api_key: String,
    base_url: String,
}

pub struct GenerationRequest {
    pub filename: String,
    pub document: bytes::Bytes,
    pub subject: Option<String>,
    pub assessment_type: String,
    pub instructions: Option<String>,
    pub num_questions: usize,
}

#[derive(Debug, Deserialize)]
struct RawDraft {
    title: Option<String>,
    questions: Vec<Question>,
}

impl AiService {
    pub fn new(api_key: String, base_url: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            base_url,
        }
    }

    /// Tutoring explanation for a wrong answer. Infallible from the caller's
    /// perspective: transport or parse failures degrade to the fallback text.
    pub async fn explain_mistake(&self, question: &Question, chosen_option_id: Option<&str>) -> String {
        let chosen_text = chosen_option_id
            .and_then(|id| question.option_text(id))
            .unwrap_or("None");
        let correct_text = question
            .option_text(&question.correct_option_id)
            .unwrap_or("(unknown)");

        let prompt = format!(
            "The student got this question wrong: \"{}\"\n\
             The correct answer is: \"{}\".\n\
             The student chose: \"{}\".\n\
             Provide a deep, reassuring, and logical explanation of why the correct \
             answer is right and why the student's choice was incorrect.",
            question.text, correct_text, chosen_text
        );

        let payload = serde_json::json!({
            "model": "gpt-4o",
            "messages": [
                {"role": "system", "content": TUTOR_PERSONA},
                {"role": "user", "content": prompt}
            ],
            "max_tokens": 300,
            "temperature": 0.7
        });

        match self.chat_text(payload).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => EXPLANATION_FALLBACK.to_string(),
            Err(e) => {
                tracing::error!(question_id = %question.id, error = ?e, "AI explanation failed");
                EXPLANATION_FALLBACK.to_string()
            }
        }
    }

    /// Draft an assessment from an uploaded document. The draft is validated
    /// whole and returned to the teacher; nothing is persisted here.
    pub async fn generate_assessment(&self, req: GenerationRequest) -> Result<DraftAssessment> {
        let max_questions = crate::config::get_config().max_ai_questions;
        let num_questions = req.num_questions.clamp(1, max_questions);

        let system_prompt = format!(
            "You are an assessment author for an online classroom.\n\
             Read the supplied study document and produce a multiple-choice assessment.\n\
             The output must be a valid JSON object: {{\"title\": string, \"questions\": [...]}}.\n\
             Rules:\n\
             1. Generate exactly {} questions, each with 4 options using the fixed option ids \
                \"a\", \"b\", \"c\", \"d\".\n\
             2. Question shape: {{\"id\": \"q1\", \"text\": ..., \"options\": \
                [{{\"id\": \"a\", \"text\": ...}}, ...], \"correct_option_id\": ..., \
                \"explanation\": ...}}.\n\
             3. correct_option_id must match the actually correct option; vary its position.\n\
             4. Avoid \"All of the above\" options.\n\
             5. Base every question strictly on the document content.",
            num_questions
        );

        let mut user_parts: Vec<String> = Vec::new();
        if let Some(subject) = &req.subject {
            user_parts.push(format!("Subject: {}", subject));
        }
        if let Some(instructions) = &req.instructions {
            user_parts.push(format!("Teacher instructions: {}", instructions));
        }

        let user_content = if let Some(mime) = image_mime(&req.filename) {
            let mut content: Vec<JsonValue> = vec![serde_json::json!({
                "type": "text",
                "text": format!("{}\nThe document is attached as an image.", user_parts.join("\n")),
            })];
            content.push(serde_json::json!({
                "type": "image_url",
                "image_url": {
                    "url": format!("data:{};base64,{}", mime, BASE64.encode(&req.document)),
                    "detail": "high"
                }
            }));
            JsonValue::Array(content)
        } else {
            let mut text = String::from_utf8_lossy(&req.document).into_owned();
            truncate_document(&mut text);
            user_parts.push(format!("Document:\n{}", text));
            JsonValue::String(user_parts.join("\n\n"))
        };

        let payload = serde_json::json!({
            "model": "gpt-4o",
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_content}
            ],
            "response_format": { "type": "json_object" },
            "temperature": 0.8
        });

        tracing::info!(filename = %req.filename, num_questions, "Requesting assessment draft");
        let raw = self.chat_json(payload).await?;

        // Typed parse first, then the same structural invariants a teacher-
        // authored assessment must satisfy. Anything off rejects the whole
        // draft; there is no partial acceptance.
        let mut draft: RawDraft = serde_json::from_value(raw)
            .map_err(|e| Error::AiUnavailable(format!("AI returned an invalid draft: {}", e)))?;

        draft.questions.truncate(num_questions);
        for (idx, q) in draft.questions.iter_mut().enumerate() {
            if q.id.trim().is_empty() {
                q.id = format!("q{}", idx + 1);
            }
        }
        check_question_set(&draft.questions)
            .map_err(|e| Error::AiUnavailable(format!("AI returned an invalid draft: {}", e)))?;
        for q in &draft.questions {
            if !q.options.iter().all(|o| OPTION_IDS.contains(&o.id.as_str())) {
                return Err(Error::AiUnavailable(
                    "AI returned an invalid draft: option ids must be a..d".to_string(),
                ));
            }
        }

        Ok(DraftAssessment {
            title: draft
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "Generated assessment".to_string()),
            assessment_type: req.assessment_type,
            subject: req.subject,
            duration_minutes: None,
            questions: draft.questions,
        })
    }

    async fn send(&self, payload: JsonValue) -> Result<JsonValue> {
        let res = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .timeout(Duration::from_secs(120))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(Error::AiUnavailable(format!(
                "OpenAI API error {}: {}",
                status, text
            )));
        }

        let body: JsonValue = res.json().await?;
        Ok(body)
    }

    async fn chat_text(&self, payload: JsonValue) -> Result<String> {
        let body = self.send(payload).await?;
        body.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| Error::AiUnavailable("Invalid OpenAI response format".to_string()))
    }

    async fn chat_json(&self, payload: JsonValue) -> Result<JsonValue> {
        let content = self.chat_text(payload).await?;
        serde_json::from_str(&content)
            .map_err(|_| Error::AiUnavailable("OpenAI response was not valid JSON".to_string()))
    }
}

fn image_mime(filename: &str) -> Option<&'static str> {
    let ext = std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Cut an oversized document at the byte cap, never inside a UTF-8 sequence.
fn truncate_document(text: &mut String) {
    if text.len() <= MAX_DOCUMENT_CHARS {
        return;
    }
    let mut cut = MAX_DOCUMENT_CHARS;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    text.truncate(cut);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_document_is_cut_on_a_char_boundary() {
        let mut text = "a".repeat(MAX_DOCUMENT_CHARS - 1);
        text.push('€');
        truncate_document(&mut text);
        assert_eq!(text.len(), MAX_DOCUMENT_CHARS - 1);
        assert!(text.ends_with('a'));

        let mut short = "résumé".to_string();
        truncate_document(&mut short);
        assert_eq!(short, "résumé");
    }

    #[test]
    fn mime_type_follows_the_file_extension() {
        assert_eq!(image_mime("scan.PNG"), Some("image/png"));
        assert_eq!(image_mime("photo.jpg"), Some("image/jpeg"));
        assert_eq!(image_mime("photo.jpeg"), Some("image/jpeg"));
        assert_eq!(image_mime("page.webp"), Some("image/webp"));
        assert_eq!(image_mime("notes.txt"), None);
        assert_eq!(image_mime("noextension"), None);
    }
}
