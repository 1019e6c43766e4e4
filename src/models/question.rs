use serde::{Deserialize, Serialize};

/// Fixed option identifiers used by AI-generated drafts.
pub const OPTION_IDS: [&str; 4] = ["a", "b", "c", "d"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McqOption {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub options: Vec<McqOption>,
    pub correct_option_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Question {
    pub fn option_text(&self, option_id: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.id == option_id)
            .map(|o| o.text.as_str())
    }

    /// Structural invariants: at least two uniquely-identified options,
    /// correct_option_id referencing one of them, image links http(s) only.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("question id must not be empty".to_string());
        }
        if self.text.trim().is_empty() {
            return Err(format!("question '{}' has no text", self.id));
        }
        if self.options.len() < 2 {
            return Err(format!("question '{}' needs at least two options", self.id));
        }
        for (i, opt) in self.options.iter().enumerate() {
            if opt.id.trim().is_empty() {
                return Err(format!("question '{}' has an option without an id", self.id));
            }
            if self.options[..i].iter().any(|prev| prev.id == opt.id) {
                return Err(format!(
                    "question '{}' has duplicate option id '{}'",
                    self.id, opt.id
                ));
            }
        }
        if !self.options.iter().any(|o| o.id == self.correct_option_id) {
            return Err(format!(
                "question '{}' correct_option_id '{}' does not match any option",
                self.id, self.correct_option_id
            ));
        }
        if let Some(url) = &self.image_url {
            match url::Url::parse(url) {
                Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => {}
                _ => {
                    return Err(format!(
                        "question '{}' image_url must be a valid http(s) URL",
                        self.id
                    ))
                }
            }
        }
        Ok(())
    }
}

pub fn check_question_set(questions: &[Question]) -> Result<(), String> {
    if questions.is_empty() {
        return Err("an assessment needs at least one question".to_string());
    }
    for (i, q) in questions.iter().enumerate() {
        q.check_invariants()?;
        if questions[..i].iter().any(|prev| prev.id == q.id) {
            return Err(format!("duplicate question id '{}'", q.id));
        }
    }
    Ok(())
}
