use crate::error::{Error, Result};
use crate::models::question::Question;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

pub const STATUS_IN_PROGRESS: &str = "in_progress";
pub const STATUS_FINISHED: &str = "finished";
pub const STATUS_REVIEWING: &str = "reviewing";

/// One assessment attempt as stored. The transition logic lives on
/// [`SessionState`]; this row is its persisted form.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttemptSession {
    pub id: Uuid,
    pub student_id: Uuid,
    pub assessment_id: Uuid,
    pub status: String,
    pub question_index: i32,
    pub review_index: i32,
    pub responses: JsonValue,
    pub revealed: JsonValue,
    pub submission_id: Option<Uuid>,
    pub started_at: DateTime<Utc>,
    pub deadline: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl AttemptSession {
    pub fn state(&self) -> SessionState {
        SessionState {
            status: self.status.clone(),
            question_index: self.question_index.max(0) as usize,
            review_index: self.review_index.max(0) as usize,
            responses: serde_json::from_value(self.responses.clone()).unwrap_or_default(),
            revealed: serde_json::from_value(self.revealed.clone()).unwrap_or_default(),
        }
    }
}

/// The attempt state machine: IN_PROGRESS(question_index) -> FINISHED ->
/// optionally REVIEWING(review_index over the mistake set). Every transition is
/// guarded and leaves the state untouched on rejection.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub status: String,
    pub question_index: usize,
    pub review_index: usize,
    pub responses: BTreeMap<String, String>,
    pub revealed: BTreeSet<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            status: STATUS_IN_PROGRESS.to_string(),
            question_index: 0,
            review_index: 0,
            responses: BTreeMap::new(),
            revealed: BTreeSet::new(),
        }
    }

    fn current_question<'a>(&self, questions: &'a [Question]) -> Result<&'a Question> {
        questions
            .get(self.question_index)
            .ok_or_else(|| Error::Internal("session index out of bounds".to_string()))
    }

    fn require_in_progress(&self) -> Result<()> {
        if self.status != STATUS_IN_PROGRESS {
            return Err(Error::BadRequest(format!(
                "session is {}, not in progress",
                self.status
            )));
        }
        Ok(())
    }

    pub fn has_answered_current(&self, questions: &[Question]) -> bool {
        questions
            .get(self.question_index)
            .map(|q| self.responses.contains_key(&q.id))
            .unwrap_or(false)
    }

    /// Record (or overwrite) the response for the current question. Rejected
    /// once the question has been revealed: the answer is locked.
    pub fn select_option(
        &mut self,
        questions: &[Question],
        question_id: &str,
        option_id: &str,
    ) -> Result<()> {
        self.require_in_progress()?;
        let current = self.current_question(questions)?;
        if current.id != question_id {
            return Err(Error::BadRequest(format!(
                "question '{}' is not the current question",
                question_id
            )));
        }
        if self.revealed.contains(question_id) {
            return Err(Error::BadRequest(
                "answer is locked after the reveal".to_string(),
            ));
        }
        if current.option_text(option_id).is_none() {
            return Err(Error::BadRequest(format!(
                "option '{}' does not belong to question '{}'",
                option_id, question_id
            )));
        }
        self.responses
            .insert(question_id.to_string(), option_id.to_string());
        Ok(())
    }

    /// Move to the next question. Forward movement requires a response for the
    /// current question; the last question advances via submit instead.
    pub fn advance(&mut self, questions: &[Question]) -> Result<()> {
        self.require_in_progress()?;
        if !self.has_answered_current(questions) {
            return Err(Error::BadRequest(
                "answer the current question before moving on".to_string(),
            ));
        }
        if self.question_index + 1 >= questions.len() {
            return Err(Error::BadRequest(
                "already at the last question; submit to finish".to_string(),
            ));
        }
        self.question_index += 1;
        Ok(())
    }

    pub fn back(&mut self) -> Result<()> {
        self.require_in_progress()?;
        self.question_index = self.question_index.saturating_sub(1);
        Ok(())
    }

    /// Practice mode only. May be invoked before any selection; from then on
    /// the question accepts no response.
    pub fn reveal(&mut self, questions: &[Question], is_practice: bool) -> Result<()> {
        self.require_in_progress()?;
        if !is_practice {
            return Err(Error::BadRequest(
                "answers can only be revealed in practice mode".to_string(),
            ));
        }
        let current = self.current_question(questions)?;
        self.revealed.insert(current.id.clone());
        Ok(())
    }

    /// Guard the submit transition and mark the session finished. Scoring and
    /// submission persistence are the caller's job.
    pub fn submit(&mut self, questions: &[Question]) -> Result<()> {
        if self.status == STATUS_FINISHED || self.status == STATUS_REVIEWING {
            return Err(Error::Conflict("session already submitted".to_string()));
        }
        self.require_in_progress()?;
        if self.question_index + 1 != questions.len() {
            return Err(Error::BadRequest(
                "submit is only available on the last question".to_string(),
            ));
        }
        if !self.has_answered_current(questions) {
            return Err(Error::BadRequest(
                "answer the last question before submitting".to_string(),
            ));
        }
        self.status = STATUS_FINISHED.to_string();
        Ok(())
    }

    /// Force-finish regardless of position, used when a timed session runs out.
    pub fn expire(&mut self) -> Result<()> {
        self.require_in_progress()?;
        self.status = STATUS_FINISHED.to_string();
        Ok(())
    }

    /// Mistake questions in original assessment order. Unanswered counts as a
    /// mistake; a correct_option_id matching no option simply never matches.
    pub fn mistakes<'a>(&self, questions: &'a [Question]) -> Vec<&'a Question> {
        questions
            .iter()
            .filter(|q| self.responses.get(&q.id) != Some(&q.correct_option_id))
            .collect()
    }

    pub fn start_review(&mut self, questions: &[Question]) -> Result<usize> {
        if self.status != STATUS_FINISHED {
            return Err(Error::BadRequest(
                "review is only available after submission".to_string(),
            ));
        }
        let mistake_count = self.mistakes(questions).len();
        if mistake_count == 0 {
            return Err(Error::BadRequest(
                "nothing to review: every answer was correct".to_string(),
            ));
        }
        self.status = STATUS_REVIEWING.to_string();
        self.review_index = 0;
        Ok(mistake_count)
    }

    fn require_reviewing(&self) -> Result<()> {
        if self.status != STATUS_REVIEWING {
            return Err(Error::BadRequest("session is not in review".to_string()));
        }
        Ok(())
    }

    /// Next mistake; advancing past the last one exits review.
    pub fn review_advance(&mut self, questions: &[Question]) -> Result<()> {
        self.require_reviewing()?;
        let mistake_count = self.mistakes(questions).len();
        if self.review_index + 1 >= mistake_count {
            self.status = STATUS_FINISHED.to_string();
            self.review_index = 0;
        } else {
            self.review_index += 1;
        }
        Ok(())
    }

    pub fn review_back(&mut self) -> Result<()> {
        self.require_reviewing()?;
        self.review_index = self.review_index.saturating_sub(1);
        Ok(())
    }
}
