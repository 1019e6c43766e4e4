use crate::error::{Error, Result};
use crate::models::assessment::Assessment;
use crate::models::session::{AttemptSession, SessionState, STATUS_IN_PROGRESS};
use crate::models::submission::Submission;
use crate::services::scoring_service::ScoringService;
use crate::services::submission_service::SubmissionService;
use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct SessionService {
    pool: PgPool,
}

impl SessionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a new attempt at question 0 with an empty response map. Timed
    /// assessments get a deadline; practice runs open-ended.
    pub async fn start(&self, student_id: Uuid, assessment_id: Uuid) -> Result<AttemptSession> {
        let assessment =
            sqlx::query_as::<_, Assessment>(r#"SELECT * FROM assessments WHERE id = $1"#)
                .bind(assessment_id)
                .fetch_one(&self.pool)
                .await?;

        let questions = assessment.parsed_questions();
        if questions.is_empty() {
            return Err(Error::BadRequest(
                "assessment has no questions".to_string(),
            ));
        }

        let now = Utc::now();
        let deadline = assessment
            .duration_minutes
            .filter(|_| !assessment.is_practice())
            .map(|minutes| now + Duration::minutes(minutes as i64));

        let session = sqlx::query_as::<_, AttemptSession>(
            r#"INSERT INTO sessions
                   (student_id, assessment_id, status, question_index, review_index,
                    responses, revealed, started_at, deadline)
               VALUES ($1, $2, $3, 0, 0, '{}'::jsonb, '[]'::jsonb, $4, $5)
               RETURNING *"#,
        )
        .bind(student_id)
        .bind(assessment.id)
        .bind(STATUS_IN_PROGRESS)
        .bind(now)
        .bind(deadline)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(session_id = %session.id, assessment_id = %assessment.id, "Started session");
        Ok(session)
    }

    /// Fetch a session together with its assessment, enforcing ownership when
    /// a student id is given (teachers pass None).
    pub async fn load(
        &self,
        session_id: Uuid,
        student_id: Option<Uuid>,
    ) -> Result<(AttemptSession, Assessment)> {
        let session = sqlx::query_as::<_, AttemptSession>(r#"SELECT * FROM sessions WHERE id = $1"#)
            .bind(session_id)
            .fetch_one(&self.pool)
            .await?;

        if let Some(student_id) = student_id {
            if session.student_id != student_id {
                return Err(Error::NotFound("Resource not found".to_string()));
            }
        }

        let assessment =
            sqlx::query_as::<_, Assessment>(r#"SELECT * FROM assessments WHERE id = $1"#)
                .bind(session.assessment_id)
                .fetch_one(&self.pool)
                .await?;

        Ok((session, assessment))
    }

    async fn save_state(
        &self,
        session_id: Uuid,
        state: &SessionState,
        submission_id: Option<Uuid>,
    ) -> Result<AttemptSession> {
        let responses = serde_json::to_value(&state.responses)?;
        let revealed = serde_json::to_value(&state.revealed)?;
        let updated = sqlx::query_as::<_, AttemptSession>(
            r#"UPDATE sessions
               SET status = $2,
                   question_index = $3,
                   review_index = $4,
                   responses = $5,
                   revealed = $6,
                   submission_id = COALESCE($7, submission_id),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(session_id)
        .bind(&state.status)
        .bind(state.question_index as i32)
        .bind(state.review_index as i32)
        .bind(responses)
        .bind(revealed)
        .bind(submission_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(updated)
    }

    fn check_deadline(session: &AttemptSession) -> Result<()> {
        if session.status == STATUS_IN_PROGRESS {
            if let Some(deadline) = session.deadline {
                if deadline <= Utc::now() {
                    return Err(Error::BadRequest("the time for this test is up".to_string()));
                }
            }
        }
        Ok(())
    }

    pub async fn answer(
        &self,
        session_id: Uuid,
        student_id: Uuid,
        question_id: &str,
        option_id: &str,
    ) -> Result<AttemptSession> {
        let (session, assessment) = self.load(session_id, Some(student_id)).await?;
        Self::check_deadline(&session)?;
        let questions = assessment.parsed_questions();
        let mut state = session.state();
        state.select_option(&questions, question_id, option_id)?;
        self.save_state(session.id, &state, None).await
    }

    pub async fn advance(&self, session_id: Uuid, student_id: Uuid) -> Result<AttemptSession> {
        let (session, assessment) = self.load(session_id, Some(student_id)).await?;
        Self::check_deadline(&session)?;
        let questions = assessment.parsed_questions();
        let mut state = session.state();
        state.advance(&questions)?;
        self.save_state(session.id, &state, None).await
    }

    pub async fn back(&self, session_id: Uuid, student_id: Uuid) -> Result<AttemptSession> {
        let (session, _assessment) = self.load(session_id, Some(student_id)).await?;
        Self::check_deadline(&session)?;
        let mut state = session.state();
        state.back()?;
        self.save_state(session.id, &state, None).await
    }

    pub async fn reveal(&self, session_id: Uuid, student_id: Uuid) -> Result<AttemptSession> {
        let (session, assessment) = self.load(session_id, Some(student_id)).await?;
        Self::check_deadline(&session)?;
        let questions = assessment.parsed_questions();
        let mut state = session.state();
        state.reveal(&questions, assessment.is_practice())?;
        self.save_state(session.id, &state, None).await
    }

    /// Score the attempt, persist the immutable submission, and mark the
    /// session finished.
    pub async fn submit(
        &self,
        session_id: Uuid,
        student_id: Uuid,
        submissions: &SubmissionService,
    ) -> Result<(AttemptSession, Submission)> {
        let (session, assessment) = self.load(session_id, Some(student_id)).await?;
        Self::check_deadline(&session)?;
        let questions = assessment.parsed_questions();
        let mut state = session.state();
        state.submit(&questions)?;

        let score = ScoringService::score(&questions, &state.responses);
        let submission = submissions
            .create(
                session.student_id,
                session.assessment_id,
                score,
                questions.len() as i32,
                &state.responses,
            )
            .await?;

        let updated = self
            .save_state(session.id, &state, Some(submission.id))
            .await?;
        Ok((updated, submission))
    }

    pub async fn start_review(&self, session_id: Uuid, student_id: Uuid) -> Result<AttemptSession> {
        let (session, assessment) = self.load(session_id, Some(student_id)).await?;
        let questions = assessment.parsed_questions();
        let mut state = session.state();
        let mistake_count = state.start_review(&questions)?;
        tracing::debug!(session_id = %session.id, mistake_count, "Entered mistake review");
        self.save_state(session.id, &state, None).await
    }

    pub async fn review_advance(
        &self,
        session_id: Uuid,
        student_id: Uuid,
    ) -> Result<AttemptSession> {
        let (session, assessment) = self.load(session_id, Some(student_id)).await?;
        let questions = assessment.parsed_questions();
        let mut state = session.state();
        state.review_advance(&questions)?;
        self.save_state(session.id, &state, None).await
    }

    pub async fn review_back(&self, session_id: Uuid, student_id: Uuid) -> Result<AttemptSession> {
        let (session, _assessment) = self.load(session_id, Some(student_id)).await?;
        let mut state = session.state();
        state.review_back()?;
        self.save_state(session.id, &state, None).await
    }

    /// Background sweep: timed sessions past their deadline are auto-submitted
    /// with whatever responses were recorded. Returns how many were closed.
    pub async fn expire_overdue(&self, submissions: &SubmissionService) -> Result<usize> {
        let overdue = sqlx::query_as::<_, AttemptSession>(
            r#"SELECT * FROM sessions
               WHERE status = $1 AND deadline IS NOT NULL AND deadline <= NOW()"#,
        )
        .bind(STATUS_IN_PROGRESS)
        .fetch_all(&self.pool)
        .await?;

        let mut closed = 0;
        for session in overdue {
            let assessment =
                sqlx::query_as::<_, Assessment>(r#"SELECT * FROM assessments WHERE id = $1"#)
                    .bind(session.assessment_id)
                    .fetch_one(&self.pool)
                    .await?;
            let questions = assessment.parsed_questions();

            let mut state = session.state();
            state.expire()?;
            let score = ScoringService::score(&questions, &state.responses);
            let submission = submissions
                .create(
                    session.student_id,
                    session.assessment_id,
                    score,
                    questions.len() as i32,
                    &state.responses,
                )
                .await?;
            self.save_state(session.id, &state, Some(submission.id))
                .await?;

            tracing::warn!(session_id = %session.id, score, "Timed session expired, auto-submitted");
            closed += 1;
        }
        Ok(closed)
    }
}
