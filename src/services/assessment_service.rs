use crate::dto::assessment_dto::CreateAssessmentPayload;
use crate::error::{Error, Result};
use crate::models::assessment::{Assessment, TYPE_PRACTICE, TYPE_TEST};
use crate::models::question::check_question_set;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct AssessmentService {
    pool: PgPool,
}

impl AssessmentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn check_payload(payload: &CreateAssessmentPayload) -> Result<()> {
        if payload.assessment_type != TYPE_PRACTICE && payload.assessment_type != TYPE_TEST {
            return Err(Error::BadRequest(format!(
                "unknown assessment type '{}'",
                payload.assessment_type
            )));
        }
        if payload.assessment_type == TYPE_PRACTICE && payload.duration_minutes.is_some() {
            return Err(Error::BadRequest(
                "practice assessments are untimed".to_string(),
            ));
        }
        if let Some(minutes) = payload.duration_minutes {
            if minutes <= 0 {
                return Err(Error::BadRequest(
                    "duration_minutes must be positive".to_string(),
                ));
            }
        }
        check_question_set(&payload.questions).map_err(Error::BadRequest)?;
        Ok(())
    }

    pub async fn create(
        &self,
        payload: CreateAssessmentPayload,
        created_by: Uuid,
    ) -> Result<Assessment> {
        Self::check_payload(&payload)?;
        let questions_json = serde_json::to_value(&payload.questions)?;

        let assessment = sqlx::query_as::<_, Assessment>(
            r#"INSERT INTO assessments
                   (title, assessment_type, subject, questions, duration_minutes, created_by)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING *"#,
        )
        .bind(&payload.title)
        .bind(&payload.assessment_type)
        .bind(&payload.subject)
        .bind(questions_json)
        .bind(payload.duration_minutes)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(assessment_id = %assessment.id, title = %assessment.title, "Created assessment");
        Ok(assessment)
    }

    /// Create-or-replace by id.
    pub async fn upsert(
        &self,
        assessment_id: Uuid,
        payload: CreateAssessmentPayload,
        created_by: Uuid,
    ) -> Result<Assessment> {
        Self::check_payload(&payload)?;
        let questions_json = serde_json::to_value(&payload.questions)?;

        let assessment = sqlx::query_as::<_, Assessment>(
            r#"INSERT INTO assessments
                   (id, title, assessment_type, subject, questions, duration_minutes, created_by)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               ON CONFLICT (id) DO UPDATE SET
                   title = EXCLUDED.title,
                   assessment_type = EXCLUDED.assessment_type,
                   subject = EXCLUDED.subject,
                   questions = EXCLUDED.questions,
                   duration_minutes = EXCLUDED.duration_minutes,
                   updated_at = NOW()
               RETURNING *"#,
        )
        .bind(assessment_id)
        .bind(&payload.title)
        .bind(&payload.assessment_type)
        .bind(&payload.subject)
        .bind(questions_json)
        .bind(payload.duration_minutes)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(assessment)
    }

    pub async fn get_by_id(&self, assessment_id: Uuid) -> Result<Assessment> {
        let assessment =
            sqlx::query_as::<_, Assessment>(r#"SELECT * FROM assessments WHERE id = $1"#)
                .bind(assessment_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(assessment)
    }

    pub async fn list(&self) -> Result<Vec<Assessment>> {
        let assessments = sqlx::query_as::<_, Assessment>(
            r#"SELECT * FROM assessments ORDER BY created_at ASC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(assessments)
    }
}
