use crate::dto::review_dto::StudentStats;
use crate::error::Result;
use crate::models::submission::Submission;
use sqlx::PgPool;
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Clone)]
pub struct SubmissionService {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct StudentStatsRow {
    student_id: Uuid,
    name: String,
    email: String,
    submissions_count: i64,
    average_accuracy_percent: i32,
}

impl SubmissionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append-only: submissions are created once and never edited. Concurrent
    /// duplicates for the same (student, assessment) are all accepted.
    pub async fn create(
        &self,
        student_id: Uuid,
        assessment_id: Uuid,
        score: i32,
        total_questions: i32,
        responses: &BTreeMap<String, String>,
    ) -> Result<Submission> {
        let responses_json = serde_json::to_value(responses)?;
        let submission = sqlx::query_as::<_, Submission>(
            r#"INSERT INTO submissions
                   (student_id, assessment_id, score, total_questions, responses, completed_at)
               VALUES ($1, $2, $3, $4, $5, NOW())
               RETURNING *"#,
        )
        .bind(student_id)
        .bind(assessment_id)
        .bind(score)
        .bind(total_questions)
        .bind(responses_json)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            submission_id = %submission.id,
            student_id = %student_id,
            score,
            total_questions,
            "Recorded submission"
        );
        Ok(submission)
    }

    pub async fn get_by_id(&self, submission_id: Uuid) -> Result<Submission> {
        let submission =
            sqlx::query_as::<_, Submission>(r#"SELECT * FROM submissions WHERE id = $1"#)
                .bind(submission_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(submission)
    }

    pub async fn list(&self, student_id: Option<Uuid>) -> Result<Vec<Submission>> {
        let submissions = sqlx::query_as::<_, Submission>(
            r#"SELECT * FROM submissions
               WHERE ($1::uuid IS NULL OR student_id = $1)
               ORDER BY completed_at DESC"#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(submissions)
    }

    /// Per-student aggregate for the teacher dashboard: attempt count and mean
    /// accuracy across all submissions, as a rounded percent.
    pub async fn student_stats(&self) -> Result<Vec<StudentStats>> {
        let rows = sqlx::query_as::<_, StudentStatsRow>(
            r#"SELECT
                   u.id AS student_id,
                   u.name,
                   u.email,
                   COUNT(s.id) AS submissions_count,
                   COALESCE(ROUND(AVG(
                       CASE WHEN s.total_questions > 0
                            THEN s.score::float8 / s.total_questions
                            ELSE 0.0
                       END
                   ) * 100)::int4, 0) AS average_accuracy_percent
               FROM users u
               LEFT JOIN submissions s ON s.student_id = u.id
               WHERE u.role = 'STUDENT'
               GROUP BY u.id, u.name, u.email
               ORDER BY u.name ASC"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| StudentStats {
                student_id: r.student_id,
                name: r.name,
                email: r.email,
                submissions_count: r.submissions_count,
                average_accuracy_percent: r.average_accuracy_percent,
            })
            .collect())
    }
}
