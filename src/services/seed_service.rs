use crate::error::Result;
use crate::models::assessment::{TYPE_PRACTICE, TYPE_TEST};
use crate::models::user::{ROLE_STUDENT, ROLE_TEACHER};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

// Fixed ids keep the step idempotent across restarts.
const TEACHER_ID: &str = "6f0b4a52-0000-4000-8000-000000000001";
const STUDENT_IDS: [(&str, &str, &str); 3] = [
    (
        "6f0b4a52-0000-4000-8000-000000000011",
        "Aman Sharma",
        "aman@example.com",
    ),
    (
        "6f0b4a52-0000-4000-8000-000000000012",
        "Priya Verma",
        "priya@example.com",
    ),
    (
        "6f0b4a52-0000-4000-8000-000000000013",
        "Rohan Gupta",
        "rohan@example.com",
    ),
];
const PRACTICE_ID: &str = "6f0b4a52-0000-4000-8000-000000000101";
const TEST_ID: &str = "6f0b4a52-0000-4000-8000-000000000102";

/// Explicit one-time seeding, run at startup when SEED_INITIAL_DATA is set.
/// Idempotent (fixed ids, ON CONFLICT DO NOTHING) and entirely separate from
/// the read paths.
pub struct SeedService {
    pool: PgPool,
}

impl SeedService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn run(&self) -> Result<()> {
        self.seed_user(TEACHER_ID, "Prof. Rajesh Panday", "rajesh@pandayclasses.com", ROLE_TEACHER)
            .await?;
        for (id, name, email) in STUDENT_IDS {
            self.seed_user(id, name, email, ROLE_STUDENT).await?;
        }
        self.seed_assessments().await?;
        tracing::info!("Initial data seeded");
        Ok(())
    }

    async fn seed_user(&self, id: &str, name: &str, email: &str, role: &str) -> Result<()> {
        // Seeded accounts carry no password hash and cannot log in until one
        // is set out of band.
        sqlx::query(
            r#"INSERT INTO users (id, name, email, role)
               VALUES ($1, $2, $3, $4)
               ON CONFLICT (id) DO NOTHING"#,
        )
        .bind(Uuid::parse_str(id).expect("seed uuid"))
        .bind(name)
        .bind(email)
        .bind(role)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn seed_assessments(&self) -> Result<()> {
        let practice_questions = json!([
            {
                "id": "q1",
                "text": "What is the value of x in 2x + 5 = 15?",
                "options": [
                    {"id": "a", "text": "5"},
                    {"id": "b", "text": "10"},
                    {"id": "c", "text": "2.5"},
                    {"id": "d", "text": "5.5"}
                ],
                "correct_option_id": "a",
                "explanation": "2x = 15 - 5 => 2x = 10 => x = 5."
            },
            {
                "id": "q2",
                "text": "Simplify: (x + 2)(x - 2)",
                "options": [
                    {"id": "a", "text": "x^2 + 4"},
                    {"id": "b", "text": "x^2 - 4"},
                    {"id": "c", "text": "x^2 - 4x + 4"},
                    {"id": "d", "text": "2x"}
                ],
                "correct_option_id": "b",
                "explanation": "This is the difference of squares formula: (a+b)(a-b) = a^2 - b^2."
            }
        ]);

        let test_questions = json!([
            {
                "id": "q3",
                "text": "What is the derivative of x^2?",
                "options": [
                    {"id": "a", "text": "x"},
                    {"id": "b", "text": "2x"},
                    {"id": "c", "text": "x^3 / 3"},
                    {"id": "d", "text": "2"}
                ],
                "correct_option_id": "b"
            },
            {
                "id": "q4",
                "text": "Value of sin(90°)?",
                "options": [
                    {"id": "a", "text": "0"},
                    {"id": "b", "text": "1"},
                    {"id": "c", "text": "0.5"},
                    {"id": "d", "text": "Undefined"}
                ],
                "correct_option_id": "b"
            },
            {
                "id": "q5",
                "text": "Sum of angles in a triangle is:",
                "options": [
                    {"id": "a", "text": "90°"},
                    {"id": "b", "text": "180°"},
                    {"id": "c", "text": "360°"},
                    {"id": "d", "text": "270°"}
                ],
                "correct_option_id": "b"
            }
        ]);

        let teacher_id = Uuid::parse_str(TEACHER_ID).expect("seed uuid");

        sqlx::query(
            r#"INSERT INTO assessments
                   (id, title, assessment_type, subject, questions, created_by)
               VALUES ($1, $2, $3, $4, $5, $6)
               ON CONFLICT (id) DO NOTHING"#,
        )
        .bind(Uuid::parse_str(PRACTICE_ID).expect("seed uuid"))
        .bind("Algebra Foundations - Practice")
        .bind(TYPE_PRACTICE)
        .bind("Mathematics")
        .bind(practice_questions)
        .bind(teacher_id)
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"INSERT INTO assessments
                   (id, title, assessment_type, subject, questions, duration_minutes, created_by)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               ON CONFLICT (id) DO NOTHING"#,
        )
        .bind(Uuid::parse_str(TEST_ID).expect("seed uuid"))
        .bind("Final Mathematics Unit Test")
        .bind(TYPE_TEST)
        .bind("Mathematics")
        .bind(test_questions)
        .bind(30)
        .bind(teacher_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
