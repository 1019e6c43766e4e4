use std::env;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;
use uuid::Uuid;

async fn setup() -> (classroom_backend::AppState, sqlx::PgPool) {
    dotenvy::dotenv().ok();
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("JWT_SECRET", "test_secret_key");
    env::set_var("TOKEN_TTL_HOURS", "24");
    env::set_var("OPENAI_API_KEY", "sk-test");
    env::set_var("MAX_AI_QUESTIONS", "15");

    let _ = classroom_backend::config::init_config();
    let pool = classroom_backend::database::pool::create_pool()
        .await
        .expect("pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");
    (classroom_backend::AppState::new(pool.clone()), pool)
}

fn app(state: classroom_backend::AppState) -> Router {
    let public = Router::new()
        .route("/api/auth/login", post(classroom_backend::routes::auth::login))
        .route(
            "/api/auth/register",
            post(classroom_backend::routes::auth::register),
        );

    let student = Router::new()
        .route(
            "/api/sessions",
            post(classroom_backend::routes::sessions::start_session),
        )
        .route(
            "/api/sessions/:id",
            get(classroom_backend::routes::sessions::get_session),
        )
        .route(
            "/api/sessions/:id/answer",
            post(classroom_backend::routes::sessions::answer),
        )
        .route(
            "/api/sessions/:id/advance",
            post(classroom_backend::routes::sessions::advance),
        )
        .route(
            "/api/sessions/:id/reveal",
            post(classroom_backend::routes::sessions::reveal),
        )
        .route(
            "/api/sessions/:id/submit",
            post(classroom_backend::routes::sessions::submit),
        )
        .route(
            "/api/sessions/:id/review",
            post(classroom_backend::routes::sessions::start_review),
        )
        .layer(axum::middleware::from_fn(
            classroom_backend::middleware::auth::require_student,
        ));

    let shared = Router::new()
        .route(
            "/api/submissions",
            get(classroom_backend::routes::submissions::list_submissions),
        )
        .route(
            "/api/submissions/:id/review",
            get(classroom_backend::routes::submissions::review_submission),
        )
        .layer(axum::middleware::from_fn(
            classroom_backend::middleware::auth::require_bearer_auth,
        ));

    public.merge(student).merge(shared).with_state(state)
}

async fn json_body(resp: axum::response::Response) -> JsonValue {
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, token: &str, body: JsonValue) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_empty(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn practice_flow_end_to_end() {
    let (state, pool) = setup().await;

    // Teacher-authored practice assessment seeded through the service layer.
    let teacher_id = Uuid::new_v4();
    sqlx::query(
        r#"INSERT INTO users (id, name, email, role)
           VALUES ($1, $2, $3, 'TEACHER')"#,
    )
    .bind(teacher_id)
    .bind("Test Teacher")
    .bind(format!("teacher_{}@example.com", teacher_id))
    .execute(&pool)
    .await
    .expect("seed teacher");

    let assessment = state
        .assessment_service
        .create(
            classroom_backend::dto::assessment_dto::CreateAssessmentPayload {
                title: "Practice Flow".into(),
                assessment_type: "PRACTICE".into(),
                subject: Some("Mathematics".into()),
                duration_minutes: None,
                questions: serde_json::from_value(json!([
                    {
                        "id": "q1",
                        "text": "2 + 2?",
                        "options": [
                            {"id": "a", "text": "3"},
                            {"id": "b", "text": "4"},
                            {"id": "c", "text": "5"}
                        ],
                        "correct_option_id": "b"
                    },
                    {
                        "id": "q2",
                        "text": "3 * 3?",
                        "options": [
                            {"id": "a", "text": "6"},
                            {"id": "b", "text": "9"},
                            {"id": "c", "text": "12"}
                        ],
                        "correct_option_id": "b"
                    }
                ]))
                .unwrap(),
            },
            teacher_id,
        )
        .await
        .expect("create assessment");

    let app = app(state);

    // Register a student, then log in.
    let suffix = Uuid::new_v4().simple().to_string();
    let register = json!({
        "name": "Flow Student",
        "email": format!("flow_{}@example.com", suffix),
        "username": format!("flow_{}", suffix),
        "password": "secret123"
    });
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/register")
                .header("content-type", "application/json")
                .body(Body::from(register.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let login = json!({
        "username_or_email": format!("flow_{}", suffix),
        "password": "secret123",
        "role": "STUDENT"
    });
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("content-type", "application/json")
                .body(Body::from(login.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    let token = body["token"].as_str().expect("token").to_string();
    assert!(body["user"].get("password_hash").is_none());

    // Start a session.
    let resp = app
        .clone()
        .oneshot(post_json(
            "/api/sessions",
            &token,
            json!({"assessment_id": assessment.id}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let session = json_body(resp).await;
    let session_id = session["id"].as_str().expect("session id").to_string();
    assert_eq!(session["status"], "in_progress");
    assert_eq!(session["total_questions"], 2);
    assert!(session["deadline"].is_null());

    // Wrong answer on q1, advance, correct answer on q2.
    let resp = app
        .clone()
        .oneshot(post_json(
            &format!("/api/sessions/{}/answer", session_id),
            &token,
            json!({"question_id": "q1", "option_id": "a"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Practice mode: check the answer, which locks it.
    let resp = app
        .clone()
        .oneshot(post_empty(
            &format!("/api/sessions/{}/reveal", session_id),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .clone()
        .oneshot(post_json(
            &format!("/api/sessions/{}/answer", session_id),
            &token,
            json!({"question_id": "q1", "option_id": "b"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app
        .clone()
        .oneshot(post_empty(
            &format!("/api/sessions/{}/advance", session_id),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .clone()
        .oneshot(post_json(
            &format!("/api/sessions/{}/answer", session_id),
            &token,
            json!({"question_id": "q2", "option_id": "b"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Submit: 1 / 2 correct.
    let resp = app
        .clone()
        .oneshot(post_empty(
            &format!("/api/sessions/{}/submit", session_id),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let result = json_body(resp).await;
    assert_eq!(result["score"], 1);
    assert_eq!(result["total_questions"], 2);
    assert_eq!(result["accuracy_percent"], 50);
    let submission_id = result["submission_id"].as_str().expect("submission id");

    // Second submit is a conflict.
    let resp = app
        .clone()
        .oneshot(post_empty(
            &format!("/api/sessions/{}/submit", session_id),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Mistake review over the one wrong question.
    let resp = app
        .clone()
        .oneshot(post_empty(
            &format!("/api/sessions/{}/review", session_id),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let review = json_body(resp).await;
    assert_eq!(review["status"], "reviewing");
    assert_eq!(review["mistake_count"], 1);

    // Submission review breaks down each question.
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/api/submissions/{}/review", submission_id))
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let breakdown = json_body(resp).await;
    assert_eq!(breakdown["accuracy_percent"], 50);
    let questions = breakdown["questions"].as_array().expect("questions");
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0]["is_correct"], false);
    assert_eq!(questions[1]["is_correct"], true);

    // The student sees their own submission in the list.
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/submissions")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let listed = json_body(resp).await;
    assert!(listed
        .as_array()
        .expect("array")
        .iter()
        .any(|s| s["id"] == submission_id));
}

#[tokio::test]
async fn duplicate_registration_is_rejected_before_write() {
    let (state, pool) = setup().await;
    let app = app(state);

    let suffix = Uuid::new_v4().simple().to_string();
    let username = format!("dup_{}", suffix);
    let register = json!({
        "name": "Dup Student",
        "email": format!("dup_{}@example.com", suffix),
        "username": username,
        "password": "secret123"
    });

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/register")
                .header("content-type", "application/json")
                .body(Body::from(register.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/register")
                .header("content-type", "application/json")
                .body(Body::from(register.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = $1")
            .bind(&username)
            .fetch_one(&pool)
            .await
            .expect("count");
    assert_eq!(count, 1);
}

#[tokio::test]
async fn student_may_reuse_a_teacher_email() {
    let (state, pool) = setup().await;
    let app = app(state);

    // Identities are unique per role, so a staff email does not block a
    // student signup.
    let suffix = Uuid::new_v4().simple().to_string();
    let email = format!("shared_{}@example.com", suffix);
    sqlx::query(
        r#"INSERT INTO users (name, email, role)
           VALUES ($1, $2, 'TEACHER')"#,
    )
    .bind("Shared Teacher")
    .bind(&email)
    .execute(&pool)
    .await
    .expect("seed teacher");

    let register = json!({
        "name": "Shared Student",
        "email": email,
        "username": format!("shared_{}", suffix),
        "password": "secret123"
    });
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/register")
                .header("content-type", "application/json")
                .body(Body::from(register.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn session_requires_student_token() {
    let (state, _pool) = setup().await;
    let app = app(state);

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/sessions")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({"assessment_id": Uuid::new_v4()}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
