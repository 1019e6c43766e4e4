use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use classroom_backend::services::seed_service::SeedService;
use classroom_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    middleware, routes, AppState,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    if config.seed_initial_data {
        SeedService::new(pool.clone()).run().await?;
        info!("Initial classroom data seeded");
    }

    let app_state = AppState::new(pool);

    {
        let state = app_state.clone();
        tokio::spawn(async move {
            loop {
                match state
                    .session_service
                    .expire_overdue(&state.submission_service)
                    .await
                {
                    Ok(0) => {}
                    Ok(closed) => info!(closed, "Auto-submitted expired test sessions"),
                    Err(e) => tracing::error!("Session expiry sweep error: {:?}", e),
                }
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
        });
    }

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let public_api = Router::new()
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/register", post(routes::auth::register));

    // Read access for any signed-in user, student or teacher.
    let shared_api = Router::new()
        .route("/api/auth/me", get(routes::auth::me))
        .route("/api/assessments", get(routes::assessments::list_assessments))
        .route(
            "/api/assessments/:id",
            get(routes::assessments::get_assessment),
        )
        .route(
            "/api/submissions",
            get(routes::submissions::list_submissions),
        )
        .route(
            "/api/submissions/:id/review",
            get(routes::submissions::review_submission),
        )
        .route(
            "/api/submissions/:id/explain",
            post(routes::submissions::explain_mistake),
        )
        .layer(axum::middleware::from_fn(
            middleware::auth::require_bearer_auth,
        ));

    let teacher_api = Router::new()
        .route("/api/assessments", post(routes::assessments::create_assessment))
        .route(
            "/api/assessments/:id",
            put(routes::assessments::upsert_assessment),
        )
        .route(
            "/api/assessments/generate",
            post(routes::assessments::generate_assessment),
        )
        .route("/api/students", get(routes::students::list_students))
        .route(
            "/api/students/stats",
            get(routes::students::list_student_stats),
        )
        .layer(axum::middleware::from_fn(middleware::auth::require_teacher));

    let student_api = Router::new()
        .route("/api/sessions", post(routes::sessions::start_session))
        .route("/api/sessions/:id", get(routes::sessions::get_session))
        .route("/api/sessions/:id/answer", post(routes::sessions::answer))
        .route("/api/sessions/:id/advance", post(routes::sessions::advance))
        .route("/api/sessions/:id/back", post(routes::sessions::back))
        .route("/api/sessions/:id/reveal", post(routes::sessions::reveal))
        .route("/api/sessions/:id/submit", post(routes::sessions::submit))
        .route(
            "/api/sessions/:id/review",
            post(routes::sessions::start_review),
        )
        .route(
            "/api/sessions/:id/review/advance",
            post(routes::sessions::review_advance),
        )
        .route(
            "/api/sessions/:id/review/back",
            post(routes::sessions::review_back),
        )
        .layer(axum::middleware::from_fn(middleware::auth::require_student));

    let app = base_routes
        .merge(public_api)
        .merge(shared_api)
        .merge(teacher_api)
        .merge(student_api)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(25 * 1024 * 1024));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
