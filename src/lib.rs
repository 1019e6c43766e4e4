pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    ai_service::AiService, assessment_service::AssessmentService, auth_service::AuthService,
    session_service::SessionService, submission_service::SubmissionService,
};
use reqwest::Client;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub auth_service: AuthService,
    pub assessment_service: AssessmentService,
    pub session_service: SessionService,
    pub submission_service: SubmissionService,
    pub ai_service: AiService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .expect("http client");

        let auth_service = AuthService::new(pool.clone());
        let assessment_service = AssessmentService::new(pool.clone());
        let session_service = SessionService::new(pool.clone());
        let submission_service = SubmissionService::new(pool.clone());
        let ai_service = AiService::new(
            config.openai_api_key.clone(),
            config.openai_base_url.clone(),
            http_client,
        );

        Self {
            pool,
            auth_service,
            assessment_service,
            session_service,
            submission_service,
            ai_service,
        }
    }
}
