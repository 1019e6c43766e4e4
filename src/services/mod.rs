pub mod ai_service;
pub mod assessment_service;
pub mod auth_service;
pub mod scoring_service;
pub mod seed_service;
pub mod session_service;
pub mod submission_service;
