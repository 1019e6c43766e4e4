pub mod assessment_dto;
pub mod auth_dto;
pub mod review_dto;
pub mod session_dto;
