pub mod assessments;
pub mod auth;
pub mod health;
pub mod sessions;
pub mod students;
pub mod submissions;
