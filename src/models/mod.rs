pub mod assessment;
pub mod question;
pub mod session;
pub mod submission;
pub mod user;
