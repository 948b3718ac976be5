pub mod course;
pub mod enrollment;
pub mod message;
pub mod quiz;
pub mod quiz_attempt;
pub mod user;
