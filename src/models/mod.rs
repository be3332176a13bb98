pub mod session;
pub mod student;
