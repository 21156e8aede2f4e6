pub mod announcement;
pub mod discussion;
