pub mod course_info;
pub mod recommend;
pub mod status;
pub mod students;
