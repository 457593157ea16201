pub mod attendance_test;
pub mod grades_test;
