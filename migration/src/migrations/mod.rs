pub mod m202606010001_create_users;
pub mod m202606010002_create_groups;
pub mod m202606010003_create_group_members;
pub mod m202606070001_create_assignments;
pub mod m202606070002_create_submissions;
pub mod m202607120001_create_attendance;
