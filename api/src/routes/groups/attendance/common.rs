use db::models::attendance_session::SessionType;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, Default)]
pub struct AttendanceSessionResponse {
    pub id: i64,
    pub group_id: i64,
    pub created_by: i64,
    pub qr_token: String,
    pub session_name: String,
    pub session_type: String,
    pub faculty_latitude: f64,
    pub faculty_longitude: f64,
    pub allowed_radius_meters: f64,
    pub created_at: String,
    pub expires_at: String,
    pub record_count: i64, // students who checked in to this session
}

impl From<db::models::attendance_session::Model> for AttendanceSessionResponse {
    fn from(m: db::models::attendance_session::Model) -> Self {
        Self {
            id: m.id,
            group_id: m.group_id,
            created_by: m.created_by,
            qr_token: m.qr_token,
            session_name: m.session_name,
            session_type: m.session_type.to_string(),
            faculty_latitude: m.faculty_latitude,
            faculty_longitude: m.faculty_longitude,
            allowed_radius_meters: m.allowed_radius_meters,
            created_at: m.created_at.to_rfc3339(),
            expires_at: m.expires_at.to_rfc3339(),
            record_count: 0,
        }
    }
}

impl AttendanceSessionResponse {
    pub fn from_with_count(
        m: db::models::attendance_session::Model,
        record_count: i64,
    ) -> Self {
        let mut base = Self::from(m);
        base.record_count = record_count;
        base
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSessionReq {
    #[validate(length(min = 1, message = "session_name must not be empty"))]
    pub session_name: String,
    pub session_type: SessionType,
    #[validate(range(min = -90.0, max = 90.0))]
    pub faculty_latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub faculty_longitude: f64,
    #[validate(range(min = 1.0, max = 10000.0))]
    pub allowed_radius_meters: Option<f64>,
    #[validate(range(min = 1, max = 1440))]
    pub expires_in_minutes: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i32>,
    pub per_page: Option<i32>,
    pub q: Option<String>,    // search in session_name
    pub sort: Option<String>, // "created_at", "-created_at", "session_name", "-session_name", "expires_at", "-expires_at"
}

#[derive(Debug, Serialize, Default)]
pub struct ListResponse {
    pub sessions: Vec<AttendanceSessionResponse>,
    pub page: i32,
    pub per_page: i32,
    pub total: i32,
}

/// A single attendance record (DTO) for API responses.
#[derive(Debug, Serialize)]
pub struct AttendanceRecordDto {
    pub id: i64,
    pub session_id: i64,
    pub student_id: i64,
    pub username: Option<String>,
    pub status: String,
    pub check_in_time: String, // ISO-8601 (UTC)
    pub distance_from_faculty_meters: f64,
}

/// Query params for listing session records.
#[derive(Debug, Deserialize)]
pub struct RecordsListQuery {
    /// Free-text search:
    /// - numeric → matches `student_id`
    /// - text   → matches `username` (contains)
    pub q: Option<String>,
    /// Sort by: `check_in_time` | `student_id` | `distance` (prefix with `-` for desc).
    /// Default `-check_in_time`.
    pub sort: Option<String>,
    /// 1-based page index (default 1).
    pub page: Option<i32>,
    /// Items per page (default 20, max 200).
    pub per_page: Option<i32>,
}

/// Paged response for records list.
#[derive(Debug, Serialize, Default)]
pub struct RecordsListResponse {
    pub records: Vec<AttendanceRecordDto>,
    pub page: i32,
    pub per_page: i32,
    pub total: i32,
}
