use db::attendance::CheckIn;
use serde::Serialize;

/// The persisted attendance record augmented with session display fields.
#[derive(Debug, Serialize, Default)]
pub struct CheckInResponse {
    pub id: i64,
    pub session_id: i64,
    pub student_id: i64,
    pub status: String,
    pub check_in_time: String,
    pub student_latitude: f64,
    pub student_longitude: f64,
    pub distance_from_faculty_meters: f64,
    pub session_name: String,
    pub session_type: String,
    pub allowed_radius_meters: f64,
}

impl From<CheckIn> for CheckInResponse {
    fn from(c: CheckIn) -> Self {
        Self {
            id: c.record.id,
            session_id: c.record.session_id,
            student_id: c.record.student_id,
            status: c.record.status.to_string(),
            check_in_time: c.record.check_in_time.to_rfc3339(),
            student_latitude: c.record.student_latitude,
            student_longitude: c.record.student_longitude,
            distance_from_faculty_meters: c.record.distance_from_faculty_meters,
            session_name: c.session_name,
            session_type: c.session_type.to_string(),
            allowed_radius_meters: c.allowed_radius_meters,
        }
    }
}
