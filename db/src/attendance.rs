//! Attendance check-in processing.
//!
//! `process_check_in` is the authoritative server-side path: it resolves the
//! scanned token to a session, applies the eligibility policy, computes the
//! haversine distance to the faculty anchor point, classifies the result and
//! persists exactly one record.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{DatabaseConnection, DbErr};
use thiserror::Error;

use crate::models::{
    attendance_record::{self, AttendanceStatus},
    attendance_session::{self, SessionType},
};
use util::{config, geo};

/// The inbound check-in payload: scanned token plus reported device position.
#[derive(Debug, Clone)]
pub struct CheckInAttempt {
    pub qr_token: String,
    pub student_latitude: f64,
    pub student_longitude: f64,
}

/// Failure kinds for a check-in attempt.
///
/// `SessionNotFound` and `SessionExpired` mean the token itself is the
/// problem; retrying the same attempt cannot succeed. `AlreadyCheckedIn` is
/// the conflict case. `Db` wraps infrastructure failures.
#[derive(Debug, Error)]
pub enum CheckInError {
    #[error("Attendance session not found")]
    SessionNotFound,
    #[error("Attendance session has expired")]
    SessionExpired,
    #[error("Attendance already recorded for this session")]
    AlreadyCheckedIn,
    #[error("Database error: {0}")]
    Db(#[from] DbErr),
}

/// A successful check-in: the persisted record joined with the session
/// display fields the UI renders.
#[derive(Debug, Clone)]
pub struct CheckIn {
    pub record: attendance_record::Model,
    pub session_name: String,
    pub session_type: SessionType,
    pub allowed_radius_meters: f64,
}

/// Pre-insert gate deciding whether a check-in attempt is permitted.
///
/// Swappable so the duplicate rule can change without touching the
/// processor's call sites.
#[async_trait]
pub trait EligibilityPolicy: Send + Sync {
    async fn permits(
        &self,
        db: &DatabaseConnection,
        session: &attendance_session::Model,
        student_id: i64,
    ) -> Result<bool, DbErr>;
}

/// Permits every attempt once a session and student are known.
pub struct AllowAll;

#[async_trait]
impl EligibilityPolicy for AllowAll {
    async fn permits(
        &self,
        _db: &DatabaseConnection,
        _session: &attendance_session::Model,
        _student_id: i64,
    ) -> Result<bool, DbErr> {
        Ok(true)
    }
}

/// Refuses an attempt when a record for (session, student) already exists.
pub struct RejectDuplicate;

#[async_trait]
impl EligibilityPolicy for RejectDuplicate {
    async fn permits(
        &self,
        db: &DatabaseConnection,
        session: &attendance_session::Model,
        student_id: i64,
    ) -> Result<bool, DbErr> {
        Ok(!attendance_record::Model::exists_for(db, session.id, student_id).await?)
    }
}

/// Classifies a check-in by distance: within the session radius is
/// `Present`, anything beyond it is `Late` (accepted, not rejected).
pub fn classify(distance_meters: f64, allowed_radius_meters: f64) -> AttendanceStatus {
    if distance_meters <= allowed_radius_meters {
        AttendanceStatus::Present
    } else {
        AttendanceStatus::Late
    }
}

/// Processes a student check-in attempt.
///
/// Exactly one `attendance_records` row is inserted per successful call.
/// Expiry enforcement follows the `ATTENDANCE_ENFORCE_EXPIRY` configuration
/// flag; with it disabled, tokens remain usable past `expires_at`.
pub async fn process_check_in(
    db: &DatabaseConnection,
    attempt: &CheckInAttempt,
    student_id: i64,
    policy: &dyn EligibilityPolicy,
) -> Result<CheckIn, CheckInError> {
    let session = attendance_session::Model::find_by_token(db, &attempt.qr_token)
        .await?
        .ok_or(CheckInError::SessionNotFound)?;

    let now = Utc::now();
    if config::attendance_enforce_expiry() && session.is_expired(now) {
        tracing::warn!(
            session_id = session.id,
            student_id,
            "check-in refused: session expired"
        );
        return Err(CheckInError::SessionExpired);
    }

    if !policy.permits(db, &session, student_id).await? {
        tracing::warn!(
            session_id = session.id,
            student_id,
            "check-in refused: eligibility policy"
        );
        return Err(CheckInError::AlreadyCheckedIn);
    }

    let distance = geo::haversine_meters(
        attempt.student_latitude,
        attempt.student_longitude,
        session.faculty_latitude,
        session.faculty_longitude,
    );
    let status = classify(distance, session.allowed_radius_meters);

    let record = attendance_record::Model::create(
        db,
        session.id,
        student_id,
        status,
        now,
        attempt.student_latitude,
        attempt.student_longitude,
        distance,
    )
    .await?;

    Ok(CheckIn {
        record,
        session_name: session.session_name,
        session_type: session.session_type,
        allowed_radius_meters: session.allowed_radius_meters,
    })
}
