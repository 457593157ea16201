use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{Duration, Utc};
use validator::Validate;

use crate::{auth::AuthUser, response::ApiResponse};
use util::{config, state::AppState};

use super::common::{AttendanceSessionResponse, CreateSessionReq};
use db::models::attendance_session as sess;

/// POST `/api/groups/{group_id}/attendance/sessions`
///
/// Faculty creates an attendance session anchored at their current
/// position. A fresh `qr_token` is generated server-side; the expiry
/// window defaults to the configured session window (30 minutes).
///
/// **Auth**: Faculty of the group (or admin).
pub async fn create_session(
    State(state): State<AppState>,
    Path(group_id): Path<i64>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(body): Json<CreateSessionReq>,
) -> (StatusCode, Json<ApiResponse<AttendanceSessionResponse>>) {
    if let Err(e) = body.validate() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::error(format!("Invalid session payload: {e}"))),
        );
    }

    let db = state.db();

    let radius = body.allowed_radius_meters.unwrap_or(50.0);
    let window_minutes = body
        .expires_in_minutes
        .unwrap_or(config::attendance_session_window_minutes() as i64);
    let expires_at = Utc::now() + Duration::minutes(window_minutes);

    match sess::Model::create(
        db,
        group_id,
        claims.sub,
        &body.session_name,
        body.session_type,
        body.faculty_latitude,
        body.faculty_longitude,
        radius,
        expires_at,
    )
    .await
    {
        Ok(row) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                AttendanceSessionResponse::from(row),
                "Attendance session created",
            )),
        ),
        Err(e) => {
            tracing::error!(error = %e, group_id, "failed to create attendance session");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to create attendance session")),
            )
        }
    }
}
