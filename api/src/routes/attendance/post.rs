use axum::{Extension, Json, extract::State, http::StatusCode};
use serde::Deserialize;
use validator::Validate;

use crate::{auth::AuthUser, response::ApiResponse};
use db::attendance::{self, CheckInAttempt, CheckInError, RejectDuplicate};
use util::state::AppState;

use super::common::CheckInResponse;

#[derive(Debug, Deserialize, Validate)]
pub struct CheckInReq {
    #[validate(length(min = 1, message = "qr_code_token must not be empty"))]
    pub qr_code_token: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub student_latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub student_longitude: f64,
}

/// POST `/api/attendance/check-in`
///
/// Student check-in against a scanned (or manually entered) session token.
///
/// **Auth**: any authenticated user; the token is the capability.
///
/// **Failures** (distinct status per kind):
/// - `404` unknown token
/// - `410` expired session
/// - `409` already checked in
/// - `422` invalid payload
/// - `500` infrastructure error
pub async fn check_in(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(body): Json<CheckInReq>,
) -> (StatusCode, Json<ApiResponse<CheckInResponse>>) {
    if let Err(e) = body.validate() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::error(format!("Invalid check-in payload: {e}"))),
        );
    }

    let db = state.db();
    let attempt = CheckInAttempt {
        qr_token: body.qr_code_token,
        student_latitude: body.student_latitude,
        student_longitude: body.student_longitude,
    };

    match attendance::process_check_in(db, &attempt, claims.sub, &RejectDuplicate).await {
        Ok(check_in) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                CheckInResponse::from(check_in),
                "Attendance recorded",
            )),
        ),
        Err(e @ CheckInError::SessionNotFound) => {
            (StatusCode::NOT_FOUND, Json(ApiResponse::error(e.to_string())))
        }
        Err(e @ CheckInError::SessionExpired) => {
            (StatusCode::GONE, Json(ApiResponse::error(e.to_string())))
        }
        Err(e @ CheckInError::AlreadyCheckedIn) => {
            (StatusCode::CONFLICT, Json(ApiResponse::error(e.to_string())))
        }
        Err(CheckInError::Db(e)) => {
            tracing::error!(error = %e, "check-in failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to record attendance")),
            )
        }
    }
}
