//! Scan-to-request flow.
//!
//! Ties the adapters together: resolve the scanned payload to a token, gate
//! the attempt, acquire a position fix, and assemble the check-in request
//! payload. Submitting the request (and retrying after failures) stays with
//! the caller.

use serde::Serialize;
use thiserror::Error;

use crate::location::{locate_with_timeout, LocationError, LocationOptions, LocationProvider};
use crate::token;

/// Authenticated-user identity, passed explicitly rather than read from a
/// process-wide store.
#[derive(Debug, Clone, Copy)]
pub struct ScanContext {
    pub user_id: Option<i64>,
}

/// Pre-location gate on a check-in attempt.
pub trait EligibilityGate: Send + Sync {
    fn permits(&self, token: &str, ctx: &ScanContext) -> bool;
}

/// Permits whenever a non-empty token and an authenticated user are
/// present. Real duplicate prevention happens server-side.
pub struct TokenAndUserPresent;

impl EligibilityGate for TokenAndUserPresent {
    fn permits(&self, token: &str, ctx: &ScanContext) -> bool {
        !token.is_empty() && ctx.user_id.is_some()
    }
}

/// The wire payload the check-in endpoint accepts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckInRequest {
    pub qr_code_token: String,
    pub student_latitude: f64,
    pub student_longitude: f64,
}

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Check-in is not permitted for this token and user")]
    NotEligible,
    #[error(transparent)]
    Location(#[from] LocationError),
}

/// Builds a check-in request from a scanned (or manually entered) payload.
pub async fn prepare_check_in<P: LocationProvider + ?Sized>(
    scanned_payload: &str,
    ctx: &ScanContext,
    gate: &dyn EligibilityGate,
    provider: &P,
    options: &LocationOptions,
) -> Result<CheckInRequest, FlowError> {
    let token = token::resolve(scanned_payload);
    if !gate.permits(&token, ctx) {
        return Err(FlowError::NotEligible);
    }

    let fix = locate_with_timeout(provider, options).await?;
    Ok(CheckInRequest {
        qr_code_token: token,
        student_latitude: fix.latitude,
        student_longitude: fix.longitude,
    })
}
