//! Device geolocation seam.
//!
//! The platform location API sits behind `LocationProvider`; the flow only
//! sees `GeoCoordinate` fixes and the fixed failure taxonomy below. Every
//! failure is recoverable by a manual retry; there is no automatic
//! retry/backoff here.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// A single position fix from the device.
///
/// Ephemeral: produced on demand, copied into the check-in payload, never
/// stored as its own entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_meters: f64,
}

/// Options for a single-shot location request.
#[derive(Debug, Clone)]
pub struct LocationOptions {
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
    pub max_age: Duration,
}

impl Default for LocationOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout: Duration::from_secs(10),
            max_age: Duration::from_secs(60),
        }
    }
}

/// Failure taxonomy surfaced to the caller, one distinct message each.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationError {
    #[error("Location permission was denied")]
    PermissionDenied,
    #[error("Current position is unavailable")]
    PositionUnavailable,
    #[error("Timed out waiting for a position fix")]
    Timeout,
    #[error("Location request failed: {0}")]
    Unknown(String),
}

impl LocationError {
    /// Human-readable message with the retry affordance spelled out.
    pub fn user_message(&self) -> &'static str {
        match self {
            LocationError::PermissionDenied => {
                "Location access was denied. Allow location access and try again."
            }
            LocationError::PositionUnavailable => {
                "Your position could not be determined. Move to an open area and try again."
            }
            LocationError::Timeout => {
                "Getting your location took too long. Try again."
            }
            LocationError::Unknown(_) => {
                "Something went wrong while getting your location. Try again."
            }
        }
    }
}

/// Single-shot provider of the device's current position.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_location(
        &self,
        options: &LocationOptions,
    ) -> Result<GeoCoordinate, LocationError>;
}

/// Runs a location request under the configured timeout, mapping a hung
/// platform call to `LocationError::Timeout`.
pub async fn locate_with_timeout<P: LocationProvider + ?Sized>(
    provider: &P,
    options: &LocationOptions,
) -> Result<GeoCoordinate, LocationError> {
    match tokio::time::timeout(options.timeout, provider.current_location(options)).await {
        Ok(result) => result,
        Err(_) => Err(LocationError::Timeout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProvider(GeoCoordinate);

    #[async_trait]
    impl LocationProvider for FixedProvider {
        async fn current_location(
            &self,
            _options: &LocationOptions,
        ) -> Result<GeoCoordinate, LocationError> {
            Ok(self.0)
        }
    }

    struct HungProvider;

    #[async_trait]
    impl LocationProvider for HungProvider {
        async fn current_location(
            &self,
            _options: &LocationOptions,
        ) -> Result<GeoCoordinate, LocationError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            unreachable!()
        }
    }

    #[tokio::test]
    async fn returns_the_provider_fix() {
        let fix = GeoCoordinate {
            latitude: 12.9716,
            longitude: 77.5946,
            accuracy_meters: 5.0,
        };
        let got = locate_with_timeout(&FixedProvider(fix), &LocationOptions::default())
            .await
            .unwrap();
        assert_eq!(got, fix);
    }

    #[tokio::test]
    async fn hung_platform_call_maps_to_timeout() {
        let options = LocationOptions {
            timeout: Duration::from_millis(50),
            ..Default::default()
        };
        let err = locate_with_timeout(&HungProvider, &options)
            .await
            .unwrap_err();
        assert_eq!(err, LocationError::Timeout);
    }

    #[test]
    fn each_error_kind_has_a_distinct_message() {
        let messages = [
            LocationError::PermissionDenied.user_message(),
            LocationError::PositionUnavailable.user_message(),
            LocationError::Timeout.user_message(),
            LocationError::Unknown("x".into()).user_message(),
        ];
        for (i, a) in messages.iter().enumerate() {
            for b in messages.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
