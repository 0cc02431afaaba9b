//! Single-shot user location acquisition.
//!
//! The host runtime's geolocation capability sits behind
//! [`GeolocationProvider`]. A request either yields finite coordinates or
//! fails once; retrying is the caller's decision.

use std::future::Future;
use std::time::Duration;

use bizmap_core::Coordinates;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("geolocation is not supported by this runtime")]
    Unsupported,
    #[error("location permission denied")]
    PermissionDenied,
    #[error("position unavailable: {0}")]
    PositionUnavailable(String),
    #[error("location request timed out after {0:?}")]
    Timeout(Duration),
}

/// Host geolocation capability.
pub trait GeolocationProvider {
    /// `false` when the runtime has no geolocation capability at all.
    fn is_supported(&self) -> bool;

    /// Resolve the device position. May prompt for permission the first
    /// time it is called in a session.
    fn current_position(&self) -> impl Future<Output = Result<Coordinates, LocationError>> + Send;
}

/// Request the user's location once.
///
/// # Errors
///
/// - [`LocationError::Unsupported`] when the provider has no capability.
/// - [`LocationError::Timeout`] when no answer arrives within `timeout`.
/// - Whatever permission or positioning error the provider reports.
pub async fn request_location<P>(provider: &P, timeout: Duration) -> Result<Coordinates, LocationError>
where
    P: GeolocationProvider + Sync,
{
    if !provider.is_supported() {
        return Err(LocationError::Unsupported);
    }

    let result = tokio::time::timeout(timeout, provider.current_position())
        .await
        .map_err(|_| LocationError::Timeout(timeout))?;

    match &result {
        Ok(coordinates) => tracing::debug!(
            latitude = coordinates.latitude,
            longitude = coordinates.longitude,
            "location acquired"
        ),
        Err(error) => tracing::warn!(error = %error, "location request failed"),
    }
    result
}

/// A provider that answers every request with the same outcome.
///
/// Backs hosts with a configured position and drives tests.
#[derive(Debug, Clone)]
pub struct FixedLocation {
    outcome: Option<Result<Coordinates, LocationError>>,
}

impl FixedLocation {
    #[must_use]
    pub fn at(coordinates: Coordinates) -> Self {
        Self {
            outcome: Some(Ok(coordinates)),
        }
    }

    #[must_use]
    pub fn failing(error: LocationError) -> Self {
        Self {
            outcome: Some(Err(error)),
        }
    }

    /// A runtime without any geolocation capability.
    #[must_use]
    pub fn unsupported() -> Self {
        Self { outcome: None }
    }
}

impl GeolocationProvider for FixedLocation {
    fn is_supported(&self) -> bool {
        self.outcome.is_some()
    }

    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        self.outcome.clone().unwrap_or(Err(LocationError::Unsupported))
    }
}
