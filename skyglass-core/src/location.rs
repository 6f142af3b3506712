//! Device position lookup.

use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;
use thiserror::Error;
use tokio::{sync::Mutex, time::Instant};
use tracing::debug;

use crate::model::Coordinates;

pub const LOCATION_TIMEOUT: Duration = Duration::from_secs(10);
pub const LOCATION_MAXIMUM_AGE: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationOptions {
    pub high_accuracy: bool,
    /// How long to wait for a fix before giving up.
    pub timeout: Duration,
    /// How old a previously obtained fix may be and still be reused.
    pub maximum_age: Duration,
}

impl Default for LocationOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: LOCATION_TIMEOUT,
            maximum_age: LOCATION_MAXIMUM_AGE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("Location access denied by user.")]
    PermissionDenied,
    #[error("Location information unavailable.")]
    PositionUnavailable,
    #[error("Location request timed out.")]
    Timeout,
    #[error("An unknown error occurred while retrieving location.")]
    Unknown,
    #[error("Geolocation is not supported on this platform.")]
    Unsupported,
}

/// A source of the device's position.
#[async_trait]
pub trait LocationProvider: Send + Sync + Debug {
    async fn current_position(&self, options: &LocationOptions) -> Result<Coordinates, LocationError>;
}

/// Position taken from configuration.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Option<Coordinates>);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_position(&self, _options: &LocationOptions) -> Result<Coordinates, LocationError> {
        self.0.ok_or(LocationError::PositionUnavailable)
    }
}

/// Platform without any location service.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

#[async_trait]
impl LocationProvider for NoLocation {
    async fn current_position(&self, _options: &LocationOptions) -> Result<Coordinates, LocationError> {
        Err(LocationError::Unsupported)
    }
}

/// Wraps a provider with the timeout, cached-fix reuse and one request at a time.
#[derive(Debug)]
pub struct Locator<P> {
    provider: P,
    options: LocationOptions,
    last_fix: Mutex<Option<(Instant, Coordinates)>>,
}

impl<P: LocationProvider> Locator<P> {
    pub fn new(provider: P) -> Self {
        Self::with_options(provider, LocationOptions::default())
    }

    pub fn with_options(provider: P, options: LocationOptions) -> Self {
        Self {
            provider,
            options,
            last_fix: Mutex::new(None),
        }
    }

    /// Current position; concurrent callers wait for the request in flight.
    pub async fn locate(&self) -> Result<Coordinates, LocationError> {
        let mut last_fix = self.last_fix.lock().await;

        if let Some((at, coords)) = *last_fix {
            if at.elapsed() <= self.options.maximum_age {
                debug!(?coords, "reusing cached position");
                return Ok(coords);
            }
        }

        let coords = tokio::time::timeout(
            self.options.timeout,
            self.provider.current_position(&self.options),
        )
        .await
        .map_err(|_| LocationError::Timeout)??;

        *last_fix = Some((Instant::now(), coords));
        Ok(coords)
    }
}
