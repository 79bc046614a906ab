//! Geolocation boundary and acquisition protocol
//!
//! Mirrors the browser geolocation surface behind [`LocationProvider`], and
//! owns the dual-accuracy acquisition protocol:
//!
//! 1. fast low-accuracy fix (4 s timeout, 60 s-old cache allowed) applied
//!    immediately to unblock the UI;
//! 2. background high-accuracy fix (15 s, no cache) applied only when the
//!    user has not overridden the location in the interim;
//! 3. if the fast fix fails, a single high-accuracy attempt whose timeout
//!    depends on the permission state (20 s when already granted, 60 s when
//!    the OS permission prompt may still be up).
//!
//! Staleness is tracked with a monotonic request id: last-request-wins by
//! id comparison, not by arrival order.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use shared::error::ErrorCode;
use shared::models::Coordinate;

/// Options for a single position request (the browser's `PositionOptions`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
    /// Accept a cached fix at most this old
    pub maximum_age: Duration,
}

/// Fast first fix: low accuracy, short timeout, allow a recent cached fix
pub const FAST_FIX: PositionOptions = PositionOptions {
    enable_high_accuracy: false,
    timeout: Duration::from_secs(4),
    maximum_age: Duration::from_secs(60),
};

/// Background refinement: high accuracy, fresh fix only
pub const PRECISE_FIX: PositionOptions = PositionOptions {
    enable_high_accuracy: true,
    timeout: Duration::from_secs(15),
    maximum_age: Duration::ZERO,
};

/// Fallback single attempt after a failed fast fix. The prompt-state budget
/// covers the time the OS permission dialog can stay on screen.
pub fn fallback_fix(permission: PermissionState) -> PositionOptions {
    let timeout = match permission {
        PermissionState::Granted => Duration::from_secs(20),
        PermissionState::Prompt | PermissionState::Denied => Duration::from_secs(60),
    };
    PositionOptions {
        enable_high_accuracy: true,
        timeout,
        maximum_age: Duration::ZERO,
    }
}

/// Geolocation permission state (the browser's `permissions.query` result)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Prompt,
    Denied,
}

/// Geolocation failure, classified into the three user-facing cases
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location request timed out")]
    Timeout,
    #[error("location unavailable: {0}")]
    Unavailable(String),
}

impl LocationError {
    /// The localized message code for this failure class
    pub fn code(&self) -> ErrorCode {
        match self {
            LocationError::PermissionDenied => ErrorCode::LocationPermissionDenied,
            LocationError::Timeout => ErrorCode::LocationTimeout,
            LocationError::Unavailable(_) => ErrorCode::LocationUnavailable,
        }
    }
}

/// The platform geolocation surface
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// One position request honoring the given options
    async fn current_position(&self, options: PositionOptions)
    -> Result<Coordinate, LocationError>;

    /// Current permission state for geolocation
    async fn permission_state(&self) -> PermissionState;
}

#[derive(Debug, Default)]
struct TrackerState {
    current: Option<Coordinate>,
    /// Monotonic request counter; only fixes carrying the latest id apply
    request_seq: u64,
    /// Set when the user picked a point manually; detection results then
    /// stop applying until the next explicit detection request
    manual_override: bool,
}

/// Stale-fix arbiter for the dual-accuracy protocol.
///
/// Shared between the foreground acquisition and the background refinement
/// task; all mutation goes through [`begin_request`](Self::begin_request),
/// [`try_apply`](Self::try_apply) and [`set_manual`](Self::set_manual).
#[derive(Debug, Default)]
pub struct LocationTracker {
    state: Mutex<TrackerState>,
}

impl LocationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new detection run: bumps the request id (invalidating every
    /// in-flight fix from older runs) and clears the manual override, since
    /// the user explicitly asked for detection again.
    pub fn begin_request(&self) -> u64 {
        let mut state = self.lock();
        state.request_seq += 1;
        state.manual_override = false;
        state.request_seq
    }

    /// Apply a fix from request `request_id`. Returns false (and leaves the
    /// state untouched) when a newer request exists or the user has
    /// manually overridden the location.
    pub fn try_apply(&self, request_id: u64, coordinate: Coordinate) -> bool {
        let mut state = self.lock();
        if state.manual_override || request_id != state.request_seq {
            debug!(
                request_id,
                current = state.request_seq,
                manual = state.manual_override,
                "discarding stale location fix"
            );
            return false;
        }
        state.current = Some(coordinate);
        true
    }

    /// The user picked a point on the map. Takes precedence over any
    /// in-flight detection result.
    pub fn set_manual(&self, coordinate: Coordinate) {
        let mut state = self.lock();
        state.current = Some(coordinate);
        state.manual_override = true;
    }

    /// Currently applied coordinate, if any
    pub fn current(&self) -> Option<Coordinate> {
        self.lock().current
    }

    /// Forget everything (new checkout session)
    pub fn reset(&self) {
        *self.lock() = TrackerState::default();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Foreground half of the protocol: fast fix, falling back to one
/// high-accuracy attempt sized by the permission state.
pub async fn acquire_fast(
    provider: &dyn LocationProvider,
    tracker: &LocationTracker,
    request_id: u64,
) -> Result<Coordinate, LocationError> {
    match provider.current_position(FAST_FIX).await {
        Ok(coordinate) => {
            tracker.try_apply(request_id, coordinate);
            Ok(coordinate)
        }
        Err(fast_err) => {
            debug!(error = %fast_err, "fast fix failed, trying high-accuracy fallback");
            let permission = provider.permission_state().await;
            let coordinate = provider.current_position(fallback_fix(permission)).await?;
            tracker.try_apply(request_id, coordinate);
            Ok(coordinate)
        }
    }
}

/// Background half: one high-accuracy fix that applies only if request
/// `request_id` is still the newest and the user has not intervened.
/// Returns the coordinate when it actually won.
pub async fn refine(
    provider: &dyn LocationProvider,
    tracker: &LocationTracker,
    request_id: u64,
) -> Option<Coordinate> {
    match provider.current_position(PRECISE_FIX).await {
        Ok(coordinate) if tracker.try_apply(request_id, coordinate) => Some(coordinate),
        Ok(_) => None,
        Err(err) => {
            debug!(error = %err, "background high-accuracy fix failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted provider: pops one result per call
    struct ScriptedProvider {
        responses: Mutex<Vec<Result<Coordinate, LocationError>>>,
        permission: PermissionState,
        calls: AtomicUsize,
        seen_options: Mutex<Vec<PositionOptions>>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<Result<Coordinate, LocationError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                permission: PermissionState::Granted,
                calls: AtomicUsize::new(0),
                seen_options: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LocationProvider for ScriptedProvider {
        async fn current_position(
            &self,
            options: PositionOptions,
        ) -> Result<Coordinate, LocationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen_options.lock().unwrap().push(options);
            self.responses.lock().unwrap().remove(0)
        }

        async fn permission_state(&self) -> PermissionState {
            self.permission
        }
    }

    #[test]
    fn stale_request_id_cannot_overwrite() {
        let tracker = LocationTracker::new();
        let first = tracker.begin_request();
        let second = tracker.begin_request();

        assert!(tracker.try_apply(second, Coordinate::new(15.0, 44.0)));
        // The slow background callback from the first request arrives late
        assert!(!tracker.try_apply(first, Coordinate::new(99.0, 99.0)));
        assert_eq!(tracker.current(), Some(Coordinate::new(15.0, 44.0)));
    }

    #[test]
    fn manual_override_blocks_detection_results() {
        let tracker = LocationTracker::new();
        let req = tracker.begin_request();
        tracker.set_manual(Coordinate::new(15.5, 44.5));

        assert!(!tracker.try_apply(req, Coordinate::new(15.0, 44.0)));
        assert_eq!(tracker.current(), Some(Coordinate::new(15.5, 44.5)));
    }

    #[test]
    fn new_detection_request_clears_manual_override() {
        let tracker = LocationTracker::new();
        tracker.set_manual(Coordinate::new(15.5, 44.5));
        let req = tracker.begin_request();

        assert!(tracker.try_apply(req, Coordinate::new(15.0, 44.0)));
        assert_eq!(tracker.current(), Some(Coordinate::new(15.0, 44.0)));
    }

    #[tokio::test]
    async fn fast_fix_applies_immediately() {
        let provider =
            ScriptedProvider::new(vec![Ok(Coordinate::new(15.0, 44.0))]);
        let tracker = LocationTracker::new();
        let req = tracker.begin_request();

        let coordinate = acquire_fast(&provider, &tracker, req).await.unwrap();
        assert_eq!(coordinate, Coordinate::new(15.0, 44.0));
        assert_eq!(tracker.current(), Some(coordinate));

        let options = provider.seen_options.lock().unwrap();
        assert!(!options[0].enable_high_accuracy);
        assert_eq!(options[0].timeout, Duration::from_secs(4));
        assert_eq!(options[0].maximum_age, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn failed_fast_fix_falls_back_to_high_accuracy() {
        let provider = ScriptedProvider::new(vec![
            Err(LocationError::Timeout),
            Ok(Coordinate::new(15.1, 44.1)),
        ]);
        let tracker = LocationTracker::new();
        let req = tracker.begin_request();

        let coordinate = acquire_fast(&provider, &tracker, req).await.unwrap();
        assert_eq!(coordinate, Coordinate::new(15.1, 44.1));

        let options = provider.seen_options.lock().unwrap();
        assert!(options[1].enable_high_accuracy);
        // Permission already granted: 20 s budget
        assert_eq!(options[1].timeout, Duration::from_secs(20));
    }

    #[tokio::test]
    async fn fallback_timeout_stretches_while_prompt_is_up() {
        let mut provider = ScriptedProvider::new(vec![
            Err(LocationError::Timeout),
            Ok(Coordinate::new(15.1, 44.1)),
        ]);
        provider.permission = PermissionState::Prompt;
        let tracker = LocationTracker::new();
        let req = tracker.begin_request();

        acquire_fast(&provider, &tracker, req).await.unwrap();
        let options = provider.seen_options.lock().unwrap();
        assert_eq!(options[1].timeout, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn refinement_loses_to_a_newer_request() {
        let provider =
            ScriptedProvider::new(vec![Ok(Coordinate::new(15.2, 44.2))]);
        let tracker = LocationTracker::new();
        let old_req = tracker.begin_request();
        let new_req = tracker.begin_request();
        tracker.try_apply(new_req, Coordinate::new(15.0, 44.0));

        let applied = refine(&provider, &tracker, old_req).await;
        assert_eq!(applied, None);
        assert_eq!(tracker.current(), Some(Coordinate::new(15.0, 44.0)));
    }

    #[tokio::test]
    async fn refinement_wins_when_still_current() {
        let provider =
            ScriptedProvider::new(vec![Ok(Coordinate::new(15.2, 44.2))]);
        let tracker = LocationTracker::new();
        let req = tracker.begin_request();
        tracker.try_apply(req, Coordinate::new(15.0, 44.0));

        let applied = refine(&provider, &tracker, req).await;
        assert_eq!(applied, Some(Coordinate::new(15.2, 44.2)));
        assert_eq!(tracker.current(), Some(Coordinate::new(15.2, 44.2)));
    }
}
