//! Client-side watchdog for settlement-workspace calls
//!
//! Distinguishes "slow backend" from "backend error" at the UI level.
//! The underlying request is not aborted server-side; the client only
//! stops waiting and reports [`StoreError::Timeout`].

use std::future::Future;
use std::time::Duration;

use crate::error::{StoreError, StoreResult};

/// Watchdog applied to settlement-workspace store calls
pub const SETTLEMENT_CALL_TIMEOUT: Duration = Duration::from_secs(15);

/// Await `fut` up to `duration`, mapping expiry to [`StoreError::Timeout`]
pub async fn with_timeout<T, F>(duration: Duration, fut: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    match tokio::time::timeout(duration, fut).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn slow_call_maps_to_timeout_error() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(42)
        };
        let result = with_timeout(SETTLEMENT_CALL_TIMEOUT, slow).await;
        assert!(matches!(result, Err(StoreError::Timeout)));
    }

    #[tokio::test(start_paused = true)]
    async fn fast_call_passes_through() {
        let fast = async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok(42)
        };
        let result = with_timeout(SETTLEMENT_CALL_TIMEOUT, fast).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test(start_paused = true)]
    async fn inner_error_is_not_masked_as_timeout() {
        let failing = async { Err::<i32, _>(StoreError::Rejected("boom".to_string())) };
        let result = with_timeout(SETTLEMENT_CALL_TIMEOUT, failing).await;
        assert!(matches!(result, Err(StoreError::Rejected(_))));
    }
}
