//! Per-command deadlines and cooperative cancellation (spec §5, §6).
//!
//! Every externally observable operation is modelled as an async task raced
//! against a deadline. On expiry the in-flight future is dropped (tokio's
//! `timeout` does this for us) and the call reports
//! [`crate::error::AdapterError::DeadlineExceeded`], which the Normalizer
//! turns into `TIMEOUT`.

use std::future::Future;
use std::time::Duration;

use crate::error::AdapterError;

/// Run `fut` under `budget`; map an expired deadline to
/// `AdapterError::DeadlineExceeded`.
pub async fn with_deadline<T, F>(budget: Duration, fut: F) -> Result<T, AdapterError>
where
    F: Future<Output = Result<T, AdapterError>>,
{
    match tokio::time::timeout(budget, fut).await {
        Ok(result) => result,
        Err(_elapsed) => Err(AdapterError::DeadlineExceeded),
    }
}
