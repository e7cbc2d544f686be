use std::time::Duration;

/// Delay before a resume attempt using exponential backoff.
///
/// The delay is `base * 2^attempt`, where `attempt` is 0 for the first resume.
/// A zero base means resumes happen immediately.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use aisread::retry_delay;
///
/// assert_eq!(retry_delay(0, Duration::from_millis(100)), Duration::from_millis(100));
/// assert_eq!(retry_delay(2, Duration::from_millis(100)), Duration::from_millis(400));
/// assert_eq!(retry_delay(7, Duration::ZERO), Duration::ZERO);
/// ```
pub fn retry_delay(attempt: u32, base: Duration) -> Duration {
    let multiplier = 2_u32.saturating_pow(attempt);
    base.saturating_mul(multiplier)
}
