use std::time::Duration;

/// How often and how patiently a transient failure is retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrySettings {
    /// Number of retries after the first attempt. 0 disables retrying.
    pub(crate) max_retries: u8,
    /// First retry delay that is then used to calculate the exponential backoff.
    /// Example: 200ms first, then 400ms, 800ms and so on.
    pub(crate) initial_retry_delay: Duration,
    /// Cap on the retry delay so the exponential backoff doesn't get out of hand.
    pub(crate) max_retry_delay: Duration,
}

impl RetrySettings {
    pub fn new() -> Self {
        Self {
            max_retries: 2,
            initial_retry_delay: Duration::from_millis(200),
            max_retry_delay: Duration::from_millis(5_000),
        }
    }

    /// Maximum number of retries before giving up.
    pub fn max_retries(&mut self, max_retries: u8) -> &mut Self {
        self.max_retries = max_retries;
        self
    }

    /// Upper bound of the backoff delay.
    pub fn max_retry_delay(&mut self, duration: Duration) -> &mut Self {
        self.max_retry_delay = duration;
        self
    }

    /// Delay before the first retry.
    pub fn initial_retry_delay(&mut self, duration: Duration) -> &mut Self {
        self.initial_retry_delay = duration;
        self
    }

    pub fn get_max_retries(&self) -> u8 {
        self.max_retries
    }

    /// Exponential backoff delay starting with `initial_retry_delay` and maxing out at `max_retry_delay`.
    pub(crate) fn retry_delay(&self, retry_count: u8) -> Duration {
        let initial_ms = self.initial_retry_delay.as_millis() as u64;
        let multiplicator = 2u64.saturating_pow(retry_count as u32);
        let delay = Duration::from_millis(initial_ms.saturating_mul(multiplicator));
        delay.min(self.max_retry_delay)
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_delay() {
        let mut settings = RetrySettings::new();
        settings
            .max_retries(10)
            .initial_retry_delay(Duration::from_millis(100))
            .max_retry_delay(Duration::from_secs(10));

        assert_eq!(settings.retry_delay(0).as_millis(), 100);
        assert_eq!(settings.retry_delay(1).as_millis(), 200);
        assert_eq!(settings.retry_delay(2).as_millis(), 400);
        assert_eq!(settings.retry_delay(9).as_millis(), 10_000);
        assert_eq!(settings.retry_delay(255).as_millis(), 10_000);
    }

    #[test]
    fn defaults_allow_two_retries() {
        assert_eq!(RetrySettings::default().get_max_retries(), 2);
    }
}
