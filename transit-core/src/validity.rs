/// Fixed period after creation during which a record counts as valid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidityWindow {
    millis: i64,
}

impl ValidityWindow {
    pub const ONE_HOUR: ValidityWindow = ValidityWindow { millis: 3_600_000 };

    pub fn from_millis(millis: i64) -> Self {
        Self { millis }
    }

    pub fn from_seconds(seconds: u64) -> Self {
        Self { millis: (seconds as i64).saturating_mul(1000) }
    }

    pub fn as_millis(&self) -> i64 {
        self.millis
    }

    /// Age at or past the window boundary counts as expired
    pub fn is_expired(&self, timestamp: i64, now_millis: i64) -> bool {
        now_millis.saturating_sub(timestamp) >= self.millis
    }

    /// Milliseconds left before expiry, zero once expired
    pub fn remaining_millis(&self, timestamp: i64, now_millis: i64) -> i64 {
        let age = now_millis.saturating_sub(timestamp);
        (self.millis - age).max(0)
    }

    /// Whole seconds left, rounded down
    pub fn remaining_seconds(&self, timestamp: i64, now_millis: i64) -> u64 {
        (self.remaining_millis(timestamp, now_millis) / 1000) as u64
    }
}

impl Default for ValidityWindow {
    fn default() -> Self {
        Self::ONE_HOUR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1_718_000_000_000;

    #[test]
    fn test_boundary_is_expired() {
        let window = ValidityWindow::ONE_HOUR;

        assert!(!window.is_expired(T0, T0 + 3_599_999));
        assert!(window.is_expired(T0, T0 + 3_600_000));
        assert!(window.is_expired(T0, T0 + 3_660_000));
    }

    #[test]
    fn test_remaining_time() {
        let window = ValidityWindow::ONE_HOUR;

        assert_eq!(window.remaining_seconds(T0, T0 + 59 * 60 * 1000), 60);
        assert_eq!(window.remaining_millis(T0, T0 + 2 * 3_600_000), 0);
    }

    #[test]
    fn test_from_seconds() {
        assert_eq!(ValidityWindow::from_seconds(3600), ValidityWindow::ONE_HOUR);
    }
}
