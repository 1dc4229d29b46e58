use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use crudlayer::InstantProvider;
use parking_lot::Mutex;
use tracing::debug;

/// Clock that stands still until a test moves it.
///
/// Starts at the current time truncated to whole seconds. Adjustments are
/// relative to that base, so [`AdjustableInstantProvider::reset`] always
/// brings back the starting instant.
#[derive(Debug)]
pub struct AdjustableInstantProvider {
    base: DateTime<Utc>,
    adjustment: Mutex<TimeDelta>,
}

impl AdjustableInstantProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::at(Utc::now().trunc_subsecs(0))
    }

    #[must_use]
    pub fn at(base: DateTime<Utc>) -> Self {
        Self {
            base,
            adjustment: Mutex::new(TimeDelta::zero()),
        }
    }

    /// Moves the clock to `f(now)`. The new instant may lie in the past.
    pub fn adjust(&self, f: impl FnOnce(DateTime<Utc>) -> DateTime<Utc>) {
        let mut adjustment = self.adjustment.lock();
        let before = self.base + *adjustment;
        let after = f(before);
        *adjustment = after - self.base;
        debug!(%before, %after, adjustment_ms = adjustment.num_milliseconds(), "Adjusted instant provider");
    }

    /// Drops all adjustments.
    pub fn reset(&self) {
        *self.adjustment.lock() = TimeDelta::zero();
        debug!(now = %self.base, "Reset instant provider");
    }
}

impl Default for AdjustableInstantProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl InstantProvider for AdjustableInstantProvider {
    fn now(&self) -> DateTime<Utc> {
        self.base + *self.adjustment.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_starts_on_a_whole_second() {
        assert_eq!(AdjustableInstantProvider::new().now().nanosecond(), 0);
    }

    #[test]
    fn test_adjustments_accumulate_until_reset() {
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let clock = AdjustableInstantProvider::at(base);

        clock.adjust(|now| now + TimeDelta::seconds(1));
        clock.adjust(|now| now + TimeDelta::seconds(2));
        assert_eq!(clock.now(), base + TimeDelta::seconds(3));

        clock.adjust(|now| now - TimeDelta::minutes(1));
        assert_eq!(clock.now(), base - TimeDelta::seconds(57));

        clock.reset();
        assert_eq!(clock.now(), base);
    }
}
