use std::time::Duration;

/// Pause signaled after a page, executed by the driver so this stays pure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SleepAction {
    None,
    Short,
    Long,
}

#[derive(Clone, Copy, Debug)]
pub struct BackoffPolicy {
    pub short: Duration,
    pub long: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            short: Duration::from_secs(300),
            long: Duration::from_secs(1800),
        }
    }
}

/// Tracks cumulative processed records and signals a short pause the first
/// time each multiple of 1,000 is crossed, a long pause on each multiple of
/// 10,000. Long wins when both thresholds are crossed by the same page.
#[derive(Debug, Default)]
pub struct BackoffController {
    total: u64,
}

const SHORT_EVERY: u64 = 1_000;
const LONG_EVERY: u64 = 10_000;

impl BackoffController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn advance(&mut self, records_in_page: usize) -> SleepAction {
        let previous = self.total;
        self.total += records_in_page as u64;

        if previous / LONG_EVERY < self.total / LONG_EVERY {
            SleepAction::Long
        } else if previous / SHORT_EVERY < self.total / SHORT_EVERY {
            SleepAction::Short
        } else {
            SleepAction::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_pause_below_first_threshold() {
        let mut ctl = BackoffController::new();
        assert_eq!(ctl.advance(999), SleepAction::None);
    }

    #[test]
    fn short_pause_fires_once_per_thousand() {
        let mut ctl = BackoffController::new();
        assert_eq!(ctl.advance(998), SleepAction::None);
        // 998 -> 1018 crosses 1,000
        assert_eq!(ctl.advance(20), SleepAction::Short);
        // 1018 -> 1038 does not
        assert_eq!(ctl.advance(20), SleepAction::None);
    }

    #[test]
    fn short_pause_fires_on_exact_boundary() {
        let mut ctl = BackoffController::new();
        assert_eq!(ctl.advance(1_000), SleepAction::Short);
        assert_eq!(ctl.total(), 1_000);
    }

    #[test]
    fn long_pause_overrides_short_at_ten_thousand() {
        let mut ctl = BackoffController::new();
        for _ in 0..9 {
            ctl.advance(1_000);
        }
        assert_eq!(ctl.total(), 9_000);
        assert_eq!(ctl.advance(1_000), SleepAction::Long);
    }

    #[test]
    fn skipping_past_a_multiple_still_fires() {
        let mut ctl = BackoffController::new();
        assert_eq!(ctl.advance(995), SleepAction::None);
        // 995 -> 1015 never lands exactly on 1,000 but crosses it
        assert_eq!(ctl.advance(20), SleepAction::Short);
    }

    #[test]
    fn page_crossing_both_thresholds_signals_long_once() {
        let mut ctl = BackoffController::new();
        ctl.advance(9_900);
        assert_eq!(ctl.advance(200), SleepAction::Long);
        assert_eq!(ctl.advance(50), SleepAction::None);
    }
}
