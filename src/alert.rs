use std::time::Duration;

use crate::DoorState;

pub const DEFAULT_ALERT_INTERVAL: Duration = Duration::from_millis(60_000);

/// A single notification to be delivered by the dispatcher.
///
/// `is_open: true` covers both the instant open alert and the periodic
/// reminders; `is_open: false` is the one-off informational closed message.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct NotificationRequest {
    pub is_open: bool,
}

/// Decides, once per polling tick, whether a notification is due.
///
/// While the door stays open in away mode a reminder fires every
/// `alert_interval`. `last_notified_at` only moves when an open-case request
/// is generated, never on delivery, so a failed delivery is naturally
/// retried at the next interval boundary.
pub struct AlertScheduler {
    last_stable_state: DoorState,
    last_notified_at: Duration,
    alert_interval: Duration,
}

impl AlertScheduler {
    pub fn new(alert_interval: Duration) -> AlertScheduler {
        AlertScheduler {
            last_stable_state: DoorState::Closed,
            last_notified_at: Duration::ZERO,
            alert_interval,
        }
    }

    /// Evaluate one tick. `now` is monotonic time since startup.
    ///
    /// Returns at most one request. Away mode suppresses open alerts and
    /// reminders but the closed message is informational and fires
    /// regardless. State tracking continues while at home, so re-entering
    /// away mode with the door already open does not replay the missed
    /// open alert.
    pub fn tick(
        &mut self,
        state: DoorState,
        now: Duration,
        away_mode: bool,
    ) -> Option<NotificationRequest> {
        if state != self.last_stable_state {
            self.last_stable_state = state;
            return match state {
                DoorState::Open if away_mode => {
                    self.last_notified_at = now;
                    Some(NotificationRequest { is_open: true })
                }
                DoorState::Open => None,
                DoorState::Closed => Some(NotificationRequest { is_open: false }),
            };
        }

        if state.is_open()
            && away_mode
            && now.saturating_sub(self.last_notified_at) >= self.alert_interval
        {
            self.last_notified_at = now;
            return Some(NotificationRequest { is_open: true });
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use DoorState::*;

    const OPEN_ALERT: Option<NotificationRequest> = Some(NotificationRequest { is_open: true });
    const CLOSED_NOTICE: Option<NotificationRequest> = Some(NotificationRequest { is_open: false });

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn scheduler() -> AlertScheduler {
        AlertScheduler::new(DEFAULT_ALERT_INTERVAL)
    }

    #[test]
    fn open_transition_alerts_immediately() {
        let mut sched = scheduler();
        assert_eq!(sched.tick(Open, ms(1234), true), OPEN_ALERT);
        assert_eq!(sched.last_notified_at, ms(1234));
    }

    #[test]
    fn steady_state_is_idempotent() {
        let mut sched = scheduler();
        assert_eq!(sched.tick(Open, ms(0), true), OPEN_ALERT);
        assert_eq!(sched.tick(Open, ms(0), true), None);
        assert_eq!(sched.tick(Closed, ms(10), true), CLOSED_NOTICE);
        assert_eq!(sched.tick(Closed, ms(10), true), None);
    }

    #[test]
    fn reminder_fires_on_interval_boundary() {
        let mut sched = scheduler();
        assert_eq!(sched.tick(Open, ms(0), true), OPEN_ALERT);
        assert_eq!(sched.tick(Open, ms(59_999), true), None);
        assert_eq!(sched.tick(Open, ms(60_000), true), OPEN_ALERT);
        // next reminder counts from the previous send
        assert_eq!(sched.tick(Open, ms(100_000), true), None);
        assert_eq!(sched.tick(Open, ms(120_000), true), OPEN_ALERT);
    }

    #[test]
    fn at_home_never_alerts_on_open() {
        let mut sched = scheduler();
        assert_eq!(sched.tick(Open, ms(0), false), None);
        assert_eq!(sched.tick(Open, ms(60_000), false), None);
        assert_eq!(sched.tick(Open, ms(600_000), false), None);
    }

    #[test]
    fn closed_notice_is_sent_regardless_of_mode() {
        let mut sched = scheduler();
        sched.tick(Open, ms(0), false);
        assert_eq!(sched.tick(Closed, ms(50), false), CLOSED_NOTICE);
        assert_eq!(sched.tick(Closed, ms(60), false), None);
    }

    #[test]
    fn missed_open_alert_is_not_replayed_on_away_reentry() {
        let mut sched = scheduler();
        // door opens while at home, no alert
        assert_eq!(sched.tick(Open, ms(1_000), false), None);
        // going away shortly after must not fire a transition alert;
        // the reminder check takes over on the interval boundary
        assert_eq!(sched.tick(Open, ms(2_000), true), None);
        assert_eq!(sched.tick(Open, ms(60_000), true), OPEN_ALERT);
    }

    #[test]
    fn reopening_resets_the_reminder_clock() {
        let mut sched = scheduler();
        assert_eq!(sched.tick(Open, ms(0), true), OPEN_ALERT);
        assert_eq!(sched.tick(Closed, ms(59_000), true), CLOSED_NOTICE);
        assert_eq!(sched.tick(Open, ms(59_500), true), OPEN_ALERT);
        // 60s boundary from boot is not a reminder boundary any more
        assert_eq!(sched.tick(Open, ms(60_000), true), None);
        assert_eq!(sched.tick(Open, ms(119_500), true), OPEN_ALERT);
    }

    #[test]
    fn end_to_end_scenario() {
        let mut sched = scheduler();
        assert_eq!(sched.tick(Open, ms(0), true), OPEN_ALERT);
        assert_eq!(sched.tick(Open, ms(30_000), true), None);
        assert_eq!(sched.tick(Open, ms(61_000), true), OPEN_ALERT);
        assert_eq!(sched.tick(Closed, ms(61_500), true), CLOSED_NOTICE);
    }
}
