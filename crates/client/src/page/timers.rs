//! Fire-once timers on a logical clock.

use std::time::Duration;

use super::NodeId;

/// Deferred page work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerAction {
    /// Start fading a notification out.
    FadeNotification(NodeId),
    /// Drop a faded notification if it is still on the page.
    RemoveNotification(NodeId),
    /// Leave the page for the given target.
    Navigate(String),
}

#[derive(Debug)]
struct Timer {
    due: Duration,
    seq: u64,
    action: TimerAction,
}

/// Pending timers ordered by due time, then by scheduling order.
#[derive(Debug, Default)]
pub(super) struct TimerQueue {
    now: Duration,
    next_seq: u64,
    pending: Vec<Timer>,
}

impl TimerQueue {
    pub(super) const fn now(&self) -> Duration {
        self.now
    }

    pub(super) fn set_now(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    pub(super) fn len(&self) -> usize {
        self.pending.len()
    }

    pub(super) fn clear(&mut self) {
        self.pending.clear();
    }

    pub(super) fn schedule(&mut self, delay: Duration, action: TimerAction) {
        self.pending.push(Timer {
            due: self.now + delay,
            seq: self.next_seq,
            action,
        });
        self.next_seq += 1;
    }

    /// Pop the earliest timer due at or before `deadline`, moving the clock
    /// to its due time.
    pub(super) fn pop_due(&mut self, deadline: Duration) -> Option<TimerAction> {
        let index = self.earliest().filter(|&i| {
            self.pending
                .get(i)
                .is_some_and(|timer| timer.due <= deadline)
        })?;
        self.take(index)
    }

    /// Pop the earliest timer regardless of its due time.
    pub(super) fn pop_next(&mut self) -> Option<TimerAction> {
        let index = self.earliest()?;
        self.take(index)
    }

    fn earliest(&self) -> Option<usize> {
        self.pending
            .iter()
            .enumerate()
            .min_by_key(|(_, timer)| (timer.due, timer.seq))
            .map(|(index, _)| index)
    }

    fn take(&mut self, index: usize) -> Option<TimerAction> {
        if index >= self.pending.len() {
            return None;
        }
        let timer = self.pending.remove(index);
        self.set_now(timer.due);
        Some(timer.action)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_timers_fire_in_due_order() {
        let mut queue = TimerQueue::default();
        queue.schedule(Duration::from_millis(300), TimerAction::Navigate("b".into()));
        queue.schedule(Duration::from_millis(100), TimerAction::Navigate("a".into()));
        queue.schedule(Duration::from_millis(300), TimerAction::Navigate("c".into()));

        assert_eq!(queue.pop_next(), Some(TimerAction::Navigate("a".into())));
        assert_eq!(queue.now(), Duration::from_millis(100));
        assert_eq!(queue.pop_next(), Some(TimerAction::Navigate("b".into())));
        assert_eq!(queue.pop_next(), Some(TimerAction::Navigate("c".into())));
        assert_eq!(queue.pop_next(), None);
    }

    #[test]
    fn test_pop_due_respects_deadline() {
        let mut queue = TimerQueue::default();
        queue.schedule(Duration::from_millis(3000), TimerAction::Navigate("x".into()));

        assert_eq!(queue.pop_due(Duration::from_millis(2999)), None);
        assert_eq!(queue.len(), 1);
        assert!(queue.pop_due(Duration::from_millis(3000)).is_some());
    }

    #[test]
    fn test_schedule_is_relative_to_now() {
        let mut queue = TimerQueue::default();
        queue.set_now(Duration::from_millis(500));
        queue.schedule(Duration::from_millis(300), TimerAction::Navigate("x".into()));

        assert_eq!(queue.pop_due(Duration::from_millis(799)), None);
        assert!(queue.pop_due(Duration::from_millis(800)).is_some());
    }
}
