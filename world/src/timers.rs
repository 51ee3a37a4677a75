//! Virtual-clock timer queue backing every deferred action in the world.

use std::{collections::BTreeMap, time::Duration};

use fuel_blend_core::{EmitterKind, ParticleId};

/// Deferred action executed when its timer elapses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TimerTask {
    /// Fire the next cycle of an emitter chain.
    Fire(EmitterKind),
    /// Remove a particle whose lifetime ended.
    Expire(ParticleId),
}

/// Handle returned when scheduling, used to cancel the timer later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct TimerHandle {
    due: Duration,
    sequence: u64,
}

impl TimerHandle {
    pub(crate) const fn due(&self) -> Duration {
        self.due
    }
}

/// Single-shot timers ordered by due time, then by scheduling order.
#[derive(Debug, Default)]
pub(crate) struct TimerQueue {
    entries: BTreeMap<TimerHandle, TimerTask>,
    next_sequence: u64,
}

impl TimerQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn schedule(&mut self, due: Duration, task: TimerTask) -> TimerHandle {
        let handle = TimerHandle {
            due,
            sequence: self.next_sequence,
        };
        self.next_sequence = self.next_sequence.wrapping_add(1);
        let _ = self.entries.insert(handle, task);
        handle
    }

    /// Cancels a pending timer. Returns `false` when it already fired or was cancelled.
    pub(crate) fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.entries.remove(&handle).is_some()
    }

    /// Removes and returns the earliest timer due at or before `now`.
    pub(crate) fn pop_due(&mut self, now: Duration) -> Option<(Duration, TimerTask)> {
        let (handle, _) = self.entries.first_key_value()?;
        if handle.due > now {
            return None;
        }
        self.entries
            .pop_first()
            .map(|(handle, task)| (handle.due, task))
    }

    /// Drops every timer whose task matches the predicate, returning how many were dropped.
    pub(crate) fn cancel_where(&mut self, mut predicate: impl FnMut(&TimerTask) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, task| !predicate(task));
        before - self.entries.len()
    }

    pub(crate) fn next_deadline(&self) -> Option<Duration> {
        self.entries.keys().next().map(TimerHandle::due)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn pops_in_due_order_then_schedule_order() {
        let mut queue = TimerQueue::new();
        let _ = queue.schedule(ms(30), TimerTask::Expire(ParticleId::new(1)));
        let _ = queue.schedule(ms(10), TimerTask::Fire(EmitterKind::Exhaust));
        let _ = queue.schedule(ms(10), TimerTask::Expire(ParticleId::new(2)));

        assert_eq!(
            queue.pop_due(ms(30)),
            Some((ms(10), TimerTask::Fire(EmitterKind::Exhaust)))
        );
        assert_eq!(
            queue.pop_due(ms(30)),
            Some((ms(10), TimerTask::Expire(ParticleId::new(2))))
        );
        assert_eq!(
            queue.pop_due(ms(30)),
            Some((ms(30), TimerTask::Expire(ParticleId::new(1))))
        );
        assert_eq!(queue.pop_due(ms(30)), None);
    }

    #[test]
    fn withholds_timers_that_are_not_yet_due() {
        let mut queue = TimerQueue::new();
        let _ = queue.schedule(ms(200), TimerTask::Fire(EmitterKind::Ambient));
        assert_eq!(queue.pop_due(ms(199)), None);
        assert_eq!(queue.next_deadline(), Some(ms(200)));
        assert!(queue.pop_due(ms(200)).is_some());
        assert_eq!(queue.next_deadline(), None);
    }

    #[test]
    fn cancelled_timers_never_fire() {
        let mut queue = TimerQueue::new();
        let handle = queue.schedule(ms(5), TimerTask::Fire(EmitterKind::Exhaust));
        assert!(queue.cancel(handle));
        assert!(!queue.cancel(handle));
        assert_eq!(queue.pop_due(ms(100)), None);
    }

    #[test]
    fn cancel_where_filters_by_task() {
        let mut queue = TimerQueue::new();
        let _ = queue.schedule(ms(5), TimerTask::Fire(EmitterKind::Exhaust));
        let _ = queue.schedule(ms(6), TimerTask::Expire(ParticleId::new(1)));
        let _ = queue.schedule(ms(7), TimerTask::Expire(ParticleId::new(2)));

        let dropped = queue.cancel_where(|task| matches!(task, TimerTask::Expire(_)));
        assert_eq!(dropped, 2);
        assert_eq!(queue.len(), 1);
    }
}
