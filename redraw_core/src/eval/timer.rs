use crate::CallbackContext;
use derivative::Derivative;
use parking_lot::Mutex;
use std::{
    collections::BTreeMap,
    sync::{Arc, Weak},
    time::Duration,
};

pub type TimerCallback = Box<dyn FnMut(&CallbackContext) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Derivative)]
#[derivative(Debug)]
struct TimerEntry {
    interval: Duration,
    next_due: Duration,
    // taken out while the callback runs
    #[derivative(Debug = "ignore")]
    callback: Option<TimerCallback>,
}

#[derive(Debug, Default)]
struct TimerQueueInner {
    now: Duration,
    next_id: u64,
    timers: BTreeMap<TimerId, TimerEntry>,
}

/// Repeating timers driven by the event loop. The queue has its own notion of
/// time which only moves forward when the owner of the loop advances it, so
/// the same tick sequence can be replayed deterministically.
#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    inner: Arc<Mutex<TimerQueueInner>>,
}

impl TimerQueue {
    /// Schedules `callback` every `interval`, first firing one interval from
    /// now. The timer lives as long as the returned handle.
    pub fn repeating(
        &self,
        interval: Duration,
        callback: impl FnMut(&CallbackContext) + Send + 'static,
    ) -> TimerHandle {
        assert!(!interval.is_zero(), "a repeating timer needs a non zero interval");
        let mut inner = self.inner.lock();
        let id = TimerId(inner.next_id);
        inner.next_id += 1;
        let next_due = inner.now + interval;
        inner.timers.insert(id, TimerEntry { interval, next_due, callback: Some(Box::new(callback)) });
        log::debug!("scheduled timer {:?} every {:?}", id, interval);

        TimerHandle { id, queue: Arc::downgrade(&self.inner) }
    }

    pub fn now(&self) -> Duration { self.inner.lock().now }

    pub fn active(&self) -> usize { self.inner.lock().timers.len() }

    pub(crate) fn set_now(&self, now: Duration) {
        let mut inner = self.inner.lock();
        inner.now = inner.now.max(now);
    }

    /// earliest point in time up to `until` at which a timer is due
    pub(crate) fn next_due(&self, until: Duration) -> Option<Duration> {
        self.inner
            .lock()
            .timers
            .values()
            .filter(|entry| entry.callback.is_some())
            .map(|entry| entry.next_due)
            .filter(|due| *due <= until)
            .min()
    }

    /// Moves the clock to `at` and hands out the callbacks of all timers due
    /// by then. They have to be given back with [`TimerQueue::restore`].
    pub(crate) fn take_due(&self, at: Duration) -> Vec<(TimerId, TimerCallback)> {
        let mut inner = self.inner.lock();
        inner.now = inner.now.max(at);
        let mut due = Vec::new();
        for (id, entry) in inner.timers.iter_mut() {
            if entry.next_due <= at {
                if let Some(callback) = entry.callback.take() {
                    entry.next_due += entry.interval;
                    due.push((*id, callback));
                }
            }
        }
        due
    }

    pub(crate) fn restore(&self, id: TimerId, callback: TimerCallback) {
        let leftover = {
            let mut inner = self.inner.lock();
            match inner.timers.get_mut(&id) {
                Some(entry) => {
                    entry.callback = Some(callback);
                    None
                }
                // cancelled while it was running
                None => Some(callback),
            }
        };
        drop(leftover);
    }
}

fn cancel(queue: &Weak<Mutex<TimerQueueInner>>, id: TimerId) {
    if let Some(queue) = queue.upgrade() {
        let removed = queue.lock().timers.remove(&id);
        if removed.is_some() {
            log::debug!("cancelled timer {:?}", id);
        }
        drop(removed);
    }
}

/// Owner of a scheduled timer. Dropping the handle cancels the timer.
#[derive(Debug)]
pub struct TimerHandle {
    id: TimerId,
    queue: Weak<Mutex<TimerQueueInner>>,
}

impl TimerHandle {
    pub fn id(&self) -> TimerId { self.id }

    pub fn cancel(&self) { cancel(&self.queue, self.id) }

    pub fn is_active(&self) -> bool {
        self.queue.upgrade().map_or(false, |queue| queue.lock().timers.contains_key(&self.id))
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) { self.cancel() }
}
