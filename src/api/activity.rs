use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Receives start/end signals around every network request.
///
/// Implementations are shared with request tasks, so they must be
/// thread-safe. `end` is called exactly once for each `start`.
pub trait NetworkActivity: Send + Sync {
    fn start(&self);
    fn end(&self);
}

/// Counts in-flight requests; the UI shows an indicator while the count is
/// non-zero.
#[derive(Debug, Default)]
pub struct NetworkActivityListener {
    requests: AtomicUsize,
}

impl NetworkActivityListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_flight(&self) -> usize {
        self.requests.load(Ordering::Acquire)
    }

    pub fn is_active(&self) -> bool {
        self.in_flight() > 0
    }
}

impl NetworkActivity for NetworkActivityListener {
    fn start(&self) {
        self.requests.fetch_add(1, Ordering::AcqRel);
    }

    fn end(&self) {
        // Never underflow, even if a caller misbehaves.
        let _ = self
            .requests
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
    }
}

/// Brackets one request: `start` on creation, `end` on drop.
///
/// The guard is moved into the request task, so `end` fires whether the
/// task completes, fails, or is aborted because a newer request replaced
/// it or the client was dropped.
pub struct ActivityGuard {
    activity: Arc<dyn NetworkActivity>,
}

impl ActivityGuard {
    pub fn start(activity: Arc<dyn NetworkActivity>) -> Self {
        activity.start();
        Self { activity }
    }
}

impl Drop for ActivityGuard {
    fn drop(&mut self) {
        self.activity.end();
    }
}
