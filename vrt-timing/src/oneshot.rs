use tracing::trace;

/// Identifies one scheduled firing. Handles are never reused within a [`OneShotTimer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    pub handle: TimerHandle,
    pub due_ms: u64,
}

/// A single-slot, fire-once timer.
///
/// At most one deadline is armed at any instant: scheduling while armed cancels
/// the previous deadline first. The owner polls it with the current time; a due
/// deadline is disarmed before its handle is returned, so it fires exactly once.
#[derive(Debug, Default)]
pub struct OneShotTimer {
    next_id: u64,
    armed: Option<Deadline>,
}

impl OneShotTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now_ms: u64, delay_ms: u64) -> TimerHandle {
        if let Some(stale) = self.cancel() {
            trace!(?stale, "replaced armed timer");
        }
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.armed = Some(Deadline {
            handle,
            due_ms: now_ms.saturating_add(delay_ms),
        });
        handle
    }

    pub fn cancel(&mut self) -> Option<TimerHandle> {
        self.armed.take().map(|d| d.handle)
    }

    pub fn deadline(&self) -> Option<Deadline> {
        self.armed
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub fn poll(&mut self, now_ms: u64) -> Option<TimerHandle> {
        match self.armed {
            Some(d) if now_ms >= d.due_ms => {
                self.armed = None;
                Some(d.handle)
            }
            _ => None,
        }
    }
}
