/// A coalescing one-shot task driven by the host clock.
///
/// At most one run is pending. Scheduling while a run is pending pushes its due time back
/// instead of queueing a second run; `poll` fires the run once its due time has passed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DebouncedTask {
    delay_ms: u64,
    due_ms: Option<u64>,
}

impl DebouncedTask {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            due_ms: None,
        }
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    pub fn set_delay_ms(&mut self, delay_ms: u64) {
        self.delay_ms = delay_ms;
    }

    pub fn is_pending(&self) -> bool {
        self.due_ms.is_some()
    }

    pub fn due_ms(&self) -> Option<u64> {
        self.due_ms
    }

    pub fn schedule(&mut self, now_ms: u64) {
        self.due_ms = Some(now_ms.saturating_add(self.delay_ms));
    }

    pub fn cancel(&mut self) -> bool {
        self.due_ms.take().is_some()
    }

    /// Returns `true` exactly once per scheduled run, when `now_ms` reaches the due time.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.due_ms {
            Some(due) if now_ms >= due => {
                self.due_ms = None;
                true
            }
            _ => false,
        }
    }
}
