//! Debouncer
//!
//! Trailing-edge debounce with explicit task identity. Scheduling replaces
//! the pending task; a timer that fires for a replaced task gets nothing.
//! The actual timer lives with the caller (browser timeout, test clock).

/// Identity of one scheduled invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

#[derive(Debug, Clone)]
pub struct Debouncer<A> {
    delay_ms: u32,
    next_id: u64,
    pending: Option<(TaskId, A)>,
}

impl<A> Debouncer<A> {
    pub fn new(delay_ms: u32) -> Self {
        Self {
            delay_ms,
            next_id: 0,
            pending: None,
        }
    }

    pub fn delay_ms(&self) -> u32 {
        self.delay_ms
    }

    /// Schedule `args`, invalidating any pending task
    pub fn schedule(&mut self, args: A) -> TaskId {
        self.next_id += 1;
        let id = TaskId(self.next_id);
        self.pending = Some((id, args));
        id
    }

    /// Timer expiry for `id`. Yields the arguments only for the latest task.
    pub fn fire(&mut self, id: TaskId) -> Option<A> {
        match self.pending.take() {
            Some((pending_id, args)) if pending_id == id => Some(args),
            other => {
                self.pending = other;
                None
            }
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_collapses_to_last_call() {
        let mut debouncer = Debouncer::new(250);
        let tasks: Vec<TaskId> = ["a", "ap", "app", "appl"].iter().map(|term| debouncer.schedule(*term)).collect();

        let fired: Vec<&str> = tasks.iter().filter_map(|task| debouncer.fire(*task)).collect();
        assert_eq!(fired, vec!["appl"]);
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_stale_fire_keeps_pending_task() {
        let mut debouncer = Debouncer::new(10);
        let old = debouncer.schedule(1);
        let new = debouncer.schedule(2);
        assert_eq!(debouncer.fire(old), None);
        assert!(debouncer.is_pending());
        assert_eq!(debouncer.fire(new), Some(2));
        assert_eq!(debouncer.fire(new), None);
    }

    #[test]
    fn test_cancel() {
        let mut debouncer = Debouncer::new(10);
        let task = debouncer.schedule(());
        debouncer.cancel();
        assert_eq!(debouncer.fire(task), None);
    }
}
