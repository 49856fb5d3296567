//! Logical clock with cancellable one-shot and repeating tasks.
//!
//! Nothing here sleeps or spawns threads. The owner moves the clock forward
//! with [`Scheduler::pop_due`] / [`Scheduler::finish_advance`] and handles each
//! fired task before asking for the next one, so a task can cancel others
//! that were due later in the same step.

use std::time::Duration;

/// Work the session schedules for later
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Tick,
    HideMismatch { generation: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug, Clone)]
struct Scheduled {
    handle: TaskHandle,
    due: Duration,
    every: Option<Duration>,
    task: Task,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    next_id: u64,
    tasks: Vec<Scheduled>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn schedule_once(&mut self, delay: Duration, task: Task) -> TaskHandle {
        self.push(delay, None, task)
    }

    /// Schedule `task` every `every`, first firing one period from now.
    pub fn schedule_repeating(&mut self, every: Duration, task: Task) -> TaskHandle {
        // a zero period would fire forever within one advance
        let every = every.max(Duration::from_millis(1));
        self.push(every, Some(every), task)
    }

    fn push(&mut self, delay: Duration, every: Option<Duration>, task: Task) -> TaskHandle {
        let handle = TaskHandle(self.next_id);
        self.next_id += 1;
        self.tasks.push(Scheduled {
            handle,
            due: self.now + delay,
            every,
            task,
        });
        handle
    }

    /// Returns true if the task was still pending.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.handle != handle);
        self.tasks.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.tasks.clear();
    }

    pub fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.tasks.iter().any(|t| t.handle == handle)
    }

    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Fire the earliest task due at or before `until`, moving the clock to its due time.
    /// Ties fire in scheduling order.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TaskHandle, Task)> {
        let idx = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= until)
            .min_by_key(|(_, t)| (t.due, t.handle.0))
            .map(|(i, _)| i)?;

        let fired = self.tasks[idx].clone();
        self.now = self.now.max(fired.due);

        match fired.every {
            Some(every) => self.tasks[idx].due += every,
            None => {
                self.tasks.swap_remove(idx);
            }
        }

        Some((fired.handle, fired.task))
    }

    /// Settle the clock at `until` once every due task has been popped.
    pub fn finish_advance(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}
