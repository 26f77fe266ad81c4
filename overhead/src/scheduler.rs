//! Named recurring tasks plus one ad-hoc triggerable task, driven from a
//! single async loop.

use std::time::Duration;
use tokio::{
    sync::mpsc,
    time::{sleep_until, Instant},
};
use tracing::trace;

const MIN_PERIOD: Duration = Duration::from_millis(1);

#[derive(Debug)]
struct RecurringTask<J> {
    name: &'static str,
    period: Duration,
    next_due: Instant,
    job: J,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<J> {
    pub name: &'static str,
    pub job: J,
}

/// Handle used to request a run of the triggerable task. Fires that pile up
/// before the scheduler gets to them run the task once.
#[derive(Debug, Clone)]
pub struct Trigger(mpsc::UnboundedSender<()>);

impl Trigger {
    pub fn fire(&self) {
        // Only fails once the scheduler is gone
        let _ = self.0.send(());
    }
}

#[derive(Debug)]
pub struct Scheduler<J> {
    recurring: Vec<RecurringTask<J>>,
    triggerable: Option<(&'static str, J)>,
    trigger_tx: mpsc::UnboundedSender<()>,
    trigger_rx: mpsc::UnboundedReceiver<()>,
}

impl<J: Clone> Default for Scheduler<J> {
    fn default() -> Self {
        Self::new()
    }
}

impl<J: Clone> Scheduler<J> {
    pub fn new() -> Self {
        let (trigger_tx, trigger_rx) = mpsc::unbounded_channel();
        Scheduler {
            recurring: Vec::new(),
            triggerable: None,
            trigger_tx,
            trigger_rx,
        }
    }

    pub fn add_recurring(
        &mut self,
        name: &'static str,
        period: Duration,
        initial_delay: Duration,
        job: J,
    ) {
        self.recurring.push(RecurringTask {
            name,
            period: period.max(MIN_PERIOD),
            next_due: Instant::now() + initial_delay,
            job,
        });
    }

    /// Replaces any previously set triggerable task
    pub fn set_triggerable(&mut self, name: &'static str, job: J) -> Trigger {
        self.triggerable = Some((name, job));
        self.trigger()
    }

    pub fn trigger(&self) -> Trigger {
        Trigger(self.trigger_tx.clone())
    }

    pub fn task_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.recurring
            .iter()
            .map(|t| t.name)
            .chain(self.triggerable.as_ref().map(|(n, _)| *n))
    }

    /// Waits for the next task to come due. A pending trigger wins over
    /// recurring tasks, recurring ties go to the task added first. Ticks
    /// missed while the caller was busy are skipped rather than replayed.
    pub async fn next(&mut self) -> Fired<J> {
        loop {
            let due = self
                .recurring
                .iter()
                .enumerate()
                .min_by_key(|(_, t)| t.next_due)
                .map(|(idx, t)| (idx, t.next_due));
            let deadline = due.map(|(_, d)| d).unwrap_or_else(Instant::now);

            tokio::select! {
                biased;

                Some(()) = self.trigger_rx.recv() => {
                    while self.trigger_rx.try_recv().is_ok() {}
                    if let Some((name, job)) = &self.triggerable {
                        trace!(task = *name, "Triggered");
                        return Fired { name: *name, job: job.clone() };
                    }
                }

                _ = sleep_until(deadline), if due.is_some() => {
                    if let Some((idx, _)) = due {
                        let task = &mut self.recurring[idx];
                        let now = Instant::now();
                        task.next_due += task.period;
                        while task.next_due <= now {
                            task.next_due += task.period;
                        }
                        trace!(task = task.name, "Due");
                        return Fired { name: task.name, job: task.job.clone() };
                    }
                }
            }
        }
    }
}
