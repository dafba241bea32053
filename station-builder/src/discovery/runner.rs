//! The bounded step loop shared by every strategy.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::error::DiscoveryError;

/// Result of one completed unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The unit finished; `checkpoint` now names it.
    Advanced { checkpoint: String, stored: usize },
    /// Nothing left to do from this checkpoint.
    Exhausted,
}

/// A resumable discovery algorithm.
///
/// A step receives the checkpoint of the last completed unit and processes
/// exactly the next one. If the returned future is dropped before it
/// completes, the unit must count as not done.
pub trait Strategy {
    fn step(&mut self, checkpoint: &str) -> impl Future<Output = Result<Step, DiscoveryError>>;
}

/// Why a run stopped.
#[derive(Debug)]
pub enum Outcome {
    /// The wall-clock budget ran out.
    BudgetSpent,
    /// The configured number of steps was reached.
    StepLimit,
    /// The operator asked to stop.
    Interrupted,
    /// The strategy ran out of work.
    Exhausted,
    /// A step failed in a way the run cannot recover from.
    Failed(DiscoveryError),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::BudgetSpent => f.write_str("time budget spent"),
            Outcome::StepLimit => f.write_str("step limit reached"),
            Outcome::Interrupted => f.write_str("interrupted"),
            Outcome::Exhausted => f.write_str("nothing left to do"),
            Outcome::Failed(e) => write!(f, "failed: {e}"),
        }
    }
}

/// Summary of one run.
#[derive(Debug)]
pub struct RunReport {
    /// Checkpoint of the last completed step (the start checkpoint if none).
    pub checkpoint: String,
    pub steps: u64,
    /// Rows written across all completed steps.
    pub stored: usize,
    pub outcome: Outcome,
}

impl RunReport {
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, Outcome::Failed(_))
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} after {} steps, {} rows written, checkpoint {:?}",
            self.outcome, self.steps, self.stored, self.checkpoint
        )
    }
}

/// Drives a strategy until its budget, step cap, work or patience runs out.
///
/// The deadline and step cap are checked between steps. An interrupt is
/// honoured at any await point: the in-flight step is dropped and the
/// report carries the checkpoint of the last completed one.
pub struct Runner {
    budget: Duration,
    max_steps: Option<u64>,
    interrupt: watch::Receiver<bool>,
}

impl Runner {
    /// A runner that stops once `budget` has elapsed or `interrupt` turns
    /// `true`.
    pub fn new(budget: Duration, interrupt: watch::Receiver<bool>) -> Self {
        Self {
            budget,
            max_steps: None,
            interrupt,
        }
    }

    /// Also stop after this many completed steps.
    pub fn with_max_steps(mut self, max_steps: Option<u64>) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub async fn run<S: Strategy>(&mut self, strategy: &mut S, start: String) -> RunReport {
        let deadline = Instant::now() + self.budget;
        let mut checkpoint = start;
        let mut steps = 0;
        let mut stored = 0;

        let outcome = loop {
            if self.max_steps.is_some_and(|max| steps >= max) {
                break Outcome::StepLimit;
            }
            if Instant::now() >= deadline {
                break Outcome::BudgetSpent;
            }

            let result = tokio::select! {
                biased;
                _ = interrupted(&mut self.interrupt) => break Outcome::Interrupted,
                result = strategy.step(&checkpoint) => result,
            };

            match result {
                Ok(Step::Advanced {
                    checkpoint: next,
                    stored: n,
                }) => {
                    debug!(checkpoint = %next, stored = n, "step complete");
                    checkpoint = next;
                    steps += 1;
                    stored += n;
                }
                Ok(Step::Exhausted) => break Outcome::Exhausted,
                Err(e) => {
                    warn!(checkpoint = %checkpoint, error = %e, "step failed");
                    break Outcome::Failed(e);
                }
            }
        };

        info!(
            outcome = %outcome,
            steps,
            stored,
            checkpoint = %checkpoint,
            "run ended"
        );
        RunReport {
            checkpoint,
            steps,
            stored,
            outcome,
        }
    }
}

/// Resolves once the flag is `true`. Never resolves if the sender is gone.
async fn interrupted(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    /// Counts upward, optionally stalling or failing at a given number.
    struct Counter {
        stall_at: Option<u64>,
        fail_at: Option<u64>,
        last: u64,
        delay: Duration,
    }

    impl Counter {
        fn new(last: u64) -> Self {
            Self {
                stall_at: None,
                fail_at: None,
                last,
                delay: Duration::ZERO,
            }
        }
    }

    impl Strategy for Counter {
        async fn step(&mut self, checkpoint: &str) -> Result<Step, DiscoveryError> {
            let current: u64 = checkpoint.parse().unwrap_or(0);
            let next = current + 1;
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.stall_at == Some(next) {
                std::future::pending::<()>().await;
            }
            if self.fail_at == Some(next) {
                return Err(StoreError::Corrupt {
                    station_id: next.to_string(),
                    reason: "disk full".into(),
                }
                .into());
            }
            if next > self.last {
                return Ok(Step::Exhausted);
            }
            Ok(Step::Advanced {
                checkpoint: next.to_string(),
                stored: 1,
            })
        }
    }

    fn never_interrupted() -> watch::Receiver<bool> {
        let (tx, rx) = watch::channel(false);
        // A dropped sender must not count as an interrupt.
        drop(tx);
        rx
    }

    #[tokio::test]
    async fn runs_until_exhausted() {
        let mut runner = Runner::new(Duration::from_secs(60), never_interrupted());
        let report = runner.run(&mut Counter::new(3), String::new()).await;

        assert!(matches!(report.outcome, Outcome::Exhausted));
        assert_eq!(report.checkpoint, "3");
        assert_eq!(report.steps, 3);
        assert_eq!(report.stored, 3);
    }

    #[tokio::test]
    async fn step_cap() {
        let mut runner =
            Runner::new(Duration::from_secs(60), never_interrupted()).with_max_steps(Some(2));
        let report = runner.run(&mut Counter::new(10), "4".into()).await;

        assert!(matches!(report.outcome, Outcome::StepLimit));
        assert_eq!(report.checkpoint, "6");
    }

    #[tokio::test(start_paused = true)]
    async fn budget_is_checked_between_steps() {
        let mut counter = Counter::new(100);
        counter.delay = Duration::from_secs(4);
        let mut runner = Runner::new(Duration::from_secs(10), never_interrupted());
        let report = runner.run(&mut counter, String::new()).await;

        // Steps start at 0s, 4s and 8s; the one starting at 8s still completes.
        assert!(matches!(report.outcome, Outcome::BudgetSpent));
        assert_eq!(report.checkpoint, "3");
    }

    #[tokio::test]
    async fn failure_keeps_last_completed_checkpoint() {
        let mut counter = Counter::new(10);
        counter.fail_at = Some(3);
        let mut runner = Runner::new(Duration::from_secs(60), never_interrupted());
        let report = runner.run(&mut counter, String::new()).await;

        assert!(report.is_failure());
        assert_eq!(report.checkpoint, "2");
        assert_eq!(report.steps, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn interrupt_drops_the_step_in_flight() {
        let (tx, rx) = watch::channel(false);
        let mut counter = Counter::new(10);
        counter.stall_at = Some(3);
        let mut runner = Runner::new(Duration::from_secs(3600), rx);

        let (report, _) = tokio::join!(runner.run(&mut counter, String::new()), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            tx.send(true).unwrap();
        });

        assert!(matches!(report.outcome, Outcome::Interrupted));
        assert_eq!(report.checkpoint, "2");
        assert_eq!(report.steps, 2);
    }

    #[tokio::test]
    async fn interrupt_before_start() {
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();
        let mut runner = Runner::new(Duration::from_secs(60), rx);
        let report = runner.run(&mut Counter::new(10), "7".into()).await;

        assert!(matches!(report.outcome, Outcome::Interrupted));
        assert_eq!(report.checkpoint, "7");
        assert_eq!(report.steps, 0);
    }

    #[test]
    fn report_display() {
        let report = RunReport {
            checkpoint: "hrb".into(),
            steps: 4,
            stored: 12,
            outcome: Outcome::BudgetSpent,
        };
        assert_eq!(
            report.to_string(),
            "time budget spent after 4 steps, 12 rows written, checkpoint \"hrb\""
        );
    }
}
