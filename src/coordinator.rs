//! Drives batch items through initiate -> poll-until-converged, bounded by a
//! per-item timeout, either one item at a time or all at once.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep, timeout_at};
use tracing::{debug, info, warn};

use crate::command::CommandDescription;
use crate::error::{Error, Result};

// Stand-in deadline for timeouts too large to add to an instant
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    /// Applied to each item independently
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanOut {
    Serial,
    Parallel,
}

impl FanOut {
    pub fn from_serial(serial: bool) -> Self {
        if serial { FanOut::Serial } else { FanOut::Parallel }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    Initiating,
    Waiting,
    Polled,
    Retrying,
    Converged,
    TimedOut,
}

/// What to do with each item and how to recognize that it is done
#[async_trait]
pub trait Convergence: Send + Sync + 'static {
    type Snapshot: Send;

    /// Issued exactly once per item
    async fn initiate(&self, item: &CommandDescription) -> Result<()>;

    async fn poll(&self, item: &CommandDescription) -> Result<Self::Snapshot>;

    fn converged(&self, snapshot: &Self::Snapshot) -> bool;

    /// Rejection message when `item` times out; names the target
    fn timeout_message(&self, item: &CommandDescription) -> String;
}

/// Terminal record of one converged item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemReport {
    pub target: Option<String>,
    pub polls: u32,
    pub state: ItemState,
}

fn transition(item: &CommandDescription, state: ItemState) {
    debug!(target_name = item.target().unwrap_or_default(), ?state, "poll state");
}

async fn converge<C: Convergence + ?Sized>(
    plan: &C,
    item: &CommandDescription,
    interval: Duration,
) -> Result<u32> {
    transition(item, ItemState::Initiating);
    plan.initiate(item).await?;

    let mut polls = 0;
    loop {
        transition(item, ItemState::Waiting);
        sleep(interval).await;

        let snapshot = plan.poll(item).await?;
        polls += 1;
        transition(item, ItemState::Polled);

        if plan.converged(&snapshot) {
            return Ok(polls);
        }
        transition(item, ItemState::Retrying);
    }
}

/// Runs one item's chain to convergence or timeout.
///
/// The only bound on retries is the deadline; executor errors end the chain
/// immediately.
pub async fn drive_item<C: Convergence + ?Sized>(
    plan: &C,
    item: &CommandDescription,
    settings: PollSettings,
) -> Result<ItemReport> {
    let now = Instant::now();
    let deadline = now
        .checked_add(settings.timeout)
        .unwrap_or_else(|| now + FAR_FUTURE);

    match timeout_at(deadline, converge(plan, item, settings.interval)).await {
        Ok(Ok(polls)) => {
            transition(item, ItemState::Converged);
            info!("{} converged after {} polls", item.target().unwrap_or_default(), polls);
            Ok(ItemReport {
                target: item.target().map(str::to_string),
                polls,
                state: ItemState::Converged,
            })
        }
        Ok(Err(err)) => Err(err),
        Err(_) => {
            transition(item, ItemState::TimedOut);
            let message = plan.timeout_message(item);
            warn!("{}", message);
            Err(Error::Timeout(message))
        }
    }
}

/// Drives every item and returns their reports in input order.
///
/// `Serial` stops at the first failure without starting later items.
/// `Parallel` starts all chains at once and fails with the first rejection;
/// chains still in flight keep running and their results are dropped.
pub async fn drive<C: Convergence>(
    plan: Arc<C>,
    items: Vec<CommandDescription>,
    fan_out: FanOut,
    settings: PollSettings,
) -> Result<Vec<ItemReport>> {
    match fan_out {
        FanOut::Serial => {
            let mut reports = Vec::with_capacity(items.len());
            for item in &items {
                reports.push(drive_item(plan.as_ref(), item, settings).await?);
            }
            Ok(reports)
        }
        FanOut::Parallel => {
            let count = items.len();
            let (tx, mut rx) = mpsc::unbounded_channel();

            for (index, item) in items.into_iter().enumerate() {
                let plan = Arc::clone(&plan);
                let tx = tx.clone();
                tokio::spawn(async move {
                    let result = drive_item(plan.as_ref(), &item, settings).await;
                    // Receiver is gone once the batch has already failed
                    let _ = tx.send((index, result));
                });
            }
            drop(tx);

            let mut reports: Vec<Option<ItemReport>> = (0..count).map(|_| None).collect();
            while let Some((index, result)) = rx.recv().await {
                reports[index] = Some(result?);
            }

            reports
                .into_iter()
                .enumerate()
                .map(|(index, report)| {
                    report.ok_or_else(|| Error::Coordinator(format!("item {} did not report", index)))
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::build;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Countdown {
        initiated: AtomicU32,
        polls_until_done: u32,
        polled: AtomicU32,
    }

    impl Countdown {
        fn new(polls_until_done: u32) -> Self {
            Self {
                initiated: AtomicU32::new(0),
                polls_until_done,
                polled: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl Convergence for Countdown {
        type Snapshot = u32;

        async fn initiate(&self, _item: &CommandDescription) -> Result<()> {
            self.initiated.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn poll(&self, _item: &CommandDescription) -> Result<u32> {
            Ok(self.polled.fetch_add(1, Ordering::SeqCst) + 1)
        }

        fn converged(&self, snapshot: &u32) -> bool {
            *snapshot >= self.polls_until_done
        }

        fn timeout_message(&self, item: &CommandDescription) -> String {
            format!("Timed out on {}.", item.target().unwrap_or_default())
        }
    }

    fn item(name: &str) -> CommandDescription {
        build("start", None, vec![name.to_string()], &[]).with_target(name)
    }

    fn settings(interval: u64, timeout: u64) -> PollSettings {
        PollSettings {
            interval: Duration::from_millis(interval),
            timeout: Duration::from_millis(timeout),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_converges_after_three_polls() {
        let plan = Countdown::new(3);

        let report = drive_item(&plan, &item("svc"), settings(100, 1000)).await.unwrap();

        assert_eq!(report.polls, 3);
        assert_eq!(report.state, ItemState::Converged);
        assert_eq!(report.target.as_deref(), Some("svc"));
        assert_eq!(plan.initiated.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_converging_times_out_at_deadline() {
        let plan = Countdown::new(u32::MAX);
        let started = Instant::now();

        let err = drive_item(&plan, &item("svc"), settings(100, 250)).await.unwrap_err();

        let elapsed = started.elapsed();
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "Timed out on svc.");
        assert!(elapsed >= Duration::from_millis(250), "{:?}", elapsed);
        assert!(elapsed <= Duration::from_millis(350), "{:?}", elapsed);
        assert_eq!(plan.initiated.load(Ordering::SeqCst), 1);
        assert_eq!(plan.polled.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_parallel_reports_in_input_order() {
        let plan = Arc::new(Countdown::new(1));

        let reports = drive(
            Arc::clone(&plan),
            vec![item("a"), item("b"), item("c")],
            FanOut::Parallel,
            settings(100, 1000),
        )
        .await
        .unwrap();

        let targets: Vec<_> = reports.iter().filter_map(|r| r.target.as_deref()).collect();
        assert_eq!(targets, ["a", "b", "c"]);
        assert_eq!(plan.initiated.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let plan = Arc::new(Countdown::new(1));
        for fan_out in [FanOut::Serial, FanOut::Parallel] {
            let reports = drive(Arc::clone(&plan), Vec::new(), fan_out, settings(1, 10))
                .await
                .unwrap();
            assert!(reports.is_empty());
        }
    }

    struct FailsOn {
        target: &'static str,
        initiated: Mutex<Vec<String>>,
        polled: AtomicU32,
    }

    impl FailsOn {
        fn new(target: &'static str) -> Self {
            Self {
                target,
                initiated: Mutex::new(Vec::new()),
                polled: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl Convergence for FailsOn {
        type Snapshot = ();

        async fn initiate(&self, item: &CommandDescription) -> Result<()> {
            let name = item.target().unwrap_or_default().to_string();
            self.initiated.lock().unwrap().push(name.clone());
            if name == self.target {
                return Err(Error::Execution {
                    command: item.to_string(),
                    code: 1060,
                    message: "boom".into(),
                });
            }
            Ok(())
        }

        async fn poll(&self, _item: &CommandDescription) -> Result<()> {
            self.polled.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn converged(&self, _snapshot: &()) -> bool {
            true
        }

        fn timeout_message(&self, _item: &CommandDescription) -> String {
            String::new()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_serial_stops_after_first_failure() {
        let plan = Arc::new(FailsOn::new("b"));

        let err = drive(
            Arc::clone(&plan),
            vec![item("a"), item("b"), item("c")],
            FanOut::Serial,
            settings(10, 1000),
        )
        .await
        .unwrap_err();

        assert_eq!(err.exit_code(), Some(1060));
        assert_eq!(*plan.initiated.lock().unwrap(), ["a", "b"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_parallel_rejects_without_cancelling_siblings() {
        let plan = Arc::new(FailsOn::new("a"));

        let err = drive(
            Arc::clone(&plan),
            vec![item("a"), item("b"), item("c")],
            FanOut::Parallel,
            settings(10, 1000),
        )
        .await
        .unwrap_err();
        assert_eq!(err.exit_code(), Some(1060));
        // Siblings are still waiting out their first interval
        assert_eq!(plan.polled.load(Ordering::SeqCst), 0);

        // Let the detached sibling chains finish
        sleep(Duration::from_millis(50)).await;
        let mut initiated = plan.initiated.lock().unwrap().clone();
        initiated.sort();
        assert_eq!(initiated, ["a", "b", "c"]);
        assert_eq!(plan.polled.load(Ordering::SeqCst), 2);
    }

    /// Converges on the `polls_until_done`-th poll of each item, except
    /// targets listed in `never`
    struct PerItem {
        polls_until_done: u32,
        never: &'static [&'static str],
        polled: Mutex<HashMap<String, u32>>,
    }

    impl PerItem {
        fn new(polls_until_done: u32, never: &'static [&'static str]) -> Self {
            Self {
                polls_until_done,
                never,
                polled: Mutex::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl Convergence for PerItem {
        type Snapshot = (String, u32);

        async fn initiate(&self, _item: &CommandDescription) -> Result<()> {
            Ok(())
        }

        async fn poll(&self, item: &CommandDescription) -> Result<(String, u32)> {
            let name = item.target().unwrap_or_default().to_string();
            let mut polled = self.polled.lock().unwrap();
            let count = polled.entry(name.clone()).or_insert(0);
            *count += 1;
            Ok((name, *count))
        }

        fn converged(&self, (name, count): &(String, u32)) -> bool {
            !self.never.contains(&name.as_str()) && *count >= self.polls_until_done
        }

        fn timeout_message(&self, item: &CommandDescription) -> String {
            format!("Timed out on {}.", item.target().unwrap_or_default())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_serial_timeout_applies_to_each_item() {
        let plan = Arc::new(PerItem::new(2, &[]));
        let started = Instant::now();

        let reports = drive(
            Arc::clone(&plan),
            vec![item("a"), item("b"), item("c")],
            FanOut::Serial,
            settings(100, 300),
        )
        .await
        .unwrap();

        // 600ms in total, twice the per-item timeout
        let elapsed = started.elapsed();
        assert_eq!(reports.len(), 3);
        assert!(reports.iter().all(|r| r.polls == 2));
        assert!(elapsed >= Duration::from_millis(600), "{:?}", elapsed);
        assert!(elapsed < Duration::from_millis(700), "{:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_parallel_batch_with_converging_and_timed_out_items() {
        let plan = Arc::new(PerItem::new(2, &["slow"]));
        let started = Instant::now();

        let err = drive(
            Arc::clone(&plan),
            vec![item("fast"), item("slow")],
            FanOut::Parallel,
            settings(100, 300),
        )
        .await
        .unwrap_err();

        // "fast" converged at 200ms without hitting the deadline of "slow"
        let elapsed = started.elapsed();
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "Timed out on slow.");
        assert!(elapsed >= Duration::from_millis(300), "{:?}", elapsed);
        assert!(elapsed < Duration::from_millis(400), "{:?}", elapsed);
        assert_eq!(plan.polled.lock().unwrap()["fast"], 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_timeout_does_not_overflow() {
        let plan = Countdown::new(1);
        let settings = PollSettings {
            interval: Duration::from_millis(100),
            timeout: Duration::MAX,
        };

        let report = drive_item(&plan, &item("svc"), settings).await.unwrap();
        assert_eq!(report.polls, 1);
    }
}
