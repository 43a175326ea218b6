use std::time::Duration;

use tokio::time::sleep;
use tracing::info;

use crate::coordinator::Coordinator;

pub const REBALANCE_INTERVAL: Duration = Duration::from_secs(60);

/// Runs the coordinator forever on a fixed delay-after-completion cadence.
/// No jitter, no overlap guard: an overrunning pass simply pushes the next
/// one back.
pub struct Scheduler {
    coordinator: Coordinator,
    interval: Duration,
}

impl Scheduler {
    pub fn new(coordinator: Coordinator) -> Self {
        Self {
            coordinator,
            interval: REBALANCE_INTERVAL,
        }
    }

    pub fn with_interval(coordinator: Coordinator, interval: Duration) -> Self {
        Self {
            coordinator,
            interval,
        }
    }

    pub async fn run(self) -> ! {
        info!(
            "Scheduler started, rebalancing every {}s",
            self.interval.as_secs()
        );
        loop {
            self.coordinator.run_pass().await;
            sleep(self.interval).await;
        }
    }
}
