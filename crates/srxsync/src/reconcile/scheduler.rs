//! Periodic monitoring scheduler.
//!
//! Runs a monitoring pass every interval and whenever a manual trigger is
//! received on the broadcast channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Notify};
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};

use super::monitor::MonitoringService;
use super::result::PassTrigger;

/// Periodic pass scheduler for a [`MonitoringService`].
pub struct SyncScheduler {
    service: Arc<MonitoringService>,
    interval: Duration,
    shutdown: Arc<AtomicBool>,
    wake: Arc<Notify>,
}

impl SyncScheduler {
    pub fn new(service: Arc<MonitoringService>, interval: Duration) -> Self {
        Self {
            service,
            interval,
            shutdown: Arc::new(AtomicBool::new(false)),
            wake: Arc::new(Notify::new()),
        }
    }

    /// Starts the pass loop on the current tokio runtime.
    /// Accepts a trigger receiver for manual pass requests.
    pub fn start(&self, mut trigger_rx: broadcast::Receiver<()>) -> JoinHandle<()> {
        let service = Arc::clone(&self.service);
        let shutdown = Arc::clone(&self.shutdown);
        let wake = Arc::clone(&self.wake);
        let interval = self.interval;

        tokio::spawn(async move {
            let mut interval_timer = pass_interval(interval);
            interval_timer.tick().await; // skip immediate first tick
            log::info!("Monitoring scheduler started, interval {:?}", interval);

            loop {
                if shutdown.load(Ordering::Acquire) {
                    break;
                }

                let trigger = tokio::select! {
                    _ = interval_timer.tick() => PassTrigger::Scheduled,
                    received = trigger_rx.recv() => match received {
                        Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {
                            log::info!("Manual monitoring pass triggered");
                            PassTrigger::Manual
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            log::warn!("Trigger channel closed, stopping scheduler");
                            break;
                        }
                    },
                    _ = wake.notified() => continue,
                };

                if shutdown.load(Ordering::Acquire) {
                    break;
                }

                let result = service.run_pass(trigger).await;
                if result.is_success() {
                    log::info!("Monitoring pass: {}", result.summary());
                } else {
                    log::warn!(
                        "Monitoring pass finished with {} errors: {}",
                        result.errors.len(),
                        result.summary()
                    );
                }
            }

            log::info!("Monitoring scheduler stopped");
        })
    }

    /// Signals the scheduler to stop. A pass already running completes.
    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::Release);
        self.wake.notify_one();
    }
}

/// Pass timer. A pass that overruns the interval delays the next tick
/// instead of queueing catch-up passes.
fn pass_interval(period: Duration) -> Interval {
    let mut timer = tokio::time::interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}
