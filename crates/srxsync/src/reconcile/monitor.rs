//! Monitoring passes: the gate, the pass guard and status bookkeeping around
//! a group reconciliation.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::info;

use super::reconciler::{rules_failure, Reconciler};
use super::result::{PassTrigger, ReconciliationResult};
use crate::status::{PassRecord, StatusAggregator};

pub const DISABLED_MESSAGE: &str = "Monitoring is disabled";
pub const SKIPPED_MESSAGE: &str = "Skipped: a monitoring pass is already in progress";

/// Runs group passes on behalf of the scheduler and the manual trigger.
pub struct MonitoringService {
    reconciler: Arc<Reconciler>,
    status: Arc<StatusAggregator>,
    group_id: String,
    pass_lock: Mutex<()>,
}

impl MonitoringService {
    pub fn new(
        reconciler: Arc<Reconciler>,
        status: Arc<StatusAggregator>,
        group_id: impl Into<String>,
    ) -> Self {
        Self {
            reconciler,
            status,
            group_id: group_id.into(),
            pass_lock: Mutex::new(()),
        }
    }

    pub fn reconciler(&self) -> &Arc<Reconciler> {
        &self.reconciler
    }

    pub fn status(&self) -> &Arc<StatusAggregator> {
        &self.status
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// Runs one monitoring pass over the target group.
    ///
    /// Does nothing while monitoring is disabled or while another pass is in
    /// flight. The last check time only moves once the group's projects have
    /// been listed.
    pub async fn run_pass(&self, trigger: PassTrigger) -> ReconciliationResult {
        if !self.status.is_enabled() {
            info!("{:?} pass not run: monitoring is disabled", trigger);
            return ReconciliationResult::failed(DISABLED_MESSAGE);
        }

        let _guard = match self.pass_lock.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                info!("{:?} pass skipped: another pass is already in progress", trigger);
                return ReconciliationResult::failed(SKIPPED_MESSAGE);
            }
        };

        let started_at = Utc::now();
        info!("Starting {:?} pass over group {}", trigger, self.group_id);

        let result = match self.reconciler.expected_configuration().await {
            Ok(expected) => {
                let pass = self
                    .reconciler
                    .reconcile_group_with(&expected, &self.group_id)
                    .await;
                if pass.reached_projects {
                    self.status.record_completed_pass(Utc::now());
                }
                pass.result
            }
            Err(e) => rules_failure(e),
        };

        self.status.record_pass(PassRecord {
            trigger,
            started_at,
            result: result.clone(),
        });
        result
    }
}
