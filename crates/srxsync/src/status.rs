//! Monitoring state and pass bookkeeping.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::config::AppConfig;
use crate::reconcile::{PassTrigger, ReconciliationResult};

const DEFAULT_HISTORY_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MonitoringState {
    enabled: bool,
    last_check_time: DateTime<Utc>,
}

/// Snapshot returned by [`StatusAggregator::stats`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringStats {
    pub is_enabled: bool,
    pub last_check_time: DateTime<Utc>,
    pub auto_configuration_enabled: bool,
    pub target_group_label: String,
    pub target_group_id: String,
    pub rules_source_label: String,
}

/// One completed monitoring pass.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassRecord {
    pub trigger: PassTrigger,
    pub started_at: DateTime<Utc>,
    pub result: ReconciliationResult,
}

/// Holds the enable flag, the last completed check time and a bounded
/// history of passes. One instance per service; nothing here is global.
#[derive(Debug)]
pub struct StatusAggregator {
    state: RwLock<MonitoringState>,
    history: Mutex<VecDeque<PassRecord>>,
    history_capacity: usize,
    auto_configuration_enabled: bool,
    target_group_id: String,
    target_group_label: String,
    rules_source_label: String,
}

impl StatusAggregator {
    /// Starts enabled, with the last check time set to now.
    pub fn new(
        target_group_id: impl Into<String>,
        target_group_label: impl Into<String>,
        rules_source_label: impl Into<String>,
    ) -> Self {
        Self {
            state: RwLock::new(MonitoringState {
                enabled: true,
                last_check_time: Utc::now(),
            }),
            history: Mutex::new(VecDeque::new()),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            auto_configuration_enabled: true,
            target_group_id: target_group_id.into(),
            target_group_label: target_group_label.into(),
            rules_source_label: rules_source_label.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.project_group_id.clone(),
            config.project_group_label.clone(),
            config.rules_file.clone(),
        )
        .with_auto_configuration(config.enable_auto_configuration)
        .with_history_capacity(config.history_capacity)
    }

    pub fn with_auto_configuration(mut self, enabled: bool) -> Self {
        self.auto_configuration_enabled = enabled;
        self
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .enabled = enabled;
        info!(
            "File monitoring {}",
            if enabled { "enabled" } else { "disabled" }
        );
    }

    pub fn is_enabled(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .enabled
    }

    pub fn last_check_time(&self) -> DateTime<Utc> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .last_check_time
    }

    /// Records the completion time of a pass. Last writer wins.
    pub fn record_completed_pass(&self, timestamp: DateTime<Utc>) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .last_check_time = timestamp;
    }

    /// Appends a pass to the history, evicting the oldest entry when full.
    pub fn record_pass(&self, record: PassRecord) {
        if self.history_capacity == 0 {
            return;
        }
        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        while history.len() >= self.history_capacity {
            history.pop_front();
        }
        history.push_back(record);
    }

    /// Most recent passes first, at most `limit` entries.
    pub fn history(&self, limit: usize) -> Vec<PassRecord> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn history_len(&self) -> usize {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn stats(&self) -> MonitoringStats {
        let state = *self.state.read().unwrap_or_else(PoisonError::into_inner);
        MonitoringStats {
            is_enabled: state.enabled,
            last_check_time: state.last_check_time,
            auto_configuration_enabled: self.auto_configuration_enabled,
            target_group_label: self.target_group_label.clone(),
            target_group_id: self.target_group_id.clone(),
            rules_source_label: self.rules_source_label.clone(),
        }
    }
}
