//! Reconciliation of remote parser options against the rules document.

pub mod monitor;
pub mod reconciler;
pub mod result;
pub mod scheduler;

pub use monitor::MonitoringService;
pub use reconciler::Reconciler;
pub use result::{
    DivergenceReport, DivergentFile, FileOutcome, PassTrigger, ProjectStatus, ReconciliationResult,
};
pub use scheduler::SyncScheduler;
