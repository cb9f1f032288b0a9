//! Intent (outbox) log for operations spanning the catalog and the blob
//! store, and the reconciliation pass that resolves what it left pending.

pub mod log;
pub mod reconcile;

pub use log::{IntentKind, IntentLog, IntentRecord, IntentStatus};
pub use reconcile::{ReconcileAction, ReconcileReport, Reconciler};
