//! Slot ledger and the reconciliation state machine that turns absolute
//! slot writes into signed per-item deltas.

mod ledger;
mod reconciler;

#[cfg(test)]
mod reconciler_tests;

pub use ledger::{ItemBaseline, SlotLedger};
pub use reconciler::{
    BaselineKind, BootstrapOutcome, Delta, InitRequest, InventoryReconciler, ReconcilerState,
};
