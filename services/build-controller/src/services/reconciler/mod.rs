//! BuildConfig and Build reconciliation passes.
//!
//! Both passes walk their resources sequentially. An error on one resource is
//! logged with its namespace and name and the pass moves on to the next.

mod build_configs;
mod builds;


use build_core::configs::ReconcilerConfig;

use crate::services::store::{ApplicationStore, ClusterStore};

pub struct Reconciler<S> {
    store: S,
    cfg: ReconcilerConfig,
}

impl<S> Reconciler<S>
where
    S: ClusterStore + ApplicationStore,
{
    pub fn new(store: S, cfg: ReconcilerConfig) -> Self {
        Self { store, cfg }
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.cfg
    }
}
