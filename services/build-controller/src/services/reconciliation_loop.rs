use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::error::AppError;
use crate::services::reconciler::Reconciler;
use crate::services::store::{ApplicationStore, ClusterStore};

/// Runs a full reconciliation pass every `interval_secs`.
///
/// Passes never overlap: the next tick is only awaited once the current pass,
/// including all of its API calls, has returned.
pub async fn start_reconciliation_loop<S>(
    reconciler: Arc<Reconciler<S>>,
    ready: Arc<AtomicBool>,
) -> Result<(), AppError>
where
    S: ClusterStore + ApplicationStore + 'static,
{
    let interval_secs = reconciler.config().interval_secs;
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        "🔄 Starting reconciliation loop, interval: {}",
        interval_secs
    );

    loop {
        interval.tick().await;

        reconcile_pass(&reconciler).await;
        ready.store(true, Ordering::Release);
    }
}

/// BuildConfigs first, so a freshly issued build gets its job in the same pass.
#[tracing::instrument("reconcile_pass", skip_all)]
async fn reconcile_pass<S>(reconciler: &Reconciler<S>)
where
    S: ClusterStore + ApplicationStore,
{
    let start = std::time::Instant::now();

    if let Err(e) = reconciler.check_build_configs().await {
        error!(error = %e, "❌ BuildConfig reconciliation failed");
    }
    if let Err(e) = reconciler.check_builds().await {
        error!(error = %e, "❌ Build reconciliation failed");
    }

    let elapsed_ms = start.elapsed().as_millis() as u64;
    info!(elapsed_ms, "✅ Reconciliation pass finished");
}
