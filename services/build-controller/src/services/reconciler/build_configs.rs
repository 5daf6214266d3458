use build_core::crds::{BuildConfig, BuildConfigStatus, BuildTriggerCause};
use kube::ResourceExt;
use tracing::{error, info, warn};

use crate::error::AppError;
use crate::services::reconciler::Reconciler;
use crate::services::store::{ApplicationStore, ClusterStore, decode};

impl<S> Reconciler<S>
where
    S: ClusterStore + ApplicationStore,
{
    /// One pass over every BuildConfig in the cluster.
    ///
    /// A config asks for a build only when it has never issued one or carries
    /// the trigger label, so repeating a pass over settled configs is a no-op.
    #[tracing::instrument("check_build_configs", skip_all, err)]
    pub async fn check_build_configs(&self) -> Result<(), AppError> {
        let objects = self.store.list_build_configs().await?;
        info!("🔍 Checking {} build configs", objects.len());

        for object in objects {
            let namespace = object.namespace().unwrap_or_default();
            let name = object.name_any();

            let config = match decode::<BuildConfig>(object) {
                Ok(config) => config,
                Err(e) => {
                    error!(%namespace, %name, error = %e, "❌ Unreadable build config");
                    continue;
                }
            };

            let Some((number, cause)) = config.pending_build() else {
                continue;
            };

            if let Err(e) = self.create_build(&config, number, cause).await {
                error!(%namespace, %name, number, error = %e, "❌ Build creation failed");
            }
        }

        Ok(())
    }

    /// Issues build `number` of `config` and starts it right away.
    async fn create_build(
        &self,
        config: &BuildConfig,
        number: i64,
        cause: BuildTriggerCause,
    ) -> Result<(), AppError> {
        let namespace = config.namespace().unwrap_or_default();
        let name = config.name_any();
        let build = config.new_build(number, cause)?;

        let created = match self.store.create_build(&build).await {
            Ok(created) => {
                info!(%namespace, %name, build = %created.name_any(), "🆕 Build created");
                Some(created)
            }
            Err(AppError::AlreadyExists(existing)) => {
                warn!(
                    %namespace,
                    %name,
                    %existing,
                    "⚠️ Build already exists, advancing lastVersion"
                );
                None
            }
            Err(e) => return Err(e),
        };

        if config.trigger_requested() {
            // Last write wins against concurrent label edits.
            if let Err(e) = self.store.clear_trigger_label(&namespace, &name).await {
                warn!(%namespace, %name, error = %e, "⚠️ Failed to clear trigger label");
            }
        }

        let status = BuildConfigStatus {
            last_version: Some(number),
        };
        self.store
            .replace_build_config_status(&namespace, &name, &status)
            .await?;

        match created {
            Some(build) => self.start_build(&build).await,
            None => Ok(()),
        }
    }
}
