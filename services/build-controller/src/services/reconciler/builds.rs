use build_core::crds::{Build, BuildPhase, BuildStatus};
use build_core::error::BuildError;
use build_core::job_spec::build_job;
use build_core::labels::AnnotationKeys;
use build_core::status::{compute_status, record_completion, record_failure};
use build_core::timestamps::from_optional_k8s_time;
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::Pod;
use kube::ResourceExt;
use tracing::{debug, error, info, warn};

use crate::error::AppError;
use crate::services::image_syncer::sync_image_refs;
use crate::services::reconciler::Reconciler;
use crate::services::store::{ApplicationStore, ClusterStore, decode};

impl<S> Reconciler<S>
where
    S: ClusterStore + ApplicationStore,
{
    /// One pass over every Build in the cluster.
    #[tracing::instrument("check_builds", skip_all, err)]
    pub async fn check_builds(&self) -> Result<(), AppError> {
        let objects = self.store.list_builds().await?;
        info!("🔍 Checking {} builds", objects.len());

        for object in objects {
            let namespace = object.namespace().unwrap_or_default();
            let name = object.name_any();

            let result = match decode::<Build>(object) {
                Ok(build) if build.phase().is_terminal() => continue,
                Ok(build) => self.reconcile_build(&build).await,
                Err(e) => Err(e),
            };

            if let Err(e) = result {
                error!(%namespace, %name, error = %e, "❌ Build reconciliation failed");
            }
        }

        Ok(())
    }

    async fn reconcile_build(&self, build: &Build) -> Result<(), AppError> {
        debug!(
            namespace = %build.namespace().unwrap_or_default(),
            name = %build.name_any(),
            phase = %build.phase(),
            "Reconciling build"
        );

        match build.phase() {
            BuildPhase::New => self.start_build(build).await,
            BuildPhase::Pending | BuildPhase::Running => {
                let job = self
                    .store
                    .get_job(&self.cfg.job_namespace, &build.name_any())
                    .await?;
                self.update_build_state(build, &job).await
            }
            BuildPhase::Complete | BuildPhase::Failed => Ok(()),
        }
    }

    /// Creates the build's Job, records `Pending`, then syncs status from the Job.
    pub(crate) async fn start_build(&self, build: &Build) -> Result<(), AppError> {
        let namespace = build.namespace().unwrap_or_default();
        let name = build.name_any();
        let job = build_job(build, &self.cfg)?;

        let job = match self.store.create_job(&job).await {
            Ok(job) => {
                info!(%namespace, %name, job = %job.name_any(), "🚀 Build job created");
                job
            }
            Err(AppError::AlreadyExists(_)) => {
                warn!(%namespace, %name, "⚠️ Build job already exists, adopting it");
                self.store
                    .get_job(&self.cfg.job_namespace, &job.name_any())
                    .await?
            }
            Err(e) => return Err(e),
        };

        let start_time =
            from_optional_k8s_time(job.status.as_ref().and_then(|s| s.start_time.as_ref()));
        self.store
            .replace_build_status(&namespace, &name, &BuildStatus::pending(start_time))
            .await?;

        self.update_build_state(build, &job).await
    }

    /// Recomputes and persists the build's status from its Job.
    ///
    /// Entering a terminal phase also reads the terminal pod's log: a
    /// failure snippet for `Failed`, the pushed digest for `Complete`.
    async fn update_build_state(&self, build: &Build, job: &Job) -> Result<(), AppError> {
        let namespace = build.namespace().unwrap_or_default();
        let name = build.name_any();
        let mut status = compute_status(build, job);

        match status.phase {
            BuildPhase::Failed => {
                let (pod, log) = self.terminal_pod_log(job, "Failed").await?;
                record_failure(&mut status, &pod, &log);

                self.annotate_pod_name(&namespace, &name, &pod).await?;
                warn!(%namespace, %name, "💥 Build failed");
            }
            BuildPhase::Complete => {
                let (pod, log) = self.terminal_pod_log(job, "Succeeded").await?;
                let pod_name = pod.name_any();
                let reference = record_completion(
                    &mut status,
                    build,
                    &pod_name,
                    &log,
                    &self.cfg.default_registry,
                )?;
                info!(%namespace, %name, %reference, "✅ Build complete");

                if let Some(image_name) = build.config_name() {
                    if let Err(e) = sync_image_refs(
                        &self.store,
                        &self.cfg.argo_namespace,
                        image_name,
                        &reference,
                    )
                    .await
                    {
                        error!(
                            %namespace,
                            %name,
                            error = %e,
                            "❌ Image reference sync failed"
                        );
                    }
                }

                self.annotate_pod_name(&namespace, &name, &pod).await?;
            }
            _ => {}
        }

        self.store
            .replace_build_status(&namespace, &name, &status)
            .await
    }

    async fn terminal_pod_log(&self, job: &Job, phase: &str) -> Result<(Pod, String), AppError> {
        let job_namespace = job
            .namespace()
            .unwrap_or_else(|| self.cfg.job_namespace.clone());
        let job_name = job.name_any();

        let pod = self
            .store
            .find_terminal_pod(&job_namespace, &job_name, phase)
            .await?
            .ok_or(BuildError::MissingTerminalPod { job: job_name })?;

        let log = self.store.pod_logs(&job_namespace, &pod.name_any()).await?;

        Ok((pod, log))
    }

    async fn annotate_pod_name(
        &self,
        namespace: &str,
        name: &str,
        pod: &Pod,
    ) -> Result<(), AppError> {
        self.store
            .annotate_build(namespace, name, AnnotationKeys::POD_NAME, &pod.name_any())
            .await
    }
}
