use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use build_core::crds::{Application, Build, BuildConfig, BuildConfigStatus, BuildStatus};
use build_core::labels::LabelKeys;
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::Pod;
use kube::ResourceExt;
use kube::api::DynamicObject;
use serde::Serialize;
use serde_json::Value;

use crate::error::AppError;
use crate::services::store::{ApplicationStore, ClusterStore};

/// Cluster contents plus a journal of every write.
#[derive(Default)]
pub struct FakeState {
    pub build_configs: Vec<BuildConfig>,
    pub builds: Vec<Build>,
    pub jobs: Vec<Job>,
    pub pods: Vec<Pod>,
    /// Pod name to log text.
    pub logs: BTreeMap<String, String>,
    pub applications: Vec<Application>,
    /// Listed ahead of the typed objects, exactly as given.
    pub raw_build_configs: Vec<Value>,
    pub raw_builds: Vec<Value>,

    pub created_builds: Vec<String>,
    pub created_jobs: Vec<String>,
    pub cleared_triggers: Vec<String>,
    pub config_statuses: Vec<(String, BuildConfigStatus)>,
    pub build_statuses: Vec<(String, BuildStatus)>,
    pub annotations: Vec<(String, String, String)>,
    pub image_patches: Vec<(String, Vec<String>)>,

    /// Job names whose lookup fails as if the API were down.
    pub broken_jobs: BTreeSet<String>,
    pub fail_image_patches: bool,
    pub fail_trigger_clears: bool,
}

#[derive(Default)]
pub struct FakeStore {
    state: Mutex<FakeState>,
}

impl FakeStore {
    pub fn new(state: FakeState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }
}

fn key(namespace: &str, name: &str) -> String {
    format!("{namespace}/{name}")
}

fn listed<K: Serialize>(raw: &[Value], typed: &[K]) -> Vec<DynamicObject> {
    raw.iter()
        .cloned()
        .chain(typed.iter().map(|k| serde_json::to_value(k).unwrap()))
        .map(|value| serde_json::from_value(value).unwrap())
        .collect()
}

fn matches<K: ResourceExt>(resource: &K, namespace: &str, name: &str) -> bool {
    resource.name_any() == name && resource.namespace().as_deref() == Some(namespace)
}

impl ClusterStore for FakeStore {
    async fn list_build_configs(&self) -> Result<Vec<DynamicObject>, AppError> {
        let state = self.state();
        Ok(listed(&state.raw_build_configs, &state.build_configs))
    }

    async fn list_builds(&self) -> Result<Vec<DynamicObject>, AppError> {
        let state = self.state();
        Ok(listed(&state.raw_builds, &state.builds))
    }

    async fn create_build(&self, build: &Build) -> Result<Build, AppError> {
        let mut state = self.state();
        let namespace = build.namespace().unwrap_or_default();
        let name = build.name_any();

        if state.builds.iter().any(|b| matches(b, &namespace, &name)) {
            return Err(AppError::AlreadyExists(key(&namespace, &name)));
        }

        state.builds.push(build.clone());
        state.created_builds.push(key(&namespace, &name));
        Ok(build.clone())
    }

    async fn clear_trigger_label(&self, namespace: &str, name: &str) -> Result<(), AppError> {
        let mut state = self.state();
        if state.fail_trigger_clears {
            return Err(AppError::IoError(std::io::Error::other("patch rejected")));
        }

        if let Some(config) = state
            .build_configs
            .iter_mut()
            .find(|c| matches(&**c, namespace, name))
        {
            config.labels_mut().remove(LabelKeys::TRIGGER_NOW);
        }
        state.cleared_triggers.push(key(namespace, name));
        Ok(())
    }

    async fn replace_build_config_status(
        &self,
        namespace: &str,
        name: &str,
        status: &BuildConfigStatus,
    ) -> Result<(), AppError> {
        let mut state = self.state();
        if let Some(config) = state
            .build_configs
            .iter_mut()
            .find(|c| matches(&**c, namespace, name))
        {
            config.status = Some(status.clone());
        }
        state
            .config_statuses
            .push((key(namespace, name), status.clone()));
        Ok(())
    }

    async fn replace_build_status(
        &self,
        namespace: &str,
        name: &str,
        status: &BuildStatus,
    ) -> Result<(), AppError> {
        let mut state = self.state();
        if let Some(build) = state
            .builds
            .iter_mut()
            .find(|b| matches(&**b, namespace, name))
        {
            build.status = Some(status.clone());
        }
        state
            .build_statuses
            .push((key(namespace, name), status.clone()));
        Ok(())
    }

    async fn annotate_build(
        &self,
        namespace: &str,
        name: &str,
        annotation: &str,
        value: &str,
    ) -> Result<(), AppError> {
        self.state().annotations.push((
            key(namespace, name),
            annotation.to_string(),
            value.to_string(),
        ));
        Ok(())
    }

    async fn create_job(&self, job: &Job) -> Result<Job, AppError> {
        let mut state = self.state();
        let namespace = job.namespace().unwrap_or_default();
        let name = job.name_any();

        if state.jobs.iter().any(|j| matches(j, &namespace, &name)) {
            return Err(AppError::AlreadyExists(key(&namespace, &name)));
        }

        state.jobs.push(job.clone());
        state.created_jobs.push(key(&namespace, &name));
        Ok(job.clone())
    }

    async fn get_job(&self, namespace: &str, name: &str) -> Result<Job, AppError> {
        let state = self.state();
        if state.broken_jobs.contains(name) {
            return Err(AppError::IoError(std::io::Error::other("connection reset")));
        }

        state
            .jobs
            .iter()
            .find(|j| matches(*j, namespace, name))
            .cloned()
            .ok_or_else(|| AppError::NotFound(key(namespace, name)))
    }

    async fn find_terminal_pod(
        &self,
        namespace: &str,
        job_name: &str,
        phase: &str,
    ) -> Result<Option<Pod>, AppError> {
        let state = self.state();
        let pod = state.pods.iter().find(|pod| {
            pod.namespace().as_deref() == Some(namespace)
                && pod.labels().get(LabelKeys::JOB_NAME).map(String::as_str) == Some(job_name)
                && pod.status.as_ref().and_then(|s| s.phase.as_deref()) == Some(phase)
        });

        Ok(pod.cloned())
    }

    async fn pod_logs(&self, namespace: &str, name: &str) -> Result<String, AppError> {
        self.state()
            .logs
            .get(name)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("logs of {}", key(namespace, name))))
    }
}

impl ApplicationStore for FakeStore {
    async fn list_applications(&self, namespace: &str) -> Result<Vec<Application>, AppError> {
        Ok(self
            .state()
            .applications
            .iter()
            .filter(|app| app.namespace().as_deref() == Some(namespace))
            .cloned()
            .collect())
    }

    async fn replace_application_images(
        &self,
        namespace: &str,
        name: &str,
        images: &[String],
    ) -> Result<(), AppError> {
        let mut state = self.state();
        if state.fail_image_patches {
            return Err(AppError::IoError(std::io::Error::other("argocd unavailable")));
        }

        state
            .image_patches
            .push((key(namespace, name), images.to_vec()));
        Ok(())
    }
}
