//! Seams between the reconcilers and the cluster API.
//!
//! [`kubernetes::KubeStore`] is the production implementation; tests run the
//! reconcilers against an in-memory store instead.

pub mod kubernetes;

#[cfg(test)]
pub mod fake;

use std::future::Future;

use build_core::crds::{Application, Build, BuildConfigStatus, BuildStatus};
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::Pod;
use kube::api::DynamicObject;
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Typed view of one listed object.
///
/// Lists come back untyped so an object that does not fit its CRD fails on
/// its own instead of failing the whole list.
pub fn decode<K: DeserializeOwned>(object: DynamicObject) -> Result<K, AppError> {
    Ok(serde_json::from_value(serde_json::to_value(object)?)?)
}

/// BuildConfigs, Builds, and the Jobs and Pods executing them.
pub trait ClusterStore: Send + Sync {
    /// BuildConfigs across all namespaces, see [`decode`].
    fn list_build_configs(
        &self,
    ) -> impl Future<Output = Result<Vec<DynamicObject>, AppError>> + Send;

    /// Builds across all namespaces, see [`decode`].
    fn list_builds(&self) -> impl Future<Output = Result<Vec<DynamicObject>, AppError>> + Send;

    /// Fails with [`AppError::AlreadyExists`] when the name is taken.
    fn create_build(&self, build: &Build) -> impl Future<Output = Result<Build, AppError>> + Send;

    fn clear_trigger_label(
        &self,
        namespace: &str,
        name: &str,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    fn replace_build_config_status(
        &self,
        namespace: &str,
        name: &str,
        status: &BuildConfigStatus,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    fn replace_build_status(
        &self,
        namespace: &str,
        name: &str,
        status: &BuildStatus,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    fn annotate_build(
        &self,
        namespace: &str,
        name: &str,
        key: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Fails with [`AppError::AlreadyExists`] when the name is taken.
    fn create_job(&self, job: &Job) -> impl Future<Output = Result<Job, AppError>> + Send;

    /// Fails with [`AppError::NotFound`] when there is no such job.
    fn get_job(
        &self,
        namespace: &str,
        name: &str,
    ) -> impl Future<Output = Result<Job, AppError>> + Send;

    /// First pod of `job_name` whose `status.phase` equals `phase`.
    fn find_terminal_pod(
        &self,
        namespace: &str,
        job_name: &str,
        phase: &str,
    ) -> impl Future<Output = Result<Option<Pod>, AppError>> + Send;

    fn pod_logs(
        &self,
        namespace: &str,
        name: &str,
    ) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// GitOps applications holding kustomize image overrides.
pub trait ApplicationStore: Send + Sync {
    fn list_applications(
        &self,
        namespace: &str,
    ) -> impl Future<Output = Result<Vec<Application>, AppError>> + Send;

    /// Replaces `spec.source.kustomize.images` and nothing else.
    fn replace_application_images(
        &self,
        namespace: &str,
        name: &str,
        images: &[String],
    ) -> impl Future<Output = Result<(), AppError>> + Send;
}
