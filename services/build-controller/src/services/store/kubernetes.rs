use build_core::crds::{Application, Build, BuildConfig, BuildConfigStatus, BuildStatus};
use build_core::labels::LabelKeys;
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::Pod;
use kube::{
    Api, Client,
    api::{ApiResource, DynamicObject, ListParams, LogParams, Patch, PatchParams, PostParams},
};
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::error::AppError;
use crate::services::store::{ApplicationStore, ClusterStore};

/// Cluster store backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
    field_manager: String,
}

impl KubeStore {
    pub fn new(client: Client, field_manager: String) -> Self {
        Self {
            client,
            field_manager,
        }
    }

    fn patch_params(&self) -> PatchParams {
        PatchParams {
            field_manager: Some(self.field_manager.clone()),
            ..Default::default()
        }
    }

    /// Every object of `K` in the cluster, left untyped.
    async fn list_untyped<K>(&self) -> Result<Vec<DynamicObject>, AppError>
    where
        K: kube::Resource<DynamicType = ()>,
    {
        let resource = ApiResource::erase::<K>(&());
        let api: Api<DynamicObject> = Api::all_with(self.client.clone(), &resource);
        Ok(api.list(&ListParams::default()).await?.items)
    }

    /// Whole-object replace of the status subresource.
    async fn replace_status<K, S>(
        &self,
        api: Api<K>,
        name: &str,
        status: &S,
    ) -> Result<(), AppError>
    where
        K: kube::Resource + Clone + std::fmt::Debug + serde::de::DeserializeOwned,
        S: Serialize,
    {
        let patch: json_patch::Patch = serde_json::from_value(json!([
            { "op": "add", "path": "/status", "value": status }
        ]))?;

        api.patch_status(name, &self.patch_params(), &Patch::Json::<()>(patch))
            .await?;

        Ok(())
    }
}

fn conflict_to_already_exists(err: kube::Error, name: &str) -> AppError {
    match err {
        kube::Error::Api(e) if e.code == 409 => AppError::AlreadyExists(name.to_string()),
        e => AppError::KubeError(e),
    }
}

/// Merge patch setting one metadata map entry; `Value::Null` removes it.
fn metadata_patch(field: &str, key: &str, value: Value) -> Value {
    let mut entries = Map::new();
    entries.insert(key.to_string(), value);
    let mut metadata = Map::new();
    metadata.insert(field.to_string(), Value::Object(entries));
    json!({ "metadata": metadata })
}

impl ClusterStore for KubeStore {
    async fn list_build_configs(&self) -> Result<Vec<DynamicObject>, AppError> {
        self.list_untyped::<BuildConfig>().await
    }

    async fn list_builds(&self) -> Result<Vec<DynamicObject>, AppError> {
        self.list_untyped::<Build>().await
    }

    async fn create_build(&self, build: &Build) -> Result<Build, AppError> {
        let namespace = build.metadata.namespace.clone().unwrap_or_default();
        let name = build.metadata.name.clone().unwrap_or_default();
        let api: Api<Build> = Api::namespaced(self.client.clone(), &namespace);

        api.create(&PostParams::default(), build)
            .await
            .map_err(|e| conflict_to_already_exists(e, &format!("build {namespace}/{name}")))
    }

    async fn clear_trigger_label(&self, namespace: &str, name: &str) -> Result<(), AppError> {
        let api: Api<BuildConfig> = Api::namespaced(self.client.clone(), namespace);
        let patch = metadata_patch("labels", LabelKeys::TRIGGER_NOW, Value::Null);

        api.patch(name, &self.patch_params(), &Patch::Merge(&patch)).await?;

        debug!(namespace, name, "trigger label cleared");
        Ok(())
    }

    async fn replace_build_config_status(
        &self,
        namespace: &str,
        name: &str,
        status: &BuildConfigStatus,
    ) -> Result<(), AppError> {
        let api: Api<BuildConfig> = Api::namespaced(self.client.clone(), namespace);
        self.replace_status(api, name, status).await
    }

    async fn replace_build_status(
        &self,
        namespace: &str,
        name: &str,
        status: &BuildStatus,
    ) -> Result<(), AppError> {
        let api: Api<Build> = Api::namespaced(self.client.clone(), namespace);
        self.replace_status(api, name, status).await
    }

    async fn annotate_build(
        &self,
        namespace: &str,
        name: &str,
        key: &str,
        value: &str,
    ) -> Result<(), AppError> {
        let api: Api<Build> = Api::namespaced(self.client.clone(), namespace);
        let patch = metadata_patch("annotations", key, Value::from(value));

        api.patch(name, &self.patch_params(), &Patch::Merge(&patch)).await?;

        Ok(())
    }

    async fn create_job(&self, job: &Job) -> Result<Job, AppError> {
        let namespace = job.metadata.namespace.clone().unwrap_or_default();
        let name = job.metadata.name.clone().unwrap_or_default();
        let api: Api<Job> = Api::namespaced(self.client.clone(), &namespace);

        api.create(&PostParams::default(), job)
            .await
            .map_err(|e| conflict_to_already_exists(e, &format!("job {namespace}/{name}")))
    }

    async fn get_job(&self, namespace: &str, name: &str) -> Result<Job, AppError> {
        let api: Api<Job> = Api::namespaced(self.client.clone(), namespace);

        match api.get(name).await {
            Ok(job) => Ok(job),
            Err(kube::Error::Api(e)) if e.code == 404 => {
                Err(AppError::NotFound(format!("job {namespace}/{name}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_terminal_pod(
        &self,
        namespace: &str,
        job_name: &str,
        phase: &str,
    ) -> Result<Option<Pod>, AppError> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let params = ListParams::default()
            .labels(&format!("{}={}", LabelKeys::JOB_NAME, job_name))
            .fields(&format!("status.phase={phase}"))
            .limit(1);

        Ok(api.list(&params).await?.items.into_iter().next())
    }

    async fn pod_logs(&self, namespace: &str, name: &str) -> Result<String, AppError> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.logs(name, &LogParams::default()).await?)
    }
}

impl ApplicationStore for KubeStore {
    async fn list_applications(&self, namespace: &str) -> Result<Vec<Application>, AppError> {
        let api: Api<Application> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.list(&ListParams::default()).await?.items)
    }

    async fn replace_application_images(
        &self,
        namespace: &str,
        name: &str,
        images: &[String],
    ) -> Result<(), AppError> {
        let api: Api<Application> = Api::namespaced(self.client.clone(), namespace);
        let patch: json_patch::Patch = serde_json::from_value(json!([
            { "op": "replace", "path": "/spec/source/kustomize/images", "value": images }
        ]))?;

        api.patch(name, &self.patch_params(), &Patch::Json::<()>(patch))
            .await?;

        Ok(())
    }
}
