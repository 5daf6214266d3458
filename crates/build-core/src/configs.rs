use serde::Deserialize;

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct ReconcilerConfig {
    #[serde(default = "interval_secs_default")]
    pub interval_secs: u64,
    #[serde(default = "job_namespace_default")]
    pub job_namespace: String,
    /// Prefix for output names that carry no registry path.
    #[serde(default = "default_registry_default")]
    pub default_registry: String,
    #[serde(default = "argo_namespace_default")]
    pub argo_namespace: String,
    #[serde(default = "builder_image_default")]
    pub builder_image: String,
    #[serde(default = "cache_host_path_default")]
    pub cache_host_path: String,
    #[serde(default = "registry_secret_default")]
    pub registry_secret: String,
    #[serde(default = "job_ttl_secs_default")]
    pub job_ttl_secs: i32,
    #[serde(default = "field_manager_default")]
    pub field_manager: String,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            interval_secs: interval_secs_default(),
            job_namespace: job_namespace_default(),
            default_registry: default_registry_default(),
            argo_namespace: argo_namespace_default(),
            builder_image: builder_image_default(),
            cache_host_path: cache_host_path_default(),
            registry_secret: registry_secret_default(),
            job_ttl_secs: job_ttl_secs_default(),
            field_manager: field_manager_default(),
        }
    }
}

fn interval_secs_default() -> u64 {
    30
}

fn job_namespace_default() -> String {
    String::from("image-builds")
}

fn default_registry_default() -> String {
    String::from("rg.nl-ams.scw.cloud/danopia-k8s-apps")
}

fn argo_namespace_default() -> String {
    String::from("argocd")
}

fn builder_image_default() -> String {
    String::from("rg.nl-ams.scw.cloud/danopia-k8s-apps/image-buildah")
}

fn cache_host_path_default() -> String {
    String::from("/tmp/k8s-buildah-containers")
}

fn registry_secret_default() -> String {
    String::from("scaleway-registry-token")
}

fn job_ttl_secs_default() -> i32 {
    60 * 60
}

fn field_manager_default() -> String {
    String::from("build-controller")
}
