use kube::{
    Client, Config,
    config::{KubeConfigOptions, Kubeconfig},
};
use tracing::info;

use crate::factories::kubernetes::{Kubernetes, error::KubernetesError};

/// How the controller reaches the cluster API.
pub trait KubernetesConfig {
    fn k8s_in_cluster(&self) -> bool;
    fn k8s_config_path(&self) -> Option<String>;
}

impl Kubernetes {
    pub async fn new<T: KubernetesConfig>(config: &T) -> Result<Self, KubernetesError> {
        let kube_config = if config.k8s_in_cluster() {
            let kube_config = Config::incluster()?;
            info!("✅ Using in-cluster service account");
            kube_config
        } else if let Some(path) = config.k8s_config_path() {
            let kubeconfig = Kubeconfig::read_from(&path)?;
            let options = KubeConfigOptions::default();
            let kube_config = Config::from_custom_kubeconfig(kubeconfig, &options).await?;
            info!(path = %path, "✅ Using kubeconfig");
            kube_config
        } else {
            let kube_config = Config::infer().await?;
            info!("✅ Using inferred kubeconfig");
            kube_config
        };

        let client = Client::try_from(kube_config)?;

        Ok(Self { client })
    }
}
