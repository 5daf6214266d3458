use std::{net::SocketAddr, path::PathBuf};

use build_core::configs::ReconcilerConfig;
use config::{ConfigBuilder, ConfigError, Environment, File, builder::AsyncState};
use factory::factories::observability::ObservabilityConfig;
use serde::Deserialize;

#[derive(Deserialize, Clone, Debug, Default)]
pub struct KubernetesClientConfig {
    #[serde(default)]
    pub in_cluster: bool,
    /// Explicit kubeconfig path; the default loading rules apply when unset.
    pub kubeconfig: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub server_address: SocketAddr,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    #[serde(default)]
    pub kubernetes: KubernetesClientConfig,
    #[serde(default)]
    pub reconciler: ReconcilerConfig,
}

impl Config {
    pub async fn init(path: PathBuf) -> Result<Self, ConfigError> {
        let cfg = ConfigBuilder::<AsyncState>::default()
            .add_source(File::from(path))
            .add_source(Environment::default().separator("__"))
            .build()
            .await?;

        cfg.try_deserialize::<Self>()?.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.reconciler.interval_secs == 0 {
            return Err(ConfigError::Message(
                "reconciler.interval_secs must be at least 1".to_string(),
            ));
        }

        Ok(self)
    }
}
