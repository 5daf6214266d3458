use factory::factories::kubernetes::implementation::KubernetesConfig;

use crate::config::Config;

impl KubernetesConfig for Config {
    fn k8s_in_cluster(&self) -> bool {
        self.kubernetes.in_cluster
    }

    fn k8s_config_path(&self) -> Option<String> {
        self.kubernetes.kubeconfig.clone()
    }
}
