use std::collections::BTreeMap;

use kube::CustomResource;
use serde::{Deserialize, Serialize};

// -----------------------------------------------------------------------------
// ArgoCD Application (only the kustomize image overrides are interpreted)
// -----------------------------------------------------------------------------
#[derive(CustomResource, Deserialize, Serialize, Clone, Default, Debug)]
#[kube(
    group = "argoproj.io",
    version = "v1alpha1",
    kind = "Application",
    plural = "applications",
    namespaced,
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ApplicationSource>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Deserialize, Serialize, Clone, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kustomize: Option<ApplicationKustomize>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Deserialize, Serialize, Clone, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationKustomize {
    /// `name=ref` override pairs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}
