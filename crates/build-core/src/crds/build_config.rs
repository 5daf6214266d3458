use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::ResourceRequirements;
use kube::CustomResource;
use serde::{Deserialize, Serialize};

// -----------------------------------------------------------------------------
// BuildConfig Resource (user-authored build template)
// -----------------------------------------------------------------------------
#[derive(CustomResource, Deserialize, Serialize, Clone, Default, Debug, PartialEq)]
#[kube(
    group = "build.danopia.net",
    version = "v1",
    kind = "BuildConfig",
    plural = "buildconfigs",
    namespaced,
    schema = "disabled",
    status = "BuildConfigStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfigSpec {
    #[serde(flatten)]
    pub common: CommonBuildSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_policy: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Default, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfigStatus {
    /// Highest build sequence number issued for this config.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_version: Option<i64>,
}

// -----------------------------------------------------------------------------
// Fields shared by BuildConfig and Build
// -----------------------------------------------------------------------------
#[derive(Deserialize, Serialize, Clone, Default, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommonBuildSpec {
    pub source: BuildSource,
    pub strategy: BuildStrategy,
    #[serde(default)]
    pub output: BuildOutput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_selector: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceRequirements>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_deadline_seconds: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_commit: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<serde_json::Value>,
}

#[derive(Deserialize, Serialize, Clone, Default, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BuildSource {
    pub r#type: SourceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git: Option<GitBuildSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_dir: Option<String>,
    /// Inline Dockerfile, written over any Dockerfile found in the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dockerfile: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Default, Debug, PartialEq, Eq)]
pub enum SourceType {
    #[default]
    Git,
    Dockerfile,
    Binary,
    Image,
    None,
    #[serde(untagged)]
    Other(String),
}

#[derive(Deserialize, Serialize, Clone, Default, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GitBuildSource {
    pub uri: String,
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub r#ref: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Default, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BuildStrategy {
    pub r#type: StrategyType,
    // dockerStrategy, sourceStrategy, ... are carried through untouched
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Deserialize, Serialize, Clone, Default, Debug, PartialEq, Eq)]
pub enum StrategyType {
    #[default]
    Docker,
    Source,
    Custom,
    JenkinsPipeline,
    #[serde(untagged)]
    Other(String),
}

#[derive(Deserialize, Serialize, Clone, Default, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BuildOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<OutputReference>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Deserialize, Serialize, Clone, Default, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OutputReference {
    pub kind: OutputKind,
    pub name: String,
}

#[derive(Deserialize, Serialize, Clone, Default, Debug, PartialEq, Eq)]
pub enum OutputKind {
    #[default]
    DockerImage,
    ImageStreamTag,
    ImageStreamImage,
    #[serde(untagged)]
    Other(String),
}
