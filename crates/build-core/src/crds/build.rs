use chrono::{DateTime, Utc};
use kube::CustomResource;
use serde::{Deserialize, Serialize};

use crate::crds::build_config::CommonBuildSpec;

// -----------------------------------------------------------------------------
// Build Resource (one attempt of a BuildConfig)
// -----------------------------------------------------------------------------
#[derive(CustomResource, Deserialize, Serialize, Clone, Default, Debug, PartialEq)]
#[kube(
    group = "build.danopia.net",
    version = "v1",
    kind = "Build",
    plural = "builds",
    namespaced,
    schema = "disabled",
    status = "BuildStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct BuildSpec {
    #[serde(flatten)]
    pub common: CommonBuildSpec,
    #[serde(default)]
    pub triggered_by: Vec<BuildTriggerCause>,
}

#[derive(Deserialize, Serialize, Clone, Default, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BuildTriggerCause {
    pub message: String,
}

#[derive(Deserialize, Serialize, Clone, Copy, Default, Debug, PartialEq, Eq)]
pub enum BuildPhase {
    #[default]
    New,
    Pending,
    Running,
    Complete,
    Failed,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConditionStatus {
    True,
    False,
}

/// Build status as persisted on the status subresource.
///
/// Always written whole: the conditions list and `phase` are recomputed
/// together on every pass.
#[derive(Deserialize, Serialize, Clone, Default, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BuildStatus {
    #[serde(default)]
    pub phase: BuildPhase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ConfigReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_timestamp: Option<DateTime<Utc>>,
    /// Nanoseconds, whole seconds only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<BuildCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<BuildStatusOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_docker_image_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_snippet: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Default, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigReference {
    pub kind: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BuildCondition {
    pub r#type: BuildPhase,
    pub status: ConditionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update_time: Option<DateTime<Utc>>,
}

#[derive(Deserialize, Serialize, Clone, Default, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BuildStatusOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<BuildStatusOutputTo>,
}

#[derive(Deserialize, Serialize, Clone, Default, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BuildStatusOutputTo {
    pub image_digest: String,
}
