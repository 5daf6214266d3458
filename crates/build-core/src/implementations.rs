use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use kube::{Resource, ResourceExt};

use crate::crds::{
    Build, BuildConfig, BuildPhase, BuildSpec, BuildStatus, BuildTriggerCause, OutputKind,
    SourceType, StrategyType,
};
use crate::error::BuildError;
use crate::formatters::format_build_name;
use crate::labels::{AnnotationKeys, LabelKeys};

// -------------------------------------------------------------------------------
// ------------------------------ Phase & status ---------------------------------
// -------------------------------------------------------------------------------

impl BuildPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, BuildPhase::Complete | BuildPhase::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BuildPhase::New => "New",
            BuildPhase::Pending => "Pending",
            BuildPhase::Running => "Running",
            BuildPhase::Complete => "Complete",
            BuildPhase::Failed => "Failed",
        }
    }
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl BuildStatus {
    /// Status recorded right after the build's job has been created.
    pub fn pending(start_timestamp: Option<DateTime<Utc>>) -> Self {
        Self {
            phase: BuildPhase::Pending,
            start_timestamp,
            ..Default::default()
        }
    }
}

// -------------------------------------------------------------------------------
// ------------------------------- Spec variants ---------------------------------
// -------------------------------------------------------------------------------

impl SourceType {
    pub fn as_str(&self) -> &str {
        match self {
            SourceType::Git => "Git",
            SourceType::Dockerfile => "Dockerfile",
            SourceType::Binary => "Binary",
            SourceType::Image => "Image",
            SourceType::None => "None",
            SourceType::Other(value) => value,
        }
    }
}

impl StrategyType {
    pub fn as_str(&self) -> &str {
        match self {
            StrategyType::Docker => "Docker",
            StrategyType::Source => "Source",
            StrategyType::Custom => "Custom",
            StrategyType::JenkinsPipeline => "JenkinsPipeline",
            StrategyType::Other(value) => value,
        }
    }
}

impl OutputKind {
    pub fn as_str(&self) -> &str {
        match self {
            OutputKind::DockerImage => "DockerImage",
            OutputKind::ImageStreamTag => "ImageStreamTag",
            OutputKind::ImageStreamImage => "ImageStreamImage",
            OutputKind::Other(value) => value,
        }
    }
}

// -------------------------------------------------------------------------------
// ----------------------------------- Build -------------------------------------
// -------------------------------------------------------------------------------

impl Build {
    /// A build without status has not been started yet.
    pub fn phase(&self) -> BuildPhase {
        self.status.as_ref().map(|s| s.phase).unwrap_or_default()
    }

    /// Logical image name of the owning config.
    pub fn config_name(&self) -> Option<&str> {
        self.metadata
            .labels
            .as_ref()
            .and_then(|labels| labels.get(LabelKeys::CONFIG_NAME))
            .map(String::as_str)
    }
}

// -------------------------------------------------------------------------------
// -------------------------------- BuildConfig ----------------------------------
// -------------------------------------------------------------------------------

impl BuildConfig {
    pub fn last_version(&self) -> Option<i64> {
        self.status.as_ref().and_then(|s| s.last_version)
    }

    pub fn trigger_requested(&self) -> bool {
        self.labels()
            .get(LabelKeys::TRIGGER_NOW)
            .is_some_and(|value| value == "true")
    }

    /// Sequence number and cause of the build this config is asking for, if any.
    ///
    /// A config that has issued builds and carries no trigger label asks for
    /// nothing, which keeps repeated passes from duplicating builds.
    pub fn pending_build(&self) -> Option<(i64, BuildTriggerCause)> {
        match self.last_version() {
            None => Some((
                1,
                BuildTriggerCause {
                    message: "Build configuration created".to_string(),
                },
            )),
            Some(last) if self.trigger_requested() => Some((
                last + 1,
                BuildTriggerCause {
                    message: format!("Manually triggered via {}", LabelKeys::TRIGGER_NOW),
                },
            )),
            Some(_) => None,
        }
    }

    /// Child Build number `number`, owned by this config.
    pub fn new_build(&self, number: i64, cause: BuildTriggerCause) -> Result<Build, BuildError> {
        let config_name = self.metadata.name.clone().ok_or_else(|| {
            BuildError::InvalidResource("BuildConfig has no metadata.name".to_string())
        })?;
        let owner = self.controller_owner_ref(&()).ok_or_else(|| {
            BuildError::InvalidResource(format!("BuildConfig {config_name} has no uid"))
        })?;

        let mut labels = BTreeMap::new();
        labels.insert(LabelKeys::BUILD_CONFIG.to_string(), config_name.clone());
        labels.insert(LabelKeys::CONFIG_NAME.to_string(), config_name.clone());
        if let Some(run_policy) = &self.spec.run_policy {
            labels.insert(LabelKeys::START_POLICY.to_string(), run_policy.clone());
        }

        let mut annotations = BTreeMap::new();
        annotations.insert(AnnotationKeys::CONFIG_NAME.to_string(), config_name.clone());
        annotations.insert(AnnotationKeys::NUMBER.to_string(), number.to_string());

        let spec = BuildSpec {
            common: self.spec.common.clone(),
            triggered_by: vec![cause],
        };

        let mut build = Build::new(&format_build_name(&config_name, number), spec);
        build.metadata.namespace = self.metadata.namespace.clone();
        build.metadata.owner_references = Some(vec![owner]);
        build.metadata.labels = Some(labels);
        build.metadata.annotations = Some(annotations);

        Ok(build)
    }
}
