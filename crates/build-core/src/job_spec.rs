use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use k8s_openapi::api::batch::v1::{Job, JobSpec};
use k8s_openapi::api::core::v1::{
    Container, EnvVar, HostPathVolumeSource, PodSpec, PodTemplateSpec, ResourceRequirements,
    SecretVolumeSource, SecurityContext, Volume, VolumeMount,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use kube::api::ObjectMeta;

use crate::configs::ReconcilerConfig;
use crate::crds::{Build, CommonBuildSpec, OutputKind, SourceType, StrategyType};
use crate::error::BuildError;
use crate::formatters::format_target_image;
use crate::labels::LabelKeys;
use crate::log_parser::DIGEST_MARKER_PREFIX;

const CONTAINER_NAME: &str = "build";
const CACHE_VOLUME: &str = "containers";
const CACHE_MOUNT_PATH: &str = "/var/lib/containers";
const AUTH_VOLUME: &str = "auth";
const AUTH_MOUNT_PATH: &str = "/var/secret/registry";
const REGISTRY_AUTH_FILE: &str = "/var/secret/registry/.dockerconfigjson";
const BUD_STEP: &str = r#"buildah bud -t "$TARGET_IMAGE" ."#;
const PUSH_STEP: &str = r#"buildah push --digestfile digestfile -- "$TARGET_IMAGE""#;
const CPU: &str = "1000m";
const MEMORY: &str = "4Gi";

/// Push target for a build, validated against the output kind.
pub fn target_image(spec: &CommonBuildSpec, default_registry: &str) -> Result<String, BuildError> {
    let Some(to) = spec.output.to.as_ref() else {
        return Err(BuildError::UnsupportedSpec {
            field: "spec.output.to",
            value: "<none>".to_string(),
        });
    };

    match &to.kind {
        OutputKind::DockerImage => Ok(format_target_image(&to.name, default_registry)),
        OutputKind::ImageStreamTag | OutputKind::ImageStreamImage | OutputKind::Other(_) => {
            Err(BuildError::UnsupportedSpec {
                field: "spec.output.to.kind",
                value: to.kind.as_str().to_string(),
            })
        }
    }
}

/// The one build flavour this controller runs: git source, Docker strategy,
/// pushed to a DockerImage reference.
#[derive(Debug, PartialEq)]
pub struct DockerBuildPlan<'a> {
    pub git_uri: Option<&'a str>,
    pub git_ref: Option<&'a str>,
    pub context_dir: &'a str,
    pub dockerfile: Option<&'a str>,
    pub target_image: String,
}

impl<'a> DockerBuildPlan<'a> {
    pub fn from_spec(
        spec: &'a CommonBuildSpec,
        default_registry: &str,
    ) -> Result<Self, BuildError> {
        match &spec.source.r#type {
            SourceType::Git => {}
            other @ (SourceType::Dockerfile
            | SourceType::Binary
            | SourceType::Image
            | SourceType::None
            | SourceType::Other(_)) => {
                return Err(BuildError::UnsupportedSpec {
                    field: "spec.source.type",
                    value: other.as_str().to_string(),
                });
            }
        }

        match &spec.strategy.r#type {
            StrategyType::Docker => {}
            other @ (StrategyType::Source
            | StrategyType::Custom
            | StrategyType::JenkinsPipeline
            | StrategyType::Other(_)) => {
                return Err(BuildError::UnsupportedSpec {
                    field: "spec.strategy.type",
                    value: other.as_str().to_string(),
                });
            }
        }

        let target_image = target_image(spec, default_registry)?;
        let git = spec.source.git.as_ref();

        Ok(Self {
            git_uri: git.map(|g| g.uri.as_str()),
            git_ref: git.and_then(|g| g.r#ref.as_deref()),
            context_dir: spec.source.context_dir.as_deref().unwrap_or(""),
            dockerfile: spec.source.dockerfile.as_deref(),
            target_image,
        })
    }

    /// Shell script run by the build container. Ends by printing the digest marker.
    pub fn script(&self) -> String {
        let mut lines = Vec::new();

        match self.git_uri {
            Some(_) => {
                lines.push(r#"git clone -- "$SOURCE_CONTEXT" app"#.to_string());
                if self.git_ref.is_some() {
                    lines.push(r#"git -C app checkout "$SOURCE_REF""#.to_string());
                }
            }
            None => lines.push(r#"mkdir -p app/"$CONTEXT_DIR""#.to_string()),
        }

        lines.push(r#"cd app/"$CONTEXT_DIR""#.to_string());

        match self.dockerfile {
            Some(dockerfile) => lines.push(format!(
                r#"echo "{}" | base64 --decode > Dockerfile"#,
                STANDARD.encode(dockerfile)
            )),
            None => lines.push("# using dockerfile from repo".to_string()),
        }

        lines.push(BUD_STEP.to_string());
        lines.push(PUSH_STEP.to_string());
        lines.push(format!(r#"echo "{DIGEST_MARKER_PREFIX}$(cat digestfile)""#));

        let mut script = lines.join("\n");
        script.push('\n');
        script
    }

    fn env(&self) -> Vec<EnvVar> {
        let var = |name: &str, value: &str| EnvVar {
            name: name.to_string(),
            value: Some(value.to_string()),
            ..Default::default()
        };

        let mut env = vec![
            var("SOURCE_CONTEXT", self.git_uri.unwrap_or("")),
            var("CONTEXT_DIR", self.context_dir),
            var("TARGET_IMAGE", &self.target_image),
            var("REGISTRY_AUTH_FILE", REGISTRY_AUTH_FILE),
            var("BUILDAH_LAYERS", "true"),
        ];
        if let Some(git_ref) = self.git_ref {
            env.push(var("SOURCE_REF", git_ref));
        }

        env
    }
}

/// Batch job that executes `build`.
///
/// The job carries no owner reference to the Build; finished jobs are
/// collected through `ttlSecondsAfterFinished` instead. Failures are never
/// retried by the job controller (`backoffLimit: 0`, `restartPolicy: Never`).
pub fn build_job(build: &Build, cfg: &ReconcilerConfig) -> Result<Job, BuildError> {
    let plan = DockerBuildPlan::from_spec(&build.spec.common, &cfg.default_registry)?;
    let name = build
        .metadata
        .name
        .clone()
        .ok_or_else(|| BuildError::InvalidResource("Build has no metadata.name".to_string()))?;

    let mut labels = BTreeMap::new();
    labels.insert(LabelKeys::BUILD_NAME.to_string(), name.clone());
    if let Some(config_name) = build.config_name() {
        labels.insert(LabelKeys::CONFIG_NAME.to_string(), config_name.to_string());
    }

    let mut quantities = BTreeMap::new();
    quantities.insert("cpu".to_string(), Quantity(CPU.to_string()));
    quantities.insert("memory".to_string(), Quantity(MEMORY.to_string()));

    let container = Container {
        name: CONTAINER_NAME.to_string(),
        image: Some(cfg.builder_image.clone()),
        command: Some(vec!["bash".to_string(), "-euxc".to_string(), plan.script()]),
        env: Some(plan.env()),
        security_context: Some(SecurityContext {
            privileged: Some(true),
            ..Default::default()
        }),
        resources: Some(ResourceRequirements {
            requests: Some(quantities.clone()),
            limits: Some(quantities),
            ..Default::default()
        }),
        volume_mounts: Some(vec![
            VolumeMount {
                name: CACHE_VOLUME.to_string(),
                mount_path: CACHE_MOUNT_PATH.to_string(),
                ..Default::default()
            },
            VolumeMount {
                name: AUTH_VOLUME.to_string(),
                mount_path: AUTH_MOUNT_PATH.to_string(),
                read_only: Some(true),
                ..Default::default()
            },
        ]),
        ..Default::default()
    };

    let pod_spec = PodSpec {
        containers: vec![container],
        node_selector: build.spec.common.node_selector.clone(),
        service_account_name: build.spec.common.service_account.clone(),
        restart_policy: Some("Never".to_string()),
        volumes: Some(vec![
            Volume {
                name: CACHE_VOLUME.to_string(),
                host_path: Some(HostPathVolumeSource {
                    path: cfg.cache_host_path.clone(),
                    ..Default::default()
                }),
                ..Default::default()
            },
            Volume {
                name: AUTH_VOLUME.to_string(),
                secret: Some(SecretVolumeSource {
                    secret_name: Some(cfg.registry_secret.clone()),
                    ..Default::default()
                }),
                ..Default::default()
            },
        ]),
        ..Default::default()
    };

    Ok(Job {
        metadata: ObjectMeta {
            name: Some(name),
            namespace: Some(cfg.job_namespace.clone()),
            labels: Some(labels),
            ..Default::default()
        },
        spec: Some(JobSpec {
            ttl_seconds_after_finished: Some(cfg.job_ttl_secs),
            backoff_limit: Some(0),
            active_deadline_seconds: build.spec.common.completion_deadline_seconds,
            template: PodTemplateSpec {
                metadata: None,
                spec: Some(pod_spec),
            },
            ..Default::default()
        }),
        ..Default::default()
    })
}
