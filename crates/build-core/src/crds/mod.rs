pub mod application;
pub mod build;
pub mod build_config;

pub use application::{Application, ApplicationKustomize, ApplicationSource, ApplicationSpec};
pub use build::{
    Build, BuildCondition, BuildPhase, BuildSpec, BuildStatus, BuildStatusOutput,
    BuildStatusOutputTo, BuildTriggerCause, ConditionStatus, ConfigReference,
};
pub use build_config::{
    BuildConfig, BuildConfigSpec, BuildConfigStatus, BuildOutput, BuildSource, BuildStrategy,
    CommonBuildSpec, GitBuildSource, OutputKind, OutputReference, SourceType, StrategyType,
};
