//! Build status computation.
//!
//! Everything here is a pure function of the Build, its Job and (for terminal
//! phases) the terminal Pod and its log. The full status is rebuilt on every
//! call so `phase` and `conditions` can never drift apart.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::Pod;
use kube::ResourceExt;

use crate::crds::{
    Build, BuildCondition, BuildPhase, BuildStatus, BuildStatusOutput, BuildStatusOutputTo,
    ConditionStatus, ConfigReference,
};
use crate::determiners::determine_build_phase;
use crate::error::BuildError;
use crate::formatters::format_digest_reference;
use crate::job_spec::target_image;
use crate::log_parser::{extract_digest, log_snippet};
use crate::timestamps::{from_optional_k8s_time, rounded_duration_nanos};

type Transitions = [Option<DateTime<Utc>>; 4];

/// Status for `build` as observed through `job`, before any pod data is read.
pub fn compute_status(build: &Build, job: &Job) -> BuildStatus {
    let phase = determine_build_phase(job);
    let job_status = job.status.as_ref();
    let start_timestamp = from_optional_k8s_time(job_status.and_then(|s| s.start_time.as_ref()));
    let completion_timestamp =
        from_optional_k8s_time(job_status.and_then(|s| s.completion_time.as_ref()));

    let duration = match (start_timestamp, completion_timestamp) {
        (Some(start), Some(end)) => Some(rounded_duration_nanos(start, end)),
        _ => None,
    };

    let placeholder = from_optional_k8s_time(build.metadata.creation_timestamp.as_ref());
    let transitions = transition_times(phase, job, start_timestamp, completion_timestamp);

    BuildStatus {
        phase,
        config: config_reference(build),
        start_timestamp,
        completion_timestamp,
        duration,
        conditions: build_conditions(phase, &transitions, placeholder),
        ..Default::default()
    }
}

/// The four conditions, in fixed order, for a build in `phase`.
///
/// Slots before the current phase are `False` at the time they were left,
/// the current slot is `True`, and slots not reached yet are `False` at
/// `placeholder` (the build's creation time). The last slot is named after
/// the terminal phase, so a failed build reports `Failed` rather than
/// `Complete`.
pub fn build_conditions(
    phase: BuildPhase,
    transitions: &Transitions,
    placeholder: Option<DateTime<Utc>>,
) -> Vec<BuildCondition> {
    let current = phase_slot(phase);
    let terminal = match phase {
        BuildPhase::Failed => BuildPhase::Failed,
        _ => BuildPhase::Complete,
    };

    [
        BuildPhase::New,
        BuildPhase::Pending,
        BuildPhase::Running,
        terminal,
    ]
    .into_iter()
    .enumerate()
    .map(|(slot, r#type)| {
        let (status, time) = match slot.cmp(&current) {
            Ordering::Less => (ConditionStatus::False, transitions[slot]),
            Ordering::Equal => (ConditionStatus::True, transitions[slot]),
            Ordering::Greater => (ConditionStatus::False, placeholder),
        };

        BuildCondition {
            r#type,
            status,
            last_transition_time: time,
            last_update_time: time,
        }
    })
    .collect()
}

fn phase_slot(phase: BuildPhase) -> usize {
    match phase {
        BuildPhase::New => 0,
        BuildPhase::Pending => 1,
        BuildPhase::Running => 2,
        BuildPhase::Complete | BuildPhase::Failed => 3,
    }
}

/// Best known time each slot was entered or left, for a job in `phase`.
fn transition_times(
    phase: BuildPhase,
    job: &Job,
    started: Option<DateTime<Utc>>,
    completed: Option<DateTime<Utc>>,
) -> Transitions {
    let created = from_optional_k8s_time(job.metadata.creation_timestamp.as_ref());

    match phase {
        BuildPhase::New | BuildPhase::Pending => [created, started.or(created), None, None],
        BuildPhase::Running => [created, started, started, None],
        BuildPhase::Complete => [created, started, completed, completed],
        BuildPhase::Failed => {
            let failed = failure_time(job);
            [created, started, failed, failed]
        }
    }
}

/// When the job was marked failed: its `Failed` condition, else its first one.
fn failure_time(job: &Job) -> Option<DateTime<Utc>> {
    let conditions = job.status.as_ref()?.conditions.as_ref()?;
    let condition = conditions
        .iter()
        .find(|c| c.type_ == "Failed")
        .or_else(|| conditions.first())?;

    from_optional_k8s_time(condition.last_transition_time.as_ref())
}

fn config_reference(build: &Build) -> Option<ConfigReference> {
    let name = build.config_name().map(str::to_string).or_else(|| {
        build
            .owner_references()
            .iter()
            .find(|owner| owner.kind == "BuildConfig")
            .map(|owner| owner.name.clone())
    })?;

    Some(ConfigReference {
        kind: "BuildConfig".to_string(),
        name,
        namespace: build.namespace(),
    })
}

/// Adds the failure snippet and pod-measured duration to a `Failed` status.
pub fn record_failure(status: &mut BuildStatus, pod: &Pod, log: &str) {
    status.log_snippet = Some(log_snippet(log));

    let ready_at = pod
        .status
        .as_ref()
        .and_then(|s| s.conditions.as_ref())
        .and_then(|conditions| conditions.iter().find(|c| c.type_ == "Ready"))
        .and_then(|c| from_optional_k8s_time(c.last_transition_time.as_ref()));

    if let (Some(start), Some(end)) = (status.start_timestamp, ready_at) {
        status.duration = Some(rounded_duration_nanos(start, end));
    }
}

/// Adds the pushed digest and canonical image reference to a `Complete` status.
///
/// Returns the `registry/repo@digest` reference.
pub fn record_completion(
    status: &mut BuildStatus,
    build: &Build,
    pod_name: &str,
    log: &str,
    default_registry: &str,
) -> Result<String, BuildError> {
    let digest = extract_digest(log).ok_or_else(|| BuildError::MissingDigestMarker {
        pod: pod_name.to_string(),
    })?;
    let target = target_image(&build.spec.common, default_registry)?;
    let reference = format_digest_reference(&target, digest);

    status.output = Some(BuildStatusOutput {
        to: Some(BuildStatusOutputTo {
            image_digest: digest.to_string(),
        }),
    });
    status.output_docker_image_reference = Some(reference.clone());

    Ok(reference)
}
