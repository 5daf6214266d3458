use chrono::{DateTime, Utc};
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::Pod;
use serde_json::{Value, json};

use crate::crds::{Build, BuildConfig, BuildStatus};

pub const BUILD_CREATED: &str = "2024-05-01T11:59:59Z";
pub const JOB_CREATED: &str = "2024-05-01T12:00:00Z";
pub const JOB_STARTED: &str = "2024-05-01T12:00:01Z";
pub const JOB_FINISHED: &str = "2024-05-01T12:00:56.400Z";

pub fn at(timestamp: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(timestamp)
        .unwrap()
        .with_timezone(&Utc)
}

fn common_spec() -> Value {
    json!({
        "source": { "type": "Git", "git": { "uri": "https://github.com/example/myapp" } },
        "strategy": { "type": "Docker" },
        "output": { "to": { "kind": "DockerImage", "name": "myapp" } },
    })
}

pub fn build_config(name: &str, last_version: Option<i64>, trigger: bool) -> BuildConfig {
    let mut spec = common_spec();
    spec["runPolicy"] = json!("Serial");

    let mut config = json!({
        "apiVersion": "build.danopia.net/v1",
        "kind": "BuildConfig",
        "metadata": {
            "name": name,
            "namespace": "apps",
            "uid": format!("uid-{name}"),
            "labels": {},
        },
        "spec": spec,
    });
    if trigger {
        config["metadata"]["labels"]["build.danopia.net/trigger-now"] = json!("true");
    }
    if let Some(last_version) = last_version {
        config["status"] = json!({ "lastVersion": last_version });
    }

    serde_json::from_value(config).unwrap()
}

pub fn build(name: &str, status: Option<BuildStatus>) -> Build {
    let mut spec = common_spec();
    spec["triggeredBy"] = json!([{ "message": "Build configuration created" }]);

    let mut build: Build = serde_json::from_value(json!({
        "apiVersion": "build.danopia.net/v1",
        "kind": "Build",
        "metadata": {
            "name": name,
            "namespace": "apps",
            "uid": format!("uid-{name}"),
            "creationTimestamp": BUILD_CREATED,
            "labels": {
                "buildconfig": "cfgname",
                "build.danopia.net/config.name": "cfgname",
            },
            "ownerReferences": [{
                "apiVersion": "build.danopia.net/v1",
                "kind": "BuildConfig",
                "name": "cfgname",
                "uid": "uid-cfgname",
                "controller": true,
            }],
        },
        "spec": spec,
    }))
    .unwrap();
    build.status = status;
    build
}

pub fn job(status: Value) -> Job {
    serde_json::from_value(json!({
        "apiVersion": "batch/v1",
        "kind": "Job",
        "metadata": {
            "name": "cfgname-h1",
            "namespace": "image-builds",
            "creationTimestamp": JOB_CREATED,
        },
        "spec": { "template": {} },
        "status": status,
    }))
    .unwrap()
}

pub fn pod(name: &str, phase: &str, ready_at: Option<&str>) -> Pod {
    let conditions = match ready_at {
        Some(time) => json!([{ "type": "Ready", "status": "False", "lastTransitionTime": time }]),
        None => json!([]),
    };

    serde_json::from_value(json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": {
            "name": name,
            "namespace": "image-builds",
            "labels": { "job-name": "cfgname-h1" },
        },
        "status": { "phase": phase, "conditions": conditions },
    }))
    .unwrap()
}
