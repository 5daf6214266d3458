use k8s_openapi::api::batch::v1::Job;

use crate::crds::BuildPhase;

/// Phase of a build given its job, checked in priority order:
/// succeeded, failed, active, otherwise still pending.
pub fn determine_build_phase(job: &Job) -> BuildPhase {
    let status = job.status.as_ref();
    let succeeded = status.and_then(|s| s.succeeded).unwrap_or(0);
    let failed = status.and_then(|s| s.failed).unwrap_or(0);
    let active = status.and_then(|s| s.active).unwrap_or(0);

    if succeeded > 0 {
        return BuildPhase::Complete;
    }

    if failed > 0 {
        return BuildPhase::Failed;
    }

    if active > 0 {
        return BuildPhase::Running;
    }

    BuildPhase::Pending
}
