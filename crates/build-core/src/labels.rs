/// Label and annotation keys that act as the controller's control plane.
pub struct LabelKeys;

impl LabelKeys {
    /// `"true"` on a BuildConfig requests an immediate new build.
    pub const TRIGGER_NOW: &'static str = "build.danopia.net/trigger-now";
    /// Logical image name of the owning config, carried by Builds and Jobs.
    pub const CONFIG_NAME: &'static str = "build.danopia.net/config.name";
    /// Mirrors the config's run policy onto the Build.
    pub const START_POLICY: &'static str = "build.danopia.net/start-policy";
    pub const BUILD_NAME: &'static str = "build.danopia.net/build.name";
    pub const BUILD_CONFIG: &'static str = "buildconfig";
    /// Label the job controller puts on every pod it creates.
    pub const JOB_NAME: &'static str = "job-name";
}

pub struct AnnotationKeys;

impl AnnotationKeys {
    pub const CONFIG_NAME: &'static str = "build.danopia.net/config.name";
    pub const NUMBER: &'static str = "build.danopia.net/number";
    pub const POD_NAME: &'static str = "build.danopia.net/pod-name";
}
