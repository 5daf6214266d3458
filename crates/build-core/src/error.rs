use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    /// Source, strategy or output kind this controller does not implement.
    #[error("Unsupported build spec: {field} '{value}' is not implemented")]
    UnsupportedSpec { field: &'static str, value: String },

    #[error("Terminal pod for job {job} is missing")]
    MissingTerminalPod { job: String },

    #[error("Pod {pod} finished without a digest marker in its log")]
    MissingDigestMarker { pod: String },

    #[error("Invalid resource, {0}")]
    InvalidResource(String),
}
