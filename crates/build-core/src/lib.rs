pub mod configs;
pub mod crds;
pub mod determiners;
pub mod error;
pub mod formatters;
pub mod image_refs;
pub mod implementations;
pub mod job_spec;
pub mod labels;
pub mod log_parser;
pub mod status;
pub mod timestamps;

#[cfg(test)]
pub(crate) mod fixtures;
