//! `mirrorkit_manifest` v1:
//! copy pipelines described in TOML.
//!
//! - `conf`     : manifest model and loading
//! - `pipeline` : verify-all-then-run execution
//! - `error`    : manifest errors

pub mod conf;
pub mod error;
pub mod pipeline;

pub use conf::{EnumManifestFailureRule, SpecCopyTask, SpecManifest, SpecManifestSettings};
pub use error::ManifestError;
pub use pipeline::{ReportPipeline, ReportTask, run_pipeline, verify_pipeline};
