//! `mirrorkit_io_fs` v1:
//! path-pattern classification and mirrored-copy engine.
//!
//! - `classify` : source/destination expression -> copy pattern + options
//! - `copy`     : pair enumeration, copy run and verification pass
//! - `registry` : known source/output paths across pipeline tasks
//! - `spec`     : enums/options/config/errors
//! - `report`   : run-time report model
//! - `util`     : shared helper functions

pub mod classify;
pub mod copy;
pub mod registry;
pub mod report;
pub mod spec;
mod util;

pub use classify::classify;
pub use copy::CopyOrchestrator;
pub use registry::{EnumKnownPathKind, RegistryPaths};
pub use report::{ReportCopy, ReportCopyBuilder};
pub use spec::{
    CopyError, EnumCopyFailureRule, EnumCopyMode, EnumPathPattern, EnumPathSide,
    SpecClassification, SpecCopyError, SpecCopyPair, SpecPathOptions, SpecRunConfig,
};
