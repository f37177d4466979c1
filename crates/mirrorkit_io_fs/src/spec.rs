//! Copy value types, run configuration and top-level error types.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Copy mode decided by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumCopyMode {
    /// Every regular file under the source directory, tree mirrored.
    AllRecursive,
    /// Only regular files directly inside the source directory, flat copy.
    BaseOnly,
    /// One existing regular file.
    SingleFile,
    /// Source matched no recognized form.
    Error,
}

/// Side of a copy expression an option belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumPathSide {
    Source,
    Destination,
}

impl EnumPathSide {
    /// Namespace prefix used for dotted option keys.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Destination => "destination",
        }
    }
}

/// What to do when one copy pair fails with an IO error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumCopyFailureRule {
    /// Record the error, continue with the next pair.
    #[default]
    Continue,
    /// Stop the run and return the error.
    Abort,
}

/// Source pattern produced once by the classifier.
///
/// Normalized source paths keep the caller's spelling minus the mode marker,
/// e.g. `assets/**` becomes `AllRecursive { dir_source: "assets/" }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumPathPattern {
    AllRecursive { dir_source: String },
    BaseOnly { dir_source: String },
    SingleFile { file_source: String },
    Error,
}

impl EnumPathPattern {
    /// Mode tag of this pattern.
    pub fn mode(&self) -> EnumCopyMode {
        match self {
            Self::AllRecursive { .. } => EnumCopyMode::AllRecursive,
            Self::BaseOnly { .. } => EnumCopyMode::BaseOnly,
            Self::SingleFile { .. } => EnumCopyMode::SingleFile,
            Self::Error => EnumCopyMode::Error,
        }
    }

    /// Normalized source path; empty for [`EnumPathPattern::Error`].
    pub fn path_source(&self) -> &str {
        match self {
            Self::AllRecursive { dir_source } | Self::BaseOnly { dir_source } => dir_source,
            Self::SingleFile { file_source } => file_source,
            Self::Error => "",
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StructsAndErrors

/// Inline options parsed from one side of a copy expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecPathOptions {
    side: EnumPathSide,
    entries: BTreeMap<String, String>,
}

impl SpecPathOptions {
    pub fn new(side: EnumPathSide) -> Self {
        Self {
            side,
            entries: BTreeMap::new(),
        }
    }

    pub fn side(&self) -> EnumPathSide {
        self.side
    }

    /// Return a copy with `key` set to `value`.
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries as dotted keys, e.g. `source.filter`.
    pub fn to_dotted(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|(k, v)| (format!("{}.{k}", self.side.prefix()), v.clone()))
            .collect()
    }
}

/// Classifier output for one (source, destination) expression pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecClassification {
    /// Original source expression, kept for error reporting.
    pub path_source_raw: String,
    pub pattern: EnumPathPattern,
    /// Destination with options stripped; empty when the pattern is `Error`.
    pub path_destination: String,
    pub source_options: SpecPathOptions,
    pub destination_options: SpecPathOptions,
}

impl SpecClassification {
    pub fn mode(&self) -> EnumCopyMode {
        self.pattern.mode()
    }

    /// Look up an option by dotted key (`source.filter`,
    /// `destination.remove_extension_folder`).
    pub fn option(&self, key_dotted: &str) -> Option<&str> {
        let (c_side, key) = key_dotted.split_once('.')?;
        match c_side {
            "source" => self.source_options.get(key),
            "destination" => self.destination_options.get(key),
            _ => None,
        }
    }

    /// Extension filter, if any. Empty strings count as no filter.
    pub fn filter(&self) -> Option<&str> {
        self.source_options.get("filter").filter(|v| !v.is_empty())
    }

    pub fn if_remove_extension_folder(&self) -> bool {
        self.destination_options.has("remove_extension_folder")
    }
}

/// One concrete unit of copy work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecCopyPair {
    pub path_file_src: PathBuf,
    pub path_file_dst: PathBuf,
}

/// Immutable run configuration handed to the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct SpecRunConfig {
    /// Do not mutate the filesystem; report what would happen.
    pub if_dry_run: bool,
    /// Print one `From`/`To` block per copied pair.
    pub if_verbose: bool,
    /// Carry timestamps and extended attributes over to the copy.
    pub if_keep_metadata: bool,
    pub rule_on_failure: EnumCopyFailureRule,
    /// Prefix stripped from paths in console output.
    pub path_base: Option<PathBuf>,
}

impl SpecRunConfig {
    /// Render `path` for console output, stripping [`SpecRunConfig::path_base`].
    pub fn display_path(&self, path: &Path) -> String {
        match &self.path_base {
            Some(path_base) => path
                .strip_prefix(path_base)
                .unwrap_or(path)
                .display()
                .to_string(),
            None => path.display().to_string(),
        }
    }
}

/// One copy failure item with path + error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecCopyError {
    /// Failed source or destination path.
    pub path: PathBuf,
    /// User-facing error text.
    pub exception: String,
}

/// Failures that stop a run or a verification before or during copying.
#[derive(Debug, thiserror::Error)]
pub enum CopyError {
    /// The source is neither an existing file nor a recognized wildcard form.
    #[error("{path_raw} not found.")]
    PathResolution { path_raw: String },

    /// The filter could not be turned into a matcher.
    #[error("invalid filter `{filter}`: {message}")]
    InvalidFilter { filter: String, message: String },

    /// IO failure under [`EnumCopyFailureRule::Abort`].
    #[error("failed to copy to {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_options_dotted_keys_carry_side_prefix() {
        let spec_opts = SpecPathOptions::new(EnumPathSide::Destination)
            .with("remove_extension_folder", "true");
        let dict_dotted = spec_opts.to_dotted();
        assert_eq!(
            dict_dotted.get("destination.remove_extension_folder"),
            Some(&"true".to_string())
        );
    }

    #[test]
    fn classification_option_lookup_by_dotted_key() {
        let spec_cls = SpecClassification {
            path_source_raw: "a/**.js".to_string(),
            pattern: EnumPathPattern::AllRecursive {
                dir_source: "a/".to_string(),
            },
            path_destination: "out/".to_string(),
            source_options: SpecPathOptions::new(EnumPathSide::Source).with("filter", "js"),
            destination_options: SpecPathOptions::new(EnumPathSide::Destination),
        };
        assert_eq!(spec_cls.option("source.filter"), Some("js"));
        assert_eq!(spec_cls.option("destination.filter"), None);
        assert_eq!(spec_cls.option("filter"), None);
        assert_eq!(spec_cls.filter(), Some("js"));
        assert!(!spec_cls.if_remove_extension_folder());
    }

    #[test]
    fn display_path_strips_base() {
        let spec_cfg = SpecRunConfig {
            path_base: Some(PathBuf::from("/work/site")),
            ..SpecRunConfig::default()
        };
        assert_eq!(
            spec_cfg.display_path(Path::new("/work/site/dist/app.js")),
            "dist/app.js"
        );
        assert_eq!(spec_cfg.display_path(Path::new("/other/x")), "/other/x");
    }

    #[test]
    fn path_resolution_error_names_raw_path() {
        let err = CopyError::PathResolution {
            path_raw: "missing/file.txt".to_string(),
        };
        assert_eq!(err.to_string(), "missing/file.txt not found.");
    }
}
