//! Manifest file model: `[settings]` plus a list of `[[copy]]` tasks.

use std::fs;
use std::path::{Path, PathBuf};

use mirrorkit_io_fs::{EnumCopyFailureRule, SpecRunConfig};
use serde::Deserialize;

use crate::error::ManifestError;

/// Failure rule as spelled in the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EnumManifestFailureRule {
    #[default]
    Continue,
    Abort,
}

impl From<EnumManifestFailureRule> for EnumCopyFailureRule {
    fn from(value: EnumManifestFailureRule) -> Self {
        match value {
            EnumManifestFailureRule::Continue => Self::Continue,
            EnumManifestFailureRule::Abort => Self::Abort,
        }
    }
}

/// `[settings]` table.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SpecManifestSettings {
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub keep_metadata: bool,
    #[serde(default)]
    pub on_failure: EnumManifestFailureRule,
    /// Directory task paths are relative to. Itself relative to the manifest.
    pub base_path: Option<PathBuf>,
}

/// One `[[copy]]` entry.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SpecCopyTask {
    pub source: String,
    pub destination: String,
}

/// Parsed manifest with task paths resolved against its root directory.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SpecManifest {
    #[serde(default)]
    pub settings: SpecManifestSettings,
    #[serde(default, rename = "copy")]
    pub tasks: Vec<SpecCopyTask>,
    #[serde(skip)]
    path_root: PathBuf,
}

impl SpecManifest {
    /// Parse manifest text. Relative task paths resolve against `path_root`.
    pub fn from_str_with_root(txt: &str, path_root: &Path) -> Result<Self, ManifestError> {
        let mut spec_manifest: SpecManifest = toml::from_str(txt)?;
        for (n_idx, spec_task) in spec_manifest.tasks.iter().enumerate() {
            if spec_task.source.trim().is_empty() {
                return Err(ManifestError::InvalidTask {
                    index: n_idx,
                    message: "`source` must not be empty".to_string(),
                });
            }
            if spec_task.destination.trim().is_empty() {
                return Err(ManifestError::InvalidTask {
                    index: n_idx,
                    message: "`destination` must not be empty".to_string(),
                });
            }
        }

        spec_manifest.path_root = match &spec_manifest.settings.base_path {
            Some(path_base) => path_root.join(path_base),
            None => path_root.to_path_buf(),
        };
        Ok(spec_manifest)
    }

    /// Read and parse a manifest file; its directory becomes the root.
    pub fn load(path_manifest: &Path) -> Result<Self, ManifestError> {
        let txt = fs::read_to_string(path_manifest).map_err(|e| ManifestError::Read {
            path: path_manifest.to_path_buf(),
            source: e,
        })?;
        let path_root = path_manifest
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        Self::from_str_with_root(&txt, path_root)
    }

    pub fn path_root(&self) -> &Path {
        &self.path_root
    }

    /// Task expressions with relative paths joined onto the root.
    ///
    /// Trailing markers and inline options survive the join untouched.
    pub fn resolved_tasks(&self) -> Vec<SpecCopyTask> {
        self.tasks
            .iter()
            .map(|spec_task| SpecCopyTask {
                source: resolve_expr(&self.path_root, &spec_task.source),
                destination: resolve_expr(&self.path_root, &spec_task.destination),
            })
            .collect()
    }

    /// Run configuration described by `[settings]`.
    pub fn to_run_config(&self) -> SpecRunConfig {
        SpecRunConfig {
            if_dry_run: self.settings.dry_run,
            if_verbose: self.settings.verbose,
            if_keep_metadata: self.settings.keep_metadata,
            rule_on_failure: self.settings.on_failure.into(),
            path_base: Some(self.path_root.clone()),
        }
    }
}

fn resolve_expr(path_root: &Path, expr: &str) -> String {
    if Path::new(expr).is_absolute() || path_root == Path::new(".") {
        return expr.to_string();
    }
    path_root.join(expr).to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use mirrorkit_io_fs::EnumCopyFailureRule;
    use tempfile::TempDir;

    use super::{EnumManifestFailureRule, SpecManifest};
    use crate::error::ManifestError;

    const C_MANIFEST: &str = r#"
[settings]
verbose = true
on_failure = "abort"

[[copy]]
source = "resources/js/**.js"
destination = "public/js/"

[[copy]]
source = "/abs/fonts/*"
destination = "public/fonts/?remove_extension_folder"
"#;

    #[test]
    fn parse_settings_and_tasks() {
        let spec_manifest =
            SpecManifest::from_str_with_root(C_MANIFEST, Path::new("/site")).expect("parse");
        assert!(spec_manifest.settings.verbose);
        assert!(!spec_manifest.settings.dry_run);
        assert_eq!(
            spec_manifest.settings.on_failure,
            EnumManifestFailureRule::Abort
        );
        assert_eq!(spec_manifest.tasks.len(), 2);

        let spec_cfg = spec_manifest.to_run_config();
        assert!(spec_cfg.if_verbose);
        assert_eq!(spec_cfg.rule_on_failure, EnumCopyFailureRule::Abort);
    }

    #[test]
    fn relative_paths_resolve_against_root() {
        let spec_manifest =
            SpecManifest::from_str_with_root(C_MANIFEST, Path::new("/site")).expect("parse");
        let l_tasks = spec_manifest.resolved_tasks();
        assert_eq!(l_tasks[0].source, "/site/resources/js/**.js");
        assert_eq!(l_tasks[0].destination, "/site/public/js/");
        assert_eq!(l_tasks[1].source, "/abs/fonts/*");
        assert_eq!(
            l_tasks[1].destination,
            "/site/public/fonts/?remove_extension_folder"
        );
    }

    #[test]
    fn base_path_setting_is_relative_to_manifest() {
        let txt = "[settings]\nbase_path = \"web\"\n\n[[copy]]\nsource = \"a/*\"\ndestination = \"b/\"\n";
        let spec_manifest =
            SpecManifest::from_str_with_root(txt, Path::new("/repo")).expect("parse");
        assert_eq!(spec_manifest.path_root(), Path::new("/repo/web"));
        assert_eq!(spec_manifest.resolved_tasks()[0].source, "/repo/web/a/*");
    }

    #[test]
    fn empty_manifest_has_no_tasks() {
        let spec_manifest =
            SpecManifest::from_str_with_root("", Path::new(".")).expect("parse");
        assert!(spec_manifest.tasks.is_empty());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = SpecManifest::from_str_with_root(
            "[[copy]]\nsource = \"a/*\"\ndestination = \"b/\"\nmode = \"x\"\n",
            Path::new("."),
        )
        .expect_err("must fail");
        assert!(matches!(err, ManifestError::Parse(_)));
    }

    #[test]
    fn empty_destination_is_rejected() {
        let err = SpecManifest::from_str_with_root(
            "[[copy]]\nsource = \"a/*\"\ndestination = \" \"\n",
            Path::new("."),
        )
        .expect_err("must fail");
        assert!(matches!(err, ManifestError::InvalidTask { index: 0, .. }));
    }

    #[test]
    fn load_reads_file_and_uses_its_directory() {
        let tmp = TempDir::new().expect("tempdir");
        let path_manifest = tmp.path().join("mirrorkit.toml");
        std::fs::write(
            &path_manifest,
            "[[copy]]\nsource = \"src/*\"\ndestination = \"dist/\"\n",
        )
        .expect("write manifest");

        let spec_manifest = SpecManifest::load(&path_manifest).expect("load");
        assert_eq!(spec_manifest.path_root(), tmp.path());

        let err = SpecManifest::load(&tmp.path().join("missing.toml")).expect_err("must fail");
        assert!(matches!(err, ManifestError::Read { .. }));
    }
}
