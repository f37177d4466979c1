//! Copy orchestration: enumerate pairs for a classified expression, then copy
//! them (`run`) or only predict and register them (`verify`).

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use mirrorkit_log::SinkReport;

use crate::classify::classify;
use crate::registry::{EnumKnownPathKind, RegistryPaths};
use crate::report::{ReportCopy, ReportCopyBuilder};
use crate::spec::{
    CopyError, EnumCopyFailureRule, EnumPathPattern, SpecClassification, SpecCopyPair,
    SpecRunConfig,
};
use crate::util::{
    as_dir_path, check_dir_path, compile_filter, copy_file_with_metadata,
    derive_destination_path, ends_with_separator, ensure_trailing_separator, filter_paths,
    is_same_file, scan, strip_extension_folder,
};

/// Where enumerated source files come from while planning.
#[derive(Clone, Copy)]
enum EnumPlanStage<'r> {
    /// Filesystem only; directory-shaped single-file targets may be created.
    Run { if_create_dirs: bool },
    /// Filesystem, falling back to outputs registered by earlier tasks.
    Verify { registry: &'r RegistryPaths },
}

/// Runs and verifies copy expressions under one [`SpecRunConfig`].
pub struct CopyOrchestrator<'a> {
    spec_cfg: SpecRunConfig,
    sink: &'a dyn SinkReport,
}

impl<'a> CopyOrchestrator<'a> {
    pub fn new(spec_cfg: SpecRunConfig, sink: &'a dyn SinkReport) -> Self {
        Self { spec_cfg, sink }
    }

    pub fn config(&self) -> &SpecRunConfig {
        &self.spec_cfg
    }

    /// Copy every file the expression pair resolves to.
    ///
    /// Returns [`CopyError::PathResolution`] before touching the filesystem
    /// when the source is unrecognized. Per-pair IO failures are recorded in
    /// the report and the run continues, unless the failure rule is
    /// [`EnumCopyFailureRule::Abort`]. Dry-run plans and reports but neither
    /// creates directories nor copies bytes.
    #[tracing::instrument(skip_all, fields(source = source_expr, destination = destination_expr))]
    pub fn run(&self, source_expr: &str, destination_expr: &str) -> Result<ReportCopy, CopyError> {
        self.sink.info("Executing 'copy' module...");
        self.sink.line("");
        self.sink.info("   Copying Files From...");
        self.sink.line(&format!(" - {source_expr}"));
        self.sink.line("");
        self.sink.info("   Saving To...");
        self.sink.line(&format!(" - {destination_expr}"));
        self.sink.line("");

        let spec_cls = classify(source_expr, destination_expr);
        let mut builder_cp_report = ReportCopyBuilder::new(spec_cls.mode());

        let enum_stage = EnumPlanStage::Run {
            if_create_dirs: !self.spec_cfg.if_dry_run,
        };
        let l_pairs = match plan_pairs(&spec_cls, enum_stage, &mut builder_cp_report) {
            Ok(v) => v,
            Err(e) => {
                self.sink.error(&e.to_string());
                return Err(e);
            }
        };

        if !matches!(spec_cls.pattern, EnumPathPattern::SingleFile { .. }) {
            self.sink
                .info(&format!("   Found {} files. Copying...", l_pairs.len()));
            self.sink.line("");
        }

        self.execute_pairs(&l_pairs, &mut builder_cp_report)?;
        if self.spec_cfg.if_verbose {
            self.sink.line("");
        }

        builder_cp_report.set_pairs(l_pairs);
        let report = builder_cp_report.build();
        tracing::info!(
            copied = report.cnt_copied,
            skipped = report.cnt_skipped,
            errors = report.error_count(),
            "copy finished"
        );
        Ok(report)
    }

    /// Pre-flight check: `true` when the expression resolves.
    ///
    /// Never copies bytes or creates directories. Every predicted destination
    /// is stored in `registry` for later tasks.
    pub fn verify(
        &self,
        source_expr: &str,
        destination_expr: &str,
        registry: &mut RegistryPaths,
    ) -> bool {
        self.verify_report(source_expr, destination_expr, registry)
            .is_ok()
    }

    /// Same as [`CopyOrchestrator::verify`], returning the predicted pairs and
    /// collision warnings.
    #[tracing::instrument(skip_all, fields(source = source_expr, destination = destination_expr))]
    pub fn verify_report(
        &self,
        source_expr: &str,
        destination_expr: &str,
        registry: &mut RegistryPaths,
    ) -> Result<ReportCopy, CopyError> {
        let spec_cls = classify(source_expr, destination_expr);
        let mut builder_cp_report = ReportCopyBuilder::new(spec_cls.mode());

        let (path_source, b_source_exists) = match &spec_cls.pattern {
            EnumPathPattern::SingleFile { file_source } => {
                let path_file = PathBuf::from(file_source);
                let b_exists = path_file.is_file();
                (path_file, b_exists)
            }
            EnumPathPattern::AllRecursive { dir_source } | EnumPathPattern::BaseOnly { dir_source } => {
                let path_dir = as_dir_path(dir_source);
                let b_exists = path_dir.is_dir() || registry.is_known(&path_dir);
                (path_dir, b_exists)
            }
            EnumPathPattern::Error => (PathBuf::new(), false),
        };
        if !b_source_exists {
            let err = CopyError::PathResolution {
                path_raw: spec_cls.path_source_raw.clone(),
            };
            self.sink.error(&err.to_string());
            return Err(err);
        }

        let l_pairs = match plan_pairs(
            &spec_cls,
            EnumPlanStage::Verify {
                registry: &*registry,
            },
            &mut builder_cp_report,
        ) {
            Ok(v) => v,
            Err(e) => {
                self.sink.error(&e.to_string());
                return Err(e);
            }
        };

        registry.store_path(path_source, EnumKnownPathKind::Source);
        for spec_pair in &l_pairs {
            if !registry.store_path(spec_pair.path_file_dst.clone(), EnumKnownPathKind::Output) {
                let c_warning = format!(
                    "Output already registered by an earlier task: {}",
                    self.spec_cfg.display_path(&spec_pair.path_file_dst)
                );
                tracing::warn!("{c_warning}");
                builder_cp_report.add_warning(c_warning);
            }
        }

        builder_cp_report.set_pairs(l_pairs);
        Ok(builder_cp_report.build())
    }

    fn execute_pairs(
        &self,
        l_pairs: &[SpecCopyPair],
        builder_cp_report: &mut ReportCopyBuilder,
    ) -> Result<(), CopyError> {
        for spec_pair in l_pairs {
            if self.spec_cfg.if_verbose {
                self.sink.line(&format!(
                    " - From: {}",
                    self.spec_cfg.display_path(&spec_pair.path_file_src)
                ));
                self.sink.line(&format!(
                    "   To:   {}",
                    self.spec_cfg.display_path(&spec_pair.path_file_dst)
                ));
                self.sink.line("");
            }

            if self.spec_cfg.if_dry_run {
                builder_cp_report.add_skipped();
                continue;
            }
            if is_same_file(&spec_pair.path_file_src, &spec_pair.path_file_dst) {
                let c_warning = format!(
                    "Source and destination are the same file, skipped: {}",
                    self.spec_cfg.display_path(&spec_pair.path_file_src)
                );
                tracing::warn!("{c_warning}");
                builder_cp_report.add_warning(c_warning);
                builder_cp_report.add_skipped();
                continue;
            }

            match copy_file_with_metadata(
                &spec_pair.path_file_src,
                &spec_pair.path_file_dst,
                self.spec_cfg.if_keep_metadata,
            ) {
                Ok(()) => builder_cp_report.add_copied(),
                Err(e) => match self.spec_cfg.rule_on_failure {
                    EnumCopyFailureRule::Continue => {
                        tracing::warn!(
                            source = %spec_pair.path_file_src.display(),
                            destination = %spec_pair.path_file_dst.display(),
                            error = %e,
                            "copy failed"
                        );
                        self.sink.error(&format!(
                            "Failed to copy {} ({e})",
                            self.spec_cfg.display_path(&spec_pair.path_file_src)
                        ));
                        builder_cp_report.add_error(spec_pair.path_file_dst.clone(), e.to_string());
                    }
                    EnumCopyFailureRule::Abort => {
                        self.sink.error(&format!(
                            "Failed to copy {} ({e})",
                            self.spec_cfg.display_path(&spec_pair.path_file_src)
                        ));
                        return Err(CopyError::Io {
                            path: spec_pair.path_file_dst.clone(),
                            source: e,
                        });
                    }
                },
            }
        }
        Ok(())
    }
}

/// Enumerate the (source, destination) pairs a classification stands for.
fn plan_pairs(
    spec_cls: &SpecClassification,
    enum_stage: EnumPlanStage<'_>,
    builder_cp_report: &mut ReportCopyBuilder,
) -> Result<Vec<SpecCopyPair>, CopyError> {
    let (dir_source, if_keep_tree) = match &spec_cls.pattern {
        EnumPathPattern::AllRecursive { dir_source } => (dir_source, true),
        EnumPathPattern::BaseOnly { dir_source } => (dir_source, false),
        EnumPathPattern::SingleFile { file_source } => {
            let spec_pair = plan_single_file(file_source, &spec_cls.path_destination, enum_stage)?;
            builder_cp_report.add_scanned(1);
            builder_cp_report.add_matched(1);
            tracing::debug!(
                source = %spec_pair.path_file_src.display(),
                destination = %spec_pair.path_file_dst.display(),
                "planned pair"
            );
            return Ok(vec![spec_pair]);
        }
        EnumPathPattern::Error => {
            return Err(CopyError::PathResolution {
                path_raw: spec_cls.path_source_raw.clone(),
            });
        }
    };

    let matcher = compile_filter(spec_cls.filter())?;
    let depth_limit = if if_keep_tree { None } else { Some(1) };
    let path_dir_src = as_dir_path(dir_source);
    let l_scanned = enumerate_files(&path_dir_src, depth_limit, enum_stage, builder_cp_report);
    builder_cp_report.add_scanned(l_scanned.len() as u64);

    let l_matched = filter_paths(l_scanned, matcher.as_ref());
    builder_cp_report.add_matched(l_matched.len() as u64);

    let c_dir_dst = ensure_trailing_separator(&spec_cls.path_destination);
    let path_dir_dst = Path::new(&c_dir_dst);
    let if_strip_ext_folder = if_keep_tree && spec_cls.if_remove_extension_folder();

    let l_pairs = l_matched
        .into_iter()
        .map(|path_file_src| {
            let mut path_file_dst =
                derive_destination_path(&path_file_src, &path_dir_src, path_dir_dst, if_keep_tree);
            if if_strip_ext_folder {
                path_file_dst = strip_extension_folder(&path_file_dst);
            }
            tracing::debug!(
                source = %path_file_src.display(),
                destination = %path_file_dst.display(),
                "planned pair"
            );
            SpecCopyPair {
                path_file_src,
                path_file_dst,
            }
        })
        .collect();
    Ok(l_pairs)
}

fn plan_single_file(
    file_source: &str,
    path_destination: &str,
    enum_stage: EnumPlanStage<'_>,
) -> Result<SpecCopyPair, CopyError> {
    let path_file_src = PathBuf::from(file_source);
    if !ends_with_separator(path_destination) {
        return Ok(SpecCopyPair {
            path_file_src,
            path_file_dst: PathBuf::from(path_destination),
        });
    }

    let if_create = match enum_stage {
        EnumPlanStage::Run { if_create_dirs } => if_create_dirs,
        EnumPlanStage::Verify { .. } => false,
    };
    let c_dir_dst =
        check_dir_path(path_destination, if_create).map_err(|e| CopyError::Io {
            path: PathBuf::from(path_destination),
            source: e,
        })?;
    let name_file = path_file_src.file_name().unwrap_or_default();
    let path_file_dst = Path::new(&c_dir_dst).join(name_file);
    Ok(SpecCopyPair {
        path_file_src,
        path_file_dst,
    })
}

fn enumerate_files(
    path_dir_src: &Path,
    depth_limit: Option<usize>,
    enum_stage: EnumPlanStage<'_>,
    builder_cp_report: &mut ReportCopyBuilder,
) -> Vec<PathBuf> {
    let EnumPlanStage::Verify { registry } = enum_stage else {
        return scan(path_dir_src, depth_limit, builder_cp_report);
    };
    let l_outputs = registry.outputs_under(path_dir_src, depth_limit);
    if !path_dir_src.is_dir() {
        return l_outputs;
    }

    // Files already on disk keep scan order; predicted outputs follow.
    let mut l_files = scan(path_dir_src, depth_limit, builder_cp_report);
    let set_seen: BTreeSet<PathBuf> = l_files.iter().cloned().collect();
    l_files.extend(l_outputs.into_iter().filter(|p| !set_seen.contains(p)));
    l_files
}
