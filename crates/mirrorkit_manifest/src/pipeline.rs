//! Verify every task of a manifest against one shared registry, then run them
//! in order. Nothing is copied unless every task verifies.

use std::fmt;

use mirrorkit_io_fs::{CopyError, CopyOrchestrator, RegistryPaths, ReportCopy, SpecRunConfig};
use mirrorkit_log::SinkReport;

use crate::conf::{SpecCopyTask, SpecManifest};

/// Outcome of one task run.
#[derive(Debug)]
pub struct ReportTask {
    /// Position in the manifest, zero-based.
    pub index: usize,
    /// Resolved task expressions.
    pub task: SpecCopyTask,
    pub outcome: Result<ReportCopy, CopyError>,
}

impl ReportTask {
    /// Failed pairs, or 1 when the task itself failed.
    pub fn failure_count(&self) -> usize {
        match &self.outcome {
            Ok(report) => report.error_count(),
            Err(_) => 1,
        }
    }
}

/// Outcome of a whole pipeline.
#[derive(Debug, Default)]
pub struct ReportPipeline {
    /// Indices of tasks that failed verification.
    pub l_unverified: Vec<usize>,
    /// One entry per task run; empty when verification failed.
    pub tasks: Vec<ReportTask>,
}

impl ReportPipeline {
    pub fn is_verified(&self) -> bool {
        self.l_unverified.is_empty()
    }

    /// Unverified tasks plus failed tasks and failed pairs.
    pub fn failure_count(&self) -> usize {
        self.l_unverified.len() + self.tasks.iter().map(ReportTask::failure_count).sum::<usize>()
    }

    pub fn is_success(&self) -> bool {
        self.failure_count() == 0
    }

    pub fn cnt_copied(&self) -> u64 {
        self.tasks
            .iter()
            .filter_map(|t| t.outcome.as_ref().ok())
            .map(|r| r.cnt_copied)
            .sum()
    }
}

impl fmt::Display for ReportPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[PIPELINE] tasks={} verified={} copied={} failures={}",
            self.tasks.len(),
            self.is_verified(),
            self.cnt_copied(),
            self.failure_count()
        )
    }
}

/// Verify all tasks in order; returns the indices that failed.
pub fn verify_pipeline(
    spec_manifest: &SpecManifest,
    spec_cfg: &SpecRunConfig,
    sink: &dyn SinkReport,
) -> Vec<usize> {
    let orchestrator = CopyOrchestrator::new(spec_cfg.clone(), sink);
    let mut registry = RegistryPaths::new();

    let mut l_unverified = Vec::new();
    for (n_idx, spec_task) in spec_manifest.resolved_tasks().iter().enumerate() {
        if !orchestrator.verify(&spec_task.source, &spec_task.destination, &mut registry) {
            tracing::warn!(task = n_idx, source = %spec_task.source, "task failed verification");
            l_unverified.push(n_idx);
        }
    }
    tracing::debug!(known_paths = registry.len(), "pipeline verified");
    l_unverified
}

/// Verify, then run every task. Task failures do not stop later tasks.
pub fn run_pipeline(
    spec_manifest: &SpecManifest,
    spec_cfg: &SpecRunConfig,
    sink: &dyn SinkReport,
) -> ReportPipeline {
    let l_unverified = verify_pipeline(spec_manifest, spec_cfg, sink);
    if !l_unverified.is_empty() {
        sink.error(&format!(
            "Verification failed for {} task(s); nothing was copied.",
            l_unverified.len()
        ));
        return ReportPipeline {
            l_unverified,
            tasks: Vec::new(),
        };
    }

    let orchestrator = CopyOrchestrator::new(spec_cfg.clone(), sink);
    let tasks = spec_manifest
        .resolved_tasks()
        .into_iter()
        .enumerate()
        .map(|(index, task)| {
            let outcome = orchestrator.run(&task.source, &task.destination);
            ReportTask {
                index,
                task,
                outcome,
            }
        })
        .collect();

    let report_pipeline = ReportPipeline {
        l_unverified,
        tasks,
    };
    tracing::info!("{report_pipeline}");
    report_pipeline
}
