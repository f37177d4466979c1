//! Known-path bookkeeping shared by the verification pass of a whole pipeline.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Why a path was registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumKnownPathKind {
    /// Read by some task.
    Source,
    /// Produced by some task.
    Output,
}

/// Paths that verified tasks read or will produce.
///
/// Lets a later task use an earlier task's output as its source before that
/// output exists on disk, and flags two tasks writing the same file.
#[derive(Debug, Default, Clone)]
pub struct RegistryPaths {
    dict_paths: BTreeMap<PathBuf, EnumKnownPathKind>,
}

impl RegistryPaths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `path`. Returns `false` when an output is registered twice.
    ///
    /// An output always wins over a source entry for the same path.
    pub fn store_path(&mut self, path: impl Into<PathBuf>, kind: EnumKnownPathKind) -> bool {
        let path = path.into();
        match (self.dict_paths.get(&path).copied(), kind) {
            (Some(EnumKnownPathKind::Output), EnumKnownPathKind::Output) => false,
            (Some(EnumKnownPathKind::Output), EnumKnownPathKind::Source) => true,
            _ => {
                self.dict_paths.insert(path, kind);
                true
            }
        }
    }

    pub fn kind_of(&self, path: &Path) -> Option<EnumKnownPathKind> {
        self.dict_paths.get(path).copied()
    }

    /// True if `path` is registered, or some registered output lives below it.
    pub fn is_known(&self, path: &Path) -> bool {
        self.kind_of(path).is_some()
            || self
                .iter_outputs()
                .any(|p| p != path && p.starts_with(path))
    }

    /// Registered outputs strictly below `path_dir`.
    ///
    /// `depth_limit = Some(1)` keeps direct children only.
    pub fn outputs_under(&self, path_dir: &Path, depth_limit: Option<usize>) -> Vec<PathBuf> {
        self.iter_outputs()
            .filter_map(|p| {
                let path_rel = p.strip_prefix(path_dir).ok()?;
                let n_depth = path_rel.components().count();
                if n_depth == 0 || depth_limit.is_some_and(|n| n_depth > n) {
                    return None;
                }
                Some(p.to_path_buf())
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.dict_paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dict_paths.is_empty()
    }

    fn iter_outputs(&self) -> impl Iterator<Item = &Path> {
        self.dict_paths
            .iter()
            .filter(|(_, kind)| **kind == EnumKnownPathKind::Output)
            .map(|(p, _)| p.as_path())
    }
}
