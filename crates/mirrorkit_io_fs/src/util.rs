use std::fs;
use std::io;
use std::path::{Path, PathBuf, is_separator};

use globset::{Glob, GlobMatcher};
use regex::Regex;
use walkdir::WalkDir;

use crate::report::ReportCopyBuilder;
use crate::spec::{CopyError, EnumPathSide, SpecPathOptions};

////////////////////////////////////////////////////////////////////////////////
// #region InlineOptions

/// Split `path?key=value&flag` into the bare path and its options.
///
/// A flag without `=` is stored as `"true"`. Empty segments are dropped.
pub(crate) fn parse_options(path_raw: &str, side: EnumPathSide) -> (String, SpecPathOptions) {
    let mut spec_opts = SpecPathOptions::new(side);
    let Some((c_path, c_query)) = path_raw.split_once('?') else {
        return (path_raw.to_string(), spec_opts);
    };

    for c_pair in c_query.split('&') {
        let c_pair = c_pair.trim();
        if c_pair.is_empty() {
            continue;
        }
        spec_opts = match c_pair.split_once('=') {
            Some((key, value)) => spec_opts.with(key.trim(), value.trim()),
            None => spec_opts.with(c_pair, "true"),
        };
    }
    (c_path.to_string(), spec_opts)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PathStrings

pub(crate) fn ends_with_separator(path: &str) -> bool {
    path.chars().last().is_some_and(is_separator)
}

pub(crate) fn ensure_trailing_separator(path: &str) -> String {
    if ends_with_separator(path) {
        return path.to_string();
    }
    format!("{path}/")
}

/// Directory a normalized source string refers to; empty means cwd.
pub(crate) fn as_dir_path(path: &str) -> PathBuf {
    if path.is_empty() {
        return PathBuf::from(".");
    }
    PathBuf::from(path)
}

/// Resolve a directory-shaped destination, creating it when asked.
///
/// Returns the path with a trailing separator so a file name can be appended.
pub(crate) fn check_dir_path(path_dir: &str, if_create: bool) -> Result<String, io::Error> {
    if if_create {
        fs::create_dir_all(as_dir_path(path_dir))?;
    }
    Ok(ensure_trailing_separator(path_dir))
}

/// Drop a trailing directory segment named like the file's extension:
/// `out/css/foo.css` becomes `out/foo.css`.
///
/// The match is a word-boundary regex anchored at the end of the parent
/// directory string, not a whole-segment comparison.
pub(crate) fn strip_extension_folder(path_dst: &Path) -> PathBuf {
    let (Some(c_ext), Some(name_file)) = (
        path_dst.extension().and_then(|v| v.to_str()),
        path_dst.file_name(),
    ) else {
        return path_dst.to_path_buf();
    };
    let c_dirname = path_dst
        .parent()
        .map(|v| v.to_string_lossy().to_string())
        .unwrap_or_default();

    let Ok(regex_ext) = Regex::new(&format!(r"\b{}$", regex::escape(c_ext))) else {
        return path_dst.to_path_buf();
    };
    let c_dirname_new = regex_ext.replace(&c_dirname, "");
    PathBuf::from(c_dirname_new.as_ref()).join(name_file)
}

/// Derive a destination path for an enumerated source file.
///
/// # Arguments
/// - `path_file_src`: Enumerated source file.
/// - `path_dir_src`: Normalized source directory the file was found under.
/// - `path_dir_dst`: Destination directory.
/// - `if_keep_tree`:
///   - `true`: Replace the `path_dir_src` prefix with `path_dir_dst`.
///   - `false`: Put the file name directly into `path_dir_dst`.
///
/// # Examples
/// ```ignore
/// let path_dst = derive_destination_path(
///     Path::new("src/vendor/lib.js"),
///     Path::new("src/"),
///     Path::new("dist/"),
///     true,
/// );
/// assert_eq!(path_dst, Path::new("dist/vendor/lib.js"));
/// ```
pub(crate) fn derive_destination_path(
    path_file_src: &Path,
    path_dir_src: &Path,
    path_dir_dst: &Path,
    if_keep_tree: bool,
) -> PathBuf {
    let path_name = Path::new(path_file_src.file_name().unwrap_or_default());
    if if_keep_tree {
        return path_dir_dst.join(path_file_src.strip_prefix(path_dir_src).unwrap_or(path_name));
    }
    path_dir_dst.join(path_name)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ScanAndFilter

/// List regular files under `path_dir`.
///
/// `depth_limit = Some(1)` lists direct children only. The root itself and
/// directories are never returned. Entries come back in file-name order per
/// directory. Unreadable entries become report warnings.
pub(crate) fn scan(
    path_dir: &Path,
    depth_limit: Option<usize>,
    builder_cp_report: &mut ReportCopyBuilder,
) -> Vec<PathBuf> {
    let mut walker = WalkDir::new(path_dir).min_depth(1).sort_by_file_name();
    if let Some(n_depth) = depth_limit {
        walker = walker.max_depth(n_depth);
    }

    let mut l_files = Vec::new();
    for _entry_res in walker {
        let entry = match _entry_res {
            Ok(v) => v,
            Err(e) => {
                builder_cp_report.add_warning(format!(
                    "Failed to read directory entry under {} ({e})",
                    path_dir.display()
                ));
                continue;
            }
        };

        let cfg_file_type = entry.file_type();
        if cfg_file_type.is_dir() {
            continue;
        }
        let b_is_regular =
            cfg_file_type.is_file() || (cfg_file_type.is_symlink() && entry.path().is_file());
        if b_is_regular {
            l_files.push(entry.into_path());
        } else if !(cfg_file_type.is_symlink() && entry.path().is_dir()) {
            builder_cp_report.add_warning(format!(
                "Special file skipped: {}",
                entry.path().display()
            ));
        }
    }
    l_files
}

/// Compile an extension filter into a `*.<filter>` file-name matcher.
pub(crate) fn compile_filter(filter: Option<&str>) -> Result<Option<GlobMatcher>, CopyError> {
    let Some(filter) = filter else {
        return Ok(None);
    };
    let matcher = Glob::new(&format!("*.{filter}"))
        .map_err(|e| CopyError::InvalidFilter {
            filter: filter.to_string(),
            message: e.to_string(),
        })?
        .compile_matcher();
    Ok(Some(matcher))
}

/// Keep paths whose file name matches the filter; no filter keeps everything.
pub(crate) fn filter_paths(l_paths: Vec<PathBuf>, matcher: Option<&GlobMatcher>) -> Vec<PathBuf> {
    let Some(matcher) = matcher else {
        return l_paths;
    };
    l_paths
        .into_iter()
        .filter(|p| p.file_name().is_some_and(|name| matcher.is_match(name)))
        .collect()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FileCopy

/// True when `path_file_dst` already exists and resolves to `path_file_src`.
///
/// Copying a file onto itself truncates it, so such pairs must never reach
/// [`copy_file_with_metadata`].
pub(crate) fn is_same_file(path_file_src: &Path, path_file_dst: &Path) -> bool {
    match (
        fs::canonicalize(path_file_src),
        fs::canonicalize(path_file_dst),
    ) {
        (Ok(path_src_resolved), Ok(path_dst_resolved)) => path_src_resolved == path_dst_resolved,
        _ => false,
    }
}

/// Create the destination's parent directories, then copy bytes.
///
/// Existing destination files are overwritten.
pub(crate) fn copy_file_with_metadata(
    path_file_src: &Path,
    path_file_dst: &Path,
    if_keep_metadata: bool,
) -> Result<(), io::Error> {
    if let Some(path_parent_dst) = path_file_dst.parent()
        && !path_parent_dst.as_os_str().is_empty()
    {
        fs::create_dir_all(path_parent_dst)?;
    }
    fs::copy(path_file_src, path_file_dst)?;
    if if_keep_metadata {
        apply_metadata(path_file_src, path_file_dst)?;
    }
    Ok(())
}

fn apply_metadata(path_file_src: &Path, path_file_dst: &Path) -> Result<(), io::Error> {
    use filetime::{FileTime, set_file_times};

    let stat_src = fs::metadata(path_file_src)?;
    let file_time_access = FileTime::from_last_access_time(&stat_src);
    let file_time_modify = FileTime::from_last_modification_time(&stat_src);
    set_file_times(path_file_dst, file_time_access, file_time_modify)?;

    #[cfg(target_os = "linux")]
    {
        copy_xattrs_linux(path_file_src, path_file_dst);
    }
    Ok(())
}

#[cfg(target_os = "linux")]
fn copy_xattrs_linux(path_file_src: &Path, path_file_dst: &Path) {
    let iter_xattr_names = match xattr::list(path_file_src) {
        Ok(v) => v,
        Err(_) => return,
    };

    for name in iter_xattr_names {
        let Some(raw_value) = xattr::get(path_file_src, &name).ok().flatten() else {
            continue;
        };
        let _ = xattr::set(path_file_dst, &name, &raw_value);
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
