//! Path classification: turn a raw (source, destination) expression pair into
//! a copy pattern plus per-side options.
//!
//! Source forms, first match wins:
//! - `dir/**`       every file below `dir`, tree mirrored
//! - `dir/*`, `dir/` files directly inside `dir`
//! - `dir/file.ext` one existing regular file
//!
//! A `*.ext` anywhere in the source becomes the `filter` option and the path is
//! cut right after that `*`, so `dir/**.js` and `dir/*.js` both carry a filter.

use std::path::Path;

use crate::spec::{EnumPathPattern, EnumPathSide, SpecClassification};
use crate::util::parse_options;

/// Classify a source/destination expression pair. Never fails: an
/// unrecognized source yields [`EnumPathPattern::Error`] with empty paths.
pub fn classify(source_expr: &str, destination_expr: &str) -> SpecClassification {
    let (mut path_source, mut source_options) = parse_options(source_expr, EnumPathSide::Source);
    let (path_destination, destination_options) =
        parse_options(destination_expr, EnumPathSide::Destination);

    if let Some(n_idx) = path_source.find("*.") {
        source_options = source_options.with("filter", &path_source[n_idx + 2..]);
        path_source.truncate(n_idx + 1);
    }

    let pattern = classify_source(&path_source);
    let path_destination = match pattern {
        EnumPathPattern::Error => String::new(),
        _ => path_destination,
    };
    tracing::debug!(
        source = source_expr,
        destination = %path_destination,
        mode = ?pattern.mode(),
        source_options = ?source_options.to_dotted(),
        destination_options = ?destination_options.to_dotted(),
        "classified copy expression"
    );

    SpecClassification {
        path_source_raw: source_expr.to_string(),
        pattern,
        path_destination,
        source_options,
        destination_options,
    }
}

fn classify_source(path_source: &str) -> EnumPathPattern {
    if let Some(dir_source) = path_source.strip_suffix("**") {
        return EnumPathPattern::AllRecursive {
            dir_source: dir_source.to_string(),
        };
    }
    if let Some(dir_source) = path_source
        .strip_suffix('*')
        .or_else(|| path_source.strip_suffix('/'))
    {
        return EnumPathPattern::BaseOnly {
            dir_source: dir_source.to_string(),
        };
    }
    if Path::new(path_source).is_file() {
        return EnumPathPattern::SingleFile {
            file_source: path_source.to_string(),
        };
    }
    EnumPathPattern::Error
}
