use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use mirrorkit_io_fs::{
    CopyOrchestrator, EnumCopyMode, RegistryPaths, SpecCopyPair, SpecRunConfig, classify,
};
use mirrorkit_log::SinkNull;
use tempfile::TempDir;
use walkdir::WalkDir;

fn write_text(path: &Path, txt: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent");
    }
    std::fs::write(path, txt).expect("write text");
}

/// `src/app.js` and `src/vendor/lib.js` under a fresh temp root.
fn fixture_tree() -> TempDir {
    let tmp = TempDir::new().expect("tempdir");
    write_text(&tmp.path().join("src/app.js"), "console.log('app');");
    write_text(&tmp.path().join("src/vendor/lib.js"), "export {};");
    tmp
}

fn relative_pairs(l_pairs: &[SpecCopyPair], root: &Path) -> Vec<(PathBuf, PathBuf)> {
    l_pairs
        .iter()
        .map(|p| {
            (
                p.path_file_src.strip_prefix(root).expect("src").to_path_buf(),
                p.path_file_dst.strip_prefix(root).expect("dst").to_path_buf(),
            )
        })
        .collect()
}

fn snapshot_tree(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    WalkDir::new(root)
        .into_iter()
        .map(|entry| entry.expect("walk entry"))
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let bytes = std::fs::read(entry.path()).expect("read");
            let path_rel = entry.path().strip_prefix(root).expect("under root");
            (path_rel.to_path_buf(), bytes)
        })
        .collect()
}

#[test]
fn all_recursive_scenario_mirrors_subdirectories() {
    let tmp = fixture_tree();
    let root = tmp.path();
    let orchestrator = CopyOrchestrator::new(SpecRunConfig::default(), &SinkNull);

    let report = orchestrator
        .run(
            &format!("{}/src/**", root.display()),
            &format!("{}/dist/", root.display()),
        )
        .expect("run");

    assert_eq!(
        relative_pairs(&report.pairs, root),
        vec![
            (PathBuf::from("src/app.js"), PathBuf::from("dist/app.js")),
            (
                PathBuf::from("src/vendor/lib.js"),
                PathBuf::from("dist/vendor/lib.js")
            ),
        ]
    );
    assert!(root.join("dist/vendor/lib.js").is_file());
}

#[test]
fn base_only_scenario_copies_direct_children_only() {
    let tmp = fixture_tree();
    let root = tmp.path();
    let orchestrator = CopyOrchestrator::new(SpecRunConfig::default(), &SinkNull);

    let report = orchestrator
        .run(
            &format!("{}/src/*", root.display()),
            &format!("{}/dist/", root.display()),
        )
        .expect("run");

    assert_eq!(
        relative_pairs(&report.pairs, root),
        vec![(PathBuf::from("src/app.js"), PathBuf::from("dist/app.js"))]
    );
    assert!(!root.join("dist/vendor").exists());
}

#[test]
fn single_file_scenario_appends_basename_to_directory_target() {
    let tmp = fixture_tree();
    let root = tmp.path();
    let orchestrator = CopyOrchestrator::new(SpecRunConfig::default(), &SinkNull);

    let report = orchestrator
        .run(
            &format!("{}/src/app.js", root.display()),
            &format!("{}/dist/", root.display()),
        )
        .expect("run");

    assert_eq!(report.mode, EnumCopyMode::SingleFile);
    assert_eq!(
        relative_pairs(&report.pairs, root),
        vec![(PathBuf::from("src/app.js"), PathBuf::from("dist/app.js"))]
    );
}

#[test]
fn all_recursive_twice_is_byte_identical() {
    let tmp = fixture_tree();
    let root = tmp.path();
    let orchestrator = CopyOrchestrator::new(SpecRunConfig::default(), &SinkNull);
    let c_source = format!("{}/src/**", root.display());
    let c_destination = format!("{}/dist", root.display());

    orchestrator.run(&c_source, &c_destination).expect("first run");
    let dict_first = snapshot_tree(&root.join("dist"));
    orchestrator.run(&c_source, &c_destination).expect("second run");
    let dict_second = snapshot_tree(&root.join("dist"));

    assert_eq!(dict_first.len(), 2);
    assert_eq!(dict_first, dict_second);
}

#[test]
fn dry_run_leaves_no_trace_in_any_mode() {
    let tmp = fixture_tree();
    let root = tmp.path();
    let dict_before = snapshot_tree(root);
    let spec_cfg = SpecRunConfig {
        if_dry_run: true,
        ..SpecRunConfig::default()
    };
    let orchestrator = CopyOrchestrator::new(spec_cfg, &SinkNull);

    for (c_source, c_destination) in [
        ("src/**", "out_all/"),
        ("src/*", "out_base/"),
        ("src/app.js", "out_file/"),
        ("src/app.js", "out_verbatim/app.js"),
    ] {
        let report = orchestrator
            .run(
                &format!("{}/{c_source}", root.display()),
                &format!("{}/{c_destination}", root.display()),
            )
            .expect("dry run");
        assert_eq!(report.cnt_copied, 0);
        assert_eq!(report.cnt_skipped as usize, report.pairs.len());
    }

    assert_eq!(snapshot_tree(root), dict_before);
    assert_eq!(std::fs::read_dir(root).expect("read root").count(), 1);
}

#[test]
fn verify_then_run_produce_the_same_pairs() {
    let tmp = fixture_tree();
    let root = tmp.path();
    let orchestrator = CopyOrchestrator::new(SpecRunConfig::default(), &SinkNull);
    let c_source = format!("{}/src/**.js", root.display());
    let c_destination = format!("{}/dist/", root.display());

    let mut registry = RegistryPaths::new();
    let report_verify = orchestrator
        .verify_report(&c_source, &c_destination, &mut registry)
        .expect("verify");
    let report_run = orchestrator.run(&c_source, &c_destination).expect("run");

    assert_eq!(report_verify.pairs, report_run.pairs);
    for spec_pair in &report_run.pairs {
        assert!(spec_pair.path_file_dst.is_file());
    }
}

#[test]
fn classification_properties_hold_for_marker_suffixes() {
    for c_path in ["a/**", "a/b/**", "**"] {
        let spec_cls = classify(c_path, "d");
        assert_eq!(spec_cls.mode(), EnumCopyMode::AllRecursive);
        assert_eq!(spec_cls.pattern.path_source(), &c_path[..c_path.len() - 2]);
    }
    for c_path in ["a/*", "a/", "a/b/"] {
        assert_eq!(classify(c_path, "d").mode(), EnumCopyMode::BaseOnly);
    }
    let spec_cls = classify("definitely/not/here.txt", "d");
    assert_eq!(spec_cls.mode(), EnumCopyMode::Error);
    assert!(spec_cls.pattern.path_source().is_empty());
    assert!(spec_cls.path_destination.is_empty());
}
