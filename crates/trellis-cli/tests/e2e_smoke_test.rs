use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::tempdir;

use trellis::style::OutputFormat;
use trellis_cli::{Args, CliError};

/// Collects all .toml manifests from a directory
fn collect_manifests(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("toml")
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

fn demos_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos")
}

fn args_for(manifest: &Path, output_dir: &Path) -> Args {
    Args {
        manifest: manifest.to_string_lossy().to_string(),
        output_dir: Some(output_dir.to_string_lossy().to_string()),
        formats: vec![OutputFormat::Dot],
        emit_only: false,
        config: None,
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let demos = collect_manifests(demos_dir());

    assert!(!demos.is_empty(), "No demo manifests found in demos/");

    let mut failed = Vec::new();

    for demo in &demos {
        let output_dir = temp_dir
            .path()
            .join(demo.file_stem().unwrap().to_string_lossy().as_ref());

        match trellis_cli::run(&args_for(demo, &output_dir)) {
            Ok(()) => {
                let written: Vec<PathBuf> = fs::read_dir(&output_dir)
                    .expect("output directory is created")
                    .flatten()
                    .map(|entry| entry.path())
                    .collect();
                assert_eq!(written.len(), 1, "{}: expected one artifact", demo.display());

                let description = fs::read_to_string(&written[0]).unwrap();
                assert!(
                    description.contains("digraph"),
                    "{}: artifact is not a DOT description",
                    demo.display()
                );
            }
            Err(e) => failed.push((demo.clone(), e)),
        }
    }

    if !failed.is_empty() {
        eprintln!("\nDemos that failed:");
        for (path, err) in &failed {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} demo(s) failed unexpectedly", failed.len());
    }

    println!("✅ All {} demos passed", demos.len());
}

#[test]
fn e2e_smoke_test_error_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let error_demos = collect_manifests(demos_dir().join("errors"));

    assert!(
        !error_demos.is_empty(),
        "No error manifests found in demos/errors/"
    );

    let mut unexpectedly_succeeded = Vec::new();

    for demo in &error_demos {
        if trellis_cli::run(&args_for(demo, temp_dir.path())).is_ok() {
            unexpectedly_succeeded.push(demo.clone());
        }
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError manifests that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error manifest(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }

    assert_eq!(
        fs::read_dir(temp_dir.path()).unwrap().count(),
        0,
        "failed runs must not leave artifacts behind"
    );
}

#[test]
fn e2e_document_translation_layout() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let manifest = demos_dir().join("document_translation.toml");

    trellis_cli::run(&args_for(&manifest, temp_dir.path())).expect("demo renders");

    let description = fs::read_to_string(temp_dir.path().join("overview.dot")).unwrap();
    let subgraphs = description
        .lines()
        .filter(|line| line.trim_start().starts_with("subgraph"))
        .count();
    let edges = description.lines().filter(|line| line.contains("->")).count();

    assert!(description.starts_with("digraph \"Overview\" {"));
    assert_eq!(subgraphs, 7);
    assert_eq!(edges, 20);
}

#[test]
fn e2e_manifest_errors_keep_source() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let manifest = demos_dir().join("errors").join("unknown_node.toml");

    let err = trellis_cli::run(&args_for(&manifest, temp_dir.path())).unwrap_err();

    match err {
        CliError::Manifest { error, src } => {
            assert_eq!(error.issues().len(), 1);
            assert!(src.contains("database"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn e2e_config_file_settings_survive_a_sparse_manifest() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let output_dir = temp_dir.path().join("out");

    let config = temp_dir.path().join("config.toml");
    fs::write(
        &config,
        format!(
            "[diagram]\ndirection = \"TB\"\nformats = [\"dot\"]\nstrict = true\noutput_dir = {:?}\n",
            output_dir.to_string_lossy()
        ),
    )
    .unwrap();

    let manifest = temp_dir.path().join("layered.toml");
    fs::write(
        &manifest,
        "[diagram]\ntitle = \"Layered\"\n\n[[nodes]]\nkey = \"a\"\nlabel = \"A\"\n",
    )
    .unwrap();

    let args = Args {
        manifest: manifest.to_string_lossy().to_string(),
        output_dir: None,
        formats: Vec::new(),
        emit_only: false,
        config: Some(config.to_string_lossy().to_string()),
        log_level: "off".to_string(),
    };
    trellis_cli::run(&args).expect("manifest renders");

    let description = fs::read_to_string(output_dir.join("layered.dot")).unwrap();
    assert!(description.starts_with("strict digraph \"Layered\" {"));
    assert!(description.contains("rankdir=\"TB\""));
}
