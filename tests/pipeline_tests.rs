//! End-to-end pipeline tests against a small Go module fixture.

use std::fs;
use std::path::Path;

use go_ext_cover::core::config::{ReportConfig, SourceConfig};
use go_ext_cover::core::pipeline::generate_report;
use go_ext_cover::{Coverage, CoverError};
use tempfile::TempDir;

const FIXTURE_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/greeter");

const GREETER_REPORT: &str = concat!(
    "{\n",
    "  \"lineMissed\": 5,\n",
    "  \"lineCovered\": 3,\n",
    "  \"methodMissed\": 3,\n",
    "  \"methodCovered\": 2\n",
    "}"
);

/// Copy the greeter module into a fresh directory
fn greeter_workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    for name in ["go.mod", "main.go", "coverage.out"] {
        fs::copy(Path::new(FIXTURE_DIR).join(name), dir.path().join(name)).unwrap();
    }
    dir
}

fn config_for(root: &Path) -> ReportConfig {
    ReportConfig {
        profile_path: root.join("coverage.out"),
        output_dir: Some(root.join("out")),
        source: SourceConfig {
            module_root: root.to_path_buf(),
            gopath: Some(Vec::new()),
            goroot: None,
            module_cache: None,
        },
        ..ReportConfig::default()
    }
}

#[test]
fn greeter_report_matches_expected_json() {
    let workspace = greeter_workspace();
    let config = config_for(workspace.path());

    let (results, output_path) = generate_report(&config).unwrap();

    assert_eq!(output_path, workspace.path().join("out/coverage.json"));
    assert_eq!(fs::read_to_string(&output_path).unwrap(), GREETER_REPORT);
    assert_eq!(
        results.coverage,
        Coverage {
            line_missed: 5,
            line_covered: 3,
            method_missed: 3,
            method_covered: 2,
        }
    );
}

#[test]
fn greeter_function_decisions() {
    let workspace = greeter_workspace();
    let (results, _) = generate_report(&config_for(workspace.path())).unwrap();

    let decisions: Vec<_> = results
        .functions
        .iter()
        .map(|f| (f.function_name(), f.start_line(), f.end_line(), f.is_covered()))
        .collect();
    assert_eq!(
        decisions,
        vec![
            ("init", 9, 11, true),
            ("main", 13, 20, false),
            ("getSomeField", 22, 25, true),
            ("setSomeFiled", 27, 31, false),
            ("someFunction", 33, 34, false),
        ]
    );

    let get_some_field = &results.functions[2];
    assert_eq!(get_some_field.covered_statements(), 2);
    assert_eq!(get_some_field.file_name(), workspace.path().join("main.go"));
}

#[test]
fn repeated_runs_are_byte_identical() {
    let workspace = greeter_workspace();
    let config = config_for(workspace.path());

    let (_, first_path) = generate_report(&config).unwrap();
    let first = fs::read(&first_path).unwrap();
    let (_, second_path) = generate_report(&config).unwrap();
    let second = fs::read(&second_path).unwrap();

    assert_eq!(first, second);
}

#[test]
fn sequential_run_matches_parallel_run() {
    let workspace = greeter_workspace();
    let mut config = config_for(workspace.path());

    let (parallel, _) = generate_report(&config).unwrap();
    config.parallel = false;
    let (sequential, _) = generate_report(&config).unwrap();

    assert_eq!(parallel.coverage, sequential.coverage);
    assert_eq!(parallel.functions, sequential.functions);
}

#[test]
fn unsorted_profile_gives_the_same_report() {
    let workspace = greeter_workspace();
    fs::write(
        workspace.path().join("coverage.out"),
        "mode: set\n\
         example.com/greeter/main.go:27.71,31.2 3 0\n\
         example.com/greeter/main.go:22.49,25.2 2 1\n\
         example.com/greeter/main.go:13.13,20.2 2 0\n\
         example.com/greeter/main.go:9.13,11.2 1 1\n",
    )
    .unwrap();

    let (_, output_path) = generate_report(&config_for(workspace.path())).unwrap();
    assert_eq!(fs::read_to_string(output_path).unwrap(), GREETER_REPORT);
}

#[test]
fn duplicate_blocks_from_concatenated_profiles_are_merged() {
    let workspace = greeter_workspace();
    fs::write(
        workspace.path().join("coverage.out"),
        "mode: count\n\
         example.com/greeter/main.go:9.13,11.2 1 0\n\
         example.com/greeter/main.go:13.13,20.2 2 0\n\
         mode: count\n\
         example.com/greeter/main.go:9.13,11.2 1 4\n\
         example.com/greeter/main.go:13.13,20.2 2 0\n",
    )
    .unwrap();

    let (results, _) = generate_report(&config_for(workspace.path())).unwrap();
    assert_eq!(results.coverage.line_covered, 1);
    assert_eq!(results.coverage.line_missed, 2);
    assert_eq!(results.coverage.method_covered, 1);
    assert_eq!(results.coverage.method_missed, 4);
}

#[test]
fn relative_file_names_resolve_against_module_root() {
    let workspace = greeter_workspace();
    fs::write(
        workspace.path().join("coverage.out"),
        "mode: atomic\n./main.go:22.49,25.2 2 7\n",
    )
    .unwrap();

    let (results, _) = generate_report(&config_for(workspace.path())).unwrap();
    assert_eq!(results.coverage.line_covered, 2);
    assert_eq!(results.coverage.method_covered, 1);
    assert_eq!(results.coverage.method_missed, 4);
}

#[test]
fn missing_source_file_fails_without_output() {
    let workspace = greeter_workspace();
    fs::remove_file(workspace.path().join("main.go")).unwrap();
    let config = config_for(workspace.path());

    let err = generate_report(&config).unwrap_err();
    match err {
        CoverError::SourceResolution {
            file_name,
            candidates,
        } => {
            assert_eq!(file_name, "example.com/greeter/main.go");
            assert_eq!(candidates[0], workspace.path().join("main.go"));
        }
        other => panic!("Expected SourceResolution, got {other:?}"),
    }
    assert!(!workspace.path().join("out").exists());
}

#[test]
fn invalid_go_source_fails_without_output() {
    let workspace = greeter_workspace();
    fs::write(workspace.path().join("main.go"), "package main\n\nfunc broken( {\n").unwrap();

    let err = generate_report(&config_for(workspace.path())).unwrap_err();
    assert!(matches!(err, CoverError::SourceParse { .. }), "{err:?}");
    assert!(!workspace.path().join("out").exists());
}

#[test]
fn malformed_profile_fails_before_matching() {
    let workspace = greeter_workspace();
    fs::write(
        workspace.path().join("coverage.out"),
        "mode: set\nexample.com/greeter/main.go:9.13,11.2 one 1\n",
    )
    .unwrap();

    match generate_report(&config_for(workspace.path())).unwrap_err() {
        CoverError::ProfileParse { line, .. } => assert_eq!(line, Some(2)),
        other => panic!("Expected ProfileParse, got {other:?}"),
    }
}

#[test]
fn missing_profile_is_io_error() {
    let workspace = greeter_workspace();
    let mut config = config_for(workspace.path());
    config.profile_path = workspace.path().join("absent.out");

    let err = generate_report(&config).unwrap_err();
    assert!(matches!(err, CoverError::Io { .. }));
}

#[test]
fn empty_profile_writes_zero_report() {
    let workspace = greeter_workspace();
    fs::write(workspace.path().join("coverage.out"), "mode: set\n").unwrap();

    let (results, output_path) = generate_report(&config_for(workspace.path())).unwrap();
    assert_eq!(results.coverage, Coverage::default());
    assert!(output_path.exists());
}
