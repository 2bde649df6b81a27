//! Integration tests for the CLI application
//!
//! These tests run the compiled binary against JSON datasets written to
//! temporary files.

use std::io::Write;
use std::process::{Command, Output};
use tempfile::{NamedTempFile, TempDir};

const DATASET: &str = r#"{
    "continuous": [[-1.0, -0.8, -1.2, 0.1, 0.0, -0.1, 1.0, 1.1, 0.9]],
    "nominal": [[1, 1, 2, 2, 1, 2, 3, 3, 1]],
    "response": [1.0, -0.5, 2.0, 1.0, -1.5, 0.7, 1.2, 0.4, -0.9],
    "probability": [1.0, 0.8, 0.5, 1.0, 0.9, 0.7, 1.0, 0.6, 1.0],
    "category": [1, 1, 1, 2, 2, 2, 5, 5, 5]
}"#;

fn dataset_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(".json").expect("Failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write dataset");
    file.flush().expect("Failed to flush");
    file
}

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rabc"))
        .args(args)
        .output()
        .expect("Failed to run CLI")
}

fn train(
    data: &NamedTempFile,
    output: &std::path::Path,
    iterations: &str,
    extra: &[&str],
) -> Output {
    let mut args = vec![
        "train",
        "--data",
        data.path().to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
        "--max-iterations",
        iterations,
        "--threads",
        "2",
    ];
    args.extend_from_slice(extra);
    run_cli(&args)
}

#[test]
fn test_cli_train_and_info() {
    let data = dataset_file(DATASET);
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let solution_path = temp_dir.path().join("solution.json");

    let output = train(&data, &solution_path, "50", &["--kernel", "POLY 1.0 2", "-c", "0.5"]);
    assert!(
        output.status.success(),
        "Train command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(solution_path.exists(), "Solution file was not created");

    let output = run_cli(&["info", solution_path.to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Kernel: POLY 1 2"));
    assert!(stdout.contains("Categories: [1, 2, 5]"));
    assert!(stdout.contains("Coefficients: 20"));
}

#[test]
fn test_cli_train_legacy_derivative() {
    let data = dataset_file(DATASET);
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let solution_path = temp_dir.path().join("solution.json");

    let output = train(&data, &solution_path, "2", &["--legacy-derivative"]);
    assert!(
        output.status.success(),
        "Train command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(solution_path.exists());
}

#[test]
fn test_cli_unsupported_kernel() {
    let data = dataset_file(DATASET);
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let solution_path = temp_dir.path().join("solution.json");

    let output = train(&data, &solution_path, "50", &["--kernel", "GAUSS 1.0"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unsupported kernel type"));
    assert!(!solution_path.exists());
}

#[test]
fn test_cli_invalid_dataset() {
    let data = dataset_file(r#"{"response": [1.0], "probability": [1.0, 1.0], "category": [0]}"#);
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let solution_path = temp_dir.path().join("solution.json");

    let output = train(&data, &solution_path, "50", &[]);
    assert!(!output.status.success());
    assert!(!solution_path.exists());
}

#[test]
fn test_cli_check_gradient() {
    let data = dataset_file(DATASET);
    let output = run_cli(&[
        "check-gradient",
        "--data",
        data.path().to_str().unwrap(),
        "--kernel",
        "RBF 0.7",
        "--seed",
        "7",
    ]);
    assert!(
        output.status.success(),
        "check-gradient failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Dimension: 20"));
    let error: f64 = stdout
        .lines()
        .find_map(|l| l.strip_prefix("Max relative gradient error: "))
        .expect("Missing error line")
        .trim()
        .parse()
        .expect("Error should be a number");
    assert!(error < 1e-4, "gradient error too large: {error}");
}

#[test]
fn test_cli_info_missing_file() {
    let output = run_cli(&["info", "/nonexistent/solution.json"]);
    assert!(!output.status.success());
}
