use assert_cmd::cargo::cargo_bin_cmd;
use serde::Deserialize;
use std::{error::Error, fs, path::PathBuf};

#[derive(Deserialize)]
struct DescriptorReport {
    hr: f64,
    qta: f64,
    pi: f64,
}

#[derive(Deserialize)]
struct ExpectedDescriptors {
    qta: f64,
    pi: f64,
}

#[derive(Deserialize)]
struct RangesOutput {
    lower: Row,
    baseline: Row,
    upper: Row,
}

#[derive(Deserialize)]
struct Row {
    hr: f64,
    pi: f64,
    qta: f64,
}

#[test]
fn descriptors_match_expected_snapshot() -> Result<(), Box<dyn Error>> {
    let test_data_dir = workspace_root().join("test_data");
    let recording = test_data_dir.join("frw_baseline.csv");
    let expected_path = test_data_dir.join("frw_baseline_expected.json");

    let expected: ExpectedDescriptors = serde_json::from_str(&fs::read_to_string(expected_path)?)?;

    let mut cmd = cargo_bin_cmd!("frw");
    cmd.args([
        "descriptors",
        "--input",
        recording.to_str().expect("utf8 path"),
    ]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let actual: DescriptorReport = serde_json::from_slice(&output)?;

    assert_eq!(actual.hr, 60.0);
    assert_close(actual.qta, expected.qta, 1e-9);
    assert_close(actual.pi, expected.pi, 1e-9);
    Ok(())
}

#[test]
fn descriptors_read_stdin_series() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("frw");
    cmd.arg("descriptors").write_stdin("1.0\n2.0\n3.0\n2.0\n");
    let output = cmd.assert().success().get_output().stdout.clone();
    let actual: DescriptorReport = serde_json::from_slice(&output)?;

    assert_close(actual.qta, 2.0, 1e-12);
    assert_close(actual.pi, 1.0, 1e-12);
    Ok(())
}

#[test]
fn ranges_reports_sample_config() -> Result<(), Box<dyn Error>> {
    let config = workspace_root().join("test_data/ranges_sample.toml");

    let mut cmd = cargo_bin_cmd!("frw");
    cmd.args(["ranges", "--config", config.to_str().expect("utf8 path")]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let ranges: RangesOutput = serde_json::from_slice(&output)?;

    assert_eq!(ranges.baseline.hr, 60.0);
    assert!(ranges.lower.qta <= ranges.baseline.qta);
    assert!(ranges.baseline.pi <= ranges.upper.pi);
    Ok(())
}

#[test]
fn simulate_feeds_descriptors_round_trip() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let generated = dir.path().join("synthetic.csv");

    let mut cmd = cargo_bin_cmd!("frw");
    cmd.args([
        "simulate",
        "--samples",
        "99",
        "--pi",
        "2.1",
        "--qta",
        "5.0",
        "--seed",
        "7",
        "--out",
        generated.to_str().expect("utf8 path"),
    ]);
    cmd.assert().success();

    let mut cmd = cargo_bin_cmd!("frw");
    cmd.args([
        "descriptors",
        "--input",
        generated.to_str().expect("utf8 path"),
    ]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let actual: DescriptorReport = serde_json::from_slice(&output)?;

    assert_close(actual.qta, 5.0, 1e-9);
    assert_close(actual.pi, 2.1, 1e-9);
    Ok(())
}

fn assert_close(a: f64, b: f64, tol: f64) {
    let diff = (a - b).abs();
    assert!(
        diff <= tol,
        "diff {} exceeded tol {} ({} vs {})",
        diff,
        tol,
        a,
        b
    );
}

fn workspace_root() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .expect("crates dir")
        .parent()
        .expect("workspace root")
        .to_path_buf()
}
