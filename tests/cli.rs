use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

mod common;

use common::YoloFixture;

fn yolo2coco() -> Command {
    let mut cmd = Command::cargo_bin("yolo2coco").unwrap();
    for var in [
        "GCS_DATA_PATH",
        "GCS_ACCESS_TOKEN",
        "GCP_PROJECT",
        "WANDB_API_KEY",
        "GOOGLE_OAUTH_ACCESS_TOKEN",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn fixture_with_images(root: &Path, count: usize) -> YoloFixture {
    let fixture = YoloFixture::new(root, &["person", "car"]);
    for i in 0..count {
        fixture.add_image(&format!("img{i:02}"), 64, 48, Some("0 0.5 0.5 0.25 0.25\n"));
    }
    fixture
}

fn convert_args(fixture: &YoloFixture, output: &Path) -> Vec<String> {
    vec![
        "convert".to_string(),
        "--images-dir".to_string(),
        fixture.images_dir().display().to_string(),
        "--labels-dir".to_string(),
        fixture.labels_dir().display().to_string(),
        "--label-list".to_string(),
        fixture.label_list().display().to_string(),
        "--output-dir".to_string(),
        output.display().to_string(),
        "--no-progress".to_string(),
    ]
}

#[test]
fn runs() {
    let mut cmd = yolo2coco();
    cmd.assert().success();
}

#[test]
fn outputs_tool_name() {
    let mut cmd = yolo2coco();
    cmd.arg("-V");
    cmd.assert().success().stdout("yolo2coco 0.1.0\n");
}

// Convert subcommand tests

#[test]
fn convert_writes_both_splits_and_text_report() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let fixture = fixture_with_images(&temp.path().join("yolo"), 10);
    let output = temp.path().join("coco");

    let mut cmd = yolo2coco();
    cmd.args(convert_args(&fixture, &output));
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Converted 10 image(s) with 2 class(es)"))
        .stdout(predicate::str::contains("train: 9 images, 9 annotations (0 dropped)"))
        .stdout(predicate::str::contains("val: 1 images, 1 annotations (0 dropped)"));

    assert!(output.join("train/annotations/instances_train.json").is_file());
    assert!(output.join("val/annotations/instances_val.json").is_file());
    assert_eq!(
        fs::read_dir(output.join("train/images")).expect("train images").count(),
        9
    );
}

#[test]
fn convert_json_report_is_machine_readable() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let fixture = fixture_with_images(&temp.path().join("yolo"), 4);
    let output = temp.path().join("coco");

    let mut cmd = yolo2coco();
    cmd.args(convert_args(&fixture, &output))
        .args(["--report", "json", "--train-ratio", "0.5", "--seed", "7"]);
    let assert = cmd.assert().success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    let report: serde_json::Value = serde_json::from_str(&stdout).expect("report json");
    assert_eq!(report["discovered_images"], 4);
    assert_eq!(report["splits"][0]["split"], "train");
    assert_eq!(report["splits"][0]["images"], 2);
    assert_eq!(report["splits"][1]["images"], 2);
    assert_eq!(report["classes"], serde_json::json!(["person", "car"]));
}

#[test]
fn convert_reports_dropped_annotations() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let fixture = YoloFixture::new(&temp.path().join("yolo"), &["only"]);
    fixture.add_image("a", 10, 10, Some("0 0.5 0.5 0.5 0.5\n1 0.5 0.5 0.5 0.5\n"));
    let output = temp.path().join("coco");

    let mut cmd = yolo2coco();
    cmd.args(convert_args(&fixture, &output));
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("(1 dropped)"))
        .stdout(predicate::str::contains("Warnings (1):"))
        .stdout(predicate::str::contains("invalid class_id 1"));
}

#[test]
fn convert_rejects_bad_ratio() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let fixture = fixture_with_images(&temp.path().join("yolo"), 2);
    let output = temp.path().join("coco");

    let mut cmd = yolo2coco();
    cmd.args(convert_args(&fixture, &output))
        .args(["--train-ratio", "1.5"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Error: Invalid train ratio 1.5"));
    assert!(!output.exists());
}

#[test]
fn convert_fails_on_missing_label_list() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let fixture = fixture_with_images(&temp.path().join("yolo"), 2);
    fs::remove_file(fixture.label_list()).expect("remove classes");

    let mut cmd = yolo2coco();
    cmd.args(convert_args(&fixture, &temp.path().join("coco")));
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("cannot read class list"));
}

#[test]
fn convert_requires_all_directories() {
    let mut cmd = yolo2coco();
    cmd.args(["convert", "--images-dir", "images"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--labels-dir"));
}

// Download subcommand tests

#[test]
fn download_without_locator_is_skipped() {
    let temp = tempfile::tempdir().expect("create temp dir");

    let mut cmd = yolo2coco();
    cmd.current_dir(temp.path()).arg("download");
    cmd.assert().success();
    assert!(!temp.path().join("data").exists());
}

#[test]
fn download_mirrors_a_file_locator() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let source = temp.path().join("bucket/dataset");
    fs::create_dir_all(source.join("images")).expect("create source");
    fs::write(source.join("images/a.jpg"), b"jpeg").expect("write a");
    fs::write(source.join("classes.txt"), b"cat\n").expect("write classes");

    let source_str = source.display().to_string();
    let locator = format!("file://{}/*", source_str.trim_start_matches('/'));
    let dest = temp.path().join("mirror");

    let mut cmd = yolo2coco();
    cmd.args(["download", &locator, "--no-progress", "--max-workers", "2", "--dest"])
        .arg(&dest);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Downloaded: 2"));

    assert_eq!(fs::read(dest.join("images/a.jpg")).expect("read a"), b"jpeg");
    assert!(dest.join("classes.txt").is_file());
}

#[test]
fn download_reads_locator_from_env() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let source = temp.path().join("bucket");
    fs::create_dir_all(&source).expect("create source");
    fs::write(source.join("x.txt"), b"x").expect("write x");

    let locator = format!("file://{}", source.display().to_string().trim_start_matches('/'));
    let dest = temp.path().join("out");

    let mut cmd = yolo2coco();
    cmd.env("GCS_DATA_PATH", &locator)
        .args(["download", "--no-progress", "--dest"])
        .arg(&dest);
    cmd.assert().success();
    assert!(dest.join("x.txt").is_file());
}

#[test]
fn download_rejects_unknown_scheme() {
    let mut cmd = yolo2coco();
    cmd.args(["download", "s3://bucket/prefix"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported storage scheme 's3'"));
}

#[test]
fn download_rejects_malformed_locator() {
    let mut cmd = yolo2coco();
    cmd.args(["download", "just-a-bucket"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid storage locator"));
}

// Submit subcommand tests

fn write_job_config(dir: &Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("vertex.yaml");
    fs::write(&path, body).expect("write job config");
    path
}

const JOB_CONFIG: &str = r#"
project_id: demo-project
container_image_uri: us-docker.pkg.dev/demo/train/dfine:latest
labels:
  team: vision
args: ["-c", "configs/dfine/dfine_hgnetv2_s_coco.yml"]
gcs_data_path: gs://demo-bucket/coco
"#;

#[test]
fn submit_dry_run_prints_request() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let config = write_job_config(temp.path(), JOB_CONFIG);

    let mut cmd = yolo2coco();
    cmd.args(["submit", "--dry-run", "--epochs", "5", "--test-only", "--config"])
        .arg(&config);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"displayName\": \"dfine-training\""))
        .stdout(predicate::str::contains("\"imageUri\": \"us-docker.pkg.dev/demo/train/dfine:latest\""))
        .stdout(predicate::str::contains("\"epochs=5\""))
        .stdout(predicate::str::contains("\"GCS_DATA_PATH\""))
        .stdout(predicate::str::contains(
            "Training args: -c configs/dfine/dfine_hgnetv2_s_coco.yml --update epochs=5 --test-only",
        ))
        .stdout(predicate::str::contains("Dry run: job not submitted"))
        .stdout(predicate::str::contains("custom-jobs?project=demo-project"));
}

#[test]
fn submit_env_overrides_project() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let config = write_job_config(temp.path(), JOB_CONFIG);

    let mut cmd = yolo2coco();
    cmd.env("GCP_PROJECT", "other-project")
        .env("WANDB_API_KEY", "wandb-secret")
        .args(["submit", "--dry-run", "--config"])
        .arg(&config);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("projects/other-project/locations/us-central1"))
        .stdout(predicate::str::contains("\"WANDB_API_KEY\""));
}

#[test]
fn submit_requires_container_image() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let config = write_job_config(temp.path(), "project_id: demo\n");

    let mut cmd = yolo2coco();
    cmd.args(["submit", "--dry-run", "--config"]).arg(&config);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("container_image_uri is not set"));
}

#[test]
fn submit_without_token_fails_before_network() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let config = write_job_config(temp.path(), JOB_CONFIG);

    let mut cmd = yolo2coco();
    cmd.args(["submit", "--config"]).arg(&config);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("no access token"));
}

#[test]
fn submit_rejects_zero_epochs() {
    let mut cmd = yolo2coco();
    cmd.args(["submit", "--dry-run", "--epochs", "0"]);
    cmd.assert().failure();
}
