mod fixtures;

use fixtures::*;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::process::Command;
use tempfile::tempdir;

#[test]
fn it_dumps_scene_to_stdout() {
    let sample = workshop_sample();

    let mut cmd = Command::new(assert_cmd::cargo_bin!("scene_dump"));
    cmd.arg(sample.to_str().unwrap());

    let output = cmd.output().unwrap();
    assert!(output.status.success());

    let json = parse_document(&String::from_utf8(output.stdout).unwrap());
    assert_eq!(json["name"], "Workshop");
    assert_eq!(json["objects"].as_array().unwrap().len(), 7);
}

#[test]
fn it_respects_file_output() {
    let d = tempdir().unwrap();
    let f = d.as_ref().join("test.out");

    let sample = workshop_sample();

    let mut cmd = Command::new(assert_cmd::cargo_bin!("scene_dump"));
    cmd.args(["-f", &f.to_string_lossy(), sample.to_str().unwrap()]);

    assert!(
        cmd.output().unwrap().stdout.is_empty(),
        "Expected output to be printed to file, but was printed to stdout"
    );

    let mut expected = vec![];

    File::open(&f).unwrap().read_to_end(&mut expected).unwrap();
    assert!(
        !expected.is_empty(),
        "Expected output to be printed to file"
    )
}

#[test]
fn test_it_refuses_to_overwrite_directory() {
    let d = tempdir().unwrap();

    let sample = workshop_sample();
    let mut cmd = Command::new(assert_cmd::cargo_bin!("scene_dump"));
    cmd.args(["-f", &d.path().to_string_lossy(), sample.to_str().unwrap()]);

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("refusing to overwrite"));
}

#[test]
fn test_it_overwrites_file_anyways_if_passed_flag() {
    let d = tempdir().unwrap();
    let f = d.as_ref().join("test.out");

    let mut file = File::create(&f).unwrap();
    file.write_all(b"I'm a file!").unwrap();

    let sample = workshop_sample();
    let mut cmd = Command::new(assert_cmd::cargo_bin!("scene_dump"));
    cmd.args([
        "-f",
        &f.to_string_lossy(),
        "--no-confirm-overwrite",
        "--no-indent",
        sample.to_str().unwrap(),
    ]);

    cmd.assert().success();

    let written = fs::read_to_string(&f).unwrap();
    assert!(!written.contains('\n'));
    parse_document(&written);
}

#[test]
fn it_names_output_after_scene_in_output_dir() {
    let d = tempdir().unwrap();
    let out_dir = d.path().join("exports");

    let sample = workshop_sample();
    let mut cmd = Command::new(assert_cmd::cargo_bin!("scene_dump"));
    cmd.args(["-d", &out_dir.to_string_lossy(), sample.to_str().unwrap()]);
    cmd.assert().success();

    assert!(out_dir.join("Workshop.json").is_file());
}

#[test]
fn it_exports_a_single_root_object() {
    let d = tempdir().unwrap();

    let sample = workshop_sample();
    let mut cmd = Command::new(assert_cmd::cargo_bin!("scene_dump"));
    cmd.args([
        "--object",
        "Lamp",
        "-d",
        &d.path().to_string_lossy(),
        sample.to_str().unwrap(),
    ]);
    cmd.assert().success();

    let text = fs::read_to_string(d.path().join("Lamp.json")).unwrap();
    let json = parse_document(&text);
    let objects = json["objects"].as_array().unwrap();
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0]["name"], "Lamp");
    assert_eq!(json["buildIndex"], -1);
}

#[test]
fn it_fails_on_unknown_object() {
    let sample = workshop_sample();
    let mut cmd = Command::new(assert_cmd::cargo_bin!("scene_dump"));
    cmd.args(["--object", "Nope", sample.to_str().unwrap()]);

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No root object named `Nope`"));
}

#[test]
fn it_supports_stdin_input_with_dash() {
    let sample = workshop_sample();

    let mut cmd_file = Command::new(assert_cmd::cargo_bin!("scene_dump"));
    cmd_file.args(["--no-indent", sample.to_str().unwrap()]);
    let out_file = cmd_file.output().unwrap();
    assert!(out_file.status.success(), "expected file-input run to succeed");

    let stdin_file = File::open(&sample).unwrap();
    let mut cmd_stdin = Command::new(assert_cmd::cargo_bin!("scene_dump"));
    cmd_stdin.args(["--no-indent", "-"]);
    cmd_stdin.stdin(stdin_file);
    let out_stdin = cmd_stdin.output().unwrap();
    assert!(out_stdin.status.success(), "expected stdin-input run to succeed");

    assert_eq!(
        out_stdin.stdout, out_file.stdout,
        "stdin and file input should produce identical output"
    );
}

#[test]
fn it_reads_inline_description_from_stdin() {
    let description = r#"{"name": "Piped", "roots": [{"name": "a", "children": [{"name": "b"}]}]}"#;

    let output = assert_cmd::Command::new(assert_cmd::cargo_bin!("scene_dump"))
        .args(["--no-indent", "-"])
        .write_stdin(description)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = parse_document(&String::from_utf8(output.stdout).unwrap());
    assert_eq!(json["name"], "Piped");
    assert_eq!(json["objects"][1]["scenePath"], "a/b");
    assert_eq!(json["objects"][0]["children"], serde_json::json!([1]));
}

#[test]
fn it_reports_malformed_descriptions() {
    assert_cmd::Command::new(assert_cmd::cargo_bin!("scene_dump"))
        .arg("-")
        .write_stdin("{ not json")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Failed to load scene description from stdin"));
}
