//! Smoke test for the driver's file I/O and exit-code contract (C6), run
//! against the actual built binary rather than the library directly.

use std::fs;
use std::process::Command;

use tempfile::tempdir;

const TRIVIAL_OR: &str = "aag 3 2 0 1 1\n2\n4\n7\n6 3 5\ni0 var_0[0]\ni1 var_0[1]\n";
const CONTRADICTION: &str = "aag 2 1 0 1 1\n2\n4\n4 2 3\ni0 var_0[0]\n";

fn solgen_bin() -> &'static str {
    env!("CARGO_BIN_EXE_solgen")
}

#[test]
fn writes_json_and_exits_zero_on_success() {
    let dir = tempdir().unwrap();
    let input_path = dir.path().join("in.aag");
    let output_path = dir.path().join("out.json");
    fs::write(&input_path, TRIVIAL_OR).unwrap();

    let status = Command::new(solgen_bin())
        .args([
            input_path.to_str().unwrap(),
            "1",
            "3",
            output_path.to_str().unwrap(),
        ])
        .status()
        .expect("failed to run solgen");
    assert!(status.success());

    let json = fs::read_to_string(&output_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    let list = parsed["assignment_list"].as_array().unwrap();
    assert_eq!(list.len(), 3);
}

#[test]
fn exits_zero_with_empty_list_when_sampler_gives_up() {
    let dir = tempdir().unwrap();
    let input_path = dir.path().join("in.aag");
    let output_path = dir.path().join("out.json");
    fs::write(&input_path, CONTRADICTION).unwrap();

    let status = Command::new(solgen_bin())
        .args([
            input_path.to_str().unwrap(),
            "1",
            "3",
            output_path.to_str().unwrap(),
        ])
        .status()
        .expect("failed to run solgen");
    assert!(status.success());

    let json = fs::read_to_string(&output_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert!(parsed["assignment_list"].as_array().unwrap().is_empty());
}

#[test]
fn nonzero_exit_and_no_output_file_on_bad_input() {
    let dir = tempdir().unwrap();
    let input_path = dir.path().join("in.aag");
    let output_path = dir.path().join("out.json");
    fs::write(&input_path, "not an aag file\n").unwrap();

    let status = Command::new(solgen_bin())
        .args([
            input_path.to_str().unwrap(),
            "1",
            "3",
            output_path.to_str().unwrap(),
        ])
        .status()
        .expect("failed to run solgen");
    assert!(!status.success());
    assert!(!output_path.exists());
}

#[test]
fn same_seed_is_byte_identical_across_runs() {
    let dir = tempdir().unwrap();
    let input_path = dir.path().join("in.aag");
    fs::write(&input_path, TRIVIAL_OR).unwrap();

    let run = |name: &str| {
        let output_path = dir.path().join(name);
        let status = Command::new(solgen_bin())
            .args([
                input_path.to_str().unwrap(),
                "42",
                "3",
                output_path.to_str().unwrap(),
            ])
            .status()
            .unwrap();
        assert!(status.success());
        fs::read(output_path).unwrap()
    };

    assert_eq!(run("a.json"), run("b.json"));
}
