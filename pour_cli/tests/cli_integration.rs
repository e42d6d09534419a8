use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

/// Config with thresholds shrunk so a simulated pour classifies in well
/// under a second.
const FAST_CONFIG: &str = r#"
[meter]
pulses_per_unit = 100.0
units = "metric"

[pour]
minimum_pour_volume = 0.05
large_pour_inactivity_ms = 150
small_pour_inactivity_ms = 100

[report]
progress_interval_ms = 50
idle_interval_ms = 1000

[display]
beverage = "testbrew"
target_pour_size = 0.4

[simulation]
pulse_count = 30
pulse_gap_ms = 5
"#;

fn write_config(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("pour_config.toml");
    std::fs::write(&path, FAST_CONFIG).expect("write config");
    path
}

fn pour_cmd(config: &PathBuf, state: &PathBuf) -> Command {
    let mut cmd = Command::cargo_bin("pour").expect("binary exists");
    cmd.arg("--config").arg(config).arg("--state").arg(state);
    cmd.timeout(std::time::Duration::from_secs(30));
    cmd
}

#[test]
fn simulate_classifies_a_large_pour() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir);
    let state = dir.path().join("state.toml");

    pour_cmd(&config, &state)
        .arg("simulate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cheers!"))
        .stdout(predicate::str::contains("testbrew"))
        .stdout(predicate::str::contains("Served 1 pours"));
}

#[test]
fn simulate_discards_a_small_pour() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir);
    let state = dir.path().join("state.toml");

    pour_cmd(&config, &state)
        .arg("simulate")
        .arg("--pulses")
        .arg("3")
        .assert()
        .success()
        .stdout(predicate::str::contains("No testbrew for you!"))
        .stdout(predicate::str::contains("(1 discarded)"));
}

#[test]
fn json_mode_emits_machine_readable_events() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir);
    let state = dir.path().join("state.toml");

    let output = pour_cmd(&config, &state)
        .arg("--json")
        .arg("simulate")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let text = String::from_utf8(output).expect("utf8 stdout");
    let mut saw_large_pour = false;
    let mut saw_summary = false;
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        let value: serde_json::Value =
            serde_json::from_str(line).unwrap_or_else(|e| panic!("bad JSON line {line:?}: {e}"));
        match value["event"].as_str() {
            Some("large_pour") => {
                assert_eq!(value["volume"].as_f64(), Some(0.30));
                saw_large_pour = true;
            }
            Some("summary") => {
                assert_eq!(value["large_pours"].as_u64(), Some(1));
                saw_summary = true;
            }
            _ => {}
        }
    }
    assert!(saw_large_pour, "expected a large_pour event:\n{text}");
    assert!(saw_summary, "expected a summary event:\n{text}");
}

#[test]
fn counters_persist_between_invocations() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir);
    let state = dir.path().join("state.toml");

    pour_cmd(&config, &state).arg("simulate").assert().success();
    pour_cmd(&config, &state)
        .arg("simulate")
        .assert()
        .success()
        .stdout(predicate::str::contains("lifetime total 0.6 L"));

    let persisted = std::fs::read_to_string(&state).expect("state file written");
    assert!(
        persisted.contains("lifetime_pulses") && persisted.contains("60"),
        "state should carry 60 pulses: {persisted}"
    );
}

#[rstest::rstest]
#[case("[pour]\nminimum_pour_volume = 0.0\n", "minimum_pour_volume")]
#[case("not toml at all [[[", "pour_config.toml")]
fn bad_configs_are_rejected_with_a_helpful_message(
    #[case] content: &str,
    #[case] needle: &str,
) {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("pour_config.toml");
    std::fs::write(&config, content).unwrap();
    let state = dir.path().join("state.toml");

    pour_cmd(&config, &state)
        .arg("simulate")
        .assert()
        .failure()
        .stderr(predicate::str::contains(needle));
}
