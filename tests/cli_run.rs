mod common;

use std::path::Path;
use std::process::Command;

use common::{create_chromium_history, dir_entries};

fn histcarve() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_histcarve"));
    cmd.env("RUST_LOG", "histcarve=warn");
    cmd
}

fn write_config(dir: &Path, history: &Path) -> std::path::PathBuf {
    let config = format!(
        r#"
run_id: cli_test
max_results: 50
families:
  - name: Alpha
    query:
      table: urls
      url_column: url
      title_column: title
      visit_count_column: visit_count
      last_visit_column: last_visit_time
      encoding: webkit
    paths:
      - '{}'
  - name: Beta
    query:
      table: moz_places
      url_column: url
      title_column: title
      visit_count_column: visit_count
      last_visit_column: last_visit_date
      encoding: unix
    paths:
      - '{}'
"#,
        history.display(),
        dir.join("missing").join("places.sqlite").display()
    );
    let path = dir.join("families.yml");
    std::fs::write(&path, config).expect("write config");
    path
}

#[test]
fn run_exports_present_families_and_exits_cleanly() {
    let data = tempfile::tempdir().expect("data");
    let out = data.path().join("exports");
    let snapshots = tempfile::tempdir().expect("snapshots");

    let history = data.path().join("Default").join("History");
    create_chromium_history(
        &history,
        &[
            ("https://one.test/", "One", 1, 100_000_000),
            ("https://two.test/", "Two", 2, 0),
        ],
    );
    let config = write_config(data.path(), &history);

    let status = histcarve()
        .arg("--config-path")
        .arg(&config)
        .arg("--output")
        .arg(&out)
        .arg("--temp-dir")
        .arg(snapshots.path())
        .status()
        .expect("spawn");
    assert!(status.success());

    let exports = dir_entries(&out);
    assert_eq!(exports.len(), 1);
    let name = exports[0]
        .file_name()
        .and_then(|n| n.to_str())
        .expect("name")
        .to_string();
    assert!(name.starts_with("Alpha_History_"), "{name}");
    assert!(name.ends_with(".csv"), "{name}");
    assert!(dir_entries(snapshots.path()).is_empty());
}

#[test]
fn family_filter_can_select_nothing() {
    let data = tempfile::tempdir().expect("data");
    let out = data.path().join("exports");
    let history = data.path().join("History");
    create_chromium_history(&history, &[("https://one.test/", "One", 1, 100_000_000)]);
    let config = write_config(data.path(), &history);

    let status = histcarve()
        .arg("--config-path")
        .arg(&config)
        .arg("--output")
        .arg(&out)
        .args(["--families", "beta"])
        .status()
        .expect("spawn");
    assert!(status.success());
    assert!(dir_entries(&out).is_empty());
}

#[test]
fn unusable_output_dir_fails_the_run() {
    let data = tempfile::tempdir().expect("data");
    let history = data.path().join("History");
    create_chromium_history(&history, &[]);
    let config = write_config(data.path(), &history);

    let blocker = data.path().join("exports");
    std::fs::write(&blocker, b"a file, not a directory").expect("write");

    let status = histcarve()
        .arg("--config-path")
        .arg(&config)
        .arg("--output")
        .arg(&blocker)
        .status()
        .expect("spawn");
    assert!(!status.success());
}

#[test]
fn invalid_config_fails_the_run() {
    let data = tempfile::tempdir().expect("data");
    let config = data.path().join("broken.yml");
    std::fs::write(&config, "families: [ {name: x} ]").expect("write");

    let status = histcarve()
        .arg("--config-path")
        .arg(&config)
        .arg("--output")
        .arg(data.path())
        .status()
        .expect("spawn");
    assert!(!status.success());
}
