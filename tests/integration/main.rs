//! Integration tests for reprobe

mod race;

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    /// Command isolated from any user config
    fn reprobe(dir: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("reprobe");
        cmd.env("REPROBE_CONFIG", dir.path().join("config.toml"));
        cmd
    }

    /// Lay out a junit jar in a repository directory
    fn publish(root: &Path, contents: &[u8]) {
        let dir = root.join("junit/junit/4.12");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("junit-4.12.jar"), contents).unwrap();
    }

    #[test]
    fn help_displays() {
        let dir = TempDir::new().unwrap();
        reprobe(&dir)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "Ordered multi-repository artifact resolution",
            ));
    }

    #[test]
    fn version_displays() {
        let dir = TempDir::new().unwrap();
        reprobe(&dir)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("reprobe"));
    }

    #[test]
    fn config_path() {
        let dir = TempDir::new().unwrap();
        reprobe(&dir)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let dir = TempDir::new().unwrap();
        reprobe(&dir)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[resolver]"));
    }

    #[test]
    fn config_init_writes_file() {
        let dir = TempDir::new().unwrap();
        reprobe(&dir).args(["config", "init"]).assert().success();

        let written = fs::read_to_string(dir.path().join("config.toml")).unwrap();
        assert!(written.contains("[general]"));

        // Second init leaves the file alone
        reprobe(&dir)
            .args(["config", "init"])
            .assert()
            .success()
            .stderr(predicate::str::contains("--force"));
    }

    #[test]
    fn invalid_config_reports_path() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.toml"), "[resolver\nworkers = ").unwrap();
        reprobe(&dir)
            .args(["config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[test]
    fn config_init_force_repairs_broken_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[resolver\n").unwrap();

        reprobe(&dir)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));

        reprobe(&dir)
            .args(["config", "init", "--force"])
            .assert()
            .success();

        reprobe(&dir)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[resolver]"));
    }

    #[test]
    fn debug_logging_reports_missing_config() {
        let dir = TempDir::new().unwrap();
        reprobe(&dir)
            .args(["-vv", "config", "show"])
            .assert()
            .success()
            .stderr(predicate::str::contains("Config file not found"));
    }

    #[test]
    fn resolve_without_repositories_fails() {
        let dir = TempDir::new().unwrap();
        reprobe(&dir)
            .args(["resolve", "junit:junit:4.12"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No repositories configured"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn resolve_invalid_coordinate() {
        let dir = TempDir::new().unwrap();
        reprobe(&dir)
            .args(["resolve", "junit"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid coordinate"));
    }

    #[test]
    fn resolve_falls_back_to_second_repository() {
        let dir = TempDir::new().unwrap();
        let remote = dir.path().join("remote");
        let local = dir.path().join("local");
        fs::create_dir_all(&remote).unwrap();
        publish(&local, b"jar bytes");

        reprobe(&dir)
            .args(["resolve", "junit:junit:4.12", "--format", "plain"])
            .arg("--repo")
            .arg(format!("remote={}", remote.display()))
            .arg("--repo")
            .arg(format!("local=file://{}", local.display()))
            .assert()
            .success()
            .stdout(predicate::str::contains("junit:junit:jar:4.12 local"));
    }

    #[test]
    fn resolve_json_output() {
        let dir = TempDir::new().unwrap();
        let local = dir.path().join("local");
        publish(&local, b"abc");

        let output = reprobe(&dir)
            .args(["resolve", "junit:junit:4.12", "--format", "json"])
            .arg("--repo")
            .arg(format!("local={}", local.display()))
            .output()
            .unwrap();
        assert!(output.status.success());

        let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        let artifact = &value["artifacts"][0];
        assert_eq!(artifact["status"], "found");
        assert_eq!(artifact["repository"], "local");
        assert_eq!(
            artifact["sha256"],
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn resolve_unresolved_exits_nonzero() {
        let dir = TempDir::new().unwrap();
        let local = dir.path().join("local");
        fs::create_dir_all(&local).unwrap();

        reprobe(&dir)
            .args(["resolve", "junit:junit:4.12", "--format", "plain"])
            .arg("--repo")
            .arg(format!("local={}", local.display()))
            .assert()
            .failure()
            .stdout(predicate::str::contains("junit:junit:jar:4.12 -"))
            .stderr(predicate::str::contains("1 of 1 coordinates unresolved"));
    }

    #[test]
    fn resolve_uses_configured_repositories() {
        let dir = TempDir::new().unwrap();
        let local = dir.path().join("local");
        publish(&local, b"jar");
        fs::write(
            dir.path().join("config.toml"),
            format!(
                "[[repositories]]\nid = \"central\"\nurl = \"{}\"\nupdate_policy = \"never\"\n",
                local.display()
            ),
        )
        .unwrap();

        reprobe(&dir)
            .args(["resolve", "junit:junit:4.12"])
            .assert()
            .success()
            .stdout(predicate::str::contains("central"));
    }
}
