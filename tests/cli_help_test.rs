mod common;

#[cfg(test)]
mod cli_help_tests {
    use super::common;
    use predicates::prelude::*;
    use tempfile::TempDir;

    #[test]
    fn test_cli_help_output() {
        let dir = TempDir::new().unwrap();
        let assert_result = common::fact(dir.path()).arg("--help").assert().success();
        let output = assert_result.get_output();
        let help_output = String::from_utf8_lossy(&output.stdout);

        assert!(help_output.contains("Usage:"));
        assert!(help_output.contains("Commands:"));
        for command in ["configure", "list", "get", "set", "delete"] {
            assert!(help_output.contains(command), "missing {}", command);
        }
        assert!(help_output.contains("--asset"));
        assert!(help_output.contains("-V, --version"));
    }

    #[test]
    fn test_configure_help_lists_its_options() {
        let dir = TempDir::new().unwrap();
        common::fact(dir.path())
            .args(["configure", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--jwt"))
            .stdout(predicate::str::contains("--id"))
            .stdout(predicate::str::contains("--validate"));
    }

    #[test]
    fn test_set_help_lists_special_keys() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("config.yml"),
            "allowed_special_keys:\n  state: [up, down]\ndisabled_special_keys: [owner]\n",
        )
        .unwrap();

        common::fact(dir.path())
            .args(["set", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("state: up, down"))
            .stdout(predicate::str::contains("owner"));
    }

    #[test]
    fn test_no_arguments_prints_help() {
        let dir = TempDir::new().unwrap();
        common::fact(dir.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("Usage:"));
    }
}
