//! End-to-end tests for the `subcommands-demo` binary.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

fn demo() -> Command {
    cargo_bin_cmd!("subcommands-demo")
}

fn stdout_of(args: &[&str]) -> String {
    let output = demo().args(args).output().unwrap();
    assert!(output.status.success(), "demo failed for {args:?}");
    String::from_utf8(output.stdout).unwrap()
}

fn sorted_lines(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
    lines.sort();
    lines
}

// ============================================
// Basic CLI
// ============================================

mod cli_basics {
    use super::*;

    #[test]
    fn shows_help() {
        demo()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("--load"))
            .stdout(predicate::str::contains("--check-group-type"));
    }

    #[test]
    fn rejects_unknown_extension() {
        demo()
            .args(["--load", "voice"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("voice"));
    }

    #[test]
    fn rejects_bad_log_level() {
        demo()
            .args(["--log-level", "loud"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid log level"));
    }
}

// ============================================
// Binding
// ============================================

mod binding {
    use super::*;

    #[test]
    fn default_run_binds_every_extension() {
        demo()
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "user [prefix group] (Groups) on_error=user_error",
            ))
            .stdout(predicate::str::contains("  avatar [prefix command] (UserInfo)\n"))
            .stdout(predicate::str::contains(
                "    whenjoin [prefix command] (Utilities)",
            ))
            .stdout(predicate::str::contains(
                "    membercount [hybrid command] (HybridUtilityCommands)",
            ))
            .stdout(predicate::str::contains(
                "    edit-description [slash command] (ServerSettingsCommands)",
            ))
            .stdout(predicate::str::contains("  banner [slash command] (ServerCommands)"))
            .stdout(predicate::str::contains("unattached").not());
    }

    #[test]
    fn load_order_does_not_change_the_tree() {
        let baseline = sorted_lines(&stdout_of(&[]));
        let reversed = sorted_lines(&stdout_of(&["--reverse-cogs"]));
        let shuffled = sorted_lines(&stdout_of(&["--load", "slash,hybrid,prefix"]));
        let both = sorted_lines(&stdout_of(&["--load", "hybrid,slash,prefix", "--reverse-cogs"]));

        assert_eq!(baseline, reversed);
        assert_eq!(baseline, shuffled);
        assert_eq!(baseline, both);
    }

    #[test]
    fn copies_group_error_handler_when_asked() {
        demo()
            .args(["--load", "prefix", "--copy-group-error-handler"])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "  info [prefix command] (UserInfo) on_error=user_error",
            ))
            .stdout(predicate::str::contains(
                "    whenjoin [prefix command] (Utilities) on_error=user_error",
            ));
    }

    #[test]
    fn unloading_a_cog_detaches_its_subcommands() {
        let out = stdout_of(&["--unload", "ServerCommands"]);
        assert!(out.contains("  settings [slash group] (SlashCog)"));
        assert!(!out.contains("banner"));
        assert!(!out.contains("icon"));
    }

    #[test]
    fn unloading_a_group_owner_leaves_its_subcommands_waiting() {
        demo()
            .args(["--load", "prefix", "--unload", "Groups", "--strict"])
            .assert()
            .failure()
            .stdout(predicate::str::contains("unattached:"))
            .stdout(predicate::str::contains("\"whenjoin\""))
            .stderr(predicate::str::contains("subcommands could not be attached"));
    }
}

// ============================================
// Diagnostics
// ============================================

mod diagnostics {
    use super::*;

    #[test]
    fn lists_unattached_subcommands() {
        demo()
            .args(["--load", "prefix,misplaced"])
            .assert()
            .success()
            .stdout(predicate::str::contains("unattached:"))
            .stdout(predicate::str::contains("\"ping\""));
    }

    #[test]
    fn strict_mode_fails_on_leftovers() {
        demo()
            .args(["--load", "prefix,misplaced", "--strict"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("was not found"));
    }

    #[test]
    fn strict_mode_passes_when_everything_binds() {
        demo().arg("--strict").assert().success();
    }

    #[test]
    fn kind_check_rejects_misplaced_command() {
        demo()
            .args(["--load", "prefix,misplaced", "--check-group-type"])
            .assert()
            .failure()
            .stderr(predicate::str::contains(
                "cannot add slash command \"ping\" to prefix group \"user\"",
            ));
    }

    #[test]
    fn json_report_has_tree_and_leftovers() {
        let out = stdout_of(&["--load", "prefix,misplaced", "--json"]);
        let report: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(report["config"]["check_group_type"], false);
        let user = &report["commands"][0];
        assert_eq!(user["name"], "user");
        assert_eq!(user["kind"], "prefix");
        assert_eq!(user["children"].as_array().unwrap().len(), 4);

        let unresolved = report["unresolved"].as_array().unwrap();
        assert_eq!(unresolved.len(), 1);
        assert_eq!(unresolved[0]["command"], "ping");
        assert_eq!(unresolved[0]["target"], "user");
        assert_eq!(unresolved[0]["owner"], "Misplaced");
    }
}

// ============================================
// Config file
// ============================================

mod config_file {
    use super::*;

    #[test]
    fn toml_config_enables_options() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("subcommands.toml");
        std::fs::write(&path, "copy_group_error_handler = true\n").unwrap();

        demo()
            .args(["--load", "prefix", "--config"])
            .arg(&path)
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "  avatar [prefix command] (UserInfo) on_error=user_error",
            ));
    }

    #[test]
    fn json_config_enables_kind_check() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("subcommands.json");
        std::fs::write(&path, r#"{ "check_group_type": true }"#).unwrap();

        demo()
            .args(["--load", "prefix,misplaced", "--config"])
            .arg(&path)
            .assert()
            .failure()
            .stderr(predicate::str::contains("cannot add slash command"));
    }

    #[test]
    fn malformed_config_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("subcommands.toml");
        std::fs::write(&path, "check_group_type = \"maybe\"\n").unwrap();

        demo()
            .arg("--config")
            .arg(&path)
            .assert()
            .failure()
            .stderr(predicate::str::contains("subcommands.toml"));
    }
}
