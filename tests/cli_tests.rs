//! End-to-end CLI test suite.
//!
//! Tests organized by command group. Each test verifies CLI behavior
//! through the public interface.

mod common;

use common::harness::TestEnv;
use predicates::prelude::*;
use serde_json::Value;

fn json_paths(value: &Value) -> Vec<String> {
    value["data"]
        .as_array()
        .expect("data should be an array")
        .iter()
        .map(|f| f["path"].as_str().unwrap().to_string())
        .collect()
}

// ===========================================
// add command tests
// ===========================================
mod add_tests {
    use super::*;

    #[test]
    fn test_add_creates_db() {
        let env = TestEnv::new();
        let file = env.file("a.txt", "a");

        env.cmd().add(&[&file]).tag("work").assert().success();

        assert!(env.db_path().exists(), "database should be created");
    }

    #[test]
    fn test_add_stores_tags() {
        let env = TestEnv::new();
        let file = env.file("report.pdf", "pdf");

        env.cmd()
            .add(&[&file])
            .tag("work")
            .tag("Q3")
            .assert()
            .success()
            .stdout(predicate::str::contains("Added:"));

        env.cmd()
            .show(&file)
            .assert()
            .success()
            .stdout(predicate::str::contains("Tags: Q3, work"));
    }

    #[test]
    fn test_add_duplicate_fails() {
        let env = TestEnv::new();
        let file = env.file("a.txt", "a");
        env.cmd().add(&[&file]).assert().success();

        env.cmd()
            .add(&[&file])
            .assert()
            .failure()
            .stderr(predicate::str::contains("already been added"));
    }

    #[test]
    fn test_add_invalid_tag_fails() {
        let env = TestEnv::new();
        let file = env.file("a.txt", "a");

        env.cmd()
            .add(&[&file])
            .tag("bad!")
            .assert()
            .failure()
            .stderr(predicate::str::contains("bad!"));

        assert!(env.open_store().all_files().unwrap().is_empty());
    }

    #[test]
    fn test_add_missing_file_fails() {
        let env = TestEnv::new();
        let ghost = env.files_dir().join("ghost.txt");

        env.cmd()
            .add(&[&ghost])
            .assert()
            .failure()
            .stderr(predicate::str::contains("file not found"));
    }

    #[test]
    fn test_add_directory_requires_recursive() {
        let env = TestEnv::new();
        env.file("docs/a.txt", "a");

        env.cmd()
            .add(&[&env.files_dir()])
            .assert()
            .failure()
            .stderr(predicate::str::contains("--recursive"));
    }

    #[test]
    fn test_add_recursive_walks_directory() {
        let env = TestEnv::new();
        let a = env.file("docs/a.txt", "a");
        let b = env.file("docs/nested/b.txt", "b");

        env.cmd()
            .add(&[&env.files_dir()])
            .args(["--recursive"])
            .tag("batch")
            .assert()
            .success()
            .stdout(predicate::str::contains("2 file(s) added"));

        let files = env.open_store().files_by_tags(["batch"]).unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.path().to_path_buf()).collect();
        assert_eq!(paths, vec![a, b]);
    }

    #[test]
    fn test_add_recursive_skips_already_added() {
        let env = TestEnv::new();
        let a = env.file("a.txt", "a");
        env.file("b.txt", "b");
        env.cmd().add(&[&a]).assert().success();

        env.cmd()
            .add(&[&env.files_dir()])
            .args(["-r"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Skipped (already added)"))
            .stdout(predicate::str::contains("1 file(s) added, 1 skipped"));
    }

    #[test]
    fn test_add_with_related() {
        let env = TestEnv::new();
        let outline = env.file("outline.md", "outline");
        let notes = env.file("notes.md", "notes");
        env.cmd().add(&[&outline]).assert().success();

        env.cmd()
            .add(&[&notes])
            .args(["--related"])
            .path(&outline)
            .assert()
            .success();

        env.cmd()
            .show(&notes)
            .assert()
            .success()
            .stdout(predicate::str::contains("Related:"))
            .stdout(predicate::str::contains(outline.to_string_lossy().as_ref()));
    }
}

// ===========================================
// ls command tests
// ===========================================
mod ls_tests {
    use super::*;

    #[test]
    fn test_ls_empty() {
        let env = TestEnv::new();

        env.cmd()
            .ls()
            .assert()
            .success()
            .stdout(predicate::str::contains("No files found."));
    }

    #[test]
    fn test_ls_filters_with_and_semantics() {
        let env = TestEnv::new();
        let a = env.file("a.txt", "a");
        let b = env.file("b.txt", "b");
        env.cmd().add(&[&a]).tag("x").tag("y").assert().success();
        env.cmd().add(&[&b]).tag("y").assert().success();

        let both: Value = env.cmd().ls().tag("x").tag("y").format_json().output_json();
        let only_y: Value = env.cmd().ls().tag("y").format_json().output_json();

        assert_eq!(json_paths(&both), vec![a.to_string_lossy().to_string()]);
        assert_eq!(
            json_paths(&only_y),
            vec![
                a.to_string_lossy().to_string(),
                b.to_string_lossy().to_string()
            ]
        );
    }

    #[test]
    fn test_ls_without_filter_lists_everything() {
        let env = TestEnv::new();
        let a = env.file("a.txt", "a");
        let b = env.file("b.txt", "b");
        env.cmd().add(&[&a]).tag("x").assert().success();
        env.cmd().add(&[&b]).assert().success();

        env.cmd()
            .ls()
            .assert()
            .success()
            .stdout(predicate::str::contains("2 file(s)"));
    }

    #[test]
    fn test_ls_paths_format() {
        let env = TestEnv::new();
        let a = env.file("a.txt", "a");
        env.cmd().add(&[&a]).tag("x").assert().success();

        let output = env.cmd().ls().format_paths().output_success();

        assert_eq!(output.trim(), a.to_string_lossy());
    }

    #[test]
    fn test_ls_json_includes_tags() {
        let env = TestEnv::new();
        let a = env.file("a.txt", "a");
        env.cmd().add(&[&a]).tag("x").tag("y").assert().success();

        let json: Value = env.cmd().ls().format_json().output_json();

        assert_eq!(json["data"][0]["tags"], serde_json::json!(["x", "y"]));
        assert_eq!(json["data"][0]["name"], "a.txt");
    }
}

// ===========================================
// tag / untag / retag command tests
// ===========================================
mod tagging_tests {
    use super::*;

    #[test]
    fn test_tag_adds_to_existing_tags() {
        let env = TestEnv::new();
        let a = env.file("a.txt", "a");
        env.cmd().add(&[&a]).tag("x").assert().success();

        env.cmd()
            .args(["tag"])
            .path(&a)
            .args(["y"])
            .assert()
            .success()
            .stdout(predicate::str::contains("x, y"));
    }

    #[test]
    fn test_tag_unknown_file_fails() {
        let env = TestEnv::new();
        let a = env.file("a.txt", "a");

        env.cmd()
            .args(["tag"])
            .path(&a)
            .args(["y"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("not found"));
    }

    #[test]
    fn test_untag_removes_one_tag() {
        let env = TestEnv::new();
        let a = env.file("a.txt", "a");
        env.cmd().add(&[&a]).tag("x").tag("y").assert().success();

        env.cmd()
            .args(["untag"])
            .path(&a)
            .args(["x"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Removed tag 'x'"));

        env.cmd()
            .show(&a)
            .assert()
            .success()
            .stdout(predicate::str::contains("Tags: y"));
    }

    #[test]
    fn test_untag_absent_tag_is_noop() {
        let env = TestEnv::new();
        let a = env.file("a.txt", "a");
        env.cmd().add(&[&a]).tag("x").assert().success();

        env.cmd()
            .args(["untag"])
            .path(&a)
            .args(["y"])
            .assert()
            .success()
            .stdout(predicate::str::contains("does not have tag 'y'"));
    }

    #[test]
    fn test_retag_replaces_tags() {
        let env = TestEnv::new();
        let a = env.file("a.txt", "a");
        env.cmd().add(&[&a]).tag("a").assert().success();

        env.cmd()
            .args(["retag"])
            .path(&a)
            .tag("b")
            .assert()
            .success();

        let json: Value = env.cmd().show(&a).format_json().output_json();
        assert_eq!(json["data"]["tags"], serde_json::json!(["b"]));
    }
}

// ===========================================
// rm / touch command tests
// ===========================================
mod file_lifecycle_tests {
    use super::*;

    #[test]
    fn test_rm_removes_file() {
        let env = TestEnv::new();
        let a = env.file("a.txt", "a");
        env.cmd().add(&[&a]).tag("x").assert().success();

        env.cmd()
            .args(["rm"])
            .path(&a)
            .assert()
            .success()
            .stdout(predicate::str::contains("Removed:"));

        assert!(env.open_store().all_files().unwrap().is_empty());
        assert!(a.exists(), "the file on disk is untouched");
    }

    #[test]
    fn test_rm_untracked_fails() {
        let env = TestEnv::new();
        let a = env.file("a.txt", "a");

        env.cmd()
            .args(["rm"])
            .path(&a)
            .assert()
            .failure()
            .stderr(predicate::str::contains("not tracked"));
    }

    #[test]
    fn test_touch_tracked_file() {
        let env = TestEnv::new();
        let a = env.file("a.txt", "a");
        env.cmd().add(&[&a]).assert().success();

        env.cmd()
            .args(["touch"])
            .path(&a)
            .assert()
            .success()
            .stdout(predicate::str::contains("Touched:"));
    }
}

// ===========================================
// tags command tests
// ===========================================
mod tags_tests {
    use super::*;

    #[test]
    fn test_tags_lists_system_tags() {
        let env = TestEnv::new();

        env.cmd()
            .tags()
            .assert()
            .success()
            .stdout(predicate::str::contains("Done"))
            .stdout(predicate::str::contains("In Progress"))
            .stdout(predicate::str::contains("Missing"))
            .stdout(predicate::str::contains("New"));
    }

    #[test]
    fn test_tags_counts() {
        let env = TestEnv::new();
        let a = env.file("a.txt", "a");
        let b = env.file("b.txt", "b");
        env.cmd().add(&[&a]).tag("popular").assert().success();
        env.cmd().add(&[&b]).tag("popular").assert().success();

        env.cmd()
            .tags()
            .args(["--counts"])
            .assert()
            .success()
            .stdout(predicate::str::contains("popular (2)"));
    }

    #[test]
    fn test_new_tag_with_color() {
        let env = TestEnv::new();

        env.cmd()
            .args(["new-tag", "Urgent", "--color", "#FF0000"])
            .assert()
            .success();

        let json: Value = env.cmd().tags().args(["--colors"]).format_json().output_json();
        let urgent = json["data"]
            .as_array()
            .unwrap()
            .iter()
            .find(|t| t["name"] == "Urgent")
            .expect("Urgent should be listed")
            .clone();
        assert_eq!(urgent["color"], "#FF0000");
        assert_eq!(urgent["system"], false);
    }

    #[test]
    fn test_new_tag_rejects_bad_color() {
        let env = TestEnv::new();

        env.cmd()
            .args(["new-tag", "Urgent", "--color", "red"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid color"));
    }

    #[test]
    fn test_delete_tag() {
        let env = TestEnv::new();
        let a = env.file("a.txt", "a");
        env.cmd().add(&[&a]).tag("gone").tag("kept").assert().success();

        env.cmd()
            .args(["delete-tag", "gone"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Deleted tag: gone"));

        env.cmd()
            .show(&a)
            .assert()
            .success()
            .stdout(predicate::str::contains("Tags: kept"));
    }

    #[test]
    fn test_delete_system_tag_fails() {
        let env = TestEnv::new();

        env.cmd()
            .args(["delete-tag", "Done"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("system tag"));

        env.cmd()
            .tags()
            .format_paths()
            .assert()
            .success()
            .stdout(predicate::str::contains("Done"));
    }

    #[test]
    fn test_color_changes_user_tag() {
        let env = TestEnv::new();
        env.cmd().args(["new-tag", "Mine"]).assert().success();

        env.cmd()
            .args(["color", "Mine", "#00AA00"])
            .assert()
            .success()
            .stdout(predicate::str::contains("#00AA00"));
    }

    #[test]
    fn test_color_rejects_system_tag() {
        let env = TestEnv::new();

        env.cmd()
            .args(["color", "Done", "#00AA00"])
            .assert()
            .failure();
    }
}

// ===========================================
// check command tests
// ===========================================
mod check_tests {
    use super::*;

    #[test]
    fn test_check_marks_deleted_file_missing() {
        let env = TestEnv::new();
        let a = env.file("a.txt", "a");
        env.cmd().add(&[&a]).tag("x").assert().success();
        std::fs::remove_file(&a).unwrap();

        env.cmd()
            .check()
            .assert()
            .success()
            .stdout(predicate::str::contains("missing:"));

        let files = env.open_store().files_by_tags(["Missing"]).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_check_restores_file() {
        let env = TestEnv::new();
        let a = env.file("a.txt", "a");
        env.cmd().add(&[&a]).assert().success();
        std::fs::remove_file(&a).unwrap();
        env.cmd().check().assert().success();
        std::fs::write(&a, "back").unwrap();

        env.cmd()
            .check()
            .assert()
            .success()
            .stdout(predicate::str::contains("found:"));

        assert!(env.open_store().files_by_tags(["Missing"]).unwrap().is_empty());
    }

    #[test]
    fn test_check_dry_run_changes_nothing() {
        let env = TestEnv::new();
        let a = env.file("a.txt", "a");
        env.cmd().add(&[&a]).assert().success();
        std::fs::remove_file(&a).unwrap();

        env.cmd()
            .check()
            .args(["--dry-run"])
            .assert()
            .success()
            .stdout(predicate::str::contains("would mark missing"));

        assert!(env.open_store().files_by_tags(["Missing"]).unwrap().is_empty());
    }

    #[test]
    fn test_check_clean_store() {
        let env = TestEnv::new();
        let a = env.file("a.txt", "a");
        env.cmd().add(&[&a]).assert().success();

        env.cmd()
            .check()
            .assert()
            .success()
            .stdout(predicate::str::contains("All 1 file(s) OK."));
    }

    #[test]
    fn test_startup_reconcile_marks_missing() {
        let env = TestEnv::new();
        let a = env.file("a.txt", "a");
        env.cmd().add(&[&a]).assert().success();
        std::fs::remove_file(&a).unwrap();

        let json: Value = env.cmd().ls().tag("Missing").format_json().output_json();

        assert_eq!(json_paths(&json), vec![a.to_string_lossy().to_string()]);
    }

    #[test]
    fn test_no_reconcile_flag_skips_startup_check() {
        let env = TestEnv::new();
        let a = env.file("a.txt", "a");
        env.cmd().add(&[&a]).assert().success();
        std::fs::remove_file(&a).unwrap();

        env.cmd()
            .args(["--no-reconcile"])
            .ls()
            .tag("Missing")
            .assert()
            .success()
            .stdout(predicate::str::contains("No files found."));
    }

    #[test]
    fn test_config_disables_startup_check() {
        let env = TestEnv::new();
        env.write_config("reconcile_on_startup = false\n");
        let a = env.file("a.txt", "a");
        env.cmd().add(&[&a]).assert().success();
        std::fs::remove_file(&a).unwrap();

        env.cmd()
            .ls()
            .tag("Missing")
            .assert()
            .success()
            .stdout(predicate::str::contains("No files found."));
    }
}

// ===========================================
// config and misc tests
// ===========================================
mod misc_tests {
    use super::*;

    #[test]
    fn test_config_database_used_without_flag() {
        let env = TestEnv::new();
        let db = env.root().join("from-config.db");
        env.write_config(&format!("database = {:?}\n", db.to_string_lossy()));
        let a = env.file("a.txt", "a");

        common::harness::ShelfCommand::new()
            .env("XDG_CONFIG_HOME", &env.config_home())
            .add(&[&a])
            .assert()
            .success();

        assert!(db.exists(), "database from config should be created");
    }

    #[test]
    fn test_bad_config_fails() {
        let env = TestEnv::new();
        env.write_config("database = [");

        env.cmd()
            .ls()
            .assert()
            .failure()
            .stderr(predicate::str::contains("failed to parse config file"));
    }

    #[test]
    fn test_completions_bash() {
        let env = TestEnv::new();

        env.cmd()
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("tagshelf"));
    }

    #[test]
    fn test_verbose_logs_to_stderr() {
        let env = TestEnv::new();
        let a = env.file("a.txt", "a");

        env.cmd()
            .args(["-vv"])
            .add(&[&a])
            .assert()
            .success()
            .stderr(predicate::str::contains("added file"));
    }
}
