//! Architecture tests for file size limits.
//!
//! - Files >500 LOC log a warning
//! - Files >800 LOC are presumed mis-scoped (test failure)
//!
//! Walks every .rs file under `crates/` and counts non-blank, non-comment
//! lines.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use walkdir::WalkDir;

const WARNING_THRESHOLD: usize = 500;
const FAILURE_THRESHOLD: usize = 800;

/// Files excluded from size checks, as (path_suffix, justification).
const EXCLUDED_FILES: &[(&str, &str)] = &[];

#[test]
fn file_size_limits() {
    let workspace_root = find_workspace_root();
    let crates_dir = workspace_root.join("crates");
    assert!(crates_dir.exists(), "crates/ directory not found at {:?}", crates_dir);

    let rust_files = find_rust_files(&crates_dir);
    assert!(!rust_files.is_empty(), "no Rust files found under {:?}", crates_dir);

    let mut failures = Vec::new();
    for file_path in &rust_files {
        let loc = count_loc(file_path);
        let relative = file_path.strip_prefix(&workspace_root).unwrap_or(file_path);
        let relative = relative.to_string_lossy().to_string();
        let is_excluded = EXCLUDED_FILES
            .iter()
            .any(|(suffix, _)| relative.ends_with(suffix));

        if loc > FAILURE_THRESHOLD && !is_excluded {
            failures.push(format!("  - {}: {} lines", relative, loc));
        } else if loc > WARNING_THRESHOLD {
            eprintln!("[architecture] {}: {} LOC exceeds {}", relative, loc, WARNING_THRESHOLD);
        }
    }

    assert!(
        failures.is_empty(),
        "\nFiles exceeding {} LOC (split them or add to EXCLUDED_FILES with a \
         justification):\n{}\n",
        FAILURE_THRESHOLD,
        failures.join("\n")
    );
    eprintln!("[architecture] Checked {} Rust files for size limits.", rust_files.len());
}

/// Count lines of code, skipping blank lines, `//` comments and block
/// comment continuations.
fn count_loc(path: &Path) -> usize {
    let content = fs::read_to_string(path).expect("Failed to read file");
    let mut count = 0;
    let mut in_block_comment = false;

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.starts_with("/*") {
            in_block_comment = true;
        }
        if in_block_comment {
            if trimmed.ends_with("*/") {
                in_block_comment = false;
            }
            continue;
        }
        if trimmed.starts_with("//") {
            continue;
        }
        count += 1;
    }

    count
}

fn find_rust_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_entry(|e| e.file_name() != "target")
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "rs"))
        .map(|e| e.into_path())
        .collect()
}

/// Find the workspace root by looking for Cargo.toml with [workspace].
pub(crate) fn find_workspace_root() -> PathBuf {
    let current_dir = std::env::current_dir().expect("Failed to get current directory");

    let mut dir = current_dir.as_path();
    loop {
        let cargo_toml = dir.join("Cargo.toml");
        if cargo_toml.exists()
            && let Ok(content) = fs::read_to_string(&cargo_toml)
            && content.contains("[workspace]")
        {
            return dir.to_path_buf();
        }

        match dir.parent() {
            Some(parent) => dir = parent,
            None => return current_dir,
        }
    }
}

#[test]
fn test_count_loc_skips_comments_and_blanks() {
    let temp_dir = TempDir::new().unwrap();
    let test_file = temp_dir.path().join("sample.rs");
    fs::write(
        &test_file,
        r#"//! Module documentation

/// Function documentation
fn main() {
    let x = 5; // inline comment
    /* block
       comment */
    println!("{x}");
}
"#,
    )
    .unwrap();

    // fn main() {, let x = 5;, println!, }
    assert_eq!(count_loc(&test_file), 4);
}

#[test]
fn test_find_rust_files_skips_target() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir_all(temp_dir.path().join("src")).unwrap();
    fs::create_dir_all(temp_dir.path().join("target/debug")).unwrap();
    fs::write(temp_dir.path().join("src/lib.rs"), "fn a() {}\n").unwrap();
    fs::write(temp_dir.path().join("target/debug/build.rs"), "fn b() {}\n").unwrap();
    fs::write(temp_dir.path().join("src/notes.md"), "# notes\n").unwrap();

    let files = find_rust_files(temp_dir.path());
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with("src/lib.rs"));
}

#[test]
fn test_excluded_files_have_justifications() {
    for (pattern, justification) in EXCLUDED_FILES {
        assert!(!pattern.is_empty(), "Excluded file pattern must not be empty");
        assert!(
            !justification.is_empty(),
            "Justification for '{}' must not be empty",
            pattern
        );
    }
}
