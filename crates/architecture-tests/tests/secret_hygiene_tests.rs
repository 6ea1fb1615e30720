//! Architecture tests for secret handling.
//!
//! Credentials travel as `secrecy::SecretString` and are exposed only where
//! they leave the process: subprocess arguments and AWS SDK credentials.
//! These tests check source patterns statically; they do not run code.
//!
//! Invariants:
//! - `.expose_secret()` in non-test code appears only in allowlisted files
//! - No `tracing` or print macro line exposes a secret

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Files allowed to expose secrets outside tests, as (path_suffix, reason).
const EXPOSE_ALLOWLIST: &[(&str, &str)] = &[
    (
        "provider/src/exec.rs",
        "secret command arguments are exposed only when handed to the OS",
    ),
    (
        "provider/src/plugins/aws/eks.rs",
        "AWS SDK credentials take plain strings",
    ),
    (
        "provider/src/plugins/aws/iam.rs",
        "emptiness checks on configured keys",
    ),
];

const LOGGING_MACROS: &[&str] = &[
    "trace!(", "debug!(", "info!(", "warn!(", "error!(", "println!(", "eprintln!(", "print!(",
    "eprint!(",
];

fn source_files() -> Vec<PathBuf> {
    let root = find_crates_dir();
    WalkDir::new(&root)
        .into_iter()
        .filter_entry(|e| e.file_name() != "target" && e.file_name() != "tests")
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "rs"))
        .map(|e| e.into_path())
        .collect()
}

fn find_crates_dir() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .expect("architecture-tests lives under crates/")
        .to_path_buf()
}

/// Source text before the `#[cfg(test)]` module, if any.
fn non_test_source(content: &str) -> &str {
    match content.find("#[cfg(test)]\nmod tests") {
        Some(idx) => &content[..idx],
        None => content,
    }
}

#[test]
fn test_expose_secret_only_in_allowlisted_files() {
    let mut violations = Vec::new();

    for path in source_files() {
        let path_str = path.to_string_lossy().replace('\\', "/");
        if path_str.contains("architecture-tests") || path_str.ends_with("testing.rs") {
            continue;
        }
        let content = fs::read_to_string(&path).unwrap_or_default();
        if !non_test_source(&content).contains(".expose_secret()") {
            continue;
        }
        if !EXPOSE_ALLOWLIST
            .iter()
            .any(|(suffix, _)| path_str.ends_with(suffix))
        {
            violations.push(path_str);
        }
    }

    assert!(
        violations.is_empty(),
        "\nSecrets exposed outside the allowlist:\n  {}\n\
         Keep secrets in SecretString or add the file to EXPOSE_ALLOWLIST with a reason.\n",
        violations.join("\n  ")
    );
}

#[test]
fn test_no_secret_in_logging_macros() {
    let mut violations = Vec::new();

    for path in source_files() {
        let content = fs::read_to_string(&path).unwrap_or_default();
        for (line_no, line) in non_test_source(&content).lines().enumerate() {
            if line.contains("expose_secret") && LOGGING_MACROS.iter().any(|m| line.contains(m)) {
                violations.push(format!("{}:{}", path.display(), line_no + 1));
            }
        }
    }

    assert!(
        violations.is_empty(),
        "\nSecrets passed to logging or print macros:\n  {}\n",
        violations.join("\n  ")
    );
}

#[test]
fn test_allowlist_entries_exist() {
    let crates_dir = find_crates_dir();
    for (suffix, reason) in EXPOSE_ALLOWLIST {
        assert!(!reason.is_empty(), "allowlist entry '{}' needs a reason", suffix);
        assert!(
            crates_dir.join(suffix).exists(),
            "allowlisted file '{}' no longer exists",
            suffix
        );
    }
}

#[test]
fn test_non_test_source_strips_test_module() {
    let content = "fn a() {}\n#[cfg(test)]\nmod tests {\n    fn b() { x.expose_secret(); }\n}\n";
    assert_eq!(non_test_source(content), "fn a() {}\n");
}
