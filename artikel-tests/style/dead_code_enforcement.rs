//! Dead Code Enforcement
//!
//! Library sources must not silence the dead code lint. Unused code is
//! either deleted or wired into a lookup path.

use std::fs;
use std::path::{Path, PathBuf};

/// Library source roots checked by this test, relative to this crate.
const SOURCE_ROOTS: &[&str] = &["../artikel-core/src"];

/// A dead code allowance found in library code
#[derive(Debug)]
struct DeadCodeViolation {
    file_path: String,
    line_number: usize,
    context: String,
}

fn find_rust_files(dir: &Path, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            find_rust_files(&path, files)?;
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            files.push(path);
        }
    }
    Ok(())
}

fn scan_source(file_path: &str, content: &str) -> Vec<DeadCodeViolation> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let trimmed = line.trim();
            trimmed.starts_with("#[allow(") && trimmed.contains("dead_code")
        })
        .map(|(index, line)| DeadCodeViolation {
            file_path: file_path.to_string(),
            line_number: index + 1,
            context: line.trim().to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dead_code_detection() {
        let content = r#"
use std::collections::HashMap;

#[allow(dead_code)]
struct UnusedStruct {
    field: u32,
}

#[allow(clippy::too_many_lines, dead_code)]
fn unused_function() {}
"#;

        let violations = scan_source("sample.rs", content);

        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].line_number, 4);
        assert_eq!(violations[1].line_number, 9);
    }

    #[test]
    fn dead_code_enforcement() {
        let mut files = Vec::new();
        for root in SOURCE_ROOTS {
            find_rust_files(Path::new(root), &mut files).expect("Failed to scan sources");
        }
        assert!(!files.is_empty(), "no library sources found");

        let violations: Vec<_> = files
            .iter()
            .flat_map(|path| {
                let content = fs::read_to_string(path).expect("Failed to read source");
                scan_source(&path.to_string_lossy(), &content)
            })
            .collect();

        for violation in &violations {
            println!(
                "{}:{}\n  {}",
                violation.file_path, violation.line_number, violation.context
            );
        }

        assert!(
            violations.is_empty(),
            "Dead code allowances found in library code - see output above"
        );
    }
}
