//! Architectural Enforcement Integration Tests
//!
//! Helpers shared by the tests in `tests/`, which enforce:
//! - No blocking I/O inside async functions
//! - No sleep() calls in production code
//!
//! Scanning is line-based. Everything from the first `#[cfg(test)]` line of
//! a file onwards is treated as test code and skipped, as are `//` comments.

use std::fs;
use std::path::{Path, PathBuf};

/// Production source directories, relative to the workspace root
pub const PRODUCTION_DIRS: &[&str] = &["dashboard/core/src", "dashboard/cli/src"];

/// Kind of item a line sits in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FnContext {
    /// Outside any function (imports, statics, impl headers)
    Module,
    /// Inside a plain `fn`
    Sync,
    /// Inside an `async fn`
    Async,
}

/// One production line handed to a check
pub struct SourceLine<'a> {
    /// File the line belongs to
    pub path: &'a Path,
    /// 1-based line number
    pub number: usize,
    /// Full line, for reporting
    pub raw: &'a str,
    /// Line with any trailing `//` comment removed
    pub code: &'a str,
    /// Enclosing function kind
    pub context: FnContext,
}

/// Workspace root, two levels above this crate
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..")
}

/// Whether `line` opens a function, and if so whether it is async
pub fn fn_signature(line: &str) -> Option<bool> {
    let mut rest = line.trim_start();
    loop {
        let stripped = ["pub(crate) ", "pub(super) ", "pub ", "const ", "unsafe "]
            .iter()
            .find_map(|prefix| rest.strip_prefix(prefix));
        match stripped {
            Some(s) => rest = s.trim_start(),
            None => break,
        }
    }

    if rest.starts_with("async fn ") {
        Some(true)
    } else if rest.starts_with("fn ") {
        Some(false)
    } else {
        None
    }
}

/// Kind of function enclosing `lines[current_idx]`
pub fn enclosing_fn(lines: &[&str], current_idx: usize) -> FnContext {
    for i in (0..=current_idx).rev() {
        if let Some(is_async) = fn_signature(lines[i]) {
            return if is_async {
                FnContext::Async
            } else {
                FnContext::Sync
            };
        }

        let line = lines[i].trim_start();
        if i < current_idx
            && (line.starts_with("mod ")
                || line.starts_with("impl ")
                || line.starts_with("impl<")
                || line.starts_with("pub trait ")
                || line.starts_with("trait "))
        {
            return FnContext::Module;
        }
    }
    FnContext::Module
}

/// Lines of `content` before the test module
pub fn production_section(content: &str) -> Vec<&str> {
    content
        .lines()
        .take_while(|line| line.trim() != "#[cfg(test)]")
        .collect()
}

/// Code portion of a line, without a trailing `//` comment
pub fn code_part(line: &str) -> &str {
    line.split("//").next().unwrap_or(line)
}

/// Every `.rs` file under the production directories
pub fn production_files() -> Vec<PathBuf> {
    let root = workspace_root();
    PRODUCTION_DIRS
        .iter()
        .map(|dir| root.join(dir))
        .filter(|dir| dir.exists())
        .flat_map(|dir| {
            walkdir::WalkDir::new(dir)
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
                .map(|e| e.into_path())
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Run `check` over every production line, collecting violation messages
pub fn scan_production<F>(check: F) -> Vec<String>
where
    F: Fn(&SourceLine<'_>) -> Option<String>,
{
    let mut violations = Vec::new();

    for path in production_files() {
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        let lines = production_section(&content);

        for (idx, raw) in lines.iter().enumerate() {
            let line = SourceLine {
                path: &path,
                number: idx + 1,
                raw,
                code: code_part(raw),
                context: enclosing_fn(&lines, idx),
            };
            if let Some(message) = check(&line) {
                violations.push(format!(
                    "{}:{} - {}: {}",
                    path.display(),
                    line.number,
                    message,
                    raw.trim()
                ));
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fn_signature() {
        assert_eq!(fn_signature("    pub async fn fetch(&self) {"), Some(true));
        assert_eq!(fn_signature("pub(crate) fn parse() {"), Some(false));
        assert_eq!(fn_signature("fn main() {"), Some(false));
        assert_eq!(fn_signature("    let f = fetch();"), None);
    }

    #[test]
    fn test_enclosing_fn() {
        let code = vec![
            "use std::path::Path;",
            "impl Store {",
            "    pub async fn read(&self) {",
            "        let x = std::fs::read(\"a\");",
            "    }",
            "    pub fn load() {",
            "        let y = std::fs::read(\"b\");",
            "    }",
            "}",
        ];
        assert_eq!(enclosing_fn(&code, 0), FnContext::Module);
        assert_eq!(enclosing_fn(&code, 3), FnContext::Async);
        assert_eq!(enclosing_fn(&code, 6), FnContext::Sync);
    }

    #[test]
    fn test_production_section_stops_at_tests() {
        let content = "fn a() {}\n#[cfg(test)]\nmod tests {}\n";
        assert_eq!(production_section(content), vec!["fn a() {}"]);
    }

    #[test]
    fn test_production_files_found() {
        let files = production_files();
        assert!(files.iter().any(|p| p.ends_with("resolver.rs")));
        assert!(files.iter().any(|p| p.ends_with("main.rs")));
    }
}
