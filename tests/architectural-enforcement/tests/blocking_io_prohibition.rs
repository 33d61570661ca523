//! Integration Test: Blocking I/O Prohibition
//!
//! **Policy**: Async code in the dashboard crates MUST NOT use blocking I/O.
//! **Required**: Use `tokio::fs` and async `reqwest`, not `std::fs`, `std::net`
//! or `reqwest::blocking`.
//!
//! Blocking calls are tolerated in plain functions that run before the
//! runtime matters (configuration loading) and in test code.

use architectural_enforcement::{scan_production, FnContext, SourceLine};

/// Test that async production code does not use blocking I/O
#[test]
fn test_no_blocking_io_in_production_code() {
    let violations = scan_production(blocking_io);

    if !violations.is_empty() {
        eprintln!("\n❌ CRITICAL: Blocking I/O calls found in async code!\n");

        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }

        eprintln!("\n❌ FORBIDDEN in async code:");
        eprintln!("  - std::fs::read_to_string(), std::fs::write(), std::fs::File");
        eprintln!("  - std::net::TcpStream, std::net::TcpListener");
        eprintln!("  - std::io::stdin()");
        eprintln!("  - reqwest::blocking::* (anywhere)");
        eprintln!("\n✅ REQUIRED async I/O:");
        eprintln!("  - tokio::fs::read_to_string().await, tokio::fs::write().await");
        eprintln!("  - reqwest::Client::get().send().await");

        panic!(
            "\nFound {} blocking I/O violation(s) in production code.\nFix these before merging!",
            violations.len()
        );
    }
}

fn blocking_io(line: &SourceLine<'_>) -> Option<String> {
    let code = line.code;

    if code.contains("reqwest::blocking") {
        return Some("Blocking HTTP client".to_string());
    }

    // Imports make blocking calls easy to reach from any function
    if line.context == FnContext::Module
        && (code.contains("use std::fs") || code.contains("use std::net"))
    {
        return Some("Blocking I/O import".to_string());
    }

    if line.context != FnContext::Async {
        return None;
    }

    if code.contains("std::fs::") {
        Some("Blocking file I/O in async fn".to_string())
    } else if code.contains("std::net::") {
        Some("Blocking network I/O in async fn".to_string())
    } else if code.contains("std::io::stdin()") {
        Some("Blocking stdin in async fn".to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn line<'a>(code: &'a str, context: FnContext) -> SourceLine<'a> {
        SourceLine {
            path: Path::new("src/lib.rs"),
            number: 1,
            raw: code,
            code,
            context,
        }
    }

    #[test]
    fn test_blocking_io_detection() {
        let read = "    let body = std::fs::read_to_string(&path)?;";
        assert!(blocking_io(&line(read, FnContext::Async)).is_some());
        // Plain functions may block (config loading happens before any fetch)
        assert!(blocking_io(&line(read, FnContext::Sync)).is_none());
    }

    #[test]
    fn test_blocking_client_always_flagged() {
        let client = "    let c = reqwest::blocking::Client::new();";
        assert!(blocking_io(&line(client, FnContext::Sync)).is_some());
    }

    #[test]
    fn test_async_io_allowed() {
        let read = "    let body = tokio::fs::read_to_string(&path).await?;";
        assert!(blocking_io(&line(read, FnContext::Async)).is_none());
    }
}
