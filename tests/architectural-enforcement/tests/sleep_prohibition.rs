//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code MUST NOT call sleep methods. The resolver
//! moves to the next source as soon as one fails; there is no retry loop
//! and no polling, so no sleep is ever needed.

use architectural_enforcement::{scan_production, SourceLine};

/// Test that production code does not contain sleep() calls
#[test]
fn test_no_sleep_in_production_code() {
    let violations = scan_production(sleep_call);

    if !violations.is_empty() {
        eprintln!("\n❌ CRITICAL: Sleep calls found in production code!\n");

        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }

        eprintln!("\n❌ FORBIDDEN:");
        eprintln!("  - Sleep between fallback steps");
        eprintln!("  - Sleep in polling loops");
        eprintln!("  - Sleep to 'wait' for a remote source (use the HTTP timeout)");

        panic!(
            "\nFound {} sleep violation(s) in production code.\nFix these before merging!",
            violations.len()
        );
    }
}

fn sleep_call(line: &SourceLine<'_>) -> Option<String> {
    (line.code.contains("::sleep(") || line.code.contains(".sleep("))
        .then(|| "Sleep call".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use architectural_enforcement::FnContext;
    use std::path::Path;

    #[test]
    fn test_sleep_detection() {
        let check = |code: &str| {
            sleep_call(&SourceLine {
                path: Path::new("src/resolver.rs"),
                number: 1,
                raw: code,
                code,
                context: FnContext::Async,
            })
        };

        assert!(check("tokio::time::sleep(Duration::from_secs(1)).await;").is_some());
        assert!(check("std::thread::sleep(d);").is_some());
        assert!(check("let timeout = Duration::from_secs(10);").is_none());
    }
}
