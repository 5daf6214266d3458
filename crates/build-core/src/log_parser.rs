//! Protocol between the build container and the controller.
//!
//! The container announces success with exactly one stdout line:
//!
//! ```text
//! build.danopia.net digest=<digest>
//! ```
//!
//! `<digest>` is a single non-whitespace token. A succeeded job whose log has
//! no such line is a contract violation, not a user error.

use once_cell::sync::Lazy;
use regex::Regex;

pub const DIGEST_MARKER_PREFIX: &str = "build.danopia.net digest=";

/// Lines kept from a failed build's log.
pub const LOG_SNIPPET_LINES: usize = 25;

static DIGEST_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^build\.danopia\.net digest=(\S+)$").expect("digest marker pattern is valid")
});

/// Finds the image digest announced by the first marker line.
pub fn extract_digest(log: &str) -> Option<&str> {
    log.lines().find_map(|line| {
        DIGEST_MARKER
            .captures(line.trim_end())
            .and_then(|caps| caps.get(1))
            .map(|digest| digest.as_str())
    })
}

/// Last `LOG_SNIPPET_LINES` lines of a log, newline-joined.
pub fn log_snippet(log: &str) -> String {
    let log = log.strip_suffix('\n').unwrap_or(log);
    let lines: Vec<&str> = log.split('\n').collect();
    let skip = lines.len().saturating_sub(LOG_SNIPPET_LINES);

    lines[skip..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_digest_marker() {
        let log = "\
+ buildah bud -t rg.example/app .
STEP 1/3: FROM alpine
+ buildah push --digestfile digestfile -- rg.example/app
++ cat digestfile
+ echo 'build.danopia.net digest=sha256:deadbeef'
build.danopia.net digest=sha256:deadbeef
";

        assert_eq!(extract_digest(log), Some("sha256:deadbeef"));
    }

    #[test]
    fn test_marker_must_be_a_whole_line() {
        for log in [
            "+ echo build.danopia.net digest=sha256:a",
            "build.danopia.net digest=",
            "build.danopia.net digest=sha256:a extra",
            "no marker here\n",
        ] {
            assert_eq!(extract_digest(log), None);
        }
    }

    #[test]
    fn test_marker_tolerates_crlf() {
        assert_eq!(
            extract_digest("line\r\nbuild.danopia.net digest=sha256:c\r\n"),
            Some("sha256:c")
        );
    }

    #[test]
    fn test_snippet_keeps_last_lines() {
        let log: String = (1..=40).map(|i| format!("line {i}\n")).collect();
        let snippet = log_snippet(&log);
        let lines: Vec<&str> = snippet.lines().collect();

        assert_eq!(lines.len(), 25);
        assert_eq!(lines.first(), Some(&"line 16"));
        assert_eq!(lines.last(), Some(&"line 40"));
    }

    #[test]
    fn test_snippet_of_short_log_is_whole_log() {
        assert_eq!(log_snippet("a\nb"), "a\nb");
        assert_eq!(log_snippet(""), "");
    }
}
