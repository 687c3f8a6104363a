//! Content safety guardrails.
//!
//! Standalone text filter, independent of the orchestration pipeline:
//! validates author names before a run starts and scans generated reports for
//! personal information or inappropriate content.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Serialize)]
pub struct SafetyViolation {
    pub severity: Severity,
    pub category: &'static str,
    pub description: String,
    /// The matched fragment, used for redaction.
    pub location: String,
}

fn pii_patterns() -> &'static Vec<Regex> {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"\b\d{3}-\d{2}-\d{4}\b",                            // SSN
            r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b", // email
            r"\b\d{4}[\s-]?\d{4}[\s-]?\d{4}[\s-]?\d{4}\b",        // credit card
            r"\b\(\d{3}\)\s?\d{3}-?\d{4}\b",                      // phone
        ]
        .iter()
        .map(|p| Regex::new(p).expect("static pattern"))
        .collect()
    })
}

fn inappropriate_patterns() -> &'static Vec<Regex> {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"(?i)\b(?:hate|violent|explicit|offensive)\b",
            r"(?i)\b(?:discriminat|racist|sexist)\w*\b",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("static pattern"))
        .collect()
    })
}

/// Validate an author name before starting a pipeline run.
///
/// Returns a cleaned-up name or a human-readable rejection reason.
pub fn validate_author_name(author_name: &str) -> Result<String, String> {
    let clean: String = author_name.split_whitespace().collect::<Vec<_>>().join(" ");

    if clean.is_empty() {
        return Err("Author name cannot be empty".to_string());
    }
    if clean.len() < 2 {
        return Err("Author name too short".to_string());
    }
    if clean.len() > 100 {
        return Err("Author name too long".to_string());
    }

    static NAME_RE: OnceLock<Regex> = OnceLock::new();
    let name_re = NAME_RE.get_or_init(|| Regex::new(r"^[A-Za-z\s.\-']+$").expect("static pattern"));
    if !name_re.is_match(&clean) {
        return Err("Author name contains invalid characters".to_string());
    }

    const REJECTED: &[&str] = &["test", "testing", "admin", "null", "undefined"];
    if REJECTED.contains(&clean.to_lowercase().as_str()) {
        return Err("Invalid author name".to_string());
    }

    Ok(clean)
}

/// Scan generated content for safety issues. Returns (is_safe, violations);
/// content is unsafe when a critical violation or more than one high-severity
/// violation is present.
pub fn validate_content(content: &str) -> (bool, Vec<SafetyViolation>) {
    let mut violations = Vec::new();

    for re in pii_patterns() {
        for m in re.find_iter(content) {
            violations.push(SafetyViolation {
                severity: Severity::High,
                category: "personal_info",
                description: format!("Personal information detected: {}...", &m.as_str()[..m.as_str().len().min(3)]),
                location: m.as_str().to_string(),
            });
        }
    }

    for re in inappropriate_patterns() {
        for m in re.find_iter(content) {
            violations.push(SafetyViolation {
                severity: Severity::Medium,
                category: "inappropriate_content",
                description: format!("Potentially inappropriate content detected: '{}'", m.as_str()),
                location: m.as_str().to_string(),
            });
        }
    }

    if content.trim().len() < 100 && !content.trim().is_empty() {
        violations.push(SafetyViolation {
            severity: Severity::Low,
            category: "content_quality",
            description: "Content appears too brief for meaningful literary analysis".to_string(),
            location: String::new(),
        });
    }

    let critical = violations.iter().filter(|v| v.severity == Severity::Critical).count();
    let high = violations.iter().filter(|v| v.severity == Severity::High).count();
    let is_safe = critical == 0 && high <= 1;

    if !violations.is_empty() {
        warn!(count = violations.len(), "content safety check found violations");
    }

    (is_safe, violations)
}

/// Redact personal information found by [`validate_content`].
pub fn sanitize_content(content: &str, violations: &[SafetyViolation]) -> String {
    let mut sanitized = content.to_string();
    if violations.iter().any(|v| v.category == "personal_info") {
        for re in pii_patterns() {
            sanitized = re.replace_all(&sanitized, "[REDACTED]").into_owned();
        }
    }
    sanitized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_author_names() {
        assert_eq!(validate_author_name("Ursula K. Le Guin").unwrap(), "Ursula K. Le Guin");
        assert_eq!(validate_author_name("  Gabriel   García ").is_err(), true); // non-ASCII letter
        assert_eq!(validate_author_name("Jean-Paul Sartre").unwrap(), "Jean-Paul Sartre");
        assert_eq!(validate_author_name("O'Connor").unwrap(), "O'Connor");
    }

    #[test]
    fn rejects_bad_author_names() {
        assert!(validate_author_name("").is_err());
        assert!(validate_author_name("   ").is_err());
        assert!(validate_author_name("x").is_err());
        assert!(validate_author_name(&"a".repeat(120)).is_err());
        assert!(validate_author_name("test").is_err());
        assert!(validate_author_name("Robert'); DROP TABLE;").is_err());
    }

    #[test]
    fn collapses_internal_whitespace() {
        assert_eq!(validate_author_name("Virginia    Woolf").unwrap(), "Virginia Woolf");
    }

    #[test]
    fn detects_pii_and_redacts_it() {
        let text = format!(
            "A long discussion of the author's published novels and literary style. {}",
            "Contact: someone@example.com for more on the novelist's archive and papers."
        );
        let (is_safe, violations) = validate_content(&text);
        assert!(is_safe); // single high-severity finding is tolerated
        assert!(violations.iter().any(|v| v.category == "personal_info"));

        let sanitized = sanitize_content(&text, &violations);
        assert!(!sanitized.contains("someone@example.com"));
        assert!(sanitized.contains("[REDACTED]"));
    }

    #[test]
    fn clean_literary_content_passes() {
        let text = "A thorough analysis of the author's narrative style, recurring themes, \
                    and place within the modernist movement, drawing on published criticism.";
        let (is_safe, violations) = validate_content(text);
        assert!(is_safe);
        assert!(violations.is_empty());
    }

    #[test]
    fn short_content_gets_quality_warning() {
        let (_, violations) = validate_content("Too short.");
        assert!(violations.iter().any(|v| v.category == "content_quality"));
    }
}
