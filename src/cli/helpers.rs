//! Shared helper functions for CLI commands
//!
//! This module contains utility functions that are used across multiple
//! command modules to avoid code duplication.

use console::style;
use miette::Result;

use crate::cli::GlobalOpts;
use crate::core::validation::ValidationErrors;
use crate::core::workspace::Session;

/// Open the workspace named by `--workspace`, else the one around the cwd
pub fn open_session(global: &GlobalOpts) -> Result<Session> {
    Session::open(global.workspace.as_deref()).map_err(|e| miette::miette!("{}", e))
}

/// Write the session back to `.prodcfg/`
pub fn save_session(session: &Session) -> Result<()> {
    session.save().map_err(|e| miette::miette!("{}", e))
}

/// Format a string ID for display, truncating if too long
///
/// Generated ids (`proj-<ULID>`) are 31 characters; they are shortened to
/// their prefix plus the first eight ULID characters.
pub fn format_short_id_str(id: &str) -> String {
    if id.chars().count() > 16 {
        let head: String = id.chars().take(13).collect();
        format!("{}...", head)
    } else {
        id.to_string()
    }
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

/// Print field errors and turn them into a diagnostic
pub fn report_validation(errors: ValidationErrors) -> miette::Report {
    for (field, message) in errors.fields() {
        eprintln!("  {} {}: {}", style("✗").red(), style(field).bold(), message);
    }
    miette::miette!("{}", errors)
}

/// Fall back to a dash for empty display values
pub fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_short_id_str() {
        assert_eq!(format_short_id_str("proj-001"), "proj-001");
        let long = "proj-01HQ3K4N5M6P7Q8R9S0T1V2W3X";
        let short = format_short_id_str(long);
        assert_eq!(short, "proj-01HQ3K4N...");
        assert_eq!(short.len(), 16);
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("short", 10), "short");
        assert_eq!(truncate_str("this is a long string", 10), "this is...");
    }

    #[test]
    fn test_truncate_str_multibyte() {
        assert_eq!(truncate_str("Überwachungsmodul", 8), "Überw...");
    }

    #[test]
    fn test_or_dash() {
        assert_eq!(or_dash(""), "-");
        assert_eq!(or_dash("TBD"), "TBD");
    }
}
