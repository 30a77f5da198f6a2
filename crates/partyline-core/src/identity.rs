//! Identity labels for chat participants.
//!
//! The protocol carries no authentication, so a participant's label is
//! purely cosmetic. By default both sides label themselves after the
//! platform they run on.

/// Returns a human-readable label for the current platform.
///
/// Unrecognized platforms fall back to the raw `std::env::consts::OS`
/// value rather than an empty label.
pub fn os_label() -> &'static str {
    match std::env::consts::OS {
        "linux" => "Linux",
        "macos" => "macOS",
        "windows" => "Windows",
        other => other,
    }
}

/// Prefixes `line` with the sender's label.
///
/// # Arguments
///
/// * `label` - The sender's display label
/// * `line` - The message text, without a trailing newline
pub fn tag_line(label: &str, line: &str) -> String {
    format!("{label}: {line}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_line_prefixes_label() {
        assert_eq!(tag_line("Linux", "hello"), "Linux: hello");
    }

    #[test]
    fn tag_line_keeps_message_verbatim() {
        assert_eq!(tag_line("host", "a: b: c"), "host: a: b: c");
        assert_eq!(tag_line("host", ""), "host: ");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn os_label_matches_platform() {
        assert_eq!(os_label(), "Linux");
    }
}
