//! Message formatting for the command-line layer.

/// Prefix a message the way the CLI reports failures.
pub fn error_message(msg: impl AsRef<str>) -> String {
    format!("ERROR: {}", msg.as_ref())
}

/// Print a non-fatal finding to stderr.
pub fn warn(msg: impl AsRef<str>) {
    eprintln!("WARN: {}", msg.as_ref());
}
