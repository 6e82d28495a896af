//! POSIX shell quoting for values interpolated into remote commands.

/// Quote `value` for a POSIX shell. Values made only of safe characters are
/// returned unchanged so the common case stays readable in logs.
#[must_use]
pub fn quote(value: &str) -> String {
    let safe = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '_' | '-' | ':' | '=' | '+' | ',' | '@'));
    if safe {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', r"'\''"))
}
