//! HTML escaping helpers.

/// Escape text the way the documentation templates expect.
///
/// Only `&` and `<` are replaced, so already-quoted attribute values and
/// `>` in arrow notation pass through untouched.
#[must_use]
pub fn htmlsafe(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;")
}

/// Escape text for use inside a double-quoted attribute value.
#[must_use]
pub fn escape_attr(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}
