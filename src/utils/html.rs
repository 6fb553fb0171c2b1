//! Helpers for Telegram's HTML parse mode.
//!
//! Only `<`, `>` and `&` need escaping there, so user text such as plant
//! names can be embedded without mangling punctuation.

/// Escapes text for Telegram HTML parse mode.
///
/// # Example
/// ```
/// use watering_reminder_bot::utils::html::escape_html;
///
/// assert_eq!(escape_html("Fern <big> & small"), "Fern &lt;big&gt; &amp; small");
/// ```
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Wraps text in a `<code>` block, escaping it first.
pub fn code(text: &str) -> String {
    format!("<code>{}</code>", escape_html(text))
}

/// Wraps text in `<b>`, escaping it first.
pub fn bold(text: &str) -> String {
    format!("<b>{}</b>", escape_html(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_special_characters() {
        assert_eq!(escape_html("a < b"), "a &lt; b");
        assert_eq!(escape_html("a > b"), "a &gt; b");
        assert_eq!(escape_html("salt & pepper"), "salt &amp; pepper");
    }

    #[test]
    fn test_escape_leaves_markdown_characters_alone() {
        assert_eq!(escape_html("Ficus *big* (kitchen) - #1!"), "Ficus *big* (kitchen) - #1!");
        assert_eq!(escape_html(""), "");
    }

    #[test]
    fn test_wrappers() {
        assert_eq!(code("ABC234"), "<code>ABC234</code>");
        assert_eq!(bold("<Fern>"), "<b>&lt;Fern&gt;</b>");
    }
}
