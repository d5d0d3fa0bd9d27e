// Helper functions for safe logging

/// Masks email addresses for safe logging
/// Prevents sensitive data exposure while preserving debugging utility
///
/// # Example
/// ```
/// use auth_plugin::common::safe_email_log;
/// let masked = safe_email_log("user@example.com");
/// assert_eq!(masked, "u***@example.com");
/// ```
pub fn safe_email_log(email: &str) -> String {
    if email.len() > 3 {
        let parts: Vec<&str> = email.split('@').collect();
        if parts.len() == 2 {
            // chars, not bytes: the local part may start with a multi-byte
            // character
            if let Some(first) = parts[0].chars().next() {
                return format!("{}***@{}", first, parts[1]);
            }
        }
    }
    "***@***.***".to_string()
}

/// Masks tokens for safe logging
/// Shows only first and last 4 characters
pub fn safe_token_log(token: &str) -> String {
    let count = token.chars().count();
    if count > 8 {
        let head: String = token.chars().take(4).collect();
        let tail: String = token.chars().skip(count - 4).collect();
        format!("{}...{}", head, tail)
    } else {
        "***".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_masking_keeps_first_char_and_domain() {
        assert_eq!(safe_email_log("user@example.com"), "u***@example.com");
    }

    #[test]
    fn test_email_masking_handles_multibyte_first_char() {
        assert_eq!(safe_email_log("é@x.com"), "é***@x.com");
        assert_eq!(safe_email_log("日本@example.jp"), "日***@example.jp");
    }

    #[test]
    fn test_email_masking_falls_back_on_malformed_input() {
        assert_eq!(safe_email_log(""), "***@***.***");
        assert_eq!(safe_email_log("abc"), "***@***.***");
        assert_eq!(safe_email_log("no-at-sign.example"), "***@***.***");
        assert_eq!(safe_email_log("a@b@c.com"), "***@***.***");
        assert_eq!(safe_email_log("@example.com"), "***@***.***");
    }

    #[test]
    fn test_token_masking_shows_ends_only() {
        assert_eq!(safe_token_log("abcdefghijkl"), "abcd...ijkl");
        assert_eq!(safe_token_log("short"), "***");
    }

    #[test]
    fn test_token_masking_handles_multibyte_input() {
        assert_eq!(safe_token_log("ééééééééé"), "éééé...éééé");
    }
}
