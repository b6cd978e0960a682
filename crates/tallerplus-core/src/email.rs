//! Email shape check.
//!
//! Accepts exactly the strings matched by `^[\w.-]+@[\w.-]+\.\w+$`, where
//! `\w` is a Unicode word character (alphanumeric or `_`). This is a shape
//! check, not RFC 5322 validation.

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_word_dot_dash(c: char) -> bool {
    is_word(c) || c == '.' || c == '-'
}

/// Return `true` if `email` has the `local@domain.tld` shape.
///
/// The top-level label is whatever follows the last `.` of the domain part;
/// it must be non-empty and contain only word characters.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || !local.chars().all(is_word_dot_dash) {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty()
        && host.chars().all(is_word_dot_dash)
        && !tld.is_empty()
        && tld.chars().all(is_word)
}
