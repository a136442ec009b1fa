//! Removal of storage-unsafe control characters.

/// Strip every carriage return, form feed, and NUL from `text`.
///
/// Diff and blame output can carry `\r` and `\f` from files with foreign
/// line endings, and `\0` from partially binary content; all three break
/// downstream persistence. Nothing else is altered, and the function is
/// idempotent.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '\r' | '\x0C' | '\0'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_cr_ff_and_nul() {
        assert_eq!(sanitize("a\rb\x0Cc\0d"), "abcd");
    }

    #[test]
    fn preserves_everything_else() {
        let text = "diff --git a/f b/f\n+añadido\t42\n";
        assert_eq!(sanitize(text), text);
    }

    #[test]
    fn is_idempotent() {
        let once = sanitize("x\r\n\0y\x0C");
        assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn empty_input() {
        assert_eq!(sanitize(""), "");
    }
}
