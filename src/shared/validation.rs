use lazy_static::lazy_static;
use regex::Regex;
use std::borrow::Cow;
use validator::ValidationError;

lazy_static! {
    /// Regex for validating email fields: `local@domain.tld` shape.
    /// - Valid: "jean@example.com", "a.b@sub.domain.fr"
    /// - Invalid: "jean@example", "jean example@x.fr", "@example.com"
    pub static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();

    /// Matches `<script>...</script>` segments (case-insensitive, spans newlines)
    /// so submitted text can be stored without embedded script markup.
    static ref SCRIPT_TAG_REGEX: Regex = Regex::new(r"(?is)<script\b.*?</script>").unwrap();
}

/// Trim a user-supplied text field and strip `<script>` segments.
///
/// This is defense-in-depth against stored markup, not a substitute for
/// output encoding in whatever renders the value.
pub fn sanitize_text(input: &str) -> String {
    SCRIPT_TAG_REGEX.replace_all(input.trim(), "").into_owned()
}

/// Like [`sanitize_text`], but maps blank results to None
pub fn sanitize_optional(input: Option<&str>) -> Option<String> {
    input
        .map(sanitize_text)
        .filter(|s| !s.is_empty())
}

/// validator hook: reject whitespace-only required fields
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("not_blank");
        err.message = Some(Cow::from("must not be blank"));
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_regex_accepts_standard_shapes() {
        assert!(EMAIL_REGEX.is_match("jean@example.com"));
        assert!(EMAIL_REGEX.is_match("laurent.tubocom@gmail.com"));
        assert!(EMAIL_REGEX.is_match("a+b@sub.domain.fr"));
    }

    #[test]
    fn email_regex_rejects_malformed_addresses() {
        assert!(!EMAIL_REGEX.is_match("jean@example")); // missing tld
        assert!(!EMAIL_REGEX.is_match("jean example@x.fr")); // whitespace
        assert!(!EMAIL_REGEX.is_match("@example.com")); // empty local part
        assert!(!EMAIL_REGEX.is_match("jean@")); // empty domain
        assert!(!EMAIL_REGEX.is_match("")); // empty
    }

    #[test]
    fn sanitize_strips_script_segments() {
        assert_eq!(
            sanitize_text("hello <script>alert(1)</script>world"),
            "hello world"
        );
        assert_eq!(
            sanitize_text("<script type=\"text/javascript\">x()</script>ok"),
            "ok"
        );
        // Case-insensitive, spans newlines
        assert_eq!(sanitize_text("<SCRIPT>\nevil()\n</SCRIPT>safe"), "safe");
    }

    #[test]
    fn sanitize_strips_multiple_segments() {
        assert_eq!(
            sanitize_text("a<script>1</script>b<script>2</script>c"),
            "abc"
        );
    }

    #[test]
    fn sanitize_trims_whitespace() {
        assert_eq!(sanitize_text("  Jean Dupont  "), "Jean Dupont");
    }

    #[test]
    fn sanitize_leaves_plain_text_alone() {
        assert_eq!(
            sanitize_text("Besoin d'une mini-pelle 2,5t"),
            "Besoin d'une mini-pelle 2,5t"
        );
    }

    #[test]
    fn sanitize_optional_drops_blank_values() {
        assert_eq!(sanitize_optional(Some("   ")), None);
        assert_eq!(sanitize_optional(Some(" x ")), Some("x".to_string()));
        assert_eq!(sanitize_optional(None), None);
    }

    #[test]
    fn not_blank_rejects_whitespace_only() {
        assert!(not_blank("  ").is_err());
        assert!(not_blank("").is_err());
        assert!(not_blank("x").is_ok());
    }
}
