//! Markup neutralization for single text values.
//!
//! Two policies are supported:
//! - [`MarkupPolicy::Reject`]: any `<...>` sequence rejects the whole value.
//! - [`MarkupPolicy::StripScripts`]: `<script>` blocks are removed, other markup is kept.
//!   A value that still yields script tags after [`MAX_STRIP_PASSES`] removal
//!   passes is rejected instead.
//!
//! Both are idempotent: feeding a sanitized value back in returns it unchanged.
//! Both run in time linear in the input length.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Any `<...>` sequence, newlines included.
static MARKUP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// A complete `<script ...> ... </script>` block.
static SCRIPT_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script(?-u:\b)[^>]*>.*?</script\s*>").unwrap());

/// Dangling opening or closing script tags left without a partner.
static SCRIPT_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?script(?-u:\b)[^>]*>").unwrap());

/// Each pass peels one layer of split payloads like `<scr<script>ipt>`.
/// Honest text never needs more than one.
pub const MAX_STRIP_PASSES: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupPolicy {
    /// Strict mode.
    Reject,
    /// Permissive mode.
    StripScripts,
}

/// Outcome of sanitizing one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sanitized<'a> {
    Clean(Cow<'a, str>),
    Rejected,
}

/// True if the value holds anything that looks like a tag.
pub fn contains_markup(input: &str) -> bool {
    MARKUP_RE.is_match(input)
}

/// Remove script blocks and stray script tags.
///
/// Removal can reassemble a live tag out of a split payload such as
/// `<scr<script></script>ipt>`, so passes repeat until no script tag is left.
/// Returns `None` when tags keep reappearing after [`MAX_STRIP_PASSES`].
pub fn strip_scripts(input: &str) -> Option<Cow<'_, str>> {
    if !SCRIPT_TAG_RE.is_match(input) {
        return Some(Cow::Borrowed(input));
    }
    let mut current = input.to_owned();
    for _ in 0..MAX_STRIP_PASSES {
        current = SCRIPT_TAG_RE
            .replace_all(&SCRIPT_BLOCK_RE.replace_all(&current, ""), "")
            .into_owned();
        if !SCRIPT_TAG_RE.is_match(&current) {
            return Some(Cow::Owned(current));
        }
    }
    None
}

/// Apply `policy` to `input`.
pub fn sanitize(input: &str, policy: MarkupPolicy) -> Sanitized<'_> {
    match policy {
        MarkupPolicy::Reject if contains_markup(input) => Sanitized::Rejected,
        MarkupPolicy::Reject => Sanitized::Clean(Cow::Borrowed(input)),
        MarkupPolicy::StripScripts => match strip_scripts(input) {
            Some(cleaned) => Sanitized::Clean(cleaned),
            None => Sanitized::Rejected,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn nested_payload(depth: usize) -> String {
        format!("{}<script>{}", "<scr".repeat(depth), "ipt>".repeat(depth))
    }

    fn permissive(input: &str) -> String {
        match sanitize(input, MarkupPolicy::StripScripts) {
            Sanitized::Clean(v) => v.into_owned(),
            Sanitized::Rejected => panic!("{input:?} was rejected"),
        }
    }

    #[test]
    fn strict_rejects_any_tag() {
        for input in [
            "<b>bold</b>",
            "<script>alert(1)</script>",
            "level <0>",
            "<img src=x onerror=alert(1)>",
            "multi\n<div\nclass=\"x\">line",
        ] {
            assert_eq!(sanitize(input, MarkupPolicy::Reject), Sanitized::Rejected, "{input}");
        }
    }

    #[test]
    fn strict_passes_plain_text_untouched() {
        let input = "Level 0: the lobby, 3 < 4 is fine";
        assert_eq!(
            sanitize(input, MarkupPolicy::Reject),
            Sanitized::Clean(Cow::Borrowed(input))
        );
    }

    #[test]
    fn permissive_removes_only_script_blocks() {
        assert_eq!(permissive("<script>alert(1)</script>safe"), "safe");
        assert_eq!(
            permissive("<p>Texto seguro</p><script>alert('x');</script><p>Más texto</p>"),
            "<p>Texto seguro</p><p>Más texto</p>"
        );
        assert_eq!(permissive("<b>keep</b>"), "<b>keep</b>");
    }

    #[test]
    fn permissive_handles_case_attributes_and_newlines() {
        assert_eq!(
            permissive("a<SCRIPT type=\"text/javascript\">\nsteal()\n</Script >b"),
            "ab"
        );
    }

    #[test]
    fn permissive_drops_dangling_script_tags() {
        assert_eq!(permissive("before<script src=//evil>after"), "beforeafter");
        assert_eq!(permissive("text</script>"), "text");
    }

    #[test]
    fn permissive_does_not_reassemble_split_payloads() {
        let out = permissive("<scr<script>x</script>ipt>alert(1)</script>");
        assert!(!out.to_ascii_lowercase().contains("<script"), "{out}");
    }

    #[test]
    fn shallow_nesting_is_peeled_away() {
        assert_eq!(permissive(&format!("a{}b", nested_payload(2))), "ab");
    }

    #[test]
    fn deep_nesting_is_rejected_in_linear_time() {
        let input = nested_payload(50_000);
        let started = Instant::now();
        assert_eq!(
            sanitize(&input, MarkupPolicy::StripScripts),
            Sanitized::Rejected
        );
        let elapsed = started.elapsed();
        assert!(elapsed < Duration::from_secs(2), "took {elapsed:?}");
    }

    #[test]
    fn sanitize_is_idempotent() {
        let inputs = [
            "",
            "plain",
            "<script>alert(1)</script>safe",
            "<scr<script>x</script>ipt>alert(1)</script>",
            "<i>x</i><script>y",
        ];
        for input in inputs {
            let once = permissive(input);
            assert_eq!(permissive(&once), once, "{input}");

            let strict_once = sanitize(input, MarkupPolicy::Reject);
            if let Sanitized::Clean(v) = &strict_once {
                assert_eq!(sanitize(v, MarkupPolicy::Reject), strict_once);
            }
        }
    }
}
