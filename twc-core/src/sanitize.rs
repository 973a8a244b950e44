//! Resource-part sanitizing.
//!
//! [`clean_part`] is a blunt denylist filter: it strips a fixed set of
//! markup fragments and their URL-encoded forms. It does not make an
//! arbitrary string a safe path segment.

/// Fragments removed by [`clean_part`], applied one after another in this order.
///
/// `<!--` must come before `<`, and `-->` before `>`.
pub const BAD_SYMBOLS: &[&str] = &[
    "<!--", "-->", "<", ">", "\"", "'", "&", "$", "=", ";", "?", "/",
    "%22",
    "%3c",   // <
    "%253c", // <
    "%3e",   // >
    "%0e",   // >
    "%28",   // (
    "%29",   // )
    "%2528", // (
    "%26",   // &
    "%24",   // $
    "%3f",   // ?
    "%3b",   // ;
    "%3d",   // =
];

/// Strip every [`BAD_SYMBOLS`] entry, then un-escape backslash sequences.
pub fn clean_part(text: &str) -> String {
    let stripped = BAD_SYMBOLS
        .iter()
        .fold(text.to_string(), |acc, bad| acc.replace(bad, ""));

    strip_slashes(&stripped)
}

/// Replace literal spaces with `%20`. Nothing else is encoded.
pub fn escape_spaces(text: &str) -> String {
    text.replace(' ', "%20")
}

/// `\x` becomes `x`, `\\` becomes `\`, `\0` becomes NUL, a trailing lone `\` is dropped.
fn strip_slashes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('0') => out.push('\0'),
                Some(next) => out.push(next),
                None => {}
            }
        } else {
            out.push(c);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_part_strips_script_markup() {
        let cleaned = clean_part(r#"<script>alert("x")</script>"#);
        assert_eq!(cleaned, "scriptalert(x)script");
        for bad in ["<", ">", "\"", "/"] {
            assert!(!cleaned.contains(bad));
        }
    }

    #[test]
    fn clean_part_strips_comments_before_brackets() {
        assert_eq!(clean_part("ab<!--c-->d"), "abcd");
    }

    #[test]
    fn clean_part_strips_encoded_fragments() {
        assert_eq!(clean_part("%3cLondon%3e%28UK%29%26%24%3f%3b%3d%22"), "LondonUK");
        assert_eq!(clean_part("%253cx%2528y"), "xy");
    }

    #[test]
    fn clean_part_strips_query_metacharacters() {
        assert_eq!(clean_part("UKXX0085?apikey=evil&x=1;$y/z'"), "UKXX0085apikeyevilx1yz");
    }

    #[test]
    fn clean_part_leaves_plain_ids_alone() {
        assert_eq!(clean_part("UKXX0085"), "UKXX0085");
        assert_eq!(clean_part("New York"), "New York");
    }

    #[test]
    fn clean_part_unescapes_backslashes() {
        assert_eq!(clean_part(r"O\'Hare"), "OHare");
        assert_eq!(clean_part(r"a\bc"), "abc");
        assert_eq!(clean_part(r"a\\b"), r"a\b");
        assert_eq!(clean_part(r"end\"), "end");
        assert_eq!(clean_part(r"a\0b"), "a\0b");
    }

    #[test]
    fn escape_spaces_only_touches_spaces() {
        assert_eq!(escape_spaces("New York"), "New%20York");
        assert_eq!(escape_spaces(" a  b "), "%20a%20%20b%20");
        assert_eq!(escape_spaces("a+b%2Cc"), "a+b%2Cc");
    }
}
