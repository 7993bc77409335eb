//! Literal and regex find/replace over a string.
//!
//! A [`Substitution`] is compiled once and can then be applied to any number
//! of texts. Literal mode is a plain substring replace that inserts the
//! template verbatim and cannot fail. Regex mode compiles the search string as-is, decodes `\r`, `\n`
//! and `\t` in the template, and expands capture references:
//!
//! - `$1`..`$99` - numbered groups (the longest reference naming an existing group wins)
//! - `$<name>` - named groups
//! - `$&` - the whole match
//! - `$$` - a literal `$`
//!
//! Any other `$` is kept as a literal character.

use std::borrow::Cow;

use regex::Regex;

/// A search paired with its replacement template, ready to apply.
#[derive(Debug, Clone)]
pub enum Substitution {
    /// Plain substring search; the template is inserted verbatim.
    Literal { search: String, template: String },
    /// Compiled regex; the template is already in `regex` expansion syntax.
    Pattern { regex: Regex, template: String },
}

impl Substitution {
    /// Compiles a substitution.
    ///
    /// Fails only in regex mode, when `search` is not a valid pattern.
    pub fn new(search: &str, template: &str, as_regex: bool) -> Result<Self, regex::Error> {
        if !as_regex {
            return Ok(Self::Literal {
                search: search.to_string(),
                template: template.to_string(),
            });
        }
        let regex = Regex::new(search)?;
        let template = translate_template(&decode_escapes(template), &regex);
        Ok(Self::Pattern { regex, template })
    }

    /// Replaces every match in `text`.
    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        match self {
            Self::Literal { search, template } => {
                if text.contains(search.as_str()) {
                    Cow::Owned(text.replace(search.as_str(), template))
                } else {
                    Cow::Borrowed(text)
                }
            }
            Self::Pattern { regex, template } => regex.replace_all(text, template.as_str()),
        }
    }
}

/// One-shot form of [`Substitution::new`] followed by [`Substitution::apply`].
pub fn substitute(
    text: &str,
    search: &str,
    template: &str,
    as_regex: bool,
) -> Result<String, regex::Error> {
    let substitution = Substitution::new(search, template, as_regex)?;
    Ok(substitution.apply(text).into_owned())
}

/// Decodes the two-character sequences `\r`, `\n` and `\t` into control characters.
pub fn decode_escapes(template: &str) -> String {
    template
        .replace("\\r", "\r")
        .replace("\\n", "\n")
        .replace("\\t", "\t")
}

fn translate_template(template: &str, regex: &Regex) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let (reference, consumed) = translate_reference(after, regex);
        out.push_str(&reference);
        rest = &after[consumed..];
    }
    out.push_str(rest);
    out
}

/// Translates the text following a `$`, returning the replacement and how
/// many bytes of `after` it consumed.
fn translate_reference(after: &str, regex: &Regex) -> (String, usize) {
    let group_count = regex.captures_len();
    match after.chars().next() {
        Some('$') => ("$$".to_string(), 1),
        Some('&') => ("${0}".to_string(), 1),
        Some(c) if c.is_ascii_digit() => {
            let digits: String = after.chars().take_while(char::is_ascii_digit).take(2).collect();
            for len in (1..=digits.len()).rev() {
                if let Ok(n) = digits[..len].parse::<usize>() {
                    if n >= 1 && n < group_count {
                        return (format!("${{{n}}}"), len);
                    }
                }
            }
            ("$$".to_string(), 0)
        }
        Some('<') => {
            if let Some(end) = after.find('>') {
                let name = &after[1..end];
                if regex.capture_names().flatten().any(|n| n == name) {
                    return (format!("${{{name}}}"), end + 1);
                }
            }
            ("$$".to_string(), 0)
        }
        _ => ("$$".to_string(), 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_replace() {
        assert_eq!(substitute("brown fox", "brown", "red", false).unwrap(), "red fox");
    }

    #[test]
    fn literal_search_ignores_metacharacters() {
        assert_eq!(substitute("a.b axb", "a.b", "c", false).unwrap(), "c axb");
        assert_eq!(substitute("f(x) = [1]", "(x)", "(y)", false).unwrap(), "f(y) = [1]");
    }

    #[test]
    fn literal_template_is_verbatim() {
        assert_eq!(substitute("a-b", "-", "$1\\t", false).unwrap(), "a$1\\tb");
    }

    #[test]
    fn replaces_every_match() {
        assert_eq!(substitute("a a a", "a", "b", false).unwrap(), "b b b");
    }

    #[test]
    fn capture_groups() {
        assert_eq!(
            substitute("quick lazy", "(quick|lazy)", "very $1", true).unwrap(),
            "very quick very lazy"
        );
    }

    #[test]
    fn capture_reference_followed_by_word_characters() {
        assert_eq!(substitute("ab", "(a)(b)", "$2x$1y", true).unwrap(), "bxay");
    }

    #[test]
    fn two_digit_reference_falls_back_to_one_digit() {
        assert_eq!(substitute("ab!", "(a)(b)", "$10", true).unwrap(), "a0!");
    }

    #[test]
    fn named_groups_and_whole_match() {
        assert_eq!(
            substitute("key=value", "(?P<k>\\w+)=(?P<v>\\w+)", "$<v>:$<k> [$&]", true).unwrap(),
            "value:key [key=value]"
        );
    }

    #[test]
    fn unknown_references_stay_literal() {
        assert_eq!(substitute("a", "(a)", "$5 $0 $x $$", true).unwrap(), "$5 $0 $x $");
    }

    #[test]
    fn escape_decoding_in_regex_mode() {
        assert_eq!(substitute("A - B", " - ", "\\t", true).unwrap(), "A\tB");
        assert_eq!(substitute("A;B", ";", "\\r\\n", true).unwrap(), "A\r\nB");
    }

    #[test]
    fn invalid_regex_is_an_error() {
        assert!(Substitution::new("(unclosed", "x", true).is_err());
        assert!(Substitution::new("(unclosed", "x", false).is_ok());
    }

    #[test]
    fn long_literal_search_is_plain_text() {
        let search = "(".repeat(100_000);
        let sub = Substitution::new(&search, "x", false).unwrap();
        assert!(matches!(sub, Substitution::Literal { .. }));
        assert_eq!(sub.apply(&format!("a{}b", search)), "axb");
    }

    #[test]
    fn apply_borrows_when_nothing_matches() {
        let sub = Substitution::new("cat", "cow", false).unwrap();
        assert!(matches!(sub.apply("dog"), Cow::Borrowed(_)));
    }
}
