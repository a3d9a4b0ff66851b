use std::borrow::Cow;
use std::fmt;
use std::ops::Range;

use regex_automata::meta::Regex;
use regex_automata::{Input, MatchKind};

use crate::error::BuildError;

/// IPv4 dotted-quad pattern.
///
/// Each octet accepts 0-255 with at most three digits:
/// - 25[0-5]            matches 250-255
/// - (2[0-4]|1?[0-9])?[0-9] matches 0-249
///
/// The pattern is unanchored. Rejecting candidates that are part of a longer
/// digit run (`999.1.1.1`, `1.2.3.4.5`) happens in `ipv4_boundary`, since the
/// regex engine has no look-around.
static IPV4_PATTERN: &str = r"(?x)
  (?:
    (?:25[0-5]|(?:2[0-4]|1?[0-9])?[0-9])  \.
    (?:25[0-5]|(?:2[0-4]|1?[0-9])?[0-9])  \.
    (?:25[0-5]|(?:2[0-4]|1?[0-9])?[0-9])  \.
    (?:25[0-5]|(?:2[0-4]|1?[0-9])?[0-9])
  )
";

/// IPv6 pattern covering the full textual grammar.
///
/// Alternatives are tried in order at each start position and the first one
/// that succeeds wins, so they are listed from the most specific to the most
/// general. Among the `::` forms, those allowing more groups after the `::`
/// come first; otherwise `2001:db8::8a2e:370:7334` would stop at
/// `2001:db8::8a2e`.
static IPV6_PATTERN: &str = r"(?x)
  (?:
    # Link-local with zone index: fe80::1%eth0
    fe80:(?::[0-9a-fA-F]{0,4}){0,4}%[0-9a-zA-Z]+
  |
    # IPv4-mapped / IPv4-compatible: ::ffff:192.0.2.1, ::ffff:0:192.0.2.1, ::192.0.2.1
    ::(?:ffff(?::0{1,4})?:)?
    (?:(?:25[0-5]|(?:2[0-4]|1?[0-9])?[0-9])\.){3}
    (?:25[0-5]|(?:2[0-4]|1?[0-9])?[0-9])
  |
    # IPv4-embedded: 64:ff9b::192.0.2.33
    (?:[0-9a-fA-F]{1,4}:){1,4}:
    (?:(?:25[0-5]|(?:2[0-4]|1?[0-9])?[0-9])\.){3}
    (?:25[0-5]|(?:2[0-4]|1?[0-9])?[0-9])
  |
    # Full form, eight groups
    (?:[0-9a-fA-F]{1,4}:){7}[0-9a-fA-F]{1,4}
  |
    # Compressed forms, most trailing groups first
    [0-9a-fA-F]{1,4}:(?::[0-9a-fA-F]{1,4}){1,6}
  |
    (?:[0-9a-fA-F]{1,4}:){1,2}(?::[0-9a-fA-F]{1,4}){1,5}
  |
    (?:[0-9a-fA-F]{1,4}:){1,3}(?::[0-9a-fA-F]{1,4}){1,4}
  |
    (?:[0-9a-fA-F]{1,4}:){1,4}(?::[0-9a-fA-F]{1,4}){1,3}
  |
    (?:[0-9a-fA-F]{1,4}:){1,5}(?::[0-9a-fA-F]{1,4}){1,2}
  |
    (?:[0-9a-fA-F]{1,4}:){1,6}:[0-9a-fA-F]{1,4}
  |
    # Trailing compression: fe80::
    (?:[0-9a-fA-F]{1,4}:){1,7}:
  |
    # Leading compression: ::1, ::
    :(?:(?::[0-9a-fA-F]{1,4}){1,7}|:)
  )
";

/// An address family recognised by an [`AddressPattern`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Family {
    /// Dotted-quad IPv4.
    V4,
    /// Colon-hex IPv6, including compressed, IPv4-suffixed and zoned forms.
    V6,
}

impl Family {
    fn source(self) -> &'static str {
        match self {
            Family::V4 => IPV4_PATTERN,
            Family::V6 => IPV6_PATTERN,
        }
    }

    /// A byte every match of this family contains. Lines without it are
    /// rejected with a single `memchr` scan.
    fn required_byte(self) -> u8 {
        match self {
            Family::V4 => b'.',
            Family::V6 => b':',
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Family::V4 => write!(f, "IPv4"),
            Family::V6 => write!(f, "IPv6"),
        }
    }
}

/// A precompiled recogniser for one address family.
///
/// Patterns are immutable once built and can be shared freely between
/// threads.
#[derive(Clone, Debug)]
pub struct AddressPattern {
    family: Family,
    regex: Regex,
}

impl AddressPattern {
    /// Compile the pattern for `family`.
    pub fn new(family: Family) -> Result<AddressPattern, BuildError> {
        let hir = regex_syntax::Parser::new()
            .parse(family.source())
            .map_err(|source| BuildError::Syntax {
                family,
                source: Box::new(source),
            })?;

        let regex = Regex::builder()
            .configure(
                Regex::config()
                    .auto_prefilter(true)
                    .match_kind(MatchKind::LeftmostFirst),
            )
            .build_from_hir(&hir)
            .map_err(|source| BuildError::Compile {
                family,
                source: Box::new(source),
            })?;

        Ok(AddressPattern { family, regex })
    }

    /// The family this pattern recognises.
    #[inline]
    pub fn family(&self) -> Family {
        self.family
    }

    /// Return true if `haystack` contains at least one match.
    #[inline]
    pub fn is_match(&self, haystack: &[u8]) -> bool {
        self.find_iter(haystack).next().is_some()
    }

    /// Return an iterator over the byte ranges of all non-overlapping matches,
    /// left to right.
    pub fn find_iter<'a>(&'a self, haystack: &'a [u8]) -> impl Iterator<Item = Range<usize>> + 'a {
        let mut at = if memchr::memchr(self.family.required_byte(), haystack).is_some() {
            0
        } else {
            haystack.len()
        };

        std::iter::from_fn(move || {
            while at < haystack.len() {
                let input = Input::new(haystack).range(at..);
                let range = self.regex.search(&input)?.range();

                if self.accepts(haystack, &range) {
                    at = range.end;
                    return Some(range);
                }
                // Retry from the next byte; a later start may still be valid.
                at = range.start + 1;
            }
            None
        })
    }

    /// Replace every match in `haystack` with `token`.
    ///
    /// Returns the input unchanged (and unallocated) when nothing matched.
    pub fn replace_all<'h>(&self, haystack: &'h [u8], token: &[u8]) -> Cow<'h, [u8]> {
        let mut ranges = self.find_iter(haystack).peekable();
        if ranges.peek().is_none() {
            return Cow::Borrowed(haystack);
        }

        let mut out = Vec::with_capacity(haystack.len());
        let mut last_pos = 0;
        for range in ranges {
            out.extend_from_slice(&haystack[last_pos..range.start]);
            out.extend_from_slice(token);
            last_pos = range.end;
        }
        out.extend_from_slice(&haystack[last_pos..]);
        Cow::Owned(out)
    }

    #[inline]
    fn accepts(&self, haystack: &[u8], range: &Range<usize>) -> bool {
        match self.family {
            Family::V4 => ipv4_boundary(haystack, range),
            Family::V6 => true,
        }
    }
}

/// Check that an IPv4 candidate is not a fragment of a longer number.
///
/// Rejects a leading digit or `<digit>.`, and a trailing digit or `.<digit>`.
/// Other neighbours (brackets, colons, letters, a sentence-ending dot) are
/// fine.
#[inline]
fn ipv4_boundary(haystack: &[u8], range: &Range<usize>) -> bool {
    let before = &haystack[..range.start];
    let after = &haystack[range.end..];

    let joined_before = match before {
        [.., d, b'.'] if d.is_ascii_digit() => true,
        [.., b] => b.is_ascii_digit(),
        [] => false,
    };
    let joined_after = match after {
        [b'.', d, ..] if d.is_ascii_digit() => true,
        [b, ..] => b.is_ascii_digit(),
        [] => false,
    };

    !joined_before && !joined_after
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(family: Family, haystack: &str) -> Vec<&str> {
        let pattern = AddressPattern::new(family).unwrap();
        pattern
            .find_iter(haystack.as_bytes())
            .map(|range| &haystack[range])
            .collect()
    }

    #[test]
    fn both_patterns_compile() {
        assert_eq!(AddressPattern::new(Family::V4).unwrap().family(), Family::V4);
        assert_eq!(AddressPattern::new(Family::V6).unwrap().family(), Family::V6);
    }

    #[test]
    fn ipv4_octet_range() {
        assert_eq!(matches(Family::V4, "0.0.0.0"), ["0.0.0.0"]);
        assert_eq!(matches(Family::V4, "255.255.255.255"), ["255.255.255.255"]);
        assert_eq!(matches(Family::V4, "199.249.250.9"), ["199.249.250.9"]);
        assert!(matches(Family::V4, "256.1.1.1").is_empty());
        assert!(matches(Family::V4, "1.1.1.256").is_empty());
        assert!(matches(Family::V4, "999.1.1.1").is_empty());
    }

    #[test]
    fn ipv4_longer_dotted_runs_rejected() {
        assert!(matches(Family::V4, "1.2.3.4.5").is_empty());
        assert!(matches(Family::V4, "version 10.1.2.3.4 released").is_empty());
        assert!(matches(Family::V4, "1.2.3").is_empty());
    }

    #[test]
    fn ipv4_punctuation_boundaries() {
        assert_eq!(
            matches(Family::V4, "[10.0.0.1] (8.8.8.8), 1.1.1.1."),
            ["10.0.0.1", "8.8.8.8", "1.1.1.1"]
        );
        assert_eq!(matches(Family::V4, "host=1.2.3.4:80"), ["1.2.3.4"]);
        assert_eq!(matches(Family::V4, "ip1.2.3.4"), ["1.2.3.4"]);
    }

    #[test]
    fn ipv4_boundary_helper() {
        let hay = b"x1.2.3.4y";
        assert!(ipv4_boundary(hay, &(1..8)));
        let hay = b"91.2.3.4";
        assert!(!ipv4_boundary(hay, &(1..8)));
        let hay = b"9.1.2.3.4";
        assert!(!ipv4_boundary(hay, &(2..9)));
        let hay = b"1.2.3.4.";
        assert!(ipv4_boundary(hay, &(0..7)));
    }

    #[test]
    fn ipv6_prefers_longest_compressed_reading() {
        assert_eq!(
            matches(Family::V6, "2001:db8::8a2e:370:7334"),
            ["2001:db8::8a2e:370:7334"]
        );
        assert_eq!(matches(Family::V6, "1:2:3::4"), ["1:2:3::4"]);
        assert_eq!(matches(Family::V6, "1::2:3:4:5:6:7"), ["1::2:3:4:5:6:7"]);
        assert_eq!(matches(Family::V6, "a:b:c:d:e:f:1::"), ["a:b:c:d:e:f:1::"]);
    }

    #[test]
    fn ipv6_special_forms() {
        assert_eq!(matches(Family::V6, "fe80::1%eth0"), ["fe80::1%eth0"]);
        assert_eq!(matches(Family::V6, "::ffff:192.168.0.1"), ["::ffff:192.168.0.1"]);
        assert_eq!(matches(Family::V6, "64:ff9b::192.0.2.33"), ["64:ff9b::192.0.2.33"]);
        assert_eq!(matches(Family::V6, "::"), ["::"]);
    }

    #[test]
    fn required_byte_short_circuits() {
        let v4 = AddressPattern::new(Family::V4).unwrap();
        let v6 = AddressPattern::new(Family::V6).unwrap();
        assert!(!v4.is_match(b"no dots in here"));
        assert!(!v6.is_match(b"no colons in here"));
        assert!(!v4.is_match(b""));
    }

    #[test]
    fn replace_all_borrows_when_unchanged() {
        let v4 = AddressPattern::new(Family::V4).unwrap();
        assert!(matches!(v4.replace_all(b"plain text", b"X"), Cow::Borrowed(_)));
        assert_eq!(
            v4.replace_all(b"a 1.2.3.4 b 5.6.7.8", b"X").as_ref(),
            b"a X b X"
        );
    }
}
