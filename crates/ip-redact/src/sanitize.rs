use std::borrow::Cow;
use std::fmt;

use crate::matcher::AddressMatcher;

/// What to do with a line that contains an address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SanitizePolicy {
    /// Drop the whole line.
    Omit,
    /// Keep the line, replacing every address with the token.
    ///
    /// An empty token is allowed and blanks the addresses out.
    Replace(String),
}

impl SanitizePolicy {
    /// `Replace(token)` when a token is given, `Omit` otherwise.
    pub fn from_replacement(token: Option<String>) -> SanitizePolicy {
        match token {
            Some(token) => SanitizePolicy::Replace(token),
            None => SanitizePolicy::Omit,
        }
    }
}

impl fmt::Display for SanitizePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SanitizePolicy::Omit => write!(f, "omit matching lines"),
            SanitizePolicy::Replace(token) => write!(f, "replace addresses with {token:?}"),
        }
    }
}

/// Apply `policy` to a single line.
///
/// Returns `None` when the line must be dropped. Under
/// [`SanitizePolicy::Replace`] the result is always `Some`; IPv4 addresses
/// are replaced first and the IPv6 pass runs over that result, so IPv4
/// suffixes inside IPv6 addresses collapse into the token before the IPv6
/// grammar looks at them.
///
/// Lines without any match come back borrowed.
///
/// # Example
///
/// ```
/// use ip_redact::{sanitize, AddressMatcher, SanitizePolicy};
///
/// # fn main() -> anyhow::Result<()> {
/// let matcher = AddressMatcher::new()?;
/// let policy = SanitizePolicy::Replace("<redacted>".to_string());
///
/// let out = sanitize(&matcher, b"Player joined from 192.168.1.100:25565", &policy);
/// assert_eq!(out.as_deref(), Some(&b"Player joined from <redacted>:25565"[..]));
///
/// assert_eq!(sanitize(&matcher, b"Connected: ::1", &SanitizePolicy::Omit), None);
/// # Ok(())
/// # }
/// ```
pub fn sanitize<'l>(
    matcher: &AddressMatcher,
    line: &'l [u8],
    policy: &SanitizePolicy,
) -> Option<Cow<'l, [u8]>> {
    match policy {
        SanitizePolicy::Omit => {
            if matcher.matches_ipv4(line) || matcher.matches_ipv6(line) {
                None
            } else {
                Some(Cow::Borrowed(line))
            }
        }
        SanitizePolicy::Replace(token) => {
            let token = token.as_bytes();
            let rewritten = match matcher.replace_ipv4(line, token) {
                Cow::Borrowed(line) => matcher.replace_ipv6(line, token),
                Cow::Owned(replaced) if !matcher.matches_ipv6(&replaced) => Cow::Owned(replaced),
                Cow::Owned(replaced) => {
                    Cow::Owned(matcher.replace_ipv6(&replaced, token).into_owned())
                }
            };
            Some(rewritten)
        }
    }
}

/// A matcher bound to the policy chosen for a run.
///
/// This is what a file driver holds on to: it is `Send + Sync`, so one
/// sanitizer can serve several files in parallel.
#[derive(Clone, Debug)]
pub struct LineSanitizer<'m> {
    matcher: &'m AddressMatcher,
    policy: SanitizePolicy,
}

impl<'m> LineSanitizer<'m> {
    pub fn new(matcher: &'m AddressMatcher, policy: SanitizePolicy) -> LineSanitizer<'m> {
        LineSanitizer { matcher, policy }
    }

    #[inline]
    pub fn policy(&self) -> &SanitizePolicy {
        &self.policy
    }

    /// See [`sanitize`].
    #[inline]
    pub fn sanitize<'l>(&self, line: &'l [u8]) -> Option<Cow<'l, [u8]>> {
        sanitize(self.matcher, line, &self.policy)
    }
}
