use std::borrow::Cow;
use std::ops::Range;

use crate::error::BuildError;
use crate::pattern::{AddressPattern, Family};

/// Finds IPv4 and IPv6 addresses embedded in a line of text.
///
/// An `AddressMatcher` holds the two compiled [`AddressPattern`]s. Build it
/// once and pass it by reference to everything that scans lines; all methods
/// take `&self` and keep no state between calls.
///
/// Lines are byte slices, so input that is not valid UTF-8 is scanned as-is.
///
/// # Example
///
/// ```
/// use ip_redact::AddressMatcher;
///
/// # fn main() -> anyhow::Result<()> {
/// let matcher = AddressMatcher::new()?;
/// assert!(matcher.matches_ipv4(b"client 10.0.0.7 connected"));
/// assert!(matcher.matches_ipv6(b"bound to [::1]:8080"));
/// assert_eq!(
///     matcher.replace_ipv4(b"from 10.0.0.7:25565", b"***").as_ref(),
///     b"from ***:25565"
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct AddressMatcher {
    ipv4: AddressPattern,
    ipv6: AddressPattern,
}

impl AddressMatcher {
    /// Compile both address patterns.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] if either pattern fails to compile.
    pub fn new() -> Result<AddressMatcher, BuildError> {
        Ok(AddressMatcher {
            ipv4: AddressPattern::new(Family::V4)?,
            ipv6: AddressPattern::new(Family::V6)?,
        })
    }

    /// The compiled pattern for `family`.
    #[inline]
    pub fn pattern(&self, family: Family) -> &AddressPattern {
        match family {
            Family::V4 => &self.ipv4,
            Family::V6 => &self.ipv6,
        }
    }

    /// Return true if `line` contains a dotted-quad IPv4 address.
    #[inline]
    pub fn matches_ipv4(&self, line: &[u8]) -> bool {
        self.ipv4.is_match(line)
    }

    /// Return true if `line` contains an IPv6 address in any textual form.
    #[inline]
    pub fn matches_ipv6(&self, line: &[u8]) -> bool {
        self.ipv6.is_match(line)
    }

    /// Return true if `line` contains an address of either family.
    #[inline]
    pub fn matches_any(&self, line: &[u8]) -> bool {
        self.matches_ipv4(line) || self.matches_ipv6(line)
    }

    /// Byte ranges of every IPv4 match in `line`.
    #[inline]
    pub fn find_ipv4<'a>(&'a self, line: &'a [u8]) -> impl Iterator<Item = Range<usize>> + 'a {
        self.ipv4.find_iter(line)
    }

    /// Byte ranges of every IPv6 match in `line`.
    #[inline]
    pub fn find_ipv6<'a>(&'a self, line: &'a [u8]) -> impl Iterator<Item = Range<usize>> + 'a {
        self.ipv6.find_iter(line)
    }

    /// Replace every IPv4 match in `line` with `token`.
    #[inline]
    pub fn replace_ipv4<'l>(&self, line: &'l [u8], token: &[u8]) -> Cow<'l, [u8]> {
        self.ipv4.replace_all(line, token)
    }

    /// Replace every IPv6 match in `line` with `token`.
    #[inline]
    pub fn replace_ipv6<'l>(&self, line: &'l [u8], token: &[u8]) -> Cow<'l, [u8]> {
        self.ipv6.replace_all(line, token)
    }
}
