//! IPv4 and IPv6 address matching and line redaction.
//!
//! `ip-redact` finds network addresses embedded in arbitrary lines of text and
//! rewrites those lines according to a [`SanitizePolicy`]:
//!
//! - [`SanitizePolicy::Omit`] drops any line containing an address;
//! - [`SanitizePolicy::Replace`] substitutes every address with a fixed token
//!   and keeps the rest of the line byte-for-byte.
//!
//! ## Quick Start
//!
//! ```
//! use ip_redact::{AddressMatcher, LineSanitizer, SanitizePolicy};
//!
//! # fn main() -> anyhow::Result<()> {
//! // Compile the two patterns once, up front.
//! let matcher = AddressMatcher::new()?;
//! let sanitizer = LineSanitizer::new(&matcher, SanitizePolicy::Replace("<ip>".into()));
//!
//! let lines: &[&[u8]] = &[
//!     b"[12:00:01] Player joined from 203.0.113.9:25565",
//!     b"[12:00:02] Listening on [fe80::1%eth0]:25565",
//!     b"[12:00:03] Done (1.234s)!",
//! ];
//! for line in lines {
//!     if let Some(clean) = sanitizer.sanitize(line) {
//!         println!("{}", String::from_utf8_lossy(&clean));
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## What counts as an address
//!
//! Matching is purely syntactic. IPv4 is the dotted quad with every octet in
//! 0-255, not glued to further digits (`999.1.1.1` and `1.2.3.4.5` are not
//! addresses). IPv6 covers the full eight-group form, `::` compression,
//! IPv4-mapped and IPv4-embedded suffixes (`::ffff:192.0.2.1`) and link-local
//! zone indices (`fe80::1%eth0`).
//!
//! Nothing checks whether an address is routable or even assigned.

mod error;
mod matcher;
mod pattern;
mod sanitize;

pub use error::BuildError;
pub use matcher::AddressMatcher;
pub use pattern::{AddressPattern, Family};
pub use sanitize::{sanitize, LineSanitizer, SanitizePolicy};
