//! The logsanitizer library: strip or replace IP addresses in log files.
//!
//! Address matching and the per-line policy live in the `ip-redact` crate;
//! this crate drives it over files, directory trees and stdin, and handles
//! the gzip/zstd steps around a run.
//!
//! # Examples
//!
//! Sanitizing a directory of server logs, replacing every address:
//!
//! ```rust,no_run
//! use logsanitizer::{driver, AddressMatcher, Config, FileOrStdin, SanitizePolicy};
//!
//! # fn main() -> logsanitizer::Result<()> {
//! let matcher = AddressMatcher::new()?;
//! let config = Config::new(
//!     FileOrStdin::from_path("logs".into()),
//!     SanitizePolicy::Replace("<redacted>".into()),
//! );
//! driver::run(&config, &matcher)?;
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod config;
pub mod driver;
pub mod error;
pub mod files;
pub mod input;

pub use crate::config::{Config, SourceRetention};
pub use crate::error::{Error, Result};
pub use crate::input::FileOrStdin;
pub use ip_redact::{AddressMatcher, LineSanitizer, SanitizePolicy};
