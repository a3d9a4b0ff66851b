use std::num::NonZeroUsize;

use ip_redact::SanitizePolicy;

use crate::input::FileOrStdin;

/// Whether the source of a (de)compression step survives it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceRetention {
    /// Keep the source next to the new file.
    Keep,
    /// Delete the source once the new file is complete.
    Remove,
}

/// Everything a run needs, resolved from the command line.
#[derive(Clone, Debug)]
pub struct Config {
    /// File, directory or stdin to sanitize.
    pub target: FileOrStdin,
    /// What to do with lines containing addresses.
    pub policy: SanitizePolicy,
    /// Compress each `.clean` result with zstd.
    pub compress: Option<SourceRetention>,
    /// Decompress `.gz` archives under a directory target before sanitizing.
    pub decompress: Option<SourceRetention>,
    /// Let (de)compression replace existing files instead of skipping them.
    pub overwrite: bool,
    /// Number of files sanitized concurrently in directory mode.
    pub threads: NonZeroUsize,
}

impl Config {
    /// A configuration that only sanitizes `target`, with no archive handling.
    pub fn new(target: FileOrStdin, policy: SanitizePolicy) -> Config {
        Config {
            target,
            policy,
            compress: None,
            decompress: None,
            overwrite: false,
            threads: NonZeroUsize::MIN,
        }
    }
}
