use camino::Utf8PathBuf;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};

use crate::error::{Error, Result};

/// Represents a line of text read from input.
pub struct Line<'a> {
    /// The content of the line, excluding the line terminator.
    content: &'a [u8],
}

impl<'a> Line<'a> {
    /// Create a new Line from a byte slice, expected to be a complete line.
    ///
    /// Only `\n` is treated as the terminator; a preceding `\r` stays part of
    /// the content.
    #[inline]
    pub fn new(full: &'a [u8]) -> Line<'a> {
        let content = full.strip_suffix(b"\n").unwrap_or(full);
        Line { content }
    }

    /// Get the content of the line, excluding the line terminator.
    #[inline]
    pub fn content(&self) -> &'a [u8] {
        self.content
    }
}

/// A source that can be either a file or stdin.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub enum FileOrStdin {
    /// Input from a file or directory.
    File(Utf8PathBuf),
    /// Input from stdin.
    #[default]
    Stdin,
}

impl fmt::Display for FileOrStdin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOrStdin::File(path) => write!(f, "{}", path),
            FileOrStdin::Stdin => write!(f, "<stdin>"),
        }
    }
}

impl FileOrStdin {
    /// Create a new FileOrStdin from a path.
    ///
    /// If the path is "-", stdin is used.
    pub fn from_path(path: Utf8PathBuf) -> Self {
        if path.as_str() == "-" {
            FileOrStdin::Stdin
        } else {
            FileOrStdin::File(path)
        }
    }

    /// Open the input source as a reader.
    pub fn reader(&self) -> Result<InputReader> {
        match self {
            FileOrStdin::File(path) => {
                let file = File::open(path).map_err(|source| Error::Read {
                    path: path.clone(),
                    source,
                })?;
                Ok(InputReader::File(file))
            }
            FileOrStdin::Stdin => Ok(InputReader::Stdin(io::stdin())),
        }
    }
}

/// A reader for input from either a file or stdin.
///
/// Unbuffered; callers wrap it in a line buffer.
pub enum InputReader {
    /// A reader for a file.
    File(File),
    /// A reader for stdin.
    Stdin(io::Stdin),
}

impl Read for InputReader {
    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            InputReader::File(ref mut rdr) => rdr.read(buf),
            InputReader::Stdin(ref mut rdr) => rdr.read(buf),
        }
    }
}
