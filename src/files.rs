use camino::{Utf8Path, Utf8PathBuf};
use ip_redact::LineSanitizer;
use ripline::{
    line_buffer::{LineBufferBuilder, LineBufferReader},
    lines::LineIter,
};
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::input::{FileOrStdin, Line};

/// Suffix appended to a file's name for its sanitized copy.
pub const CLEAN_SUFFIX: &str = ".clean";

/// Files with these suffixes are never sanitized during a directory walk:
/// archives, and our own output.
pub const SKIPPED_SUFFIXES: [&str; 3] = [".gz", CLEAN_SUFFIX, ".zst"];

pub(crate) const BUFFER_CAPACITY: usize = 65536;

/// Line counts for one sanitized stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Lines read from the input.
    pub read: u64,
    /// Lines written to the output.
    pub written: u64,
}

/// Sanitize every line of `reader` into `out`.
///
/// Lines are split on `\n`. Each kept line is written followed by `\n`, so
/// the output always ends with a terminator even when the input did not.
/// Lines dropped by the policy produce no output at all.
pub fn sanitize_stream<R: Read, W: Write + ?Sized>(
    reader: R,
    out: &mut W,
    sanitizer: &LineSanitizer<'_>,
) -> io::Result<StreamStats> {
    let mut line_buffer = LineBufferBuilder::new().capacity(BUFFER_CAPACITY).build();
    let mut lb_reader = LineBufferReader::new(reader, &mut line_buffer);
    let mut stats = StreamStats::default();

    while lb_reader.fill()? {
        let lines = LineIter::new(b'\n', lb_reader.buffer());
        for full in lines {
            let line = Line::new(full);
            stats.read += 1;
            if let Some(clean) = sanitizer.sanitize(line.content()) {
                out.write_all(&clean)?;
                out.write_all(b"\n")?;
                stats.written += 1;
            }
        }
        lb_reader.consume_all();
    }

    Ok(stats)
}

/// The path a file's sanitized copy is written to.
pub fn clean_path(path: &Utf8Path) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("{path}{CLEAN_SUFFIX}"))
}

/// Whether a directory walk leaves this file alone.
pub fn is_skipped(path: &Utf8Path) -> bool {
    SKIPPED_SUFFIXES
        .iter()
        .any(|suffix| path.as_str().ends_with(suffix))
}

/// Sanitize `path` into `<path>.clean`, truncating any previous result.
///
/// On failure the output is removed rather than left half written. Returns
/// the output path.
pub fn sanitize_file(path: &Utf8Path, sanitizer: &LineSanitizer<'_>) -> Result<Utf8PathBuf> {
    let input = FileOrStdin::File(path.to_owned()).reader()?;

    let output = clean_path(path);
    let stats = write_new(&output, |out| {
        sanitize_stream(input, out, sanitizer).map_err(|source| Error::Sanitize {
            path: path.to_owned(),
            source,
        })
    })?;

    log::debug!(
        "{path}: kept {} of {} lines -> {output}",
        stats.written,
        stats.read
    );
    Ok(output)
}

/// Create `target`, fill it through `fill`, and flush it.
///
/// `fill` reports its own errors so that read failures can name the source.
/// A partially written target is removed again on any failure.
pub(crate) fn write_new<T, F>(target: &Utf8Path, fill: F) -> Result<T>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<T>,
{
    let file = File::create(target).map_err(|source| Error::Write {
        path: target.to_owned(),
        source,
    })?;
    let mut out = BufWriter::with_capacity(BUFFER_CAPACITY, file);

    let result = fill(&mut out).and_then(|value| {
        out.flush().map_err(|source| Error::Write {
            path: target.to_owned(),
            source,
        })?;
        Ok(value)
    });

    if result.is_err() {
        drop(out);
        if let Err(err) = fs::remove_file(target) {
            log::warn!("could not remove partial {target}: {err}");
        }
    }
    result
}

/// Collect every file under `root` that a directory run should sanitize,
/// sorted by name within each directory.
pub fn collect_targets(root: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
    let mut targets = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if entry.path().is_dir() {
            continue;
        }
        let path = Utf8PathBuf::from_path_buf(entry.into_path()).map_err(Error::NonUtf8Path)?;
        if is_skipped(&path) {
            continue;
        }
        targets.push(path);
    }
    Ok(targets)
}
