//! Archive handling around a sanitizing run.
//!
//! Rotated logs usually sit next to the live one as `.gz` archives, and
//! sanitized copies are worth shipping compressed. This module decompresses
//! gzip archives in place before a directory walk and compresses `.clean`
//! results with zstd afterwards.

use camino::{Utf8Path, Utf8PathBuf};
use flate2::read::MultiGzDecoder;
use std::fs::{self, File};
use std::io::{self, BufReader, Read, Write};
use walkdir::WalkDir;

use crate::config::SourceRetention;
use crate::error::{Error, Result};
use crate::files::{write_new, BUFFER_CAPACITY};

/// Suffix of the archives decompressed before a directory walk.
pub const GZIP_SUFFIX: &str = ".gz";

/// Suffix appended to compressed results.
pub const ZSTD_SUFFIX: &str = ".zst";

/// Highest zstd level; slow, but logs compress very well at it.
pub const ZSTD_LEVEL: i32 = 22;

/// Outcome of a single (de)compression step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The new file was written.
    Written(Utf8PathBuf),
    /// The target already existed and overwriting was not allowed.
    Skipped(Utf8PathBuf),
}

/// Decompress every `.gz` file under `root`, recursively.
///
/// `x.gz` is written to `x`. Existing targets are left untouched unless
/// `overwrite` is set. Returns the number of archives decompressed.
pub fn decompress_tree(
    root: &Utf8Path,
    retention: SourceRetention,
    overwrite: bool,
) -> Result<usize> {
    let mut archives = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = Utf8PathBuf::from_path_buf(entry.into_path()).map_err(Error::NonUtf8Path)?;
        if path.as_str().ends_with(GZIP_SUFFIX) {
            archives.push(path);
        }
    }

    let mut count = 0;
    for archive in &archives {
        if let Outcome::Written(_) = decompress_file(archive, retention, overwrite)? {
            count += 1;
        }
    }
    Ok(count)
}

/// Decompress one gzip archive next to itself, dropping the `.gz` suffix.
pub fn decompress_file(
    archive: &Utf8Path,
    retention: SourceRetention,
    overwrite: bool,
) -> Result<Outcome> {
    let Some(stem) = archive.as_str().strip_suffix(GZIP_SUFFIX) else {
        log::warn!("{archive} has no {GZIP_SUFFIX} suffix; skipped");
        return Ok(Outcome::Skipped(archive.to_owned()));
    };
    let target = Utf8PathBuf::from(stem);
    if target.exists() && !overwrite {
        log::warn!("{target} already exists; not overwritten");
        return Ok(Outcome::Skipped(target));
    }

    let input = File::open(archive).map_err(|source| Error::Read {
        path: archive.to_owned(),
        source,
    })?;
    let mut decoder = MultiGzDecoder::new(BufReader::with_capacity(BUFFER_CAPACITY, input));
    let written = write_new(&target, |out| copy(&mut decoder, archive, out, &target))?;
    log::debug!("{archive}: decompressed {written} bytes -> {target}");

    if retention == SourceRetention::Remove {
        remove(archive)?;
    }
    Ok(Outcome::Written(target))
}

/// Compress `path` with zstd into `<path>.zst`.
pub fn compress_file(
    path: &Utf8Path,
    retention: SourceRetention,
    overwrite: bool,
) -> Result<Outcome> {
    let target = Utf8PathBuf::from(format!("{path}{ZSTD_SUFFIX}"));
    if target.exists() && !overwrite {
        log::warn!("{target} already exists; not overwritten");
        return Ok(Outcome::Skipped(target));
    }

    let mut input = File::open(path).map_err(|source| Error::Read {
        path: path.to_owned(),
        source,
    })?;
    let read = write_new(&target, |out| {
        let write_err = |source| Error::Write {
            path: target.clone(),
            source,
        };
        let mut encoder = zstd::Encoder::new(out, ZSTD_LEVEL).map_err(write_err)?;
        let read = copy(&mut input, path, &mut encoder, &target)?;
        encoder.finish().map_err(write_err)?;
        Ok(read)
    })?;
    log::debug!("{path}: compressed {read} bytes -> {target}");

    if retention == SourceRetention::Remove {
        remove(path)?;
    }
    Ok(Outcome::Written(target))
}

/// Copy `reader` into `writer`.
///
/// Read failures (a corrupt archive, an unreadable source) are reported
/// against `from`, write failures against `to`.
fn copy<R, W>(reader: &mut R, from: &Utf8Path, writer: &mut W, to: &Utf8Path) -> Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buf = vec![0; BUFFER_CAPACITY];
    let mut total = 0;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(Error::Read {
                    path: from.to_owned(),
                    source,
                })
            }
        };
        writer.write_all(&buf[..n]).map_err(|source| Error::Write {
            path: to.to_owned(),
            source,
        })?;
        total += n as u64;
    }
}

fn remove(path: &Utf8Path) -> Result<()> {
    fs::remove_file(path).map_err(|source| Error::Write {
        path: path.to_owned(),
        source,
    })?;
    log::debug!("removed {path}");
    Ok(())
}
