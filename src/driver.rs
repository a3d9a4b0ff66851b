use camino::Utf8Path;
use ip_redact::{AddressMatcher, LineSanitizer};
use log::{info, warn};
use rayon::prelude::*;
use std::io::{self, BufWriter, Write};

use crate::archive;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::files::{self, BUFFER_CAPACITY};
use crate::input::FileOrStdin;

/// Sanitize the configured target.
///
/// - stdin is streamed to stdout;
/// - a file `P` is written to `P.clean`, then compressed if requested;
/// - a directory is optionally gunzipped first, then every eligible file
///   under it is handled like a single file.
///
/// The first failing file aborts the run.
pub fn run(config: &Config, matcher: &AddressMatcher) -> Result<()> {
    let sanitizer = LineSanitizer::new(matcher, config.policy.clone());

    let path = match &config.target {
        FileOrStdin::Stdin => return run_stdin(config, &sanitizer),
        FileOrStdin::File(path) => path,
    };

    // Always shown; `-q` only silences this module's per-file progress.
    info!(target: "logsanitizer", "Handling {path} ...");
    if !path.exists() {
        return Err(Error::NotFound { path: path.clone() });
    }

    if path.is_dir() {
        run_directory(path, config, &sanitizer)
    } else {
        if config.decompress.is_some() {
            warn!("decompression only applies to directories; ignored for {path}");
        }
        process_file(path, config, &sanitizer)
    }
}

fn run_stdin(config: &Config, sanitizer: &LineSanitizer<'_>) -> Result<()> {
    if config.compress.is_some() || config.decompress.is_some() {
        warn!("(de)compression is ignored when reading from stdin");
    }
    let reader = FileOrStdin::Stdin.reader()?;
    let mut out = BufWriter::with_capacity(BUFFER_CAPACITY, io::stdout().lock());
    files::sanitize_stream(reader, &mut out, sanitizer)?;
    out.flush()?;
    Ok(())
}

fn run_directory(root: &Utf8Path, config: &Config, sanitizer: &LineSanitizer<'_>) -> Result<()> {
    if let Some(retention) = config.decompress {
        let count = archive::decompress_tree(root, retention, config.overwrite)?;
        info!("Decompressed {count} archive(s) under {root}");
    }

    let targets = files::collect_targets(root)?;

    if config.threads.get() == 1 {
        return targets
            .iter()
            .try_for_each(|path| process_file(path, config, sanitizer));
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads.get())
        .build()?;
    pool.install(|| {
        targets
            .par_iter()
            .try_for_each(|path| process_file(path, config, sanitizer))
    })
}

fn process_file(path: &Utf8Path, config: &Config, sanitizer: &LineSanitizer<'_>) -> Result<()> {
    info!("Working on {path}");
    let output = files::sanitize_file(path, sanitizer)?;

    if let Some(retention) = config.compress {
        if let archive::Outcome::Written(compressed) =
            archive::compress_file(&output, retention, config.overwrite)?
        {
            info!("Compressed {output} -> {compressed}");
        }
    }
    Ok(())
}
