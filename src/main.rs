use anyhow::{Context, Error, Result};
use camino::Utf8PathBuf;
use clap::{CommandFactory, Parser};
use log::LevelFilter;
use std::io::{self, Write};
use std::num::NonZeroUsize;
use std::process::ExitCode;

use logsanitizer::{
    driver, AddressMatcher, Config, FileOrStdin, SanitizePolicy, SourceRetention,
};

/// Check if the error chain contains a broken pipe error.
#[inline(always)]
fn is_broken_pipe(err: &Error) -> bool {
    for cause in err.chain() {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            if io_err.kind() == io::ErrorKind::BrokenPipe {
                return true;
            }
        }
    }
    false
}

/// Remove IPv4 and IPv6 addresses from log files.
///
/// Each processed file FILE is written to FILE.clean. Lines containing an
/// address are dropped, or the addresses are replaced when -r is given.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about)]
struct Args {
    /// Compress resulting files with zstd and remove the uncompressed result
    #[clap(short = 'c', long, conflicts_with = "compress_keep")]
    compress: bool,

    /// Compress resulting files with zstd and keep the uncompressed result
    #[clap(short = 'C', long)]
    compress_keep: bool,

    /// Decompress all .gz archives under the directory first, keeping the archives
    #[clap(short = 'd', long, conflicts_with = "decompress_remove")]
    decompress: bool,

    /// Decompress all .gz archives under the directory first, removing the archives
    #[clap(short = 'D', long)]
    decompress_remove: bool,

    /// Let (de)compression overwrite existing files instead of skipping them
    #[clap(short, long)]
    overwrite: bool,

    /// Log each (de)compression step
    #[clap(short, long)]
    verbose: bool,

    /// Do not log which files are being worked on
    #[clap(short, long)]
    quiet: bool,

    /// The file or directory to sanitize. Use "-" to filter stdin to stdout
    #[clap(
        short,
        long,
        value_name = "PATH",
        default_value = "latest.log",
        value_hint = clap::ValueHint::AnyPath
    )]
    file: Utf8PathBuf,

    /// Replace addresses with this token. If not set, lines with an address are omitted
    #[clap(short, long, value_name = "TOKEN", env = "LOGSANITIZER_REPLACEMENT")]
    replacement: Option<String>,

    /// Number of files to sanitize in parallel in directory mode
    #[clap(long, value_name = "N", default_value = "1")]
    threads: NonZeroUsize,
}

impl Args {
    fn into_config(self) -> Config {
        let compress = match (self.compress, self.compress_keep) {
            (true, _) => Some(SourceRetention::Remove),
            (false, true) => Some(SourceRetention::Keep),
            (false, false) => None,
        };
        let decompress = match (self.decompress, self.decompress_remove) {
            (true, _) => Some(SourceRetention::Keep),
            (false, true) => Some(SourceRetention::Remove),
            (false, false) => None,
        };

        Config {
            target: FileOrStdin::from_path(self.file),
            policy: SanitizePolicy::from_replacement(self.replacement),
            compress,
            decompress,
            overwrite: self.overwrite,
            threads: self.threads,
        }
    }
}

/// Route progress and (de)compression messages to stderr.
///
/// `-q` silences the per-file progress but not the `Handling` line, `-v`
/// surfaces archive and per-file details.
/// `RUST_LOG` is applied last and wins.
fn init_logger(args: &Args) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(LevelFilter::Info);
    if args.quiet {
        builder.filter_module("logsanitizer::driver", LevelFilter::Warn);
    }
    if args.verbose {
        builder.filter_module("logsanitizer::archive", LevelFilter::Debug);
        builder.filter_module("logsanitizer::files", LevelFilter::Debug);
    }
    builder
        .parse_env(env_logger::Env::default())
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn main() -> ExitCode {
    let err = match run_main() {
        Ok(code) => return code,
        Err(err) => err,
    };

    // Handle broken pipe errors gracefully
    if is_broken_pipe(&err) {
        return ExitCode::SUCCESS;
    }

    if std::env::var("RUST_BACKTRACE").is_ok_and(|v| v == "1")
        && std::env::var("RUST_LIB_BACKTRACE").map_or(true, |v| v == "1")
    {
        let _ = writeln!(&mut io::stderr(), "{:?}", err);
    } else {
        let _ = writeln!(&mut io::stderr(), "{:#}", err);
    }

    ExitCode::FAILURE
}

fn run_main() -> Result<ExitCode> {
    // Without any arguments, show how to use the tool instead of
    // silently sanitizing ./latest.log
    if std::env::args_os().len() <= 1 {
        Args::command().print_help()?;
        println!();
        return Ok(ExitCode::SUCCESS);
    }

    let args = Args::parse();
    init_logger(&args);

    let config = args.into_config();
    log::debug!("policy: {}", config.policy);

    let matcher = AddressMatcher::new().context("failed to build address matcher")?;
    driver::run(&config, &matcher).with_context(|| format!("failed to sanitize {}", config.target))?;

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["logsanitizer"];
        argv.extend_from_slice(args);
        Args::try_parse_from(argv).unwrap().into_config()
    }

    #[test]
    fn cli_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let config = parse(&["-q"]);
        assert_eq!(config.target, FileOrStdin::File("latest.log".into()));
        assert_eq!(config.policy, SanitizePolicy::Omit);
        assert_eq!(config.compress, None);
        assert_eq!(config.decompress, None);
        assert!(!config.overwrite);
        assert_eq!(config.threads.get(), 1);
    }

    #[test]
    fn short_flags_map_to_retention() {
        let config = parse(&["-c", "-D", "-o", "-f", "logs", "-r", "<ip>"]);
        assert_eq!(config.compress, Some(SourceRetention::Remove));
        assert_eq!(config.decompress, Some(SourceRetention::Remove));
        assert!(config.overwrite);
        assert_eq!(config.target, FileOrStdin::File("logs".into()));
        assert_eq!(config.policy, SanitizePolicy::Replace("<ip>".into()));

        let config = parse(&["-C", "-d"]);
        assert_eq!(config.compress, Some(SourceRetention::Keep));
        assert_eq!(config.decompress, Some(SourceRetention::Keep));
    }

    #[test]
    fn empty_replacement_is_not_omit() {
        let config = parse(&["-r", ""]);
        assert_eq!(config.policy, SanitizePolicy::Replace(String::new()));
    }

    #[test]
    fn conflicting_modes_are_rejected() {
        assert!(Args::try_parse_from(["logsanitizer", "-c", "-C"]).is_err());
        assert!(Args::try_parse_from(["logsanitizer", "-d", "-D"]).is_err());
        assert!(Args::try_parse_from(["logsanitizer", "--threads", "0"]).is_err());
    }
}
