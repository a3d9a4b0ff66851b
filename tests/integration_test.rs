use camino::Utf8PathBuf;
use std::fs;
use std::num::NonZeroUsize;

use logsanitizer::files::{collect_targets, sanitize_file};
use logsanitizer::{
    driver, AddressMatcher, Config, Error, FileOrStdin, LineSanitizer, SanitizePolicy,
    SourceRetention,
};

// Lay out a small server log directory the way a rotating logger leaves it
fn setup_log_dir() -> (tempfile::TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("temp dir is UTF-8");

    fs::write(
        root.join("latest.log"),
        "joined from 203.0.113.9\nchat: hello\nrcon from fe80::1%eth0\n",
    )
    .unwrap();
    fs::create_dir(root.join("archive")).unwrap();
    fs::write(root.join("archive/2024-01-01-1.log"), "version 1.20.4\n").unwrap();
    fs::write(root.join("archive/2024-01-01-1.log.gz"), b"not really gzip").unwrap();

    (dir, root)
}

fn matcher() -> AddressMatcher {
    AddressMatcher::new().expect("Failed to build matcher")
}

#[test]
fn collects_only_plain_files() {
    let (_dir, root) = setup_log_dir();
    let targets = collect_targets(&root).unwrap();
    assert_eq!(
        targets,
        vec![root.join("archive/2024-01-01-1.log"), root.join("latest.log")]
    );
}

#[test]
fn directory_run_with_omit() {
    let (_dir, root) = setup_log_dir();
    let config = Config::new(FileOrStdin::File(root.clone()), SanitizePolicy::Omit);

    driver::run(&config, &matcher()).unwrap();

    assert_eq!(
        fs::read_to_string(root.join("latest.log.clean")).unwrap(),
        "chat: hello\n"
    );
    assert_eq!(
        fs::read_to_string(root.join("archive/2024-01-01-1.log.clean")).unwrap(),
        "version 1.20.4\n"
    );
    // The fake archive is never opened
    assert!(!root.join("archive/2024-01-01-1.log.gz.clean").exists());
}

#[test]
fn directory_run_with_replacement_and_threads() {
    let (_dir, root) = setup_log_dir();
    let mut config = Config::new(
        FileOrStdin::File(root.clone()),
        SanitizePolicy::Replace("[ip]".into()),
    );
    config.threads = NonZeroUsize::new(2).unwrap();

    driver::run(&config, &matcher()).unwrap();

    assert_eq!(
        fs::read_to_string(root.join("latest.log.clean")).unwrap(),
        "joined from [ip]\nchat: hello\nrcon from [ip]\n"
    );
}

#[test]
fn rerun_overwrites_clean_output() {
    let (_dir, root) = setup_log_dir();
    let log = root.join("latest.log");
    let matcher = matcher();

    let sanitizer = LineSanitizer::new(&matcher, SanitizePolicy::Replace("A".into()));
    sanitize_file(&log, &sanitizer).unwrap();
    let sanitizer = LineSanitizer::new(&matcher, SanitizePolicy::Omit);
    let output = sanitize_file(&log, &sanitizer).unwrap();

    assert_eq!(output, root.join("latest.log.clean"));
    assert_eq!(fs::read_to_string(output).unwrap(), "chat: hello\n");
}

#[test]
fn single_file_compressed() {
    let (_dir, root) = setup_log_dir();
    let mut config = Config::new(
        FileOrStdin::File(root.join("latest.log")),
        SanitizePolicy::Omit,
    );
    config.compress = Some(SourceRetention::Remove);

    driver::run(&config, &matcher()).unwrap();

    assert!(!root.join("latest.log.clean").exists());
    let zst = fs::File::open(root.join("latest.log.clean.zst")).unwrap();
    assert_eq!(zstd::decode_all(zst).unwrap(), b"chat: hello\n");
}

#[test]
fn missing_target_is_reported() {
    let (_dir, root) = setup_log_dir();
    let missing = root.join("missing.log");
    let config = Config::new(FileOrStdin::File(missing.clone()), SanitizePolicy::Omit);

    match driver::run(&config, &matcher()) {
        Err(Error::NotFound { path }) => assert_eq!(path, missing),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn broken_archive_aborts_decompression() {
    let (_dir, root) = setup_log_dir();
    fs::write(root.join("broken.log.gz"), b"\x1f\x8b truncated").unwrap();
    let mut config = Config::new(FileOrStdin::File(root.clone()), SanitizePolicy::Omit);
    config.decompress = Some(SourceRetention::Keep);

    let err = driver::run(&config, &matcher()).unwrap_err();
    match &err {
        Error::Read { path, .. } => assert_eq!(*path, root.join("broken.log.gz")),
        other => panic!("expected a read error on the archive, got {other}"),
    }
    // The partial output is removed and nothing gets sanitized
    assert!(!root.join("broken.log").exists());
    assert!(root.join("broken.log.gz").exists());
    assert!(!root.join("latest.log.clean").exists());
    // An archive whose target already exists is skipped, not clobbered
    assert_eq!(
        fs::read_to_string(root.join("archive/2024-01-01-1.log")).unwrap(),
        "version 1.20.4\n"
    );
}
