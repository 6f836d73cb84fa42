//! Tests for collect and download subcommands.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use std::path::Path;

#[test]
fn cli_parse_collect() {
    match parse(&["imgsnag", "collect", "page.html"]) {
        CliCommand::Collect {
            source,
            base_url,
            background,
            json,
        } => {
            assert_eq!(source, Path::new("page.html"));
            assert!(base_url.is_none());
            assert!(!background);
            assert!(!json);
        }
        _ => panic!("expected Collect"),
    }
}

#[test]
fn cli_parse_collect_flags() {
    match parse(&[
        "imgsnag",
        "collect",
        "snap.json",
        "--base-url",
        "https://example.com/g/",
        "--background",
        "--json",
    ]) {
        CliCommand::Collect {
            base_url,
            background,
            json,
            ..
        } => {
            assert_eq!(base_url.as_deref(), Some("https://example.com/g/"));
            assert!(background);
            assert!(json);
        }
        _ => panic!("expected Collect with flags"),
    }
}

#[test]
fn cli_parse_download() {
    match parse(&[
        "imgsnag",
        "download",
        "https://a.example/1.png",
        "https://a.example/2.png",
        "--name",
        "cat",
        "--folder",
        "trip",
        "--timeout-secs",
        "5",
    ]) {
        CliCommand::Download {
            references,
            from,
            save,
        } => {
            assert_eq!(references.len(), 2);
            assert!(from.is_none());
            assert_eq!(save.name.as_deref(), Some("cat"));
            assert_eq!(save.folder.as_deref(), Some("trip"));
            assert_eq!(save.timeout_secs, Some(5));
            assert!(save.dir.is_none());
        }
        _ => panic!("expected Download"),
    }
}

#[test]
fn cli_parse_download_from_file_only() {
    match parse(&["imgsnag", "download", "--from", "list.txt", "--dir", "/tmp/out"]) {
        CliCommand::Download {
            references,
            from,
            save,
        } => {
            assert!(references.is_empty());
            assert_eq!(from.as_deref(), Some(Path::new("list.txt")));
            assert_eq!(save.dir.as_deref(), Some(Path::new("/tmp/out")));
        }
        _ => panic!("expected Download with --from"),
    }
}

#[test]
fn cli_rejects_non_numeric_timeout() {
    assert!(Cli::try_parse_from(["imgsnag", "download", "x", "--timeout-secs", "soon"]).is_err());
}
