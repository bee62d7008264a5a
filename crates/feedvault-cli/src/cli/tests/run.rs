//! Tests for the run subcommand and global options.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use std::path::{Path, PathBuf};

#[test]
fn cli_parse_run_single_har() {
    match parse(&["feedvault", "run", "--har", "session.har"]) {
        CliCommand::Run {
            har,
            profiles,
            storage_root,
        } => {
            assert_eq!(har, vec![PathBuf::from("session.har")]);
            assert!(profiles.is_empty());
            assert!(storage_root.is_none());
        }
        _ => panic!("expected Run"),
    }
}

#[test]
fn cli_parse_run_many_hars_and_profiles() {
    match parse(&[
        "feedvault",
        "run",
        "--har",
        "a.har",
        "--har",
        "b.har",
        "--profile",
        "123",
        "--profile",
        "456",
        "--storage-root",
        "/srv/archive",
    ]) {
        CliCommand::Run {
            har,
            profiles,
            storage_root,
        } => {
            assert_eq!(har.len(), 2);
            assert_eq!(profiles, vec!["123", "456"]);
            assert_eq!(storage_root.as_deref(), Some(Path::new("/srv/archive")));
        }
        _ => panic!("expected Run"),
    }
}

#[test]
fn cli_parse_run_requires_har() {
    assert!(Cli::try_parse_from(["feedvault", "run"]).is_err());
}

#[test]
fn cli_parse_global_config() {
    let cli = Cli::try_parse_from(["feedvault", "config-path", "--config", "/etc/fv.toml"]).unwrap();
    assert_eq!(cli.config.as_deref(), Some(Path::new("/etc/fv.toml")));
    assert!(matches!(cli.command, CliCommand::ConfigPath));
}

#[test]
fn cli_parse_unknown_subcommand_fails() {
    assert!(Cli::try_parse_from(["feedvault", "status"]).is_err());
}
