//! CLI for the feedvault archiver.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use feedvault_core::config::{self, FeedvaultConfig};
use std::path::{Path, PathBuf};

use commands::{run_archive, run_assemble, run_config_path, run_decode, run_fetch};

/// Top-level CLI for feedvault.
#[derive(Debug, Parser)]
#[command(name = "feedvault")]
#[command(about = "feedvault: archive profile feeds with their images and videos", long_about = None)]
pub struct Cli {
    /// Config file to use instead of the XDG default.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Archive profiles by replaying recorded browser traffic.
    Run {
        /// HAR export(s) of the profile pages.
        #[arg(long = "har", required = true, value_name = "PATH")]
        har: Vec<PathBuf>,
        /// Profile id to archive (repeatable). Defaults to `profile_ids` from config.
        #[arg(long = "profile", value_name = "ID")]
        profiles: Vec<String>,
        /// Archive root; overrides `storage_root` from config.
        #[arg(long, value_name = "DIR")]
        storage_root: Option<PathBuf>,
    },

    /// Download one file (skipped if the destination is already non-empty).
    Fetch {
        url: String,
        dest: PathBuf,
        /// Referer header; defaults to `referer` from config.
        #[arg(long)]
        referer: Option<String>,
    },

    /// Download an HLS playlist and join its segments into one file.
    Assemble {
        playlist_url: String,
        dest: PathBuf,
        /// Referer header; defaults to `referer` from config.
        #[arg(long)]
        referer: Option<String>,
    },

    /// Decode a captured feed response body and summarize it.
    Decode {
        /// Raw response body as captured.
        file: PathBuf,
        /// Content-Encoding label the body was served with (gzip, br).
        #[arg(long, value_name = "LABEL")]
        encoding: Option<String>,
    },

    /// Print the config file location.
    ConfigPath,
}

fn load_config(path: Option<&Path>) -> Result<FeedvaultConfig> {
    match path {
        Some(p) => config::load_from_path(p),
        None => config::load_or_init(),
    }
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        if let CliCommand::ConfigPath = cli.command {
            return run_config_path(cli.config.as_deref());
        }
        let cfg = load_config(cli.config.as_deref())?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run {
                har,
                profiles,
                storage_root,
            } => run_archive(cfg, &har, profiles, storage_root)?,
            CliCommand::Fetch { url, dest, referer } => run_fetch(&cfg, &url, &dest, referer)?,
            CliCommand::Assemble {
                playlist_url,
                dest,
                referer,
            } => run_assemble(&cfg, &playlist_url, &dest, referer)?,
            CliCommand::Decode { file, encoding } => run_decode(&file, encoding.as_deref())?,
            CliCommand::ConfigPath => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
