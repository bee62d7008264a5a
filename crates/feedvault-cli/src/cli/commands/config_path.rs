use anyhow::Result;
use feedvault_core::config;
use std::path::Path;

/// Prints the config file in use: the `--config` override, else the XDG location.
pub fn run_config_path(override_path: Option<&Path>) -> Result<()> {
    match override_path {
        Some(p) => println!("{}", p.display()),
        None => println!("{}", config::config_path()?.display()),
    }
    Ok(())
}
