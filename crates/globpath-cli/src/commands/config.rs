//! Config command - show, locate or initialise the configuration file.

use anyhow::bail;
use globpath_core::Config;
use std::path::{Path, PathBuf};

/// Run the config command.
pub fn run(
    config: Config,
    explicit_path: Option<PathBuf>,
    init: bool,
    force: bool,
    show_path: bool,
) -> anyhow::Result<()> {
    let path = match explicit_path {
        Some(path) => path,
        None => Config::default_config_path()?,
    };

    if show_path {
        println!("{}", path.display());
        return Ok(());
    }

    if init {
        write_default(&path, force)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    print!("{}", config.to_toml()?);
    Ok(())
}

/// Write the built-in defaults to `path`, refusing to clobber unless `force`.
fn write_default(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists; pass --force to overwrite it",
            path.display()
        );
    }
    Config::default().save_to(path)?;
    Ok(())
}
