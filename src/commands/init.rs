use crate::config::{ModmapConfig, CONFIG_FILE_NAME};
use crate::io;
use anyhow::Result;
use std::path::Path;

pub fn init_config(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!("Configuration file already exists. Use --force to overwrite.");
    }

    let contents = format!("# Modmap Configuration\n\n{}", ModmapConfig::default_toml());
    io::write_file(&config_path, &contents)?;
    println!("Created {CONFIG_FILE_NAME} configuration file");

    Ok(())
}
