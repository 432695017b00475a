use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::config::AppPaths;

/// Batch script that moves into the install directory and runs a single evaluation.
pub fn render_launcher(executable: &Path, base_dir: &Path) -> String {
    let install_dir = executable.parent().unwrap_or(base_dir);
    format!(
        "@echo off\r\n\
         cd /d \"{}\"\r\n\
         \"{}\" --dir \"{}\" --notify\r\n",
        install_dir.display(),
        executable.display(),
        base_dir.display(),
    )
}

/// Writes the launcher, replacing whatever was there, and returns its absolute path.
pub fn generate_launcher(paths: &AppPaths, executable: &Path) -> Result<PathBuf> {
    let content = render_launcher(executable, &paths.base_dir);
    std::fs::write(&paths.launcher, content)
        .with_context(|| format!("Failed to write launcher {:?}", paths.launcher))?;
    let path = std::path::absolute(&paths.launcher)?;
    info!("Created launcher {path:?}");
    Ok(path)
}
