use std::{env, io, path::PathBuf};

use anyhow::Result;

/// Resolves the directory holding the settings file and generated artifacts. Without an explicit
/// directory the current working directory is used, which is where the launcher script `cd`s into.
pub fn resolve_base_dir(dir: Option<PathBuf>) -> Result<PathBuf> {
    let path = match dir {
        Some(dir) => std::path::absolute(dir)?,
        None => env::current_dir()?,
    };

    match std::fs::create_dir_all(&path) {
        Ok(_) => Ok(path),
        Err(v) if v.kind() == io::ErrorKind::AlreadyExists => Ok(path),
        Err(v) => Err(v.into()),
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use super::resolve_base_dir;

    #[test]
    fn creates_missing_directory() -> Result<()> {
        let dir = tempdir()?;
        let nested = dir.path().join("a").join("b");
        let resolved = resolve_base_dir(Some(nested.clone()))?;
        assert!(resolved.is_dir());
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("a/b"));
        Ok(())
    }
}
