use crate::error::{Result, StoreError};
use std::fs;
use std::path::{Path, PathBuf};

const DB_RELATIVE: [&str; 2] = ["numfix", "numfix.sqlite3"];

/// `$XDG_DATA_HOME/numfix/numfix.sqlite3` (or the platform data dir equivalent).
pub fn default_db_path() -> Result<PathBuf> {
    let base = dirs::data_dir().ok_or(StoreError::MissingHomeDir)?;
    Ok(DB_RELATIVE.iter().fold(base, |path, part| path.join(part)))
}

/// Picks `custom` or the default location and makes sure its directory exists.
///
/// The default directory is created owner-only; a custom directory is left as the user made it.
pub fn resolve_db_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    let (path, private_dir) = match custom {
        Some(path) if path.as_os_str().is_empty() => {
            return Err(StoreError::InvalidDataPath(path))
        }
        Some(path) => (path, false),
        None => (default_db_path()?, true),
    };

    let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) else {
        return Ok(path);
    };
    if dir.is_file() {
        return Err(StoreError::InvalidDataPath(dir.to_path_buf()));
    }
    if !dir.exists() {
        fs::create_dir_all(dir)?;
        if private_dir {
            restrict_dir(dir)?;
        }
    }
    Ok(path)
}

#[cfg(unix)]
fn restrict_dir(dir: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(dir, fs::Permissions::from_mode(0o700))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_dir(_dir: &Path) -> Result<()> {
    Ok(())
}
