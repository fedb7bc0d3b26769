//! Secret file storage.
//!
//! Each secret is a single file named after the secret inside a caller
//! supplied directory. On unix the file has mode `0600`, including when an
//! existing file is overwritten.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid secret name: {0}")]
    InvalidName(String),

    #[error("Refusing to store an empty secret")]
    Empty,
}

fn secret_path(dir: &Path, name: &str) -> Result<PathBuf, SecretError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if !valid {
        return Err(SecretError::InvalidName(name.to_string()));
    }

    Ok(dir.join(name))
}

/// Store `value` (trimmed) under `name`, replacing any previous value.
pub fn save_secret(dir: &Path, name: &str, value: &str) -> Result<(), SecretError> {
    let path = secret_path(dir, name)?;
    let value = value.trim();

    if value.is_empty() {
        return Err(SecretError::Empty);
    }

    fs::create_dir_all(dir)?;

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(&path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(value.as_bytes())?;

    Ok(())
}

/// Load the secret stored under `name`. A missing or blank file is `None`.
pub fn load_secret(dir: &Path, name: &str) -> Result<Option<String>, SecretError> {
    let path = secret_path(dir, name)?;

    if !path.exists() {
        return Ok(None);
    }

    let value = fs::read_to_string(&path)?;
    let value = value.trim();

    Ok((!value.is_empty()).then(|| value.to_string()))
}

/// Remove the secret stored under `name`. Returns whether one existed.
pub fn delete_secret(dir: &Path, name: &str) -> Result<bool, SecretError> {
    let path = secret_path(dir, name)?;

    if !path.exists() {
        return Ok(false);
    }

    fs::remove_file(&path)?;
    Ok(true)
}
