use crate::error::Error;
use codexr_core::secrets::{delete_secret, load_secret, save_secret};
use std::path::PathBuf;

pub const API_KEY_SECRET: &str = "gemini_api_key";
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Where the Gemini API key lives. Read at call time, never cached.
pub trait CredentialStore: Send + Sync {
    fn get(&self) -> Result<Option<String>, Error>;

    fn set(&self, value: &str) -> Result<(), Error>;

    /// Returns whether a stored key was removed.
    fn clear(&self) -> Result<bool, Error>;

    /// Human readable location, for `key status`.
    fn describe(&self) -> String;
}

/// API key kept in a private file under the config directory.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    dir: PathBuf,
}

impl FileCredentialStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Result<Option<String>, Error> {
        Ok(load_secret(&self.dir, API_KEY_SECRET)?)
    }

    fn set(&self, value: &str) -> Result<(), Error> {
        Ok(save_secret(&self.dir, API_KEY_SECRET, value)?)
    }

    fn clear(&self) -> Result<bool, Error> {
        Ok(delete_secret(&self.dir, API_KEY_SECRET)?)
    }

    fn describe(&self) -> String {
        self.dir.join(API_KEY_SECRET).display().to_string()
    }
}

/// Prefers a non-empty environment variable, then falls back to `inner`.
/// Writes always go to `inner`.
#[derive(Debug, Clone)]
pub struct EnvCredentialStore<S> {
    var: String,
    inner: S,
}

impl<S: CredentialStore> EnvCredentialStore<S> {
    pub fn new(var: impl Into<String>, inner: S) -> Self {
        Self {
            var: var.into(),
            inner,
        }
    }

    fn from_env(&self) -> Option<String> {
        std::env::var(&self.var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

impl<S: CredentialStore> CredentialStore for EnvCredentialStore<S> {
    fn get(&self) -> Result<Option<String>, Error> {
        match self.from_env() {
            Some(key) => Ok(Some(key)),
            None => self.inner.get(),
        }
    }

    fn set(&self, value: &str) -> Result<(), Error> {
        self.inner.set(value)
    }

    fn clear(&self) -> Result<bool, Error> {
        self.inner.clear()
    }

    fn describe(&self) -> String {
        if self.from_env().is_some() {
            format!("${}", self.var)
        } else {
            self.inner.describe()
        }
    }
}

/// The store every command uses: `$GEMINI_API_KEY`, then the key file.
pub fn default_store() -> color_eyre::eyre::Result<EnvCredentialStore<FileCredentialStore>> {
    Ok(EnvCredentialStore::new(
        API_KEY_ENV,
        FileCredentialStore::new(crate::config::config_dir()?),
    ))
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(temp_dir.path().to_path_buf());

        assert_eq!(store.get().unwrap(), None);
        store.set(" AIza-file-key ").unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("AIza-file-key"));
        assert!(store.clear().unwrap());
        assert_eq!(store.get().unwrap(), None);
    }

    #[test]
    fn test_file_store_rejects_empty_key() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(temp_dir.path().to_path_buf());

        assert!(matches!(store.set(""), Err(Error::CredentialStore(_))));
    }

    #[test]
    fn test_env_store_falls_back_to_inner() {
        let store = EnvCredentialStore::new(
            "CODEXR_TEST_UNSET_KEY_VARIABLE",
            memory::MemoryCredentialStore::with_key("stored"),
        );

        assert_eq!(store.get().unwrap().as_deref(), Some("stored"));
        assert_eq!(store.describe(), "memory");

        store.set("replaced").unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("replaced"));
    }

    #[test]
    fn test_env_store_prefers_environment() {
        let var = "CODEXR_TEST_ENV_STORE_KEY";
        std::env::set_var(var, "from-env");

        let store = EnvCredentialStore::new(var, memory::MemoryCredentialStore::with_key("stored"));
        assert_eq!(store.get().unwrap().as_deref(), Some("from-env"));
        assert_eq!(store.describe(), format!("${var}"));

        std::env::set_var(var, "   ");
        assert_eq!(store.get().unwrap().as_deref(), Some("stored"));

        std::env::remove_var(var);
    }
}
