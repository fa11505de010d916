use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("home directory not found: set $HOME environment variable")]
    HomeNotFound,
}

/// Centralized path construction for the `~/.pulse/` directory layout.
///
/// Use `resolve()` in production code and `from_dir()` in tests.
#[derive(Debug, Clone)]
pub struct PulsePaths {
    pulse_dir: PathBuf,
}

impl PulsePaths {
    /// Resolve paths from the user's home directory (`~/.pulse`).
    pub fn resolve() -> Result<Self, PathError> {
        let home = dirs::home_dir().ok_or(PathError::HomeNotFound)?;
        Ok(Self {
            pulse_dir: home.join(".pulse"),
        })
    }

    /// Create paths from an explicit base directory. Use in tests.
    pub fn from_dir(pulse_dir: PathBuf) -> Self {
        Self { pulse_dir }
    }

    /// The base `~/.pulse` directory.
    pub fn pulse_dir(&self) -> &Path {
        &self.pulse_dir
    }

    /// Persisted refresh settings: `~/.pulse/settings.toml`.
    pub fn settings_file(&self) -> PathBuf {
        self.pulse_dir.join("settings.toml")
    }

    /// Scratch file used for whole-record replacement of a settings file.
    pub fn settings_temp_file(settings_file: &Path) -> PathBuf {
        let mut name = settings_file
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "settings.toml".into());
        name.push(".tmp");
        settings_file.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_paths() -> PulsePaths {
        PulsePaths::from_dir(PathBuf::from("/home/user/.pulse"))
    }

    #[test]
    fn test_resolve_uses_home() {
        temp_env::with_var("HOME", Some("/home/tester"), || {
            let paths = PulsePaths::resolve().unwrap();
            assert_eq!(paths.pulse_dir(), Path::new("/home/tester/.pulse"));
        });
    }

    #[test]
    fn test_from_dir() {
        let paths = PulsePaths::from_dir(PathBuf::from("/tmp/test-pulse"));
        assert_eq!(paths.pulse_dir(), Path::new("/tmp/test-pulse"));
    }

    #[test]
    fn test_settings_file() {
        assert_eq!(
            test_paths().settings_file(),
            PathBuf::from("/home/user/.pulse/settings.toml")
        );
    }

    #[test]
    fn test_settings_temp_file_sits_next_to_target() {
        assert_eq!(
            PulsePaths::settings_temp_file(Path::new("/etc/pulse/custom.toml")),
            PathBuf::from("/etc/pulse/custom.toml.tmp")
        );
    }
}
