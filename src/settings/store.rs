//! File-backed storage for [`Settings`] and [`UpdateCheckState`].

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::settings::{Settings, SettingsError, UpdateCheckState};

/// Name of the per-user settings directory, relative to the home directory.
pub const SETTINGS_DIR_NAME: &str = ".circleci";

/// Name of the configuration file inside the settings directory.
pub const CONFIG_FILE_NAME: &str = "cli.yml";

/// Name of the update-check file inside the settings directory.
pub const UPDATE_CHECK_FILE_NAME: &str = "update_check.yml";

/// Reads and writes the local settings files.
///
/// The store is an explicit handle: construct it once (usually with
/// [`SettingsStore::from_home`]) and pass it to whatever needs settings.
/// It holds no cached state, so every call goes to disk.
///
/// # Durability
///
/// Every save writes a temporary file in the settings directory, flushes it
/// to disk, restricts it to the owner and renames it over the target. A
/// crash at any point leaves either the old complete file or the new one.
/// There is no cross-process locking: concurrent writers race and the last
/// rename wins.
///
/// # Example
///
/// ```rust
/// use circleci_core::{AuthToken, Settings, SettingsStore};
///
/// let dir = tempfile::tempdir().unwrap();
/// let store = SettingsStore::new(dir.path().join(".circleci"));
///
/// // Nothing saved yet: defaults, not an error
/// assert_eq!(store.load().unwrap(), Settings::default());
///
/// let settings = Settings {
///     host: "https://circleci.com".to_string(),
///     token: AuthToken::new("abc"),
///     ..Settings::default()
/// };
/// store.save(&settings).unwrap();
/// assert_eq!(store.load().unwrap(), settings);
/// ```
#[derive(Clone, Debug)]
pub struct SettingsStore {
    base_dir: PathBuf,
}

impl SettingsStore {
    /// Creates a store rooted at `base_dir`. Nothing is touched on disk
    /// until the first save.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Creates a store rooted at `~/.circleci`.
    ///
    /// On Unix the `HOME` environment variable takes precedence over the
    /// platform lookup.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::HomeDirNotFound`] if no home directory can be
    /// determined.
    pub fn from_home() -> Result<Self, SettingsError> {
        Ok(Self::new(home_dir()?.join(SETTINGS_DIR_NAME)))
    }

    /// Returns the settings directory.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Returns the path of the configuration file.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.base_dir.join(CONFIG_FILE_NAME)
    }

    /// Returns the path of the update-check file.
    #[must_use]
    pub fn update_check_path(&self) -> PathBuf {
        self.base_dir.join(UPDATE_CHECK_FILE_NAME)
    }

    /// Loads the configuration file.
    ///
    /// A missing, empty or whitespace-only file yields
    /// [`Settings::default`].
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::ConfigParse`] if the file is not a valid
    /// settings mapping; nothing from it is applied in that case. Returns
    /// [`SettingsError::Io`] if the file exists but cannot be read.
    pub fn load(&self) -> Result<Settings, SettingsError> {
        let path = self.config_path();
        let Some(contents) = read_if_exists(&path)? else {
            tracing::debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(Settings::default());
        };

        if is_blank(&contents) {
            return Ok(Settings::default());
        }

        // Invalid UTF-8 is a parse failure, not an I/O one.
        let settings = serde_yaml::from_slice(&contents)
            .map_err(|source| SettingsError::ConfigParse { path, source })?;
        Ok(settings)
    }

    /// Saves `settings`, replacing the configuration file atomically.
    ///
    /// Creates the settings directory (owner-only) if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Io`] if the directory or file cannot be
    /// written.
    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let contents = serde_yaml::to_string(settings).map_err(SettingsError::Serialize)?;
        self.write_atomic(&self.config_path(), contents.as_bytes())
    }

    /// Loads the update-check file.
    ///
    /// A missing file, or one that cannot be parsed, yields
    /// [`UpdateCheckState::default`] ("never checked"). The update check is
    /// best-effort, so a corrupt file is logged and otherwise ignored.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Io`] only if the file exists but cannot be
    /// read.
    pub fn load_update_check(&self) -> Result<UpdateCheckState, SettingsError> {
        let path = self.update_check_path();
        let Some(contents) = read_if_exists(&path)? else {
            return Ok(UpdateCheckState::default());
        };

        if is_blank(&contents) {
            return Ok(UpdateCheckState::default());
        }

        match serde_yaml::from_slice(&contents) {
            Ok(state) => Ok(state),
            Err(error) => {
                tracing::warn!(
                    path = %path.display(),
                    %error,
                    "Ignoring unreadable update check file"
                );
                Ok(UpdateCheckState::default())
            }
        }
    }

    /// Saves `state`, replacing the update-check file atomically.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Io`] if the directory or file cannot be
    /// written.
    pub fn save_update_check(&self, state: &UpdateCheckState) -> Result<(), SettingsError> {
        let contents = serde_yaml::to_string(state).map_err(SettingsError::Serialize)?;
        self.write_atomic(&self.update_check_path(), contents.as_bytes())
    }

    fn write_atomic(&self, path: &Path, contents: &[u8]) -> Result<(), SettingsError> {
        create_private_dir(&self.base_dir)?;

        let io_error = |source: io::Error| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        };

        // Same directory as the target so the rename never crosses filesystems.
        let mut temp = NamedTempFile::new_in(&self.base_dir).map_err(io_error)?;
        temp.write_all(contents).map_err(io_error)?;
        temp.as_file().sync_all().map_err(io_error)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            temp.as_file()
                .set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(io_error)?;
        }

        temp.persist(path).map_err(|e| io_error(e.error))?;

        // Make the rename itself durable.
        #[cfg(unix)]
        if let Err(error) = fs::File::open(&self.base_dir).and_then(|dir| dir.sync_all()) {
            tracing::debug!(path = %self.base_dir.display(), %error, "Failed to sync settings directory");
        }

        tracing::debug!(path = %path.display(), "Saved settings file");
        Ok(())
    }
}

fn read_if_exists(path: &Path) -> Result<Option<Vec<u8>>, SettingsError> {
    match fs::read(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(SettingsError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn is_blank(contents: &[u8]) -> bool {
    contents.iter().all(u8::is_ascii_whitespace)
}

fn create_private_dir(dir: &Path) -> Result<(), SettingsError> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }

    builder.create(dir).map_err(|source| SettingsError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

fn home_dir() -> Result<PathBuf, SettingsError> {
    #[cfg(unix)]
    if let Some(home) = std::env::var_os("HOME").filter(|home| !home.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    dirs::home_dir().ok_or(SettingsError::HomeDirNotFound)
}
