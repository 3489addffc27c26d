//! Settings file and command-line merging.
//!
//! Precedence is command line, then `config.toml`, then built-in defaults.
//! The file lives at `<config dir>/vblank/config.toml` unless `--config`
//! names another one.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;
use vblank_machines::rom_loader::ChecksumPolicy;

pub const DEFAULT_SCALE: u32 = 3;
pub const DEFAULT_FRAME_MS: u64 = 10;

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// A value parsed but is out of range.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Parse { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Invalid(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub scale: Option<u32>,
    pub frame_ms: Option<u64>,
    pub skip_checksums: Option<bool>,
}

impl FileConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("vblank").join("config.toml"))
    }

    /// Read the settings file.
    ///
    /// An explicitly named file must exist. The default location is
    /// optional: if nothing is there, every key falls back to its default.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => match Self::default_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file");
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Io { path, source }),
        };

        let config = Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), ?config, "loaded config file");
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

/// Values given on the command line; `None` defers to the file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub scale: Option<u32>,
    pub frame_ms: Option<u64>,
    pub skip_checksums: bool,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub scale: u32,
    pub frame_threshold: Duration,
    pub checksums: ChecksumPolicy,
}

impl Settings {
    pub fn resolve(cli: &Overrides, file: &FileConfig) -> Result<Self, ConfigError> {
        let scale = cli.scale.or(file.scale).unwrap_or(DEFAULT_SCALE);
        if scale == 0 {
            return Err(ConfigError::Invalid("scale must be at least 1".into()));
        }

        let frame_ms = cli.frame_ms.or(file.frame_ms).unwrap_or(DEFAULT_FRAME_MS);
        if frame_ms == 0 {
            return Err(ConfigError::Invalid("frame_ms must be at least 1".into()));
        }

        let checksums = if cli.skip_checksums || file.skip_checksums.unwrap_or(false) {
            ChecksumPolicy::Skip
        } else {
            ChecksumPolicy::Verify
        };

        Ok(Self {
            scale,
            frame_threshold: Duration::from_millis(frame_ms),
            checksums,
        })
    }
}
