use std::fmt;

use vblank_core::video::RenderError;
use vblank_machines::rom_loader::RomLoadError;

use crate::config::ConfigError;

/// Everything that can end the process early.
#[derive(Debug)]
pub enum FrontendError {
    Config(ConfigError),
    UnknownMachine {
        name: String,
        available: Vec<&'static str>,
    },
    RomLoad(RomLoadError),
    /// SDL, window or renderer initialization failed.
    Sdl(String),
    /// The frame buffer could not be written mid-run.
    Render(RenderError),
}

impl FrontendError {
    /// 1 for anything that stops us starting, 2 for a render failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Render(_) => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for FrontendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration error: {e}"),
            Self::UnknownMachine { name, available } => {
                write!(
                    f,
                    "unknown machine: {name} (available: {})",
                    available.join(", ")
                )
            }
            Self::RomLoad(e) => write!(f, "failed to load ROMs: {e}"),
            Self::Sdl(msg) => write!(f, "SDL error: {msg}"),
            Self::Render(e) => write!(f, "render failed: {e}"),
        }
    }
}

impl std::error::Error for FrontendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::RomLoad(e) => Some(e),
            Self::Render(e) => Some(e),
            Self::UnknownMachine { .. } | Self::Sdl(_) => None,
        }
    }
}

impl From<ConfigError> for FrontendError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<RomLoadError> for FrontendError {
    fn from(e: RomLoadError) -> Self {
        Self::RomLoad(e)
    }
}

impl From<RenderError> for FrontendError {
    fn from(e: RenderError) -> Self {
        Self::Render(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_failures_exit_with_two() {
        let err = FrontendError::from(RenderError::Lock("busy".into()));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn startup_failures_exit_with_one() {
        let errors = [
            FrontendError::Sdl("no display".into()),
            FrontendError::RomLoad(RomLoadError::MissingFile("invaders.h".into())),
            FrontendError::UnknownMachine {
                name: "pacman".into(),
                available: vec!["invaders"],
            },
        ];
        for err in errors {
            assert_eq!(err.exit_code(), 1, "{err}");
        }
    }

    #[test]
    fn unknown_machine_lists_alternatives() {
        let err = FrontendError::UnknownMachine {
            name: "galaga".into(),
            available: vec!["invaders"],
        };
        assert_eq!(
            err.to_string(),
            "unknown machine: galaga (available: invaders)"
        );
    }
}
