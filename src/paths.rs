//! XDG-compliant path resolution.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

const APP_DIR: &str = "sentiment-lens";

/// Errors from path resolution.
#[derive(Debug, Error, Diagnostic)]
pub enum PathError {
    #[error("cannot determine home directory")]
    #[diagnostic(
        code(lens::paths::no_home),
        help("Set the HOME environment variable or pass --data-dir explicitly.")
    )]
    NoHome,
}

pub type PathResult<T> = std::result::Result<T, PathError>;

/// Directories used by the CLI.
#[derive(Debug, Clone)]
pub struct LensPaths {
    /// `$XDG_CONFIG_HOME/sentiment-lens/`
    pub config_dir: PathBuf,
    /// `$XDG_DATA_HOME/sentiment-lens/`
    pub data_dir: PathBuf,
}

impl LensPaths {
    /// Resolve XDG directories from environment variables with standard fallbacks.
    pub fn resolve() -> PathResult<Self> {
        let home = std::env::var("HOME")
            .map(PathBuf::from)
            .map_err(|_| PathError::NoHome)?;

        let xdg = |var: &str, fallback: &str| {
            std::env::var(var)
                .map(PathBuf::from)
                .unwrap_or_else(|_| home.join(fallback))
                .join(APP_DIR)
        };

        Ok(Self {
            config_dir: xdg("XDG_CONFIG_HOME", ".config"),
            data_dir: xdg("XDG_DATA_HOME", ".local/share"),
        })
    }

    /// Same layout rooted at a single directory (`--data-dir`).
    pub fn rooted(root: &Path) -> Self {
        Self {
            config_dir: root.join("config"),
            data_dir: root.to_path_buf(),
        }
    }

    /// Path to the config file.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Path to the analysis history database.
    pub fn history_db(&self) -> PathBuf {
        self.data_dir.join("history.redb")
    }

    /// Directory exports are written to when no output path is given.
    pub fn exports_dir(&self) -> PathBuf {
        self.data_dir.join("exports")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_paths_use_app_dir() {
        // Env vars are not mutated here (that is unsafe in edition 2024).
        let Ok(paths) = LensPaths::resolve() else {
            return;
        };
        assert!(paths.config_dir.ends_with(APP_DIR));
        assert!(paths.data_dir.ends_with(APP_DIR));
        assert!(paths.config_file().starts_with(&paths.config_dir));
    }

    #[test]
    fn rooted_layout() {
        let paths = LensPaths::rooted(Path::new("/tmp/lens"));
        assert_eq!(paths.config_file(), PathBuf::from("/tmp/lens/config/config.toml"));
        assert_eq!(paths.history_db(), PathBuf::from("/tmp/lens/history.redb"));
        assert_eq!(paths.exports_dir(), PathBuf::from("/tmp/lens/exports"));
    }

    #[test]
    fn history_and_exports_live_under_data_dir() {
        let paths = LensPaths::rooted(Path::new("/srv/lens"));
        assert!(paths.history_db().starts_with(&paths.data_dir));
        assert!(paths.exports_dir().starts_with(&paths.data_dir));
        assert!(!paths.config_file().starts_with(paths.exports_dir()));
    }
}
