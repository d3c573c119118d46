//! Subcommand implementations.

pub mod boundary;
pub mod env;
pub mod init;
pub mod list_rules;
pub mod output;
pub mod prohibited;
pub mod scan;

use anyhow::Result;
use guardrails_core::{
    Config, FileLister, FileRecord, GitLister, Mode, ToolError, INCLUDE_UNTRACKED_ENV_VAR,
};
use std::path::{Path, PathBuf};

use crate::config_resolver::{self, ConfigSource};

/// Repository root plus its resolved configuration.
pub struct Context {
    /// Repository root every relative path is resolved against.
    pub root: PathBuf,
    /// Loaded configuration (defaults when no file was found).
    pub config: Config,
}

impl Context {
    /// Resolves and loads the configuration for `root`.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let source = config_resolver::resolve(root, explicit);
        let config = match source.path() {
            None => Config::default(),
            Some(path) => {
                if let ConfigSource::Global(_) = source {
                    tracing::info!("Using global config: {}", path.display());
                }
                Config::from_file(path).map_err(ToolError::from)?
            }
        };
        Ok(Self {
            root: root.to_path_buf(),
            config,
        })
    }

    /// Exit policy for lexical scanners: `GUARDRAILS_MODE` > config > `error`.
    pub fn mode(&self) -> Mode {
        Mode::from_env(self.config.mode)
    }

    /// Lists the tracked file universe (plus untracked files when enabled).
    pub fn files(&self) -> Result<Vec<FileRecord>, ToolError> {
        let env_value = std::env::var(INCLUDE_UNTRACKED_ENV_VAR).ok();
        GitLister::new(self.root.clone(), self.config.scan.max_output_bytes())
            .include_untracked(self.config.scan.include_untracked_with(env_value.as_deref()))
            .list()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn dotfile_config_sets_the_mode() {
        let repo = TempDir::new().unwrap();
        fs::write(repo.path().join(".guardrails.toml"), "mode = \"warn\"\n").unwrap();
        let ctx = Context::load(repo.path(), None).unwrap();
        assert_eq!(ctx.config.mode, Some(Mode::Warn));
    }

    #[test]
    fn explicit_config_must_exist() {
        let repo = TempDir::new().unwrap();
        let missing = repo.path().join("nope.toml");
        let err = Context::load(repo.path(), Some(&missing)).err().unwrap();
        assert!(err.downcast_ref::<ToolError>().is_some());
    }
}
