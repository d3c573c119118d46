//! Locates the `guardrails.toml` that governs a repository.
//!
//! `--config` wins outright. Otherwise the repository root is searched for
//! `guardrails.toml`, then `.guardrails.toml`, and last the user-level
//! directory (`$GUARDRAILS_CONFIG_DIR`, else `~/.guardrails/`). Only regular
//! files count. With nothing found the built-in defaults apply.

use std::path::{Path, PathBuf};

/// Where the configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `--config` on the command line.
    Explicit(PathBuf),
    /// A config file at the repository root.
    Project(PathBuf),
    /// `config.toml` in the user-level directory.
    Global(PathBuf),
    /// Built-in defaults.
    Default,
}

impl ConfigSource {
    /// The file to load, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Short name used in log lines.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Explicit(_) => "explicit",
            Self::Project(_) => "project",
            Self::Global(_) => "global",
            Self::Default => "default",
        }
    }
}

/// Repository-level config names, in lookup order.
pub const PROJECT_CONFIG_NAMES: &[&str] = &["guardrails.toml", ".guardrails.toml"];

const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Overrides the user-level config directory.
pub const CONFIG_DIR_ENV_VAR: &str = "GUARDRAILS_CONFIG_DIR";

/// Resolves the config for the repository at `root`.
#[must_use]
pub fn resolve(root: &Path, explicit: Option<&Path>) -> ConfigSource {
    match explicit {
        Some(path) => ConfigSource::Explicit(path.to_path_buf()),
        None => search(root, global_config_dir().as_deref()),
    }
}

fn search(root: &Path, global_dir: Option<&Path>) -> ConfigSource {
    let project = PROJECT_CONFIG_NAMES
        .iter()
        .map(|name| ConfigSource::Project(root.join(name)));
    let global = global_dir.map(|dir| ConfigSource::Global(dir.join(GLOBAL_CONFIG_NAME)));

    let found = project
        .chain(global)
        .find(|source| source.path().is_some_and(Path::is_file))
        .unwrap_or(ConfigSource::Default);
    tracing::debug!(source = found.label(), path = ?found.path(), "config resolved");
    found
}

fn global_config_dir() -> Option<PathBuf> {
    std::env::var_os(CONFIG_DIR_ENV_VAR)
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| home::home_dir().map(|home| home.join(".guardrails")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn explicit_path_is_taken_as_given() {
        let repo = TempDir::new().unwrap();
        fs::write(repo.path().join("guardrails.toml"), "").unwrap();

        let source = resolve(repo.path(), Some(Path::new("ci/strict.toml")));
        assert_eq!(source, ConfigSource::Explicit(PathBuf::from("ci/strict.toml")));
        assert_eq!(source.label(), "explicit");
    }

    #[test]
    fn dotfile_is_used_when_plain_name_is_absent() {
        let repo = TempDir::new().unwrap();
        fs::write(repo.path().join(".guardrails.toml"), "mode = \"warn\"\n").unwrap();
        assert_eq!(
            search(repo.path(), None),
            ConfigSource::Project(repo.path().join(".guardrails.toml"))
        );

        fs::write(repo.path().join("guardrails.toml"), "").unwrap();
        assert_eq!(
            search(repo.path(), None),
            ConfigSource::Project(repo.path().join("guardrails.toml"))
        );
    }

    #[test]
    fn directory_named_like_a_config_is_skipped() {
        let repo = TempDir::new().unwrap();
        fs::create_dir(repo.path().join("guardrails.toml")).unwrap();
        assert_eq!(search(repo.path(), None), ConfigSource::Default);
    }

    #[test]
    fn user_config_applies_only_to_unconfigured_repos() {
        let repo = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        fs::write(user.path().join("config.toml"), "").unwrap();

        let source = search(repo.path(), Some(user.path()));
        assert_eq!(source, ConfigSource::Global(user.path().join("config.toml")));
        assert_eq!(source.label(), "global");

        fs::write(repo.path().join(".guardrails.toml"), "").unwrap();
        assert_eq!(search(repo.path(), Some(user.path())).label(), "project");
    }

    #[test]
    fn unconfigured_repo_uses_defaults() {
        let repo = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        let source = search(repo.path(), Some(user.path()));
        assert_eq!(source, ConfigSource::Default);
        assert!(source.path().is_none());
    }
}
