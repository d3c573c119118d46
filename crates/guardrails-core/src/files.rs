//! File-universe collaborators.
//!
//! Scanners never walk the filesystem themselves. They receive
//! [`FileRecord`]s from a [`FileLister`]: [`GitLister`] asks version control
//! for tracked (and optionally untracked) paths, [`WalkLister`] walks a
//! directory honoring ignore files.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ToolError;
use crate::process::run_capped;
use crate::scope::normalize_path;

#[derive(Debug, Clone)]
enum Content {
    Disk(PathBuf),
    Inline(Vec<u8>),
}

/// A candidate file: repository-relative path plus lazily read content.
#[derive(Debug, Clone)]
pub struct FileRecord {
    path: String,
    tracked: bool,
    content: Content,
}

impl FileRecord {
    /// A file on disk at `root/relative`.
    #[must_use]
    pub fn on_disk(root: &Path, relative: &str, tracked: bool) -> Self {
        let path = normalize_path(relative);
        Self {
            content: Content::Disk(root.join(&path)),
            path,
            tracked,
        }
    }

    /// An in-memory file (fixtures, pre-materialized content).
    #[must_use]
    pub fn inline(path: &str, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path: normalize_path(path),
            tracked: true,
            content: Content::Inline(content.into()),
        }
    }

    /// Normalized repository-relative path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether version control tracks this file.
    #[must_use]
    pub fn is_tracked(&self) -> bool {
        self.tracked
    }

    /// Reads the content as text. Returns `Ok(None)` for binary content
    /// (any NUL byte); invalid UTF-8 is replaced lossily.
    ///
    /// # Errors
    ///
    /// Returns the IO error if the file cannot be read.
    pub fn load(&self) -> std::io::Result<Option<String>> {
        let bytes = match &self.content {
            Content::Disk(path) => std::fs::read(path)?,
            Content::Inline(bytes) => bytes.clone(),
        };
        if bytes.contains(&0) {
            return Ok(None);
        }
        Ok(Some(match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        }))
    }
}

/// Produces the file universe for a scan.
pub trait FileLister {
    /// Lists candidate files in deterministic (sorted) order.
    ///
    /// # Errors
    ///
    /// Returns a [`ToolError`] if the universe cannot be determined.
    fn list(&self) -> Result<Vec<FileRecord>, ToolError>;
}

/// Lists files known to git.
#[derive(Debug, Clone)]
pub struct GitLister {
    root: PathBuf,
    include_untracked: bool,
    max_output_bytes: usize,
}

impl GitLister {
    /// Creates a lister for the repository at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, max_output_bytes: usize) -> Self {
        Self {
            root: root.into(),
            include_untracked: false,
            max_output_bytes,
        }
    }

    /// Also lists untracked, non-ignored files.
    #[must_use]
    pub fn include_untracked(mut self, include: bool) -> Self {
        self.include_untracked = include;
        self
    }

    fn ls_files(&self, extra: &[&str]) -> Result<Vec<String>, ToolError> {
        let mut args = vec!["ls-files", "-z"];
        args.extend_from_slice(extra);
        let out = run_capped("git", &args, &self.root, self.max_output_bytes)?;
        Ok(out
            .split(|b| *b == 0)
            .filter(|p| !p.is_empty())
            .map(|p| String::from_utf8_lossy(p).into_owned())
            .collect())
    }
}

impl FileLister for GitLister {
    fn list(&self) -> Result<Vec<FileRecord>, ToolError> {
        let mut records: Vec<FileRecord> = self
            .ls_files(&[])?
            .iter()
            .map(|p| FileRecord::on_disk(&self.root, p, true))
            .collect();

        if self.include_untracked {
            let untracked = self.ls_files(&["--others", "--exclude-standard"])?;
            debug!(count = untracked.len(), "including untracked files");
            records.extend(
                untracked
                    .iter()
                    .map(|p| FileRecord::on_disk(&self.root, p, false)),
            );
        }

        records.sort_by(|a, b| a.path.cmp(&b.path).then(b.tracked.cmp(&a.tracked)));
        records.dedup_by(|a, b| a.path == b.path);
        Ok(records)
    }
}

/// Lists files by walking a directory, honoring `.gitignore`/`.ignore`.
///
/// Every listed file is reported as tracked. The `.git` directory itself
/// is never entered.
#[derive(Debug, Clone)]
pub struct WalkLister {
    root: PathBuf,
}

impl WalkLister {
    /// Creates a lister rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl FileLister for WalkLister {
    fn list(&self) -> Result<Vec<FileRecord>, ToolError> {
        let walker = ignore::WalkBuilder::new(&self.root)
            .hidden(false)
            .require_git(false)
            .filter_entry(|entry| entry.file_name() != std::ffi::OsStr::new(".git"))
            .build();

        let mut records = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| ToolError::Read {
                path: self.root.clone(),
                source: std::io::Error::other(e.to_string()),
            })?;
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            records.push(FileRecord::on_disk(
                &self.root,
                &relative.to_string_lossy(),
                true,
            ));
        }

        records.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn inline_record_normalizes_path() {
        let record = FileRecord::inline(".\\content\\home.mdx", "hi");
        assert_eq!(record.path(), "content/home.mdx");
        assert!(record.is_tracked());
    }

    #[test]
    fn binary_content_is_skipped() {
        let record = FileRecord::inline("assets/logo.png", vec![0x89, b'P', 0, b'G']);
        assert_eq!(record.load().unwrap(), None);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let record = FileRecord::inline("content/a.md", vec![b'a', 0xff, b'b']);
        assert_eq!(record.load().unwrap().as_deref(), Some("a\u{fffd}b"));
    }

    #[test]
    fn missing_disk_file_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let record = FileRecord::on_disk(dir.path(), "gone.md", true);
        assert!(record.load().is_err());
    }

    fn git(dir: &std::path::Path, args: &[&str]) {
        let status = std::process::Command::new("git")
            .args(args)
            .current_dir(dir)
            .status()
            .unwrap();
        assert!(status.success(), "git {args:?}");
    }

    #[test]
    fn git_lister_separates_tracked_and_untracked() {
        let dir = TempDir::new().unwrap();
        git(dir.path(), &["init", "-q"]);
        std::fs::create_dir_all(dir.path().join("content")).unwrap();
        std::fs::write(dir.path().join("content/home page.mdx"), "tracked").unwrap();
        std::fs::write(dir.path().join("draft.md"), "untracked").unwrap();
        std::fs::write(dir.path().join("debug.log"), "ignored").unwrap();
        std::fs::write(dir.path().join(".gitignore"), "*.log\n").unwrap();
        git(dir.path(), &["add", "content", ".gitignore"]);

        let tracked = GitLister::new(dir.path(), 1 << 20).list().unwrap();
        let paths: Vec<&str> = tracked.iter().map(FileRecord::path).collect();
        assert_eq!(paths, vec![".gitignore", "content/home page.mdx"]);

        let all = GitLister::new(dir.path(), 1 << 20)
            .include_untracked(true)
            .list()
            .unwrap();
        let listed: Vec<(&str, bool)> = all.iter().map(|r| (r.path(), r.is_tracked())).collect();
        assert_eq!(
            listed,
            vec![(".gitignore", true), ("content/home page.mdx", true), ("draft.md", false)]
        );
        assert_eq!(all[1].load().unwrap().as_deref(), Some("tracked"));
    }

    #[test]
    fn walk_lister_respects_ignore_files_and_sorts() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::create_dir_all(dir.path().join("dist")).unwrap();
        std::fs::create_dir_all(dir.path().join(".github")).unwrap();
        std::fs::write(dir.path().join(".ignore"), "dist/\n").unwrap();
        std::fs::write(dir.path().join("src/b.ts"), "b").unwrap();
        std::fs::write(dir.path().join("src/a.ts"), "a").unwrap();
        std::fs::write(dir.path().join("dist/out.js"), "x").unwrap();
        std::fs::write(dir.path().join(".github/ci.yml"), "y").unwrap();

        let records = WalkLister::new(dir.path()).list().unwrap();
        let paths: Vec<&str> = records.iter().map(FileRecord::path).collect();
        assert_eq!(paths, vec![".github/ci.yml", ".ignore", "src/a.ts", "src/b.ts"]);
        assert_eq!(records[2].load().unwrap().as_deref(), Some("a"));
    }
}
