//! Discovery of runnable script files under a root directory.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use walkdir::{DirEntry, WalkDir};

/// Extension of runnable scripts (without the dot).
pub const SCRIPT_EXTENSION: &str = "ts";

/// How long a listing stays valid for cached reads.
pub const FILE_CACHE_TTL: Duration = Duration::from_millis(5000);

/// Directories never worth descending into.
pub const SKIP_DIRECTORIES: [&str; 8] = [
    "node_modules",
    "dist",
    "build",
    ".git",
    "coverage",
    ".next",
    ".nuxt",
    ".output",
];

/// A script found under the root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// File name without the extension.
    pub name: String,
    /// Absolute path.
    pub path: PathBuf,
    /// Path relative to the root, always `/`-separated.
    pub relative_path: String,
}

#[derive(Debug)]
struct CachedListing {
    files: Vec<FileRecord>,
    captured_at: Instant,
    root: PathBuf,
}

/// Lists script files and keeps the last listing around for a short while.
#[derive(Debug)]
pub struct FileLister {
    ttl: Duration,
    cache: Option<CachedListing>,
}

impl Default for FileLister {
    fn default() -> Self {
        Self::new()
    }
}

impl FileLister {
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(FILE_CACHE_TTL)
    }

    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self { ttl, cache: None }
    }

    /// List every script under `root_dir` (relative paths resolve against the
    /// current directory), sorted by relative path.
    ///
    /// With `use_cache`, a listing of the same root younger than the TTL is
    /// returned without touching the filesystem. Any fresh scan replaces the
    /// cached listing, including scans made with `use_cache == false`.
    pub fn list(&mut self, root_dir: &Path, use_cache: bool) -> Vec<FileRecord> {
        let root = resolve_root(root_dir);

        if use_cache
            && let Some(cached) = &self.cache
            && cached.root == root
            && cached.captured_at.elapsed() < self.ttl
        {
            return cached.files.clone();
        }

        if !root.exists() {
            tracing::warn!("Directory does not exist: {}", root.display());
            return Vec::new();
        }

        let files = scan(&root);
        self.cache = Some(CachedListing {
            files: files.clone(),
            captured_at: Instant::now(),
            root,
        });
        files
    }

    /// Forget the cached listing.
    pub fn clear(&mut self) {
        self.cache = None;
    }
}

fn resolve_root(root_dir: &Path) -> PathBuf {
    if root_dir.is_absolute() {
        return root_dir.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(root_dir),
        Err(e) => {
            tracing::warn!("Cannot determine current directory: {e}");
            root_dir.to_path_buf()
        }
    }
}

fn is_skipped(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIP_DIRECTORIES.contains(&name))
}

fn scan(root: &Path) -> Vec<FileRecord> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).into_iter().filter_entry(|e| !is_skipped(e)) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let dir = e.path().unwrap_or(root);
                tracing::warn!("Cannot read directory: {} ({e})", dir.display());
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry
            .file_name()
            .to_str()
            .and_then(|n| n.strip_suffix(SCRIPT_EXTENSION))
            .and_then(|n| n.strip_suffix('.'))
        else {
            continue;
        };

        let relative_path = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .replace('\\', "/");

        files.push(FileRecord {
            name: name.to_string(),
            path: entry.path().to_path_buf(),
            relative_path,
        });
    }

    files.sort_by(|a, b| compare_paths(&a.relative_path, &b.relative_path));
    files
}

/// Locale-like ordering: case-insensitive first, lowercase before uppercase on ties.
fn compare_paths(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}
