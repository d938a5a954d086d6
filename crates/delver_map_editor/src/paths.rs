//! Project-relative asset paths for portable save files

use std::path::{Component, Path, PathBuf};

/// Converts asset paths between this machine and save files.
///
/// Saved paths are relative to the project root, prefixed with `/` and use
/// forward slashes on every platform.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssetPaths {
    project_root: PathBuf,
}

impl AssetPaths {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Convert an absolute path to a `/`-prefixed project-relative path.
    /// Paths outside the project root are returned unchanged.
    pub fn to_relative(&self, path: &Path) -> String {
        match self.to_relative_checked(path) {
            Some(relative) => relative,
            None => path.to_string_lossy().into_owned(),
        }
    }

    /// Like [`Self::to_relative`], but `None` for paths outside the root
    pub fn to_relative_checked(&self, path: &Path) -> Option<String> {
        let relative = normalize(path)
            .strip_prefix(normalize(&self.project_root))
            .ok()?
            .to_path_buf();
        let joined = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        Some(format!("/{joined}"))
    }

    pub fn is_inside_root(&self, path: &Path) -> bool {
        self.to_relative_checked(path).is_some()
    }

    /// Resolve a saved path back to an absolute one on this machine.
    /// Strings without the leading `/` are taken as ordinary paths.
    pub fn from_relative(&self, relative: &str) -> PathBuf {
        match relative.strip_prefix('/') {
            Some(stripped) => self.project_root.join(stripped),
            None => PathBuf::from(relative),
        }
    }
}

/// Lexically drop `.` components and fold `..` where possible
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}
