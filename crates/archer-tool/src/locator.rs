//! Locating executables on the host.
//!
//! A [`ToolLocator`] only maps a binary name to an absolute path. Ordering
//! and caching live in [`ToolResolver`](crate::ToolResolver).

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

pub trait ToolLocator {
    fn locate(&self, name: &str) -> Option<PathBuf>;
}

impl<L: ToolLocator + ?Sized> ToolLocator for Box<L> {
    fn locate(&self, name: &str) -> Option<PathBuf> {
        (**self).locate(name)
    }
}

/// Searches configured directories, then `PATH`.
#[derive(Clone, Debug, Default)]
pub struct PathLocator {
    search_paths: Vec<PathBuf>,
}

impl PathLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search_paths(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.search_paths.extend(paths);
        self
    }
}

impl ToolLocator for PathLocator {
    fn locate(&self, name: &str) -> Option<PathBuf> {
        if !self.search_paths.is_empty() {
            let cwd = env::current_dir().ok()?;
            if let Ok(joined) = env::join_paths(&self.search_paths) {
                if let Ok(path) = which::which_in(name, Some(joined), cwd) {
                    return Some(path);
                }
            }
        }
        which::which(name).ok()
    }
}

/// A fixed name to path table.
#[derive(Clone, Debug, Default)]
pub struct StaticLocator {
    tools: HashMap<String, PathBuf>,
}

impl StaticLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.tools.insert(name.into(), path.into());
        self
    }
}

impl<S: Into<String>, P: Into<PathBuf>> FromIterator<(S, P)> for StaticLocator {
    fn from_iter<I: IntoIterator<Item = (S, P)>>(iter: I) -> Self {
        Self {
            tools: iter
                .into_iter()
                .map(|(name, path)| (name.into(), path.into()))
                .collect(),
        }
    }
}

impl ToolLocator for StaticLocator {
    fn locate(&self, name: &str) -> Option<PathBuf> {
        self.tools.get(name).cloned()
    }
}

/// Tries `primary`, then `fallback`.
#[derive(Clone, Debug)]
pub struct ChainLocator<L1, L2> {
    primary: L1,
    fallback: L2,
}

impl<L1, L2> ChainLocator<L1, L2>
where
    L1: ToolLocator,
    L2: ToolLocator,
{
    pub fn new(primary: L1, fallback: L2) -> Self {
        Self { primary, fallback }
    }
}

impl<L1, L2> ToolLocator for ChainLocator<L1, L2>
where
    L1: ToolLocator,
    L2: ToolLocator,
{
    fn locate(&self, name: &str) -> Option<PathBuf> {
        self.primary
            .locate(name)
            .or_else(|| self.fallback.locate(name))
    }
}
