use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;
use std::time::Duration;

use archer_format::ToolGroup;
use tracing::{debug, trace};

use crate::compat;
use crate::locator::{ChainLocator, PathLocator, StaticLocator, ToolLocator};
use crate::variant::{DEFAULT_PROBE_TIMEOUT, ToolFamily, Variant, VariantProbe, VersionProbe};

/// A binary found on the host, together with its implementation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedTool {
    pub name: String,
    pub path: PathBuf,
    pub family: ToolFamily,
    pub variant: Variant,
}

impl ResolvedTool {
    pub fn supports(&self, flag: &str) -> bool {
        compat::supports(self.family, self.variant, flag)
    }

    pub fn sanitize<S: AsRef<str>>(&self, flags: &[S]) -> Vec<String> {
        compat::sanitize_flags(self.family, self.variant, flags)
    }

    pub fn path_str(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

#[derive(Clone, Debug)]
pub struct ResolverOptions {
    pub probe_timeout: Duration,
    /// Directories searched before `PATH`.
    pub search_paths: Vec<PathBuf>,
    /// Binary names mapped to fixed paths, consulted before any search.
    pub pinned: Vec<(String, PathBuf)>,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            search_paths: Vec::new(),
            pinned: Vec::new(),
        }
    }
}

impl ResolverOptions {
    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn search_paths(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.search_paths.extend(paths);
        self
    }

    pub fn pin(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.pinned.push((name.into(), path.into()));
        self
    }
}

type Locator = Box<dyn ToolLocator + Send + Sync>;
type Probe = Box<dyn VariantProbe + Send + Sync>;

/// Finds and classifies host tools, remembering every answer.
///
/// Lookups are cached per binary name, misses included, until [`reprobe`]
/// is called. The first answer stored for a name is the one every caller sees.
///
/// [`reprobe`]: ToolResolver::reprobe
pub struct ToolResolver {
    locator: Locator,
    probe: Probe,
    cache: RwLock<HashMap<String, Option<ResolvedTool>>>,
}

impl std::fmt::Debug for ToolResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolResolver")
            .field("cached", &self.cached_len())
            .finish_non_exhaustive()
    }
}

impl ToolResolver {
    pub fn new<L, P>(locator: L, probe: P) -> Self
    where
        L: ToolLocator + Send + Sync + 'static,
        P: VariantProbe + Send + Sync + 'static,
    {
        Self {
            locator: Box::new(locator),
            probe: Box::new(probe),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Resolver over the real host: pinned paths, then `PATH` lookup, with
    /// version probing.
    pub fn system(options: &ResolverOptions) -> Self {
        let pinned: StaticLocator = options.pinned.iter().cloned().collect();
        Self::new(
            ChainLocator::new(
                pinned,
                PathLocator::new().search_paths(options.search_paths.iter().cloned()),
            ),
            VersionProbe::new(options.probe_timeout),
        )
    }

    /// Look up a single binary.
    pub fn resolve(&self, name: &str) -> Option<ResolvedTool> {
        if let Some(hit) = self.read_cache(name) {
            return hit;
        }

        let resolved = self.locator.locate(name).map(|path| {
            let family = ToolFamily::of(&path);
            let variant = self.probe.probe(&path, family);
            ResolvedTool {
                name: name.to_string(),
                path,
                family,
                variant,
            }
        });
        trace!(tool = name, found = resolved.is_some(), "probed");

        let mut cache = match self.cache.write() {
            Ok(cache) => cache,
            Err(poisoned) => poisoned.into_inner(),
        };
        cache.entry(name.to_string()).or_insert(resolved).clone()
    }

    /// The first of `names` present on the host.
    pub fn find_tool(&self, names: &[&str]) -> Option<ResolvedTool> {
        names.iter().find_map(|name| self.resolve(name))
    }

    /// The first group with an installed tool, and that tool.
    pub fn find_tool_group<'g>(
        &self,
        groups: &'g [ToolGroup],
    ) -> Option<(ResolvedTool, &'g ToolGroup)> {
        let found = groups
            .iter()
            .find_map(|group| self.find_tool(group.tools).map(|tool| (tool, group)));
        match &found {
            Some((tool, _)) => {
                debug!(tool = %tool.name, path = %tool.path.display(), "selected tool")
            }
            None => debug!(groups = groups.len(), "no tool group available"),
        }
        found
    }

    /// Forget every cached lookup.
    pub fn reprobe(&self) {
        match self.cache.write() {
            Ok(mut cache) => cache.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }

    fn read_cache(&self, name: &str) -> Option<Option<ResolvedTool>> {
        match self.cache.read() {
            Ok(cache) => cache.get(name).cloned(),
            Err(poisoned) => poisoned.into_inner().get(name).cloned(),
        }
    }

    fn cached_len(&self) -> usize {
        match self.cache.read() {
            Ok(cache) => cache.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}
