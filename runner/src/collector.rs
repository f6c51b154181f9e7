use crate::config::{ConfigErrors, MergeConfig};
use globset::GlobBuilder;
use ignore::{DirEntry, WalkBuilder};
use itertools::Itertools;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug)]
/// Results files named by one merge entry
/// These should be initialized from `Collector::load`
pub enum Collector {
    Path { paths: Vec<PathBuf> },
    Glob { paths: Vec<PathBuf> },
}

impl Collector {
    /// `index` is the position of the entry in the session, used for errors
    pub fn load(index: usize, config: &MergeConfig) -> Result<Self, ConfigErrors> {
        match (&config.path, &config.glob) {
            (Some(path), None) => Ok(Self::Path {
                paths: vec![path.clone()],
            }),
            (None, Some(glob)) => {
                let root = config.root.as_deref().unwrap_or(Path::new("."));

                Self::glob(glob, root)
            }
            _ => Err(ConfigErrors::InvalidMerge(index)),
        }
    }

    /// every file under `root` whose path relative to `root` matches `glob`
    pub fn glob(glob: &str, root: &Path) -> Result<Self, ConfigErrors> {
        let matcher = GlobBuilder::new(glob).build()?.compile_matcher();

        debug!("Filtering with glob: {matcher:?}");
        let mut paths = WalkBuilder::new(root)
            .standard_filters(false)
            .build()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().map_or(false, |kind| kind.is_file()))
            .map(DirEntry::into_path)
            .filter(|path| matcher.is_match(path.strip_prefix(root).unwrap_or(path.as_path())))
            .sorted()
            .collect_vec();

        if paths.is_empty() {
            warn!(root = ?root, "Glob {glob} did not match any results file");
        }

        // popped from the back
        paths.reverse();

        Ok(Self::Glob { paths })
    }
}

impl Iterator for Collector {
    type Item = PathBuf;

    /// return accurate size for underlying iterator
    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Self::Path { paths } | Self::Glob { paths } => (paths.len(), Some(paths.len())),
        }
    }

    /// return the next file in path order
    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Path { paths } | Self::Glob { paths } => paths.pop(),
        }
    }
}

impl ExactSizeIterator for Collector {}
