use benchview_analysis::PlotParams;
use globset::GlobBuilder;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum ConfigErrors {
    #[error("Globs were invalid")]
    InvalidGlobs(#[from] globset::Error),
    #[error("Failed to read session file")]
    Read(#[from] std::io::Error),
    #[error("Failed to parse session file")]
    Parse(#[from] serde_yaml::Error),
    #[error("Merge entry {0} needs exactly one of 'path' or 'glob'")]
    InvalidMerge(usize),
    #[error("Session failed the preflight checks")]
    Preflight,
}

/// How a results file is combined with the results already loaded
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
    /// add every record, renaming colliding names
    #[default]
    Append,
    /// replace records with the same name, add the others
    Overwrite,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    // first results file, opened as a new store
    pub origin: PathBuf,
    // merged in order on open and on every reload
    #[serde(default)]
    pub merges: Vec<MergeConfig>,
    // default chart request, command line flags take precedence
    #[serde(default)]
    pub plot: Option<PlotParams>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MergeConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub glob: Option<String>,
    // directory the glob is matched under, defaults to the session directory
    #[serde(default)]
    pub root: Option<PathBuf>,
    #[serde(default)]
    pub mode: MergeMode,
}

impl SessionConfig {
    /// Read a session file, relative paths are taken from its directory
    pub fn load(path: &Path) -> Result<Self, ConfigErrors> {
        let mut config: Self = serde_yaml::from_reader(File::open(path)?)?;

        if let Some(directory) = path.parent() {
            config.resolve_relative(directory);
        }

        Ok(config)
    }

    pub fn resolve_relative(&mut self, directory: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = directory.join(&*path);
            }
        };

        resolve(&mut self.origin);
        for merge in self.merges.iter_mut() {
            if let Some(path) = merge.path.as_mut() {
                resolve(path);
            }
            match merge.root.as_mut() {
                Some(root) => resolve(root),
                None if merge.glob.is_some() => merge.root = Some(directory.to_path_buf()),
                None => (),
            }
        }
    }

    /// true if any problem was found, every problem is logged
    pub fn preflight_checks(&self) -> bool {
        // attempt to catch all errors instead of piece-by-piece to make debugging easier for users
        let mut contains_error = false;

        if !self.origin.is_file() {
            error!(
                "Failed to find origin. Either not a file or not found at {}",
                self.origin.to_string_lossy()
            );
            contains_error = true;
        }

        for (index, merge) in self.merges.iter().enumerate() {
            match (&merge.path, &merge.glob) {
                (Some(_), Some(_)) | (None, None) => {
                    error!("merges.{index} must contain either 'path' or 'glob'");
                    contains_error = true;
                }
                (Some(path), None) => {
                    if !path.is_file() {
                        error!(
                            "Failed to find merges.{index}.path. Either not a file or not found at {}",
                            path.to_string_lossy()
                        );
                        contains_error = true;
                    }
                    if merge.root.is_some() {
                        warn!("merges.{index}.root is only used together with 'glob' and will be ignored");
                    }
                }
                (None, Some(glob)) => {
                    if let Err(error) = GlobBuilder::new(glob).build() {
                        error!("merges.{index}.glob ({glob}) is not a valid glob: {error}");
                        contains_error = true;
                    }
                    if let Some(root) = merge.root.as_ref().filter(|root| !root.is_dir()) {
                        error!(
                            "merges.{index}.root ({}) is not a directory",
                            root.to_string_lossy()
                        );
                        contains_error = true;
                    }
                }
            }
        }

        contains_error
    }
}
