use crate::{
    collector::Collector,
    config::{ConfigErrors, MergeMode, SessionConfig},
};
use benchview_analysis::{AnalysisError, BenchmarkStore, SharedStore};
use benchview_ingest::{read_file, IngestError};
use itertools::Itertools;
use rayon::prelude::*;
use std::{
    iter,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to load {}: {source}", .path.display())]
    Ingest {
        path: PathBuf,
        #[source]
        source: IngestError,
    },
    #[error("Error parsing file {}: no benchmark could be loaded", .0.display())]
    Empty(PathBuf),
    #[error("No results file is open")]
    NotOpened,
    #[error("Invalid session configuration")]
    Config(#[from] ConfigErrors),
}

/// A results file merged after the origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merge {
    pub path: PathBuf,
    pub mode: MergeMode,
}

/// Decoded results file and the records that could not be decoded
#[derive(Debug)]
pub struct Loaded {
    pub store: BenchmarkStore,
    pub rejected: Vec<AnalysisError>,
}

/// Open results plus the history needed to rebuild them
///
/// The store is replaced as a whole by `open` and `reload`, and merged into
/// by `append`/`overwrite`. A file that fails to load never changes it.
#[derive(Debug, Default)]
pub struct Session {
    origin: Option<PathBuf>,
    merges: Vec<Merge>,
    store: SharedStore,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the origin of `config`, then apply its merges in order
    #[tracing::instrument(level = "debug", skip(config), fields(origin = ?config.origin))]
    pub fn from_config(config: &SessionConfig) -> Result<Self, SessionError> {
        let mut session = Self::new();
        session.open(&config.origin)?;

        for (index, merge) in config.merges.iter().enumerate() {
            for path in Collector::load(index, merge)? {
                session.merge(&path, merge.mode)?;
            }
        }

        Ok(session)
    }

    /// Replace everything with the results of `path`
    pub fn open(&mut self, path: &Path) -> Result<Vec<AnalysisError>, SessionError> {
        let loaded = load_file(path)?;

        info!(path = ?path, records = loaded.store.len(), "Opened results");
        self.store.replace(loaded.store);
        self.origin = Some(path.to_path_buf());
        self.merges.clear();

        Ok(loaded.rejected)
    }

    pub fn append(&mut self, path: &Path) -> Result<Vec<AnalysisError>, SessionError> {
        self.merge(path, MergeMode::Append)
    }

    pub fn overwrite(&mut self, path: &Path) -> Result<Vec<AnalysisError>, SessionError> {
        self.merge(path, MergeMode::Overwrite)
    }

    /// Merge the results of `path` into the open ones and remember it for reloads
    pub fn merge(&mut self, path: &Path, mode: MergeMode) -> Result<Vec<AnalysisError>, SessionError> {
        if self.origin.is_none() {
            return Err(SessionError::NotOpened);
        }

        let loaded = load_file(path)?;
        match mode {
            MergeMode::Append => self.store.append_results(loaded.store),
            MergeMode::Overwrite => self.store.overwrite_results(loaded.store),
        }
        self.merges.push(Merge {
            path: path.to_path_buf(),
            mode,
        });

        Ok(loaded.rejected)
    }

    /// Rebuild the store from the origin and every merge
    ///
    /// Files are read concurrently. The current store is only replaced once
    /// every file loaded, otherwise it stays as it was.
    #[tracing::instrument(level = "debug", skip(self), fields(merges = self.merges.len()))]
    pub fn reload(&mut self) -> Result<(), SessionError> {
        let origin = self.origin.as_ref().ok_or(SessionError::NotOpened)?;
        let files = iter::once(origin)
            .chain(self.merges.iter().map(|merge| &merge.path))
            .collect_vec();

        let mut loaded = files
            .par_iter()
            .map(|path| load_file(path.as_path()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|error| {
                warn!("Reload aborted, keeping the current results");
                error
            })?
            .into_iter();

        let Some(first) = loaded.next() else {
            return Err(SessionError::NotOpened);
        };
        let mut store = first.store;
        for (merge, file) in self.merges.iter().zip(loaded) {
            match merge.mode {
                MergeMode::Append => store.append_results(file.store),
                MergeMode::Overwrite => store.overwrite_results(file.store),
            }
        }

        info!(
            files = files.len(),
            records = store.len(),
            "Reloaded results"
        );
        self.store.replace(store);

        Ok(())
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    pub fn merges(&self) -> &[Merge] {
        &self.merges
    }
}

/// Read and decode one results file, rejecting files without any record
#[tracing::instrument(level = "debug")]
pub fn load_file(path: &Path) -> Result<Loaded, SessionError> {
    let raw = read_file(path).map_err(|source| {
        error!(error = ?source, path = ?path, "Failed to read results: {source}");

        SessionError::Ingest {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let (store, rejected) = BenchmarkStore::load(raw);
    if store.is_empty() {
        error!(path = ?path, "Error parsing file, no benchmark could be loaded");

        return Err(SessionError::Empty(path.to_path_buf()));
    }
    if !rejected.is_empty() {
        warn!(
            path = ?path,
            rejected = rejected.len(),
            "Some benchmarks were left out"
        );
    }

    Ok(Loaded { store, rejected })
}
