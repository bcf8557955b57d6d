use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::RwLock;
use tracing::info;

use crate::document::TrackerDocument;
use crate::store;

/// Holds the live document and keeps the on-disk copy in step with it. The
/// UI reads snapshots and funnels every mutation through [`apply`].
///
/// [`apply`]: TrackerService::apply
pub struct TrackerService {
    data_path: PathBuf,
    document: RwLock<TrackerDocument>,
    watcher: Option<RecommendedWatcher>,
}

pub struct TrackerServiceBuilder {
    data_path: Option<PathBuf>,
}

impl TrackerServiceBuilder {
    pub fn new() -> Self {
        Self { data_path: None }
    }

    pub fn with_data_path(mut self, path: impl AsRef<Path>) -> Self {
        self.data_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn build(self) -> Result<TrackerService> {
        let data_path = self
            .data_path
            .ok_or_else(|| anyhow!("no data path configured"))?;
        let document = store::load(&data_path);
        info!(
            path = %data_path.display(),
            habits = document.habits.len(),
            weight_logs = document.weight_logs.len(),
            "tracker service ready"
        );
        Ok(TrackerService {
            data_path,
            document: RwLock::new(document),
            watcher: None,
        })
    }
}

impl Default for TrackerServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackerService {
    pub fn builder() -> TrackerServiceBuilder {
        TrackerServiceBuilder::new()
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Snapshot of the current document.
    pub fn document(&self) -> TrackerDocument {
        self.document.read().clone()
    }

    /// Run one mutation against the current document, persist the result,
    /// then publish it. The write lock serializes concurrent callers, so at
    /// most one mutation is in flight at a time. On a save failure the held
    /// document is left as it was.
    pub fn apply<F>(&self, mutate: F) -> Result<()>
    where
        F: FnOnce(TrackerDocument) -> TrackerDocument,
    {
        let mut guard = self.document.write();
        let next = mutate(guard.clone());
        store::save(&self.data_path, &next)?;
        *guard = next;
        Ok(())
    }

    /// Drop in-memory state in favor of whatever is on disk.
    pub fn reload(&self) {
        let fresh = store::load(&self.data_path);
        *self.document.write() = fresh;
    }

    /// Watch the data file and log external modifications. Picking them up
    /// is left to an explicit [`reload`].
    ///
    /// [`reload`]: TrackerService::reload
    pub fn watch(&mut self) -> Result<()> {
        if self.watcher.is_some() {
            return Ok(());
        }
        let mut watcher = notify::recommended_watcher(|res: notify::Result<notify::Event>| {
            if let Ok(event) = res {
                tracing::debug!(?event, "data file changed on disk");
            }
        })?;
        // The file may not exist until the first save; fall back to its
        // directory.
        let target = if self.data_path.exists() {
            self.data_path.clone()
        } else {
            self.data_path
                .parent()
                .filter(|parent| parent.exists())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."))
        };
        watcher.watch(&target, RecursiveMode::NonRecursive)?;
        self.watcher = Some(watcher);
        Ok(())
    }
}
