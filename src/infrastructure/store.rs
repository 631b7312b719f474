//! Chart record storage.
//!
//! A store keeps whole-chart records keyed by id. It assigns ids and creation
//! timestamps on insert and overwrites records on update; it knows nothing
//! about trees or groups beyond serializing them.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::domain::Chart;
use crate::infrastructure::traits::FileSystem;

/// Generic persistence of whole-chart records.
pub trait ChartStore: Send + Sync {
    /// Store a new record; the store assigns `id` and `created_at`.
    fn insert(&self, chart: Chart) -> io::Result<Chart>;

    /// Fully overwrite the record with `chart.id`.
    /// Fails with `NotFound` if there is no such record.
    fn update(&self, chart: &Chart) -> io::Result<()>;

    fn get(&self, id: &str) -> io::Result<Option<Chart>>;

    /// All records, in no particular order.
    fn list(&self) -> io::Result<Vec<Chart>>;

    /// Returns `false` if no record had that id.
    fn delete(&self, id: &str) -> io::Result<bool>;
}

fn assign_identity(mut chart: Chart) -> Chart {
    chart.id = Some(Uuid::new_v4().to_string());
    chart.created_at = Some(Utc::now());
    chart
}

fn missing_id() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, "chart has no id")
}

// ============================================================
// JSON FILE STORE
// ============================================================

/// One pretty-printed JSON file per record: `<dir>/<id>.json`.
pub struct JsonFileStore {
    dir: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            dir: dir.into(),
            fs,
        }
    }

    fn record_path(&self, id: &str) -> io::Result<PathBuf> {
        // Ids become file names; refuse anything that could escape the store dir
        if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid chart id: {id}"),
            ));
        }
        Ok(self.dir.join(format!("{id}.json")))
    }

    fn write_record(&self, path: &Path, chart: &Chart) -> io::Result<()> {
        let json = serde_json::to_string_pretty(chart)?;
        self.fs.write_atomic(path, &json)
    }

    fn read_record(&self, path: &Path) -> io::Result<Chart> {
        let content = self.fs.read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl ChartStore for JsonFileStore {
    #[instrument(level = "debug", skip(self, chart), fields(name = %chart.name))]
    fn insert(&self, chart: Chart) -> io::Result<Chart> {
        let chart = assign_identity(chart);
        let id = chart.id.as_deref().ok_or_else(missing_id)?;
        let path = self.record_path(id)?;
        self.write_record(&path, &chart)?;
        debug!("insert: wrote {}", path.display());
        Ok(chart)
    }

    #[instrument(level = "debug", skip(self, chart), fields(id = ?chart.id))]
    fn update(&self, chart: &Chart) -> io::Result<()> {
        let id = chart.id.as_deref().ok_or_else(missing_id)?;
        let path = self.record_path(id)?;
        if !self.fs.is_file(&path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no chart record: {id}"),
            ));
        }
        self.write_record(&path, chart)
    }

    fn get(&self, id: &str) -> io::Result<Option<Chart>> {
        let path = self.record_path(id)?;
        if !self.fs.is_file(&path) {
            return Ok(None);
        }
        self.read_record(&path).map(Some)
    }

    #[instrument(level = "debug", skip(self))]
    fn list(&self) -> io::Result<Vec<Chart>> {
        if !self.fs.exists(&self.dir) {
            return Ok(Vec::new());
        }
        let mut charts = Vec::new();
        for entry in walkdir::WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }
            let is_record = path.extension().map(|ext| ext == "json").unwrap_or(false);
            if !is_record {
                continue;
            }
            match self.read_record(path) {
                Ok(chart) => charts.push(chart),
                Err(e) => warn!("skipping unreadable chart record {}: {}", path.display(), e),
            }
        }
        debug!("list: found {} charts", charts.len());
        Ok(charts)
    }

    #[instrument(level = "debug", skip(self))]
    fn delete(&self, id: &str) -> io::Result<bool> {
        let path = self.record_path(id)?;
        if !self.fs.is_file(&path) {
            return Ok(false);
        }
        self.fs.remove_file(&path)?;
        Ok(true)
    }
}

// ============================================================
// IN-MEMORY STORE
// ============================================================

/// Process-local store, for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct InMemoryChartStore {
    records: Mutex<BTreeMap<String, Chart>>,
}

impl InMemoryChartStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> io::Result<std::sync::MutexGuard<'_, BTreeMap<String, Chart>>> {
        self.records
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "chart store lock poisoned"))
    }
}

impl ChartStore for InMemoryChartStore {
    fn insert(&self, chart: Chart) -> io::Result<Chart> {
        let chart = assign_identity(chart);
        let id = chart.id.clone().ok_or_else(missing_id)?;
        self.lock()?.insert(id, chart.clone());
        Ok(chart)
    }

    fn update(&self, chart: &Chart) -> io::Result<()> {
        let id = chart.id.as_deref().ok_or_else(missing_id)?;
        let mut records = self.lock()?;
        match records.get_mut(id) {
            Some(slot) => {
                *slot = chart.clone();
                Ok(())
            }
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no chart record: {id}"),
            )),
        }
    }

    fn get(&self, id: &str) -> io::Result<Option<Chart>> {
        Ok(self.lock()?.get(id).cloned())
    }

    fn list(&self) -> io::Result<Vec<Chart>> {
        Ok(self.lock()?.values().cloned().collect())
    }

    fn delete(&self, id: &str) -> io::Result<bool> {
        Ok(self.lock()?.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrgNode;

    fn chart(name: &str) -> Chart {
        Chart::new(name, None, OrgNode::new("r", "CEO", "Exec"))
    }

    #[test]
    fn given_new_chart_when_inserting_then_assigns_id_and_created_at() {
        let store = InMemoryChartStore::new();
        let saved = store.insert(chart("Acme")).unwrap();
        assert!(saved.id.is_some());
        assert!(saved.created_at.is_some());
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn given_unknown_id_when_updating_then_not_found() {
        let store = InMemoryChartStore::new();
        let mut c = chart("Acme");
        c.id = Some("missing".into());
        let err = store.update(&c).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn given_path_like_id_when_resolving_record_then_rejected() {
        let store = JsonFileStore::new("/tmp/charts", Arc::new(crate::infrastructure::traits::RealFileSystem));
        assert!(store.record_path("../etc/passwd").is_err());
        assert!(store.record_path("").is_err());
        assert!(store.record_path("abc-123").is_ok());
    }
}
