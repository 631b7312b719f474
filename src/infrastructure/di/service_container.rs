//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{ChartService, ExportService};
use crate::config::Settings;
use crate::infrastructure::store::{ChartStore, JsonFileStore};
use crate::infrastructure::traits::{FileSystem, RealFileSystem, Selector, SkimSelector};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Chart record storage
    pub store: Arc<dyn ChartStore>,

    /// Interactive node picker
    pub selector: Arc<dyn Selector>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    ///
    /// Charts are stored as JSON files under `settings.charts_dir()`.
    pub fn new(settings: Settings) -> Self {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let store = Arc::new(JsonFileStore::new(settings.charts_dir(), fs.clone()));
        Self::with_deps(settings, fs, store, Arc::new(SkimSelector))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        store: Arc<dyn ChartStore>,
        selector: Arc<dyn Selector>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            fs,
            store,
            selector,
        }
    }

    pub fn chart_service(&self) -> ChartService {
        ChartService::new(self.store.clone(), self.settings.clone())
    }

    pub fn export_service(&self) -> ExportService {
        ExportService::new(self.fs.clone())
    }
}
