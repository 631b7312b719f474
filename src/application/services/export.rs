//! File export/import of charts
//!
//! Writes charts as pretty JSON files named after the chart and reads them back.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::codec::{self, export_file_name};
use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::Chart;
use crate::infrastructure::traits::FileSystem;

/// Service for chart file import/export.
pub struct ExportService {
    fs: Arc<dyn FileSystem>,
}

impl ExportService {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Write `<chart name>.json` into `dir`, creating `dir` if needed.
    #[instrument(level = "debug", skip(self, chart), fields(name = %chart.name))]
    pub fn export_json(&self, chart: &Chart, dir: &Path) -> ApplicationResult<PathBuf> {
        let json = codec::export_json(chart)?;
        let target = dir.join(export_file_name(&chart.name, "json"));
        self.fs
            .ensure_parent(&target)
            .with_path_context("create export directory", dir)?;
        self.fs
            .write(&target, &json)
            .with_path_context("write chart export", &target)?;
        debug!("export_json: wrote {} bytes", json.len());
        Ok(target)
    }

    /// Read a chart file.
    ///
    /// Unless `keep_id` is set the record id is cleared, so saving the
    /// result creates a new chart instead of overwriting the original.
    #[instrument(level = "debug", skip(self))]
    pub fn import_json(&self, path: &Path, keep_id: bool) -> ApplicationResult<Chart> {
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read chart file", path)?;
        let mut chart = codec::import_json(&content)?;
        if !keep_id {
            chart.id = None;
        }
        Ok(chart)
    }
}
