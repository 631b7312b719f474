//! Chart persistence service
//!
//! Creates charts, saves whole snapshots and looks records up by id or name.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument};

use crate::application::session::{EditPolicy, EditorSession};
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{Chart, OrgNode};
use crate::infrastructure::store::ChartStore;

/// Service for creating, saving and loading charts.
pub struct ChartService {
    store: Arc<dyn ChartStore>,
    settings: Arc<Settings>,
}

impl ChartService {
    pub fn new(store: Arc<dyn ChartStore>, settings: Arc<Settings>) -> Self {
        Self { store, settings }
    }

    /// Unsaved chart with a single root node taken from settings.
    pub fn new_chart(&self, name: Option<&str>, description: Option<&str>) -> Chart {
        let name = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(self.settings.default_chart_name.as_str());
        let root = OrgNode::with_generated_id(
            self.settings.root_name.as_str(),
            self.settings.root_position.as_str(),
        );
        let description = description
            .filter(|d| !d.trim().is_empty())
            .map(str::to_string);
        Chart::new(name, description, root)
    }

    /// Editor session over `chart` using the configured edit policy.
    pub fn session(&self, chart: Chart) -> EditorSession {
        EditorSession::new(chart, EditPolicy::from(self.settings.as_ref()))
    }

    /// Persist the whole chart.
    ///
    /// Charts without an id are inserted and receive one from the store;
    /// charts with an id overwrite their record. `updated_at` is stamped on
    /// every save.
    #[instrument(level = "debug", skip(self, chart), fields(name = %chart.name))]
    pub fn save(&self, mut chart: Chart) -> ApplicationResult<Chart> {
        chart.updated_at = Some(Utc::now());
        match chart.id.clone() {
            Some(id) => {
                self.store
                    .update(&chart)
                    .map_err(|e| match e.kind() {
                        std::io::ErrorKind::NotFound => ApplicationError::ChartNotFound(id.clone()),
                        _ => ApplicationError::OperationFailed {
                            context: format!("update chart {id}"),
                            source: Box::new(e),
                        },
                    })?;
                info!("save: updated chart {}", id);
                Ok(chart)
            }
            None => {
                let saved = self
                    .store
                    .insert(chart)
                    .with_context("insert chart")?;
                info!("save: inserted chart {:?}", saved.id);
                Ok(saved)
            }
        }
    }

    /// Find a chart by id, falling back to an exact, unique name match.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, reference: &str) -> ApplicationResult<Chart> {
        match self.store.get(reference) {
            Ok(Some(chart)) => return Ok(chart),
            Ok(None) => {}
            // not usable as an id, may still be a name
            Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => {}
            Err(e) => return Err(e).with_context(format!("read chart {reference}")),
        }

        let mut matches: Vec<Chart> = self
            .list()?
            .into_iter()
            .filter(|c| c.name == reference)
            .collect();
        debug!("load: {} charts named {:?}", matches.len(), reference);
        match matches.len() {
            0 => Err(ApplicationError::ChartNotFound(reference.to_string())),
            1 => Ok(matches.remove(0)),
            _ => Err(ApplicationError::AmbiguousChart(reference.to_string())),
        }
    }

    /// All charts, most recently updated first.
    pub fn list(&self) -> ApplicationResult<Vec<Chart>> {
        let mut charts = self.store.list().with_context("list charts")?;
        // Never-saved timestamps sort last
        charts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(charts)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn delete(&self, id: &str) -> ApplicationResult<()> {
        let removed = self
            .store
            .delete(id)
            .with_context(format!("delete chart {id}"))?;
        if !removed {
            return Err(ApplicationError::ChartNotFound(id.to_string()));
        }
        info!("delete: removed chart {}", id);
        Ok(())
    }
}
