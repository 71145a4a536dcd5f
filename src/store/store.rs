use super::entities::{Category, InterviewReport, InterviewResult};
use crate::classifier::VoiceMetrics;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

/// Tolerance for the best-effort duplicate probe. Exact float equality
/// across rows would make the dedup check fragile against any rounding
/// in the pipeline.
const METRIC_EPSILON: f64 = 1e-9;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to write store file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read store file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store file {path} is malformed: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize store contents: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreData {
    categories: Vec<Category>,
    results: Vec<InterviewResult>,
}

/// Local persistence for interview attempts
///
/// A flat JSON file holding categories and results. Calls are
/// synchronous and internally locked so they are safe from any async
/// completion context. The check-then-insert dedup is not transactional;
/// single-user usage makes that acceptable.
pub struct ResultStore {
    path: Option<PathBuf>,
    data: Mutex<StoreData>,
}

impl ResultStore {
    /// Open a store backed by a JSON file, loading existing contents
    /// when the file exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let data = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|source| StoreError::Read {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str(&raw).map_err(|source| StoreError::Malformed {
                path: path.clone(),
                source,
            })?
        } else {
            StoreData::default()
        };

        info!(
            "Result store opened: {} ({} results, {} categories)",
            path.display(),
            data.results.len(),
            data.categories.len()
        );

        Ok(Self {
            path: Some(path),
            data: Mutex::new(data),
        })
    }

    /// Create a store with no backing file. `save` becomes a no-op.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            data: Mutex::new(StoreData::default()),
        }
    }

    pub fn insert_category(&self, category: Category) -> Uuid {
        let id = category.id;
        self.data.lock().unwrap().categories.push(category);
        id
    }

    /// Look up a category by exact name, creating it if absent.
    pub fn find_or_create_category(&self, name: &str) -> Uuid {
        let mut data = self.data.lock().unwrap();
        if let Some(existing) = data.categories.iter().find(|c| c.name == name) {
            return existing.id;
        }
        let category = Category::new(name);
        let id = category.id;
        info!("Created category: {}", name);
        data.categories.push(category);
        id
    }

    pub fn category_by_name(&self, name: &str) -> Option<Category> {
        self.data
            .lock()
            .unwrap()
            .categories
            .iter()
            .find(|c| c.name == name)
            .cloned()
    }

    pub fn insert_result(&self, result: InterviewResult) -> Uuid {
        let id = result.id;
        self.data.lock().unwrap().results.push(result);
        id
    }

    /// All results, newest first.
    pub fn results(&self) -> Vec<InterviewResult> {
        let mut results = self.data.lock().unwrap().results.clone();
        results.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        results
    }

    pub fn result(&self, id: Uuid) -> Option<InterviewResult> {
        self.data
            .lock()
            .unwrap()
            .results
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    /// Results belonging to the named category, newest first. Exact
    /// name match only; "Coding" never matches "Business".
    pub fn results_for_category(&self, name: &str) -> Vec<InterviewResult> {
        let data = self.data.lock().unwrap();
        let Some(category_id) = data.categories.iter().find(|c| c.name == name).map(|c| c.id)
        else {
            return Vec::new();
        };
        let mut results: Vec<InterviewResult> = data
            .results
            .iter()
            .filter(|r| r.category_id == Some(category_id))
            .cloned()
            .collect();
        results.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        results
    }

    /// Duplicate probe for the save guard: does a row with these
    /// metrics already exist under this category name?
    pub fn has_matching_result(&self, metrics: &VoiceMetrics, category_name: &str) -> bool {
        let data = self.data.lock().unwrap();
        let Some(category_id) = data
            .categories
            .iter()
            .find(|c| c.name == category_name)
            .map(|c| c.id)
        else {
            return false;
        };

        data.results.iter().any(|r| {
            r.category_id == Some(category_id)
                && (r.pitch - metrics.pitch).abs() < METRIC_EPSILON
                && (r.speed - metrics.speed).abs() < METRIC_EPSILON
                && r.confidence == metrics.confidence
        })
    }

    /// Attach a report to a result. A report, once attached, is never
    /// replaced; repeat calls leave the existing report in place.
    pub fn attach_report(&self, result_id: Uuid, text: impl Into<String>) {
        let mut data = self.data.lock().unwrap();
        match data.results.iter_mut().find(|r| r.id == result_id) {
            Some(result) => {
                if result.report.is_some() {
                    warn!("Result {} already has a report, keeping it", result_id);
                    return;
                }
                result.report = Some(InterviewReport::new(text));
            }
            None => warn!("No result {} to attach report to", result_id),
        }
    }

    /// Flush contents to the backing file, if any.
    pub fn save(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let data = self.data.lock().unwrap();
        let raw = serde_json::to_string_pretty(&*data).map_err(StoreError::Serialize)?;
        fs::write(path, raw).map_err(|source| StoreError::Write {
            path: path.clone(),
            source,
        })?;

        Ok(())
    }
}
