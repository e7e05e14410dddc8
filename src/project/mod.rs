//! Project file reading and writing.
//!
//! A project file is a JSON object holding the video metadata and the
//! annotation list, plus derived sections (statistics, label grouping,
//! progression descriptions) that are written for human readers and
//! ignored on load.
//!
//! Two annotation layouts are understood:
//! - version 2.0 entries carry a `labels` array of `{label, intensity,
//!   progression}` configs;
//! - version 1.0 entries carry a single `label` string and an optional
//!   `intensity`. They are migrated to one linear config on load.
//!
//! Loading is lenient per entry: an entry that cannot be parsed, or that
//! the store rejects (overlap, repeated id), is skipped and reported as a
//! [`LoadIssue`]. Only a document that is not a JSON object at all, or
//! whose top-level sections have the wrong shape, fails the load.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::LabelCatalog;
use crate::error::FacelabelError;
use crate::model::{
    clamp_intensity, generate_interval_id, AnnotationInterval, LabelConfig, Progression, VideoInfo,
    DEFAULT_COLOR,
};
use crate::stats::{LabelGrouping, StoreStatistics};
use crate::store::{AnnotationStore, Rejected};

/// Version written into new project files.
pub const PROJECT_VERSION: &str = "2.0";

/// Version assumed for documents without a `project_info` section.
pub const LEGACY_VERSION: &str = "1.0";

const CREATED_BY: &str = "facelabel";

/// The `project_info` header.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub version: String,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub supports_multi_label: bool,
    #[serde(default)]
    pub supports_progression_types: bool,
}

impl Default for ProjectInfo {
    fn default() -> Self {
        Self {
            version: PROJECT_VERSION.to_string(),
            created_by: CREATED_BY.to_string(),
            supports_multi_label: true,
            supports_progression_types: true,
        }
    }
}

/// An annotation as written to disk: the interval plus its duration.
#[derive(Clone, Debug, Serialize)]
pub struct AnnotationEntry<'a> {
    #[serde(flatten)]
    pub interval: &'a AnnotationInterval,
    pub duration: f64,
}

/// A complete version 2.0 project document, borrowed from a store.
#[derive(Clone, Debug, Serialize)]
pub struct ProjectDocument<'a> {
    pub project_info: ProjectInfo,
    pub video_info: &'a VideoInfo,
    pub annotations: Vec<AnnotationEntry<'a>>,
    pub statistics: StoreStatistics,
    pub label_grouping: LabelGrouping,
    pub progression_types: BTreeMap<&'static str, &'static str>,
}

/// Human-readable description of each progression type.
pub fn progression_descriptions() -> BTreeMap<&'static str, &'static str> {
    BTreeMap::from([
        (
            Progression::Linear.as_str(),
            "intensity ramps linearly from 0 to the configured value",
        ),
        (
            Progression::Constant.as_str(),
            "intensity holds the configured value for the whole interval",
        ),
    ])
}

/// Builds the document for `store`, grouping labels with the standard
/// facial-action catalog.
pub fn to_document(store: &AnnotationStore) -> ProjectDocument<'_> {
    to_document_with(store, &LabelCatalog::facial_actions())
}

/// Builds the document for `store`, grouping labels with `catalog`.
pub fn to_document_with<'a>(store: &'a AnnotationStore, catalog: &LabelCatalog) -> ProjectDocument<'a> {
    ProjectDocument {
        project_info: ProjectInfo::default(),
        video_info: store.video_info(),
        annotations: store
            .intervals()
            .iter()
            .map(|interval| AnnotationEntry {
                interval,
                duration: interval.duration(),
            })
            .collect(),
        statistics: store.statistics(),
        label_grouping: store.label_grouping(catalog),
        progression_types: progression_descriptions(),
    }
}

/// Serializes `store` as a pretty-printed project document.
pub fn to_json_string(store: &AnnotationStore) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&to_document(store))
}

/// Writes `store` to `path` without touching its dirty flag.
///
/// # Errors
/// Returns an error if the file cannot be created or written.
pub fn write_project(path: &Path, store: &AnnotationStore) -> Result<(), FacelabelError> {
    let file = File::create(path).map_err(FacelabelError::Io)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, &to_document(store)).map_err(|source| {
        FacelabelError::ProjectWrite {
            path: path.to_path_buf(),
            source,
        }
    })?;
    writer.flush()?;
    Ok(())
}

/// Saves `store` to `path`, or to the path it was loaded from when `path`
/// is `None`. On success the path is remembered and the store is clean.
pub fn save_project(store: &mut AnnotationStore, path: Option<&Path>) -> Result<(), FacelabelError> {
    let target = match path.or(store.project_path()) {
        Some(target) => target.to_path_buf(),
        None => {
            return Err(FacelabelError::InvalidArgument(
                "no project path to save to".to_string(),
            ))
        }
    };

    write_project(&target, store)?;
    info!(path = %target.display(), intervals = store.len(), "project saved");
    store.set_project_path(target);
    store.mark_saved();
    Ok(())
}

/// An entry that was left out of the loaded store.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum LoadIssue {
    #[error("annotation {}: could not be parsed: {message}", .index + 1)]
    Unparseable { index: usize, message: String },

    #[error("annotation {}: skipped: {reason}", .index + 1)]
    Rejected { index: usize, reason: Rejected },
}

impl LoadIssue {
    /// Position of the entry in the document's annotation list.
    pub fn index(&self) -> usize {
        match self {
            LoadIssue::Unparseable { index, .. } | LoadIssue::Rejected { index, .. } => *index,
        }
    }
}

/// The result of loading a project document.
#[derive(Debug)]
pub struct ProjectLoad {
    /// The loaded store, clean.
    pub store: AnnotationStore,
    /// `project_info.version`, or "1.0" when absent.
    pub version: String,
    /// Entries that were skipped.
    pub issues: Vec<LoadIssue>,
}

impl ProjectLoad {
    /// True if the document used the pre-2.0 layout.
    pub fn is_legacy(&self) -> bool {
        self.version != PROJECT_VERSION
    }
}

/// Version 1.0 annotation entry.
#[derive(Deserialize)]
struct LegacyEntry {
    #[serde(default)]
    id: String,
    start_time: f64,
    end_time: f64,
    label: String,
    intensity: Option<f64>,
    #[serde(default)]
    color: Option<String>,
}

impl From<LegacyEntry> for AnnotationInterval {
    fn from(entry: LegacyEntry) -> Self {
        let intensity = clamp_intensity(entry.intensity.unwrap_or(1.0));
        AnnotationInterval {
            id: entry.id,
            start_time: entry.start_time,
            end_time: entry.end_time,
            labels: vec![LabelConfig::new(entry.label, intensity, Progression::Linear)],
            color: entry.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
        }
    }
}

/// Parses one annotation entry in either layout.
fn parse_entry(entry: &Value) -> Result<AnnotationInterval, serde_json::Error> {
    let mut interval = if entry.get("labels").is_some_and(Value::is_array) {
        AnnotationInterval::deserialize(entry)?
    } else {
        LegacyEntry::deserialize(entry)?.into()
    };
    if interval.id.is_empty() {
        interval.id = generate_interval_id();
    }
    Ok(interval)
}

/// Parses a single annotation entry, for fuzzing the migration path.
#[cfg(feature = "fuzzing")]
pub fn parse_annotation_entry(entry: &Value) -> Result<AnnotationInterval, serde_json::Error> {
    parse_entry(entry)
}

/// Builds a store from an already parsed JSON document.
pub fn from_value(document: &Value) -> Result<ProjectLoad, FacelabelError> {
    let object = document.as_object().ok_or_else(|| {
        FacelabelError::ProjectFormat("project document must be a JSON object".to_string())
    })?;

    let version = match object.get("project_info") {
        Some(raw) => ProjectInfo::deserialize(raw)
            .map(|info| info.version)
            .map_err(|e| FacelabelError::ProjectFormat(format!("invalid project_info: {e}")))?,
        None => LEGACY_VERSION.to_string(),
    };

    let video_info = match object.get("video_info") {
        Some(raw) => VideoInfo::deserialize(raw)
            .map_err(|e| FacelabelError::ProjectFormat(format!("invalid video_info: {e}")))?,
        None => VideoInfo::default(),
    };

    let entries: &[Value] = match object.get("annotations") {
        Some(Value::Array(entries)) => entries,
        Some(Value::Null) | None => &[],
        Some(_) => {
            return Err(FacelabelError::ProjectFormat(
                "annotations must be an array".to_string(),
            ))
        }
    };

    let mut store = AnnotationStore::with_video(video_info);
    let mut issues = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        let issue = match parse_entry(entry) {
            Ok(interval) => match store.add(interval) {
                Ok(()) => continue,
                Err(reason) => LoadIssue::Rejected { index, reason },
            },
            Err(e) => LoadIssue::Unparseable {
                index,
                message: e.to_string(),
            },
        };
        warn!("{issue}");
        issues.push(issue);
    }

    store.mark_saved();
    debug!(
        version = %version,
        loaded = store.len(),
        skipped = issues.len(),
        "project document parsed"
    );

    Ok(ProjectLoad {
        store,
        version,
        issues,
    })
}

/// Parses a project document from a string.
pub fn from_json_str(json: &str) -> Result<ProjectLoad, FacelabelError> {
    from_json_slice(json.as_bytes())
}

/// Parses a project document from bytes.
pub fn from_json_slice(bytes: &[u8]) -> Result<ProjectLoad, FacelabelError> {
    let document: Value = serde_json::from_slice(bytes).map_err(|source| {
        FacelabelError::ProjectParse {
            path: "<memory>".into(),
            source,
        }
    })?;
    from_value(&document)
}

/// Reads a project file. The returned store remembers `path`.
///
/// # Errors
/// Returns an error if the file cannot be read, is not JSON, or is not a
/// project document.
pub fn read_project(path: &Path) -> Result<ProjectLoad, FacelabelError> {
    let file = File::open(path).map_err(FacelabelError::Io)?;
    let reader = BufReader::new(file);

    let document: Value =
        serde_json::from_reader(reader).map_err(|source| FacelabelError::ProjectParse {
            path: path.to_path_buf(),
            source,
        })?;

    let mut load = from_value(&document)?;
    load.store.set_project_path(path);
    load.store.mark_saved();
    info!(
        path = %path.display(),
        version = %load.version,
        intervals = load.store.len(),
        "project loaded"
    );
    Ok(load)
}
