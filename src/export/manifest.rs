//! The `dataset_info.json` manifest written at the end of every export.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::Local;
use serde::Serialize;

use super::report::ExportStatistics;
use crate::catalog::{LabelCatalog, LabelCategory};
use crate::encode::CASCADE_RULES;
use crate::error::FacelabelError;
use crate::model::Progression;

/// File name of the manifest inside the output directory.
pub const MANIFEST_FILE: &str = "dataset_info.json";

#[derive(Debug, Serialize)]
pub struct DatasetManifest<'a> {
    pub dataset_name: &'static str,
    pub dataset_type: &'static str,
    pub created_at: String,
    pub source_video: String,
    pub total_labels: usize,
    pub label_mapping: Vec<LabelMapping<'a>>,
    pub multi_label_features: MultiLabelFeatures,
    pub special_rules: Vec<String>,
    pub label_file_format: LabelFileFormat<'a>,
    pub statistics: &'a ExportStatistics,
    pub progression_types: BTreeMap<&'static str, ProgressionTypeInfo>,
    pub tongue_actions: Vec<&'a str>,
    pub export_status: &'static str,
    pub generator: Generator,
}

#[derive(Debug, Serialize)]
pub struct LabelMapping<'a> {
    pub index: usize,
    pub id: &'a str,
    pub name: &'a str,
    pub localized_name: &'a str,
    pub category: LabelCategory,
}

#[derive(Debug, Serialize)]
pub struct MultiLabelFeatures {
    pub supports_multiple_labels_per_annotation: bool,
    pub supports_different_progression_types: bool,
    pub progression_types: [&'static str; 2],
    pub automatic_tongue_rules: bool,
}

#[derive(Debug, Serialize)]
pub struct LabelFileFormat<'a> {
    pub description: String,
    pub range: &'static str,
    pub value_format: &'static str,
    pub order: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct ProgressionTypeInfo {
    pub description: &'static str,
    pub formula: &'static str,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct Generator {
    pub name: &'static str,
    pub version: &'static str,
}

impl<'a> DatasetManifest<'a> {
    /// Describes an export run over `catalog`.
    pub fn new(catalog: &'a LabelCatalog, source_video: String, statistics: &'a ExportStatistics) -> Self {
        let n = catalog.label_count();

        let label_mapping = catalog
            .entries()
            .iter()
            .enumerate()
            .map(|(index, entry)| LabelMapping {
                index,
                id: entry.id.as_str(),
                name: &entry.name,
                localized_name: &entry.localized_name,
                category: entry.category,
            })
            .collect();

        let mut special_rules = vec![
            "Each annotation may carry several facial action labels at once".to_string(),
            "Each label has its own intensity and progression type".to_string(),
        ];
        special_rules.extend(CASCADE_RULES.iter().map(|r| r.to_string()));
        special_rules.push(format!(
            "Each label file holds {n} values, one per facial action"
        ));

        let progression_types = BTreeMap::from([
            (
                Progression::Linear.as_str(),
                ProgressionTypeInfo {
                    description: "intensity grows linearly over the interval",
                    formula: "value = intensity * progress",
                    count: statistics.progression_stats.linear_count,
                },
            ),
            (
                Progression::Constant.as_str(),
                ProgressionTypeInfo {
                    description: "intensity stays constant over the interval",
                    formula: "value = intensity",
                    count: statistics.progression_stats.constant_count,
                },
            ),
        ]);

        Self {
            dataset_name: "Multi-Label Facial Action Dataset",
            dataset_type: "multi_label",
            created_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            source_video,
            total_labels: n,
            label_mapping,
            multi_label_features: MultiLabelFeatures {
                supports_multiple_labels_per_annotation: true,
                supports_different_progression_types: true,
                progression_types: [Progression::Linear.as_str(), Progression::Constant.as_str()],
                automatic_tongue_rules: true,
            },
            special_rules,
            label_file_format: LabelFileFormat {
                description: format!("One value per line, {n} lines, in label order"),
                range: "0.0 to 1.0",
                value_format: "%.6f",
                order: catalog.entries().iter().map(|e| e.id.as_str()).collect(),
            },
            statistics,
            progression_types,
            tongue_actions: catalog.tongue_labels().map(|l| l.as_str()).collect(),
            export_status: if statistics.cancelled {
                "cancelled"
            } else {
                "completed"
            },
            generator: Generator {
                name: env!("CARGO_PKG_NAME"),
                version: env!("CARGO_PKG_VERSION"),
            },
        }
    }
}

/// Writes `manifest` as pretty JSON to `path`.
pub fn write_manifest(path: &Path, manifest: &DatasetManifest<'_>) -> Result<(), FacelabelError> {
    let file = File::create(path).map_err(FacelabelError::Io)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, manifest).map_err(|source| {
        FacelabelError::ManifestWrite {
            path: path.to_path_buf(),
            source,
        }
    })?;
    writer.flush()?;
    Ok(())
}
