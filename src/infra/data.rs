//! # Data Loading Module / 数据加载模块
//!
//! Loads the JSON reference datasets from the data directory. Files are read
//! concurrently and independently; a missing or broken file leaves its
//! dataset empty and is logged, it never aborts loading. Single records with
//! an unreadable shape are skipped.
//!
//! 从数据目录加载 JSON 参考数据集。文件并发且独立读取；
//! 缺失或损坏的文件会使对应数据集为空并记录日志，不会中止加载。

use futures::join;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::core::models::{Example, parse_examples};
use crate::core::reference::ReferenceData;
use crate::error::DataError;

pub const CATALOG_FILE: &str = "LKAAT_Leistungskatalog.json";
pub const TARDOC_FILE: &str = "TARDOC_Tarifpositionen.json";
pub const INTERPRETATIONS_FILE: &str = "TARDOC_Interpretationen.json";
pub const PAUSCHALE_LP_FILE: &str = "PAUSCHALEN_Leistungspositionen.json";
pub const PAUSCHALEN_FILE: &str = "PAUSCHALEN_Pauschalen.json";
pub const CONDITIONS_FILE: &str = "PAUSCHALEN_Bedingungen.json";
pub const TABLES_FILE: &str = "PAUSCHALEN_Tabellen.json";
pub const DIGNITIES_FILE: &str = "DIGNITAETEN.json";

/// Result of loading the reference data: the datasets plus the problem, if
/// any, that should be shown as a banner.
/// 加载结果：数据集以及需要以横幅显示的问题（如有）。
#[derive(Debug)]
pub struct LoadedData {
    pub data: ReferenceData,
    pub problem: Option<DataError>,
}

/// Loads every dataset from `dir`.
pub async fn load_reference_data(dir: &Path) -> LoadedData {
    tracing::info!("Loading reference data from {}", dir.display());
    let (catalog, tardoc, interpretations, pauschale_lp, pauschalen, conditions, tables, dignities) = join!(
        load_dataset(dir.join(CATALOG_FILE)),
        load_dataset(dir.join(TARDOC_FILE)),
        load_dataset(dir.join(INTERPRETATIONS_FILE)),
        load_dataset(dir.join(PAUSCHALE_LP_FILE)),
        load_dataset(dir.join(PAUSCHALEN_FILE)),
        load_dataset(dir.join(CONDITIONS_FILE)),
        load_dataset(dir.join(TABLES_FILE)),
        load_dataset(dir.join(DIGNITIES_FILE)),
    );

    let data = ReferenceData {
        catalog,
        tardoc,
        interpretations,
        pauschale_lp,
        pauschalen,
        pauschale_conditions: conditions,
        tables,
        dignities,
    };

    let missing = data.missing_critical();
    let problem = if missing.is_empty() {
        tracing::info!(
            "Reference data loaded: {} catalog entries, {} TARDOC positions, {} Pauschalen",
            data.catalog.len(),
            data.tardoc.len(),
            data.pauschalen.len()
        );
        None
    } else {
        tracing::warn!("Critical datasets missing: {}", missing.join(", "));
        Some(DataError::MissingData { names: missing })
    };

    LoadedData { data, problem }
}

/// Reads one JSON array file. A missing or unparsable file is logged and
/// yields an empty list; records that do not decode are skipped one by one.
async fn load_dataset<T: DeserializeOwned>(path: PathBuf) -> Vec<T> {
    let items = match read_json::<Vec<Value>>(&path).await {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!("{}", e);
            return Vec::new();
        }
    };
    let total = items.len();
    let records: Vec<T> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(
                    "Skipping record {} of {} with unreadable shape: {}",
                    index,
                    path.display(),
                    e
                );
                None
            }
        })
        .collect();
    tracing::debug!(
        "Loaded {} of {} records from {}",
        records.len(),
        total,
        path.display()
    );
    records
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DataError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| DataError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    serde_json::from_str(&content).map_err(|source| DataError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads the baseline example set used by quality control.
/// 加载质量控制使用的基线示例集。
pub async fn load_examples(path: &Path) -> Result<Vec<Example>, DataError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| DataError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    parse_examples(&content, path)
}
