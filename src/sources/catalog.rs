//! Full action catalog from the JSON listing API, and the compact index
//! rebuilt from it.

use crate::app::ports::HttpClientPort;
use crate::assets::{cache_path, public_path, IconFetcher};
use crate::config::Config;
use crate::constants::{CATALOG_PULL_JOB, CATALOG_RECOMPILE_JOB};
use crate::error::{PrepError, Result};
use crate::pipeline::Pipeline;
use crate::types::{IconRecord, RecordOutcome, RunSummary, SkipReason};
use crate::writer::write_json;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// One catalog item, kept as the API returned it apart from `icon`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogEntry {
    #[serde(skip)]
    pub id: u32,
    #[serde(skip)]
    pub icon_id: u32,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl IconRecord for CatalogEntry {
    fn id(&self) -> u32 {
        self.id
    }

    fn icon_id(&self) -> u32 {
        self.icon_id
    }

    /// Catalog icons are cached under the action id.
    fn icon_name(&self) -> u32 {
        self.id
    }

    fn set_icon(&mut self, icon: Option<String>) {
        self.fields
            .insert("icon".to_string(), icon.map(Value::String).unwrap_or(Value::Null));
    }
}

/// Integer from a number or a numeric string.
fn integer(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Positive integer id; zero and anything else count as absent.
fn positive_id(value: Option<&Value>) -> Option<u32> {
    integer(value)
        .and_then(|id| u32::try_from(id).ok())
        .filter(|id| *id > 0)
}

/// Only actions tied to a class or job are kept.
fn is_job_action(fields: &Map<String, Value>) -> bool {
    let positive = |key: &str| integer(fields.get(key)).unwrap_or(0) > 0;
    positive("classjob") || positive("classjob_category")
}

pub fn select_entry(item: &Value) -> RecordOutcome<CatalogEntry> {
    let Value::Object(fields) = item else {
        return RecordOutcome::Skipped(SkipReason::NotAnObject);
    };
    let Some(id) = positive_id(fields.get("id")) else {
        return RecordOutcome::Skipped(SkipReason::MissingId);
    };
    if !is_job_action(fields) {
        return RecordOutcome::Skipped(SkipReason::NotJobAction);
    }
    let Some(icon_id) = positive_id(fields.get("icon")) else {
        return RecordOutcome::Skipped(SkipReason::MissingIcon);
    };

    RecordOutcome::Success(CatalogEntry {
        id,
        icon_id,
        fields: fields.clone(),
    })
}

/// Download the catalog listing and cache one icon per kept action.
#[instrument(skip_all)]
pub async fn pull(config: &Config, http: Arc<dyn HttpClientPort>) -> Result<RunSummary> {
    let url = &config.catalog.api_url;
    let response = http.get(url).await.map_err(|message| PrepError::Fetch {
        url: url.clone(),
        message,
    })?;
    if response.status != 200 {
        return Err(PrepError::Fetch {
            url: url.clone(),
            message: format!("status {}", response.status),
        });
    }
    debug!(
        "Catalog response: {} bytes of {}",
        response.bytes.len(),
        response.content_type
    );

    let items: Vec<Value> = serde_json::from_slice(&response.bytes)?;
    info!("Fetched {} catalog items", items.len());

    let fetcher = IconFetcher::new(http, config.icons.clone())
        .with_url_template(&config.catalog.icon_url_template);

    Pipeline::run_records(
        CATALOG_PULL_JOB,
        items.into_iter().map(Ok),
        select_entry,
        &fetcher,
        &config.catalog.output,
    )
    .await
}

/// Split the pulled catalog into one file per action plus a compact index.
/// Works offline: icons are only looked up in the cache.
#[instrument(skip_all)]
pub fn recompile(config: &Config) -> Result<RunSummary> {
    let settings = &config.recompile;
    let mut summary = RunSummary::start(CATALOG_RECOMPILE_JOB);

    let content = fs::read_to_string(&settings.input).map_err(|source| PrepError::Read {
        path: settings.input.clone(),
        source,
    })?;
    let catalog: Map<String, Value> = serde_json::from_str(&content)?;
    fs::create_dir_all(&settings.data_dir)?;

    let mut index: IndexMap<String, Value> = IndexMap::new();
    for (key, mut entry) in catalog {
        summary.rows_read += 1;
        let Ok(id) = key.parse::<u32>() else {
            debug!("Skipping catalog key {:?}: {}", key, SkipReason::MissingId);
            summary.skipped += 1;
            continue;
        };
        let Value::Object(fields) = &mut entry else {
            debug!("Skipping action {}: {}", id, SkipReason::NotAnObject);
            summary.skipped += 1;
            continue;
        };
        if !is_job_action(fields) {
            debug!("Skipping action {}: {}", id, SkipReason::NotJobAction);
            summary.skipped += 1;
            continue;
        }

        let icon = if cache_path(&config.icons, id).exists() {
            summary.icons_cached += 1;
            Value::String(public_path(&config.icons, id))
        } else {
            summary.icons_missing += 1;
            Value::Null
        };
        fields.insert("icon".to_string(), icon.clone());

        let mut compact = Map::new();
        compact.insert("icon".to_string(), icon);
        for field in &settings.keys {
            compact.insert(field.clone(), fields.get(field).cloned().unwrap_or(Value::Null));
        }

        write_json(&settings.data_dir.join(format!("{}.json", id)), &entry)?;
        index.insert(id.to_string(), Value::Object(compact));
        summary.written += 1;
    }

    write_json(&settings.output, &index)?;
    summary.finish(&settings.output);
    info!(
        "Recompiled {} actions into {} ({} skipped)",
        summary.written,
        settings.output.display(),
        summary.skipped
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IconConfig, RecompileConfig};
    use serde_json::json;

    #[test]
    fn test_select_entry_filters() {
        assert!(matches!(
            select_entry(&json!({"id": 0, "classjob": 1, "icon": 405})),
            RecordOutcome::Skipped(SkipReason::MissingId)
        ));
        assert!(matches!(
            select_entry(&json!({"id": 9, "classjob": 0, "classjob_category": 0, "icon": 405})),
            RecordOutcome::Skipped(SkipReason::NotJobAction)
        ));
        assert!(matches!(
            select_entry(&json!({"id": 9, "classjob_category": 3, "icon": ""})),
            RecordOutcome::Skipped(SkipReason::MissingIcon)
        ));
        assert!(matches!(
            select_entry(&json!([1, 2])),
            RecordOutcome::Skipped(SkipReason::NotAnObject)
        ));
    }

    #[test]
    fn test_entry_keeps_all_fields_and_replaces_icon() {
        let item = json!({"id": 9, "name_en": "Stone", "classjob": 6, "icon": "405"});
        let RecordOutcome::Success(mut entry) = select_entry(&item) else {
            panic!("expected an entry");
        };
        assert_eq!(entry.icon_id, 405);
        assert_eq!(entry.icon_name(), 9);

        entry.set_icon(Some("/icons/9.png".to_string()));
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            value,
            json!({"id": 9, "name_en": "Stone", "classjob": 6, "icon": "/icons/9.png"})
        );
    }

    #[test]
    fn test_numeric_strings_count_as_job_ids() {
        assert!(matches!(
            select_entry(&json!({"id": "9", "classjob": "6", "icon": 405})),
            RecordOutcome::Success(CatalogEntry { id: 9, .. })
        ));
        assert!(matches!(
            select_entry(&json!({"id": 9, "classjob": "0", "classjob_category": "x", "icon": 405})),
            RecordOutcome::Skipped(SkipReason::NotJobAction)
        ));
    }

    fn recompile_config(root: &std::path::Path) -> Config {
        Config {
            icons: IconConfig {
                cache_dir: root.join("icons"),
                ..IconConfig::default()
            },
            recompile: RecompileConfig {
                input: root.join("actions_full.json"),
                output: root.join("out").join("actions.json"),
                data_dir: root.join("out").join("data"),
                ..RecompileConfig::default()
            },
            ..Config::default()
        }
    }

    #[test]
    fn test_recompile_counts_icons_of_kept_entries_only() {
        let dir = tempfile::tempdir().unwrap();
        let config = recompile_config(dir.path());
        fs::create_dir_all(&config.icons.cache_dir).unwrap();
        fs::write(config.icons.cache_dir.join("10.png"), b"png").unwrap();
        let catalog = json!({
            "10": {"name_en": "Cure", "classjob": 6},
            "11": {"name_en": "Aero", "classjob_category": 2},
            "12": {"name_en": "Sprint", "classjob": 0}
        });
        fs::write(&config.recompile.input, catalog.to_string()).unwrap();

        let summary = recompile(&config).unwrap();

        assert_eq!(summary.written, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.icons_cached, 1);
        assert_eq!(summary.icons_missing, 1);
        assert_eq!(summary.icon_failures, 0);
    }

    #[test]
    fn test_recompile_skips_keys_that_are_not_ids() {
        let dir = tempfile::tempdir().unwrap();
        let config = recompile_config(dir.path());
        let catalog = json!({
            "../evil": {"name_en": "Escape", "classjob": 6},
            "7/8": {"name_en": "Nested", "classjob": 6},
            "7": {"name_en": "Stone", "classjob": 6}
        });
        fs::write(&config.recompile.input, catalog.to_string()).unwrap();

        let summary = recompile(&config).unwrap();

        assert_eq!(summary.written, 1);
        assert_eq!(summary.skipped, 2);
        assert!(!dir.path().join("out").join("evil.json").exists());
        let files: Vec<_> = fs::read_dir(&config.recompile.data_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(files, vec![std::ffi::OsString::from("7.json")]);
        let index: Value =
            serde_json::from_str(&fs::read_to_string(&config.recompile.output).unwrap()).unwrap();
        assert_eq!(index.as_object().unwrap().keys().collect::<Vec<_>>(), vec!["7"]);
    }
}
