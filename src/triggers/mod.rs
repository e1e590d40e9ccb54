//! Trigger bundle: every trigger script in a directory, minified and keyed by
//! file name, in one JSON document.

pub mod minify;

use crate::config::TriggerConfig;
use crate::constants::TRIGGERS_JOB;
use crate::error::{PrepError, Result};
use crate::types::RunSummary;
use crate::writer::write_json;
use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument};

/// Files directly inside `dir` with the given extension, sorted by name.
pub fn collect_sources(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let read_error = |source| PrepError::Read {
        path: dir.to_path_buf(),
        source,
    };

    let mut sources = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_error)? {
        let path = entry.map_err(read_error)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
            sources.push(path);
        }
    }
    sources.sort();
    Ok(sources)
}

/// Read and minify every source. Fails on the first unreadable file, so a
/// bundle is either complete or not produced at all.
pub fn build_bundle(config: &TriggerConfig) -> Result<IndexMap<String, String>> {
    let mut bundle = IndexMap::new();
    for path in collect_sources(&config.source_dir, &config.extension)? {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let script = fs::read_to_string(&path).map_err(|source| PrepError::Read {
            path: path.clone(),
            source,
        })?;
        let minified = minify::minify(&script).map_err(|e| PrepError::Minify {
            file: file_name.clone(),
            reason: e.to_string(),
        })?;
        debug!("Minified {} ({} -> {} bytes)", file_name, script.len(), minified.len());
        bundle.insert(file_name, minified);
    }
    Ok(bundle)
}

#[instrument(skip_all)]
pub fn run(config: &TriggerConfig) -> Result<RunSummary> {
    let mut summary = RunSummary::start(TRIGGERS_JOB);
    info!("Bundling *.{} from {}", config.extension, config.source_dir.display());

    let bundle = match build_bundle(config) {
        Ok(bundle) => bundle,
        Err(e) => {
            summary.abort();
            error!("Trigger bundle aborted: {}", e);
            return Err(e);
        }
    };

    summary.rows_read = bundle.len();
    summary.written = bundle.len();
    write_json(&config.output, &bundle)?;
    summary.finish(&config.output);
    info!("Bundled {} trigger files into {}", bundle.len(), config.output.display());
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trigger_config(dir: &Path) -> TriggerConfig {
        TriggerConfig {
            source_dir: dir.join("triggers"),
            extension: "js".to_string(),
            output: dir.join("out/cactbot.triggers.json"),
        }
    }

    #[test]
    fn test_bundle_keys_by_file_name_and_ignores_other_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = trigger_config(dir.path());
        fs::create_dir_all(config.source_dir.join("nested")).unwrap();
        fs::write(config.source_dir.join("b.js"), "var b = 2; // two").unwrap();
        fs::write(config.source_dir.join("a.js"), "var a = 1;").unwrap();
        fs::write(config.source_dir.join("notes.txt"), "not a script").unwrap();
        fs::write(config.source_dir.join("nested/c.js"), "var c = 3;").unwrap();

        let bundle = build_bundle(&config).unwrap();

        assert_eq!(bundle.keys().collect::<Vec<_>>(), vec!["a.js", "b.js"]);
        assert_eq!(bundle["b.js"], "var b=2;");
    }

    #[test]
    fn test_non_utf8_file_fails_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let config = trigger_config(dir.path());
        fs::create_dir_all(&config.source_dir).unwrap();
        fs::write(config.source_dir.join("a.js"), "var a = 1;").unwrap();
        fs::write(config.source_dir.join("b.js"), b"var b = '\xff';").unwrap();

        let result = run(&config);

        assert!(matches!(result, Err(PrepError::Read { .. })));
        assert!(!config.output.exists());
    }

    #[test]
    fn test_missing_source_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = trigger_config(dir.path());
        assert!(matches!(build_bundle(&config), Err(PrepError::Read { .. })));
    }
}
