#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;
use xivprep::app::ports::{HttpClientPort, HttpGetResult};
use xivprep::config::Config;

/// Answers from a fixed URL table (404 for anything else) and remembers every
/// URL it was asked for.
#[derive(Default)]
pub struct SpyHttp {
    requests: Mutex<Vec<String>>,
    responses: HashMap<String, (u16, Vec<u8>)>,
}

impl SpyHttp {
    pub fn with(mut self, url: &str, status: u16, body: &[u8]) -> Self {
        self.responses.insert(url.to_string(), (status, body.to_vec()));
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn answer(&self, url: &str) -> (u16, Vec<u8>) {
        self.requests.lock().unwrap().push(url.to_string());
        self.responses.get(url).cloned().unwrap_or((404, Vec::new()))
    }
}

#[async_trait]
impl HttpClientPort for SpyHttp {
    async fn get(&self, url: &str) -> Result<HttpGetResult, String> {
        let (status, bytes) = self.answer(url);
        Ok(HttpGetResult {
            status,
            bytes,
            content_type: "application/json".to_string(),
        })
    }

    async fn download(&self, url: &str, sink: &mut (dyn Write + Send)) -> Result<u16, String> {
        let (status, bytes) = self.answer(url);
        if status == 200 {
            sink.write_all(&bytes).map_err(|e| e.to_string())?;
        }
        Ok(status)
    }
}

/// A scratch directory with every configured path pointing inside it and no
/// rate-limit delay.
pub struct TestEnv {
    _tmp: TempDir,
    pub root: PathBuf,
    pub config: Config,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path().to_path_buf();

        let mut config = Config::default();
        config.icons.cache_dir = root.join("icons");
        config.icons.fetch_delay_ms = 0;
        config.actions.input = root.join("action.csv");
        config.actions.descriptions = root.join("action_desc.csv");
        config.actions.output = root.join("actions.json");
        config.statuses.input = root.join("status.csv");
        config.statuses.output = root.join("status_effects.json");
        config.triggers.source_dir = root.join("triggers");
        config.triggers.output = root.join("static/data/cactbot.triggers.json");
        config.catalog.api_url = "https://api.example.com/action".to_string();
        config.catalog.output = root.join("actions_full.json");
        config.recompile.input = root.join("actions_full.json");
        config.recompile.output = root.join("actions_index.json");
        config.recompile.data_dir = root.join("data");

        Self {
            _tmp: tmp,
            root,
            config,
        }
    }

    pub fn write(&self, path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(path, content).expect("write fixture");
    }

    pub fn read_json(&self, path: &Path) -> serde_json::Value {
        let content = fs::read_to_string(path).expect("read output");
        serde_json::from_str(&content).expect("parse output")
    }

    pub fn icon(&self, name: u32) -> PathBuf {
        self.config.icons.cache_dir.join(format!("{}.png", name))
    }
}

/// An action export row: id, name, icon, cast and recast in their usual columns.
pub fn action_line(id: u32, name: &str, icon: u32, cast: u32, recast: u32) -> String {
    let mut fields = vec![String::new(); 40];
    fields[0] = id.to_string();
    fields[1] = name.to_string();
    fields[3] = icon.to_string();
    fields[38] = cast.to_string();
    fields[39] = recast.to_string();
    fields.join(",")
}

pub fn icon_url(icon: u32) -> String {
    format!(
        "https://xivapi.com/i/{:06}/{:06}.png",
        icon / 1000 * 1000,
        icon
    )
}
