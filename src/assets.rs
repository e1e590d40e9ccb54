//! Icon download and the on-disk icon cache.
//!
//! A file in the cache directory means the icon is done. There is no
//! freshness check: delete the file to force a refetch.

use crate::app::ports::HttpClientPort;
use crate::config::IconConfig;
use crate::constants::ICON_BUCKET_SIZE;
use crate::error::{PrepError, Result};
use std::fmt::Display;
use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Directory shard of an icon on the upstream server.
pub fn bucket(icon_id: u32) -> u32 {
    icon_id / ICON_BUCKET_SIZE * ICON_BUCKET_SIZE
}

/// Fill `{bucket}` and `{id}` in a URL template, both zero-padded to six digits.
pub fn render_url(template: &str, icon_id: u32) -> String {
    template
        .replace("{bucket}", &format!("{:06}", bucket(icon_id)))
        .replace("{id}", &format!("{:06}", icon_id))
}

pub fn cache_path(config: &IconConfig, name: impl Display) -> PathBuf {
    config
        .cache_dir
        .join(format!("{}.{}", name, config.extension))
}

/// Path written into output records, relative to the site root.
pub fn public_path(config: &IconConfig, name: impl Display) -> String {
    format!(
        "{}/{}.{}",
        config.public_prefix.trim_end_matches('/'),
        name,
        config.extension
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconOutcome {
    /// Already on disk, no request made.
    Cached,
    Fetched,
    /// Upstream answered with something other than 200.
    Failed { status: u16 },
}

impl IconOutcome {
    pub fn is_available(&self) -> bool {
        !matches!(self, IconOutcome::Failed { .. })
    }
}

pub struct IconFetcher {
    http: Arc<dyn HttpClientPort>,
    config: IconConfig,
}

impl IconFetcher {
    pub fn new(http: Arc<dyn HttpClientPort>, config: IconConfig) -> Self {
        Self { http, config }
    }

    /// Same cache, different upstream.
    pub fn with_url_template(mut self, template: &str) -> Self {
        self.config.url_template = template.to_string();
        self
    }

    pub fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.config.cache_dir)?;
        Ok(())
    }

    pub fn public_path(&self, name: u32) -> String {
        public_path(&self.config, name)
    }

    /// Make sure icon `icon_id` is cached as `{name}.{ext}`.
    ///
    /// A non-200 answer is reported as [`IconOutcome::Failed`] and leaves no
    /// file behind. Transport errors are returned as [`PrepError::Fetch`].
    pub async fn ensure(&self, icon_id: u32, name: u32) -> Result<IconOutcome> {
        let dest = cache_path(&self.config, name);
        if dest.exists() {
            debug!("Icon {} already cached at {}", icon_id, dest.display());
            return Ok(IconOutcome::Cached);
        }

        let url = render_url(&self.config.url_template, icon_id);
        let partial = dest.with_extension(format!("{}.part", self.config.extension));

        let status = {
            let mut file = File::create(&partial)?;
            match self.http.download(&url, &mut file).await {
                Ok(status) => status,
                Err(message) => {
                    let _ = fs::remove_file(&partial);
                    return Err(PrepError::Fetch { url, message });
                }
            }
        };

        if status != 200 {
            let _ = fs::remove_file(&partial);
            error!(url = %url, status, "Failed to fetch icon {}", icon_id);
            return Ok(IconOutcome::Failed { status });
        }

        fs::rename(&partial, &dest)?;
        info!("Fetched icon {} into {}", icon_id, dest.display());

        let delay = self.config.fetch_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(IconOutcome::Fetched)
    }
}
