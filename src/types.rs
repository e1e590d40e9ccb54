use crate::assets::IconOutcome;
use crate::error::PrepError;
use chrono::{DateTime, Utc};
use metrics::counter;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::time::Instant;

/// Normalized action, serialized in the shape the front-end reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionRecord {
    #[serde(skip)]
    pub id: u32,
    #[serde(skip)]
    pub icon_id: u32,
    #[serde(rename = "name_en")]
    pub name: String,
    #[serde(rename = "help_en")]
    pub description: String,
    /// Seconds.
    #[serde(rename = "cast")]
    pub cast_time: f64,
    /// Seconds.
    pub cooldown: f64,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRecord {
    #[serde(skip)]
    pub id: u32,
    #[serde(skip)]
    pub icon_id: u32,
    pub name: String,
    pub description: String,
    pub max_stacks: String,
    pub category: String,
    pub hit_effect: String,
    pub vfx: String,
    pub lock_movement: bool,
    pub lock_actions: bool,
    pub lock_control: bool,
    pub transfiguration: bool,
    pub can_dispel: bool,
    pub inflicted_by_actor: bool,
    pub is_permanent: bool,
    pub is_fc_buff: bool,
    pub invisibility: bool,
    pub icon: Option<String>,
}

/// A record that carries an icon reference resolved by the asset fetcher.
pub trait IconRecord {
    /// Key of the record in the output mapping.
    fn id(&self) -> u32;

    /// Remote icon id used to build the download URL.
    fn icon_id(&self) -> u32;

    /// Name the cached file is stored under. Most sources cache by icon id.
    fn icon_name(&self) -> u32 {
        self.icon_id()
    }

    fn set_icon(&mut self, icon: Option<String>);
}

impl IconRecord for ActionRecord {
    fn id(&self) -> u32 {
        self.id
    }

    fn icon_id(&self) -> u32 {
        self.icon_id
    }

    fn set_icon(&mut self, icon: Option<String>) {
        self.icon = icon;
    }
}

impl IconRecord for StatusRecord {
    fn id(&self) -> u32 {
        self.id
    }

    fn icon_id(&self) -> u32 {
        self.icon_id
    }

    fn set_icon(&mut self, icon: Option<String>) {
        self.icon = icon;
    }
}

/// Why a record was left out of the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    BlankName,
    MissingId,
    NotJobAction,
    MissingIcon,
    NotAnObject,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            SkipReason::BlankName => "blank name",
            SkipReason::MissingId => "missing id",
            SkipReason::NotJobAction => "not tied to a class or job",
            SkipReason::MissingIcon => "no icon",
            SkipReason::NotAnObject => "entry is not an object",
        };
        f.write_str(reason)
    }
}

/// Result of transforming one input row.
#[derive(Debug)]
pub enum RecordOutcome<R> {
    Success(R),
    Skipped(SkipReason),
    /// Aborts the whole run.
    Fatal(PrepError),
}

/// Counts of every outcome in a single job run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub job: String,
    pub started_at: DateTime<Utc>,
    pub elapsed: std::time::Duration,
    pub rows_read: usize,
    pub written: usize,
    pub skipped: usize,
    pub icons_fetched: usize,
    pub icons_cached: usize,
    pub icon_failures: usize,
    /// Icons looked up offline and not found in the cache.
    pub icons_missing: usize,
    pub fatal: bool,
    pub output_file: String,
    clock: Option<Instant>,
}

impl RunSummary {
    pub fn start(job: &str) -> Self {
        Self {
            job: job.to_string(),
            started_at: Utc::now(),
            elapsed: std::time::Duration::ZERO,
            rows_read: 0,
            written: 0,
            skipped: 0,
            icons_fetched: 0,
            icons_cached: 0,
            icon_failures: 0,
            icons_missing: 0,
            fatal: false,
            output_file: String::new(),
            clock: Some(Instant::now()),
        }
    }

    pub fn record_icon(&mut self, outcome: &IconOutcome) {
        match outcome {
            IconOutcome::Fetched => self.icons_fetched += 1,
            IconOutcome::Cached => self.icons_cached += 1,
            IconOutcome::Failed { .. } => self.icon_failures += 1,
        }
    }

    pub fn finish(&mut self, output: &Path) {
        self.output_file = output.display().to_string();
        self.stop();
        self.emit_metrics();
    }

    pub fn abort(&mut self) {
        self.fatal = true;
        self.stop();
        self.emit_metrics();
    }

    fn stop(&mut self) {
        if let Some(clock) = self.clock.take() {
            self.elapsed = clock.elapsed();
        }
    }

    fn emit_metrics(&self) {
        let job = self.job.clone();
        counter!("xivprep_runs_total", "job" => job.clone(), "fatal" => self.fatal.to_string()).increment(1);
        counter!("xivprep_rows_read_total", "job" => job.clone()).increment(self.rows_read as u64);
        counter!("xivprep_records_written_total", "job" => job.clone()).increment(self.written as u64);
        counter!("xivprep_records_skipped_total", "job" => job.clone()).increment(self.skipped as u64);
        counter!("xivprep_icons_total", "job" => job.clone(), "outcome" => "fetched").increment(self.icons_fetched as u64);
        counter!("xivprep_icons_total", "job" => job.clone(), "outcome" => "cached").increment(self.icons_cached as u64);
        counter!("xivprep_icons_total", "job" => job.clone(), "outcome" => "failed").increment(self.icon_failures as u64);
        counter!("xivprep_icons_total", "job" => job, "outcome" => "missing").increment(self.icons_missing as u64);
    }
}
